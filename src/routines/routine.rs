use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoutineError {
    #[error("Failed to persist captured records")]
    Persistence,
    #[error("Routine failed unexpectedly")]
    Unexpected,
}

#[async_trait::async_trait]
pub trait Routine<T = ()>: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self) -> error_stack::Result<T, RoutineError>;
}
