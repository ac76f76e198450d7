use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Element query failed")]
    QueryFailed,
    #[error("Element text not available")]
    TextUnavailable,
    #[error("Script execution failed")]
    ScriptFailed,
}

#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("Page or ranking table not ready within the wait bound")]
    Timeout,
    #[error("Failed to navigate to target page")]
    NavigationFailed,
}

/// Where to load the ranking page from and how long to wait for it.
#[derive(Debug, Clone, Copy)]
pub struct PageTarget<'a> {
    pub url: &'a str,
    pub row_selector: &'a str,
    pub page_load_timeout: Duration,
    pub table_timeout: Duration,
}

/// A fully rendered page exposing element queries.
#[async_trait::async_trait]
pub trait RankingDocument: Send + Sync {
    type Row: DocumentRow;

    /// Nudges lazily rendered content into the DOM: scroll by `scroll_px`, then
    /// pause for `pause`.
    async fn settle(&self, scroll_px: i64, pause: Duration)
        -> error_stack::Result<(), DocumentError>;

    async fn rows(&self, selector: &str) -> error_stack::Result<Vec<Self::Row>, DocumentError>;
}

#[async_trait::async_trait]
pub trait DocumentRow: Send + Sync {
    type Cell: DocumentCell;

    async fn cells(&self, selector: &str) -> error_stack::Result<Vec<Self::Cell>, DocumentError>;
}

#[async_trait::async_trait]
pub trait DocumentCell: Send + Sync {
    async fn text(&self) -> error_stack::Result<String, DocumentError>;
}

/// Owner of the resource that renders documents (a browser session).
///
/// `release` must be called exactly once, on every exit path.
#[async_trait::async_trait]
pub trait DocumentProvider: Send + Sync {
    type Document: RankingDocument;

    async fn load(
        &self,
        target: PageTarget<'_>,
    ) -> error_stack::Result<Self::Document, AcquisitionError>;

    async fn release(self)
    where
        Self: Sized;
}
