pub mod appending_store;

pub use appending_store::{persist, AppendingStore, PersistenceError};
