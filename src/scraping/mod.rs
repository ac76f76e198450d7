pub mod browser_session;
pub mod fantoccini_document;
pub mod field;
pub mod row_extractor;
pub mod scraper_driver;

pub use browser_session::BrowserSession;
pub use field::Field;
pub use row_extractor::{Extraction, ExtractionError, RowExtractor, RowOutcome, SkipReason};
