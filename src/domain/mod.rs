pub mod clock;
pub mod document;
pub mod record;

pub use clock::{Clock, FixedClock, SystemClock};
pub use document::{
    AcquisitionError, DocumentCell, DocumentError, DocumentProvider, DocumentRow, PageTarget,
    RankingDocument,
};
pub use record::Record;
