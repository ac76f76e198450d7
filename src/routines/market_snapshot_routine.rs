use error_stack::{Result, ResultExt};

use super::routine::{Routine, RoutineError};
use crate::{
    config::AppConfig,
    domain::{Clock, DocumentProvider, PageTarget, SystemClock},
    scraping::{BrowserSession, RowExtractor},
    storage::AppendingStore,
};

/// What one run captured.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Rows appended to the dataset.
    pub captured: usize,
    pub skipped: usize,
    /// The page or its ranking table never became ready.
    pub acquisition_failed: bool,
    /// The page loaded but its rows could not be queried.
    pub table_failed: bool,
}

/// Loads the ranking page, extracts the top rows and appends them to the
/// dataset.
pub struct MarketSnapshotRoutine<'a, C = SystemClock> {
    config: &'a AppConfig,
    clock: C,
}

impl<'a> MarketSnapshotRoutine<'a> {
    pub fn new(config: &'a AppConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<'a, C: Clock> MarketSnapshotRoutine<'a, C> {
    pub fn with_clock(config: &'a AppConfig, clock: C) -> Self {
        Self { config, clock }
    }

    /// Runs against an already acquired provider and releases it on every
    /// path before returning.
    pub async fn run_with<P: DocumentProvider>(
        &self,
        provider: P,
    ) -> Result<RunSummary, RoutineError> {
        let outcome = self.capture_and_persist(&provider).await;
        provider.release().await;
        outcome
    }

    async fn capture_and_persist<P: DocumentProvider>(
        &self,
        provider: &P,
    ) -> Result<RunSummary, RoutineError> {
        let scraping = &self.config.scraping;
        let target = PageTarget {
            url: &scraping.target_url,
            row_selector: &scraping.row_selector,
            page_load_timeout: scraping.page_load_timeout(),
            table_timeout: scraping.table_timeout(),
        };

        let mut summary = RunSummary::default();

        let records = match provider.load(target).await {
            Ok(document) => {
                let extraction = RowExtractor::with_clock(scraping, &self.clock)
                    .extract(&document)
                    .await;
                summary.skipped = extraction.skipped;
                summary.table_failed = extraction.table_failure.is_some();
                extraction.records
            }
            Err(report) => {
                log::error!("Error waiting for table: {:?}", report);
                summary.acquisition_failed = true;
                Vec::new()
            }
        };

        summary.captured = AppendingStore::new(&self.config.storage)
            .persist(&records)
            .change_context(RoutineError::Persistence)?;

        Ok(summary)
    }
}

#[async_trait::async_trait]
impl<'a, C: Clock> Routine<RunSummary> for MarketSnapshotRoutine<'a, C> {
    fn name(&self) -> &str {
        "MarketSnapshot"
    }

    async fn run(&self) -> Result<RunSummary, RoutineError> {
        let session = BrowserSession::start(&self.config.browser)
            .await
            .change_context(RoutineError::Unexpected)
            .attach_printable("Browser session could not be started")?;

        self.run_with(session).await
    }
}
