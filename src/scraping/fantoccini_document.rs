use std::time::Duration;

use error_stack::ResultExt;
use fantoccini::{elements::Element, wd::TimeoutConfiguration, Client, Locator};

use crate::domain::{
    AcquisitionError, DocumentCell, DocumentError, DocumentRow, PageTarget, RankingDocument,
};

/// The ranking page as rendered by a live WebDriver session.
#[derive(Clone)]
pub struct FantocciniDocument {
    client: Client,
}

impl std::fmt::Debug for FantocciniDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FantocciniDocument").finish()
    }
}

impl FantocciniDocument {
    /// Navigates to the target and waits until at least one ranking row is in
    /// the DOM. Both steps are bounded.
    pub async fn open(
        client: Client,
        target: PageTarget<'_>,
    ) -> error_stack::Result<Self, AcquisitionError> {
        client
            .update_timeouts(driver_timeouts(&target))
            .await
            .change_context(AcquisitionError::NavigationFailed)
            .attach_printable("WebDriver rejected the page load timeout")?;

        log::info!("Navigating to {}...", target.url);
        tokio::time::timeout(target.page_load_timeout, client.goto(target.url))
            .await
            .change_context(AcquisitionError::Timeout)
            .attach_printable_lazy(|| {
                format!("Page did not load within {:?}", target.page_load_timeout)
            })?
            .change_context(AcquisitionError::NavigationFailed)
            .attach_printable_lazy(|| format!("URL: {}", target.url))?;

        log::debug!("Waiting for {}", target.row_selector);
        client
            .wait()
            .at_most(target.table_timeout)
            .for_element(Locator::Css(target.row_selector))
            .await
            .change_context(AcquisitionError::Timeout)
            .attach_printable_lazy(|| {
                format!(
                    "No element matched {:?} within {:?}",
                    target.row_selector, target.table_timeout
                )
            })?;

        Ok(Self { client })
    }
}

/// Timeouts handed to the driver so it aborts a stuck navigation on its own
/// instead of holding the session past our wait bound.
pub fn driver_timeouts(target: &PageTarget<'_>) -> TimeoutConfiguration {
    TimeoutConfiguration::new(None, Some(target.page_load_timeout), None)
}

#[async_trait::async_trait]
impl RankingDocument for FantocciniDocument {
    type Row = RowElement;

    async fn settle(
        &self,
        scroll_px: i64,
        pause: Duration,
    ) -> error_stack::Result<(), DocumentError> {
        self.client
            .execute(
                "window.scrollBy(0, arguments[0]);",
                vec![serde_json::json!(scroll_px)],
            )
            .await
            .change_context(DocumentError::ScriptFailed)?;

        tokio::time::sleep(pause).await;
        Ok(())
    }

    async fn rows(&self, selector: &str) -> error_stack::Result<Vec<RowElement>, DocumentError> {
        let rows = self
            .client
            .find_all(Locator::Css(selector))
            .await
            .change_context(DocumentError::QueryFailed)
            .attach_printable_lazy(|| format!("Selector: {}", selector))?;

        Ok(rows.into_iter().map(RowElement).collect())
    }
}

pub struct RowElement(Element);

#[async_trait::async_trait]
impl DocumentRow for RowElement {
    type Cell = CellElement;

    async fn cells(&self, selector: &str) -> error_stack::Result<Vec<CellElement>, DocumentError> {
        let cells = self
            .0
            .find_all(Locator::Css(selector))
            .await
            .change_context(DocumentError::QueryFailed)?;

        Ok(cells.into_iter().map(CellElement).collect())
    }
}

pub struct CellElement(Element);

#[async_trait::async_trait]
impl DocumentCell for CellElement {
    async fn text(&self) -> error_stack::Result<String, DocumentError> {
        self.0
            .text()
            .await
            .change_context(DocumentError::TextUnavailable)
    }
}
