use std::{fmt, future::Future, process::Child, time::Duration};

use error_stack::Result;
use fantoccini::Client;

use super::{
    fantoccini_document::FantocciniDocument,
    scraper_driver::{
        create_and_configure_client, random_port, spawn_driver_process, ScraperDriverError,
    },
};
use crate::{
    config::BrowserConfig,
    domain::{AcquisitionError, DocumentProvider, PageTarget},
};

const CLOSE_TIMEOUT: Duration = Duration::from_secs(10);

/// A WebDriver process plus the session connected to it.
///
/// Release with [`DocumentProvider::release`]. A session dropped without being
/// released still kills its driver process.
pub struct BrowserSession {
    driver_process: Option<Child>,
    client: Client,
}

impl fmt::Debug for BrowserSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrowserSession")
            .field("driver_running", &self.driver_process.is_some())
            .finish()
    }
}

impl BrowserSession {
    pub async fn start(config: &BrowserConfig) -> Result<Self, ScraperDriverError> {
        let port = random_port();
        log::info!("Setting up {} on port {}...", config.driver_binary, port);

        let mut driver_process = spawn_driver_process(&config.driver_binary, port)?;
        tokio::time::sleep(config.startup_grace()).await;

        match create_and_configure_client(port, config).await {
            Ok(client) => Ok(Self {
                driver_process: Some(driver_process),
                client,
            }),
            Err(report) => {
                kill_driver_process(&mut driver_process);
                Err(report)
            }
        }
    }
}

fn kill_driver_process(process: &mut Child) {
    if let Err(error) = process.kill() {
        log::error!("Failed to kill WebDriver process: {}", error);
        return;
    }
    if let Err(error) = process.wait() {
        log::error!("Failed to reap WebDriver process: {}", error);
    }
}

/// Drives `close` to completion unless it outlives `bound`. Returns whether it
/// finished.
async fn close_within<F: Future<Output = ()>>(bound: Duration, close: F) -> bool {
    tokio::time::timeout(bound, close).await.is_ok()
}

#[async_trait::async_trait]
impl DocumentProvider for BrowserSession {
    type Document = FantocciniDocument;

    async fn load(&self, target: PageTarget<'_>) -> Result<FantocciniDocument, AcquisitionError> {
        FantocciniDocument::open(self.client.clone(), target).await
    }

    async fn release(mut self) {
        log::info!("Closing browser session...");
        let client = self.client.clone();
        let closed = close_within(CLOSE_TIMEOUT, async move {
            client
                .close()
                .await
                .unwrap_or_else(|error| log::error!("Failed to close WebDriver client: {}", error));
        })
        .await;
        if !closed {
            log::warn!(
                "WebDriver client did not close within {:?}, killing driver",
                CLOSE_TIMEOUT
            );
        }

        if let Some(mut process) = self.driver_process.take() {
            kill_driver_process(&mut process);
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if let Some(mut process) = self.driver_process.take() {
            log::warn!("Browser session was not released, killing WebDriver process");
            kill_driver_process(&mut process);
        }
    }
}
