use std::process::{Child, Command};

use error_stack::ResultExt;
use fantoccini::{wd::Capabilities, Client, ClientBuilder};
use thiserror::Error;

use crate::config::BrowserConfig;

#[derive(Debug, Error)]
pub enum ScraperDriverError {
    #[error("Failed to spawn WebDriver process")]
    FailedToSpawnDriver,
    #[error("Failed to create client for WebDriver")]
    FailedToCreateClient,
}

pub fn random_port() -> u16 {
    rand::random::<u16>() % (65535 - 1024) + 1024
}

pub fn spawn_driver_process(
    driver_binary: &str,
    port: u16,
) -> error_stack::Result<Child, ScraperDriverError> {
    Command::new(driver_binary)
        .arg("--port")
        .arg(port.to_string())
        .arg("--log")
        .arg("fatal")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .change_context(ScraperDriverError::FailedToSpawnDriver)
        .attach_printable_lazy(|| format!("Driver binary: {}", driver_binary))
}

/// Firefox session capabilities for the configured window and headless mode.
pub fn browser_capabilities(config: &BrowserConfig) -> Capabilities {
    let mut args = vec![
        format!("--width={}", config.window_width),
        format!("--height={}", config.window_height),
    ];
    if config.headless {
        args.push("-headless".to_string());
    }

    let mut capabilities = Capabilities::new();
    capabilities.insert(
        "moz:firefoxOptions".to_string(),
        serde_json::json!({ "args": args }),
    );
    capabilities
}

pub async fn create_and_configure_client(
    port: u16,
    config: &BrowserConfig,
) -> error_stack::Result<Client, ScraperDriverError> {
    let mut builder = ClientBuilder::native();
    builder.capabilities(browser_capabilities(config));

    let client = builder
        .connect(format!("http://localhost:{}", port).as_str())
        .await
        .change_context(ScraperDriverError::FailedToCreateClient)
        .attach_printable_lazy(|| format!("Failed to connect to WebDriver on port {}", port))?;

    if let Some(user_agent) = config.user_agent.as_deref() {
        client
            .set_ua(user_agent)
            .await
            .change_context(ScraperDriverError::FailedToCreateClient)?;
    }

    Ok(client)
}
