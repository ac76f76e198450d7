use std::time::Duration;

#[derive(serde::Deserialize, Debug, Clone)]
#[serde(default)]
pub struct BrowserConfig {
    /// WebDriver executable, resolved through `PATH` when not absolute.
    pub driver_binary: Box<str>,
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub user_agent: Option<Box<str>>,
    /// Time given to the driver process to bind its port before connecting.
    pub startup_grace_millis: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            driver_binary: "geckodriver".into(),
            headless: true,
            window_width: 1920,
            window_height: 1080,
            user_agent: None,
            startup_grace_millis: 1000,
        }
    }
}

impl BrowserConfig {
    pub fn startup_grace(&self) -> Duration {
        Duration::from_millis(self.startup_grace_millis)
    }
}
