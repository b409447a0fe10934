use serde::Deserialize;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Run Chromium without a visible window.
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Explicit Chrome/Chromium binary. When unset chromiumoxide searches the
    /// usual install locations.
    #[serde(default)]
    pub chrome_executable: Option<PathBuf>,

    /// Pass `--no-sandbox`; needed when running as root inside containers.
    #[serde(default)]
    pub no_sandbox: bool,

    #[serde(default = "default_window_width")]
    pub window_width: u32,

    #[serde(default = "default_window_height")]
    pub window_height: u32,

    #[serde(default = "default_launch_timeout_ms")]
    pub launch_timeout_ms: u64,

    /// Per-command CDP timeout.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Upper bound for waiting on a form element to render.
    #[serde(default = "default_selector_timeout_ms")]
    pub selector_timeout_ms: u64,

    /// Upper bound for a navigation to settle.
    #[serde(default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,

    /// How long the network must stay quiet before a page counts as idle
    /// (the "networkidle0" heuristic).
    #[serde(default = "default_network_idle_ms")]
    pub network_idle_ms: u64,

    #[serde(default)]
    pub selectors: FormSelectors,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            chrome_executable: None,
            no_sandbox: false,
            window_width: default_window_width(),
            window_height: default_window_height(),
            launch_timeout_ms: default_launch_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            selector_timeout_ms: default_selector_timeout_ms(),
            navigation_timeout_ms: default_navigation_timeout_ms(),
            network_idle_ms: default_network_idle_ms(),
            selectors: FormSelectors::default(),
        }
    }
}

impl BrowserConfig {
    pub fn selector_timeout(&self) -> Duration {
        Duration::from_millis(self.selector_timeout_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn network_idle(&self) -> Duration {
        Duration::from_millis(self.network_idle_ms)
    }

    /// Apply a single overall timeout to both the selector and navigation waits.
    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        let ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self.selector_timeout_ms = ms;
        self.navigation_timeout_ms = ms;
        self
    }
}

/// CSS selectors for the hosted login form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSelectors {
    pub username: String,
    pub password: String,
    pub submit: String,
}

impl Default for FormSelectors {
    fn default() -> Self {
        Self {
            username: r#"input[name="username"]"#.to_string(),
            password: r#"input[name="password"]"#.to_string(),
            submit: r#"input[type="submit"]"#.to_string(),
        }
    }
}

fn default_headless() -> bool {
    true
}

fn default_window_width() -> u32 {
    1024
}

fn default_window_height() -> u32 {
    768
}

fn default_launch_timeout_ms() -> u64 {
    20_000
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_selector_timeout_ms() -> u64 {
    30_000
}

fn default_navigation_timeout_ms() -> u64 {
    30_000
}

fn default_network_idle_ms() -> u64 {
    500
}
