use crate::BrowserError;
use crate::Result;
use crate::config::BrowserConfig;
use crate::latch::RedirectLatch;
use crate::page::LoginPage;
use chromiumoxide::Browser;
use chromiumoxide::BrowserConfig as CdpConfig;
use chromiumoxide::browser::HeadlessMode;
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::target;
use futures::StreamExt;
use tempfile::TempDir;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::debug;
use tracing::info;
use tracing::warn;

/// Owns one Chromium process for the lifetime of a login run.
///
/// The browser always starts from a throwaway profile directory and every page
/// is opened inside a fresh browser context, so no cookies or storage leak in
/// from earlier runs. Call [`BrowserManager::stop`] on every exit path; it is
/// idempotent.
pub struct BrowserManager {
    config: BrowserConfig,
    browser: Mutex<Option<Browser>>,
    handler: Mutex<Option<JoinHandle<()>>>,
    context_id: Mutex<Option<BrowserContextId>>,
    profile_dir: Mutex<Option<TempDir>>,
}

impl BrowserManager {
    pub async fn launch(config: BrowserConfig) -> Result<Self> {
        info!("Launching new browser instance");

        let profile_dir = tempfile::Builder::new()
            .prefix("authcode-browser-")
            .tempdir()?;

        let mut builder = CdpConfig::builder()
            .user_data_dir(profile_dir.path())
            .window_size(config.window_width, config.window_height)
            .launch_timeout(Duration::from_millis(config.launch_timeout_ms))
            .request_timeout(Duration::from_millis(config.request_timeout_ms));

        builder = if config.headless {
            builder.headless_mode(HeadlessMode::New)
        } else {
            builder.with_head()
        };
        if config.no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(path) = &config.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        let browser_config = builder.build().map_err(BrowserError::ConfigError)?;
        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {e}");
                }
            }
        });

        Ok(Self {
            config,
            browser: Mutex::new(Some(browser)),
            handler: Mutex::new(Some(handler_task)),
            context_id: Mutex::new(None),
            profile_dir: Mutex::new(Some(profile_dir)),
        })
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    /// Open a page in a new isolated browser context with interception wired
    /// to `latch`.
    pub async fn new_login_page(&self, latch: RedirectLatch) -> Result<LoginPage> {
        let browser_guard = self.browser.lock().await;
        let browser = browser_guard.as_ref().ok_or(BrowserError::NotInitialized)?;

        let context = browser
            .execute(target::CreateBrowserContextParams::default())
            .await?;
        let context_id = context.result.browser_context_id.clone();
        *self.context_id.lock().await = Some(context_id.clone());

        let params = target::CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(context_id)
            .build()
            .map_err(BrowserError::CdpError)?;
        let cdp_page = browser.new_page(params).await?;
        debug!("created page in isolated browser context");

        LoginPage::attach(cdp_page, self.config.clone(), latch).await
    }

    /// Tear down the context, the browser process and the temporary profile.
    pub async fn stop(&self) -> Result<()> {
        let mut browser_guard = self.browser.lock().await;
        if let Some(mut browser) = browser_guard.take() {
            info!("Stopping browser");
            if let Some(context_id) = self.context_id.lock().await.take() {
                let dispose = target::DisposeBrowserContextParams::new(context_id);
                if let Err(e) = browser.execute(dispose).await {
                    debug!("Failed to dispose browser context: {e}");
                }
            }
            if let Err(e) = browser.close().await {
                warn!("Browser close failed: {e}");
            }
            if let Err(e) = browser.wait().await {
                warn!("Failed waiting for browser process to exit: {e}");
            }
        }
        drop(browser_guard);

        if let Some(handler) = self.handler.lock().await.take() {
            handler.abort();
        }

        if let Some(dir) = self.profile_dir.lock().await.take() {
            let path = dir.path().display().to_string();
            if let Err(e) = dir.close() {
                warn!("Failed to cleanup browser user data directory {path}: {e}");
            }
        }

        Ok(())
    }
}
