use crate::BrowserError;
use crate::Result;
use crate::config::BrowserConfig;
use crate::intercept;
use crate::latch::RedirectLatch;
use chromiumoxide::Page as CdpPage;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;
use tracing::info;

const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// The page a login run happens in, with interception already installed.
pub struct LoginPage {
    cdp_page: CdpPage,
    config: BrowserConfig,
    latch: RedirectLatch,
    inflight: watch::Receiver<usize>,
    interceptor: JoinHandle<()>,
}

impl LoginPage {
    pub(crate) async fn attach(
        cdp_page: CdpPage,
        config: BrowserConfig,
        latch: RedirectLatch,
    ) -> Result<Self> {
        let (inflight_tx, inflight) = watch::channel(0usize);
        let interceptor = intercept::install(&cdp_page, latch.clone(), inflight_tx).await?;
        Ok(Self {
            cdp_page,
            config,
            latch,
            inflight,
            interceptor,
        })
    }

    pub fn latch(&self) -> &RedirectLatch {
        &self.latch
    }

    /// Navigate and wait until the network has been idle for the configured
    /// window.
    pub async fn goto(&self, url: &str) -> Result<()> {
        info!("Navigating to {url}");
        let timeout = self.config.navigation_timeout();
        match tokio::time::timeout(timeout, self.cdp_page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                return Err(BrowserError::NavigationFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                return Err(BrowserError::Timeout {
                    what: format!("navigation to {url}"),
                    timeout,
                });
            }
        }
        self.wait_for_network_idle(timeout).await
    }

    /// Resolve once no request has been in flight for the idle window.
    pub async fn wait_for_network_idle(&self, timeout: Duration) -> Result<()> {
        let idle = self.config.network_idle();
        let mut rx = self.inflight.clone();
        let settle = async move {
            loop {
                let busy = *rx.borrow_and_update() > 0;
                if busy {
                    if rx.changed().await.is_err() {
                        return;
                    }
                    continue;
                }
                match tokio::time::timeout(idle, rx.changed()).await {
                    Err(_) => return,
                    Ok(Ok(())) => continue,
                    Ok(Err(_)) => return,
                }
            }
        };
        tokio::time::timeout(timeout, settle)
            .await
            .map_err(|_| BrowserError::Timeout {
                what: "network idle".to_string(),
                timeout,
            })
    }

    /// Wait for activity to start and then settle again. Used right after an
    /// action that triggers a navigation, where the network may still be
    /// quiet when the wait begins.
    pub async fn wait_for_navigation(&self) -> Result<()> {
        let timeout = self.config.navigation_timeout();
        let started = Instant::now();
        let mut rx = self.inflight.clone();
        tokio::time::timeout(timeout, rx.wait_for(|count| *count > 0))
            .await
            .map_err(|_| BrowserError::Timeout {
                what: "navigation to start".to_string(),
                timeout,
            })?
            .map_err(|_| BrowserError::CdpError("page event stream closed".to_string()))?;
        let remaining = timeout.saturating_sub(started.elapsed());
        self.wait_for_network_idle(remaining).await
    }

    /// Poll for `selector` until it exists or `timeout` elapses.
    pub async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.cdp_page.find_element(selector).await.is_ok() {
                debug!("selector {selector} present");
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::SelectorTimeout {
                    selector: selector.to_string(),
                    timeout,
                });
            }
            tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
        }
    }

    /// Focus the element matching `selector` and type `text` into it.
    pub async fn type_into(&self, selector: &str, text: &str) -> Result<()> {
        let element = self.cdp_page.find_element(selector).await?;
        element.click().await?;
        element.type_str(text).await?;
        Ok(())
    }

    pub async fn click(&self, selector: &str) -> Result<()> {
        let element = self.cdp_page.find_element(selector).await?;
        element.click().await?;
        Ok(())
    }
}

impl Drop for LoginPage {
    fn drop(&mut self) {
        self.interceptor.abort();
    }
}
