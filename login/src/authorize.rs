//! Drives the hosted login form in a headless browser and captures the
//! redirect that carries the authorization code.

use crate::config::FlowConfig;
use crate::error::FlowError;
use crate::query::extract_code;
use authcode_browser::BrowserConfig;
use authcode_browser::BrowserManager;
use authcode_browser::LoginPage;
use authcode_browser::RedirectLatch;
use tracing::debug;
use tracing::info;
use tracing::warn;

/// Sign in through the hosted UI at `authorize_url` and return the
/// authorization code from the intercepted redirect.
pub async fn obtain_code(
    browser: &BrowserConfig,
    authorize_url: &str,
    config: &FlowConfig,
) -> Result<String, FlowError> {
    let location = capture_redirect(browser, authorize_url, config).await?;
    let code = extract_code(&location)?;
    debug!("authorization code: {code}");
    Ok(code)
}

/// Sign in and return the full redirect location, unparsed.
///
/// The browser is shut down before returning, on success and on failure.
pub async fn capture_redirect(
    browser: &BrowserConfig,
    authorize_url: &str,
    config: &FlowConfig,
) -> Result<String, FlowError> {
    let manager = BrowserManager::launch(browser.clone())
        .await
        .map_err(FlowError::navigation("launch"))?;
    let latch = RedirectLatch::new(config.redirect_uri.clone());

    let outcome = drive(&manager, latch, authorize_url, config).await;

    if let Err(e) = manager.stop().await {
        warn!("failed to stop browser cleanly: {e}");
    }
    outcome
}

async fn drive(
    manager: &BrowserManager,
    latch: RedirectLatch,
    authorize_url: &str,
    config: &FlowConfig,
) -> Result<String, FlowError> {
    let page = manager
        .new_login_page(latch.clone())
        .await
        .map_err(FlowError::navigation("open page"))?;

    // An existing session can send the browser straight back with a code.
    // Aborting that redirect may surface as a navigation error.
    let navigated = page.goto(authorize_url).await;
    if let Some(location) = latched_first(&latch, navigated, "authorize page")? {
        info!("redirect captured without a login form");
        return Ok(location);
    }

    submit_credentials(&page, manager.config(), config).await?;

    let navigation_timeout = manager.config().navigation_timeout();
    let submit = &manager.config().selectors.submit;
    info!("submitting login form");
    let (clicked, settled) = tokio::join!(page.click(submit), async {
        tokio::select! {
            Some(_) = latch.wait_captured(navigation_timeout) => Ok(()),
            settled = page.wait_for_navigation() => settled,
        }
    });
    let settled = clicked.and(settled);
    if let Some(location) = latched_first(&latch, settled, "submit")? {
        return Ok(location);
    }

    Err(FlowError::RedirectNotCaptured {
        redirect_uri: config.redirect_uri.clone(),
    })
}

/// A captured redirect takes precedence over the step's own error. Aborting
/// the callback request can fail the step that triggered it.
fn latched_first(
    latch: &RedirectLatch,
    step: authcode_browser::Result<()>,
    stage: &'static str,
) -> Result<Option<String>, FlowError> {
    if let Some(location) = latch.captured() {
        if let Err(e) = step {
            debug!("ignoring {stage} error after capture: {e}");
        }
        return Ok(Some(location));
    }
    step.map_err(FlowError::navigation(stage))?;
    Ok(None)
}

async fn submit_credentials(
    page: &LoginPage,
    browser: &BrowserConfig,
    config: &FlowConfig,
) -> Result<(), FlowError> {
    let selectors = &browser.selectors;
    info!("waiting for login form");
    page.wait_for_selector(&selectors.username, browser.selector_timeout())
        .await
        .map_err(FlowError::navigation("login form"))?;

    page.type_into(&selectors.username, &config.username)
        .await
        .map_err(FlowError::navigation("login form"))?;
    page.type_into(&selectors.password, &config.password)
        .await
        .map_err(FlowError::navigation("login form"))?;
    debug!("credentials entered for {}", config.username);
    Ok(())
}
