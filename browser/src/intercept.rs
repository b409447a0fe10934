//! Request/response hooks for the login page.
//!
//! Request interception goes through the CDP `Fetch` domain: every request
//! pauses at the request stage and is either continued unmodified or failed
//! with `Aborted`. Redirect responses never reach `Fetch` as responses, so
//! they are read from `Network.requestWillBeSent`, which carries the previous
//! hop's response in `redirectResponse`. The same network events drive the
//! in-flight request count used for idle detection.

use crate::Result;
use crate::latch::RedirectLatch;
use chromiumoxide::Page as CdpPage;
use chromiumoxide::cdp::browser_protocol::fetch;
use chromiumoxide::cdp::browser_protocol::network;
use futures::StreamExt;
use serde_json::Value;
use std::collections::HashSet;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestDecision {
    Continue,
    Abort,
}

pub fn decide(latch: &RedirectLatch, url: &str) -> RequestDecision {
    if latch.should_abort(url) {
        RequestDecision::Abort
    } else {
        RequestDecision::Continue
    }
}

/// Case-insensitive lookup of the `Location` header in a CDP headers object.
pub fn location_header(headers: &Value) -> Option<&str> {
    headers
        .as_object()?
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("location"))
        .and_then(|(_, value)| value.as_str())
}

/// Tracks request ids between `requestWillBeSent` and
/// `loadingFinished`/`loadingFailed`. Redirect hops reuse their request id, so
/// a chain of redirects counts as one request.
#[derive(Debug, Default)]
pub struct InflightRequests {
    ids: HashSet<String>,
}

impl InflightRequests {
    pub fn started(&mut self, request_id: &str) -> usize {
        self.ids.insert(request_id.to_string());
        self.ids.len()
    }

    pub fn finished(&mut self, request_id: &str) -> usize {
        self.ids.remove(request_id);
        self.ids.len()
    }
}

/// Enable interception on `page` and spawn the task that services it.
///
/// Listeners are registered before the domains are enabled so no paused
/// request can slip past unanswered.
pub(crate) async fn install(
    page: &CdpPage,
    latch: RedirectLatch,
    inflight_tx: watch::Sender<usize>,
) -> Result<JoinHandle<()>> {
    let mut paused = page.event_listener::<fetch::EventRequestPaused>().await?;
    let mut will_be_sent = page
        .event_listener::<network::EventRequestWillBeSent>()
        .await?;
    let mut finished = page
        .event_listener::<network::EventLoadingFinished>()
        .await?;
    let mut failed = page.event_listener::<network::EventLoadingFailed>().await?;

    page.execute(network::EnableParams::default()).await?;
    let pattern = fetch::RequestPattern::builder()
        .url_pattern("*")
        .request_stage(fetch::RequestStage::Request)
        .build();
    page.execute(fetch::EnableParams::builder().pattern(pattern).build())
        .await?;

    let page = page.clone();
    let handle = tokio::spawn(async move {
        let mut inflight = InflightRequests::default();
        loop {
            tokio::select! {
                Some(event) = paused.next() => {
                    handle_paused(&page, &latch, &event).await;
                }
                Some(event) = will_be_sent.next() => {
                    if let Some(response) = &event.redirect_response {
                        let status = u16::try_from(response.status).unwrap_or_default();
                        latch.observe_redirect(
                            status,
                            &response.url,
                            location_header(response.headers.inner()),
                        );
                    }
                    let count = inflight.started(event.request_id.inner());
                    inflight_tx.send_replace(count);
                }
                Some(event) = finished.next() => {
                    let count = inflight.finished(event.request_id.inner());
                    inflight_tx.send_replace(count);
                }
                Some(event) = failed.next() => {
                    let count = inflight.finished(event.request_id.inner());
                    inflight_tx.send_replace(count);
                }
                else => break,
            }
        }
        debug!("interception streams closed");
    });

    Ok(handle)
}

async fn handle_paused(page: &CdpPage, latch: &RedirectLatch, event: &fetch::EventRequestPaused) {
    let request_id = event.request_id.clone();
    let outcome = match decide(latch, &event.request.url) {
        RequestDecision::Continue => page
            .execute(fetch::ContinueRequestParams::new(request_id))
            .await
            .map(|_| ()),
        RequestDecision::Abort => {
            debug!(url = %event.request.url, "aborting request");
            page.execute(fetch::FailRequestParams::new(
                request_id,
                network::ErrorReason::Aborted,
            ))
            .await
            .map(|_| ())
        }
    };
    if let Err(e) = outcome {
        // The page may already be gone while the browser shuts down.
        warn!("failed to answer paused request: {e}");
    }
}
