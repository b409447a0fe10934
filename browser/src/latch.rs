//! Write-once capture of the redirect that carries the authorization code.
//!
//! The latch starts in [`LatchState::AwaitingRedirect`] and moves to
//! [`LatchState::Captured`] the first time a 3xx response points at the
//! configured redirect URI. That transition happens at most once; later
//! redirects are ignored and only cause outgoing requests to be aborted.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LatchState {
    AwaitingRedirect,
    Captured(String),
}

impl LatchState {
    pub fn is_captured(&self) -> bool {
        matches!(self, LatchState::Captured(_))
    }
}

/// Shared handle to the latch. Cloning is cheap and every clone observes the
/// same state.
#[derive(Debug, Clone)]
pub struct RedirectLatch {
    redirect_prefix: Arc<str>,
    state: Arc<watch::Sender<LatchState>>,
}

impl RedirectLatch {
    pub fn new(redirect_prefix: impl Into<String>) -> Self {
        let (state, _) = watch::channel(LatchState::AwaitingRedirect);
        Self {
            redirect_prefix: Arc::from(redirect_prefix.into()),
            state: Arc::new(state),
        }
    }

    pub fn redirect_prefix(&self) -> &str {
        &self.redirect_prefix
    }

    pub fn state(&self) -> LatchState {
        self.state.borrow().clone()
    }

    pub fn is_captured(&self) -> bool {
        self.state.borrow().is_captured()
    }

    pub fn captured(&self) -> Option<String> {
        match &*self.state.borrow() {
            LatchState::Captured(location) => Some(location.clone()),
            LatchState::AwaitingRedirect => None,
        }
    }

    /// Feed a response for `from` into the latch. Returns `true` only for the
    /// response that performed the transition.
    pub fn observe_redirect(&self, status: u16, from: &str, location: Option<&str>) -> bool {
        if !(300..=399).contains(&status) {
            return false;
        }
        let Some(location) = location else {
            return false;
        };
        debug!(status, from, location, "redirect observed");
        if !location.starts_with(&*self.redirect_prefix) {
            return false;
        }
        let latched = self.state.send_if_modified(|state| match state {
            LatchState::AwaitingRedirect => {
                *state = LatchState::Captured(location.to_string());
                true
            }
            LatchState::Captured(_) => false,
        });
        if latched {
            info!("captured redirect to the configured redirect URI");
        }
        latched
    }

    /// Whether an outgoing request should be aborted instead of continued.
    ///
    /// Everything is aborted once the latch holds a value. A request whose
    /// target is the redirect URI itself is aborted as well, so the callback
    /// endpoint is never loaded even when the request is seen before the
    /// redirect response that produced it.
    pub fn should_abort(&self, url: &str) -> bool {
        self.is_captured() || url.starts_with(&*self.redirect_prefix)
    }

    /// Resolve with the captured location, or `None` if nothing was captured
    /// within `timeout`.
    pub async fn wait_captured(&self, timeout: Duration) -> Option<String> {
        let mut rx = self.state.subscribe();
        let waited = tokio::time::timeout(timeout, rx.wait_for(LatchState::is_captured)).await;
        match waited {
            Ok(Ok(state)) => match &*state {
                LatchState::Captured(location) => Some(location.clone()),
                LatchState::AwaitingRedirect => None,
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    const REDIRECT: &str = "https://app.example.com/callback";
    const LOGIN: &str = "https://auth.example.com/login";

    #[test]
    fn starts_awaiting() {
        let latch = RedirectLatch::new(REDIRECT);
        assert_eq!(latch.state(), LatchState::AwaitingRedirect);
        assert_eq!(latch.captured(), None);
        assert!(!latch.should_abort("https://auth.example.com/login"));
    }

    #[test]
    fn ignores_provider_internal_redirects() {
        let latch = RedirectLatch::new(REDIRECT);
        assert!(!latch.observe_redirect(
            302,
            LOGIN,
            Some("https://auth.example.com/login?client_id=x")
        ));
        assert!(!latch.observe_redirect(301, LOGIN, Some("/oauth2/authorize")));
        assert_eq!(latch.state(), LatchState::AwaitingRedirect);
    }

    #[test]
    fn ignores_non_redirect_statuses_and_missing_location() {
        let latch = RedirectLatch::new(REDIRECT);
        let callback = Some("https://app.example.com/callback?code=1");
        assert!(!latch.observe_redirect(200, LOGIN, callback));
        assert!(!latch.observe_redirect(400, LOGIN, callback));
        assert!(!latch.observe_redirect(302, LOGIN, None));
        assert!(!latch.is_captured());
    }

    #[test]
    fn status_bounds_are_inclusive() {
        let low = RedirectLatch::new(REDIRECT);
        assert!(low.observe_redirect(300, LOGIN, Some("https://app.example.com/callback?code=a")));
        let high = RedirectLatch::new(REDIRECT);
        assert!(high.observe_redirect(399, LOGIN, Some("https://app.example.com/callback?code=b")));
    }

    #[test]
    fn first_match_wins() {
        let latch = RedirectLatch::new(REDIRECT);
        assert!(!latch.observe_redirect(302, LOGIN, Some("https://auth.example.com/login")));
        assert!(latch.observe_redirect(
            302,
            LOGIN,
            Some("https://app.example.com/callback?code=ABC123&state=xyz")
        ));
        assert!(!latch.observe_redirect(
            302,
            LOGIN,
            Some("https://app.example.com/callback?code=OTHER")
        ));
        assert!(!latch.observe_redirect(
            307,
            LOGIN,
            Some("https://app.example.com/callback?code=LATE")
        ));
        assert_eq!(
            latch.state(),
            LatchState::Captured("https://app.example.com/callback?code=ABC123&state=xyz".into())
        );
    }

    #[test]
    fn aborts_everything_after_capture() {
        let latch = RedirectLatch::new(REDIRECT);
        latch.observe_redirect(302, LOGIN, Some("https://app.example.com/callback?code=1"));
        assert!(latch.should_abort("https://auth.example.com/static/app.js"));
        assert!(latch.should_abort("https://app.example.com/callback?code=1"));
    }

    #[test]
    fn aborts_callback_target_before_capture() {
        let latch = RedirectLatch::new(REDIRECT);
        assert!(latch.should_abort("https://app.example.com/callback?code=1"));
        assert!(!latch.is_captured());
    }

    #[test]
    fn clones_share_state() {
        let latch = RedirectLatch::new(REDIRECT);
        let observer = latch.clone();
        latch.observe_redirect(303, LOGIN, Some("https://app.example.com/callback?code=z"));
        assert_eq!(
            observer.captured().as_deref(),
            Some("https://app.example.com/callback?code=z")
        );
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn redirect_log_names_the_responding_url() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let latch = RedirectLatch::new(REDIRECT);
            latch.observe_redirect(
                302,
                "https://auth.example.com/login/submit",
                Some("https://auth.example.com/mfa"),
            );
        });

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("redirect observed"), "{output}");
        assert!(output.contains("https://auth.example.com/login/submit"), "{output}");
        assert!(output.contains("https://auth.example.com/mfa"), "{output}");
    }

    #[tokio::test]
    async fn wait_captured_wakes_on_capture() {
        let latch = RedirectLatch::new(REDIRECT);
        let writer = latch.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            writer.observe_redirect(302, LOGIN, Some("https://app.example.com/callback?code=late"));
        });
        let captured = latch.wait_captured(Duration::from_secs(5)).await;
        assert_eq!(
            captured.as_deref(),
            Some("https://app.example.com/callback?code=late")
        );
        assert!(handle.await.is_ok());
    }

    #[tokio::test]
    async fn wait_captured_times_out() {
        let latch = RedirectLatch::new(REDIRECT);
        assert_eq!(latch.wait_captured(Duration::from_millis(20)).await, None);
    }
}
