//! Headless Chromium plumbing for driving a hosted login page.
//!
//! [`BrowserManager`] owns the browser process, its temporary profile and an
//! isolated browser context. [`LoginPage`] wraps the single page used for a
//! login run and exposes the few interactions the flow needs. Every request
//! the page makes passes through the interceptor, which feeds redirect
//! responses into a [`RedirectLatch`] and aborts traffic once it has latched.

pub mod config;
pub mod intercept;
pub mod latch;
pub mod manager;
pub mod page;

pub use config::BrowserConfig;
pub use config::FormSelectors;
pub use latch::LatchState;
pub use latch::RedirectLatch;
pub use manager::BrowserManager;
pub use page::LoginPage;

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Browser not initialized")]
    NotInitialized,

    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("CDP error: {0}")]
    CdpError(String),

    #[error("Navigation to {url} failed: {reason}")]
    NavigationFailed { url: String, reason: String },

    #[error("Timed out after {timeout:?} waiting for {what}")]
    Timeout { what: String, timeout: Duration },

    #[error("Element {selector} did not appear within {timeout:?}")]
    SelectorTimeout { selector: String, timeout: Duration },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl From<chromiumoxide::error::CdpError> for BrowserError {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        BrowserError::CdpError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BrowserError>;
