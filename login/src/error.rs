use crate::query::CodeExtractionError;
use authcode_browser::BrowserError;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing required configuration: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
}

/// Which back-channel call an HTTP failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeStage {
    Token,
    UserInfo,
}

impl fmt::Display for ExchangeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExchangeStage::Token => f.write_str("token exchange"),
            ExchangeStage::UserInfo => f.write_str("userinfo"),
        }
    }
}

#[derive(Debug, Error)]
pub enum HttpExchangeError {
    #[error("{stage} request failed: {source}")]
    Transport {
        stage: ExchangeStage,
        source: reqwest::Error,
    },

    #[error("{stage} endpoint returned {status}: {body}")]
    Status {
        stage: ExchangeStage,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("{stage} response could not be parsed: {source}")]
    Body {
        stage: ExchangeStage,
        source: serde_json::Error,
    },
}

impl HttpExchangeError {
    pub fn stage(&self) -> ExchangeStage {
        match self {
            HttpExchangeError::Transport { stage, .. }
            | HttpExchangeError::Status { stage, .. }
            | HttpExchangeError::Body { stage, .. } => *stage,
        }
    }
}

/// Fatal failures of the login pipeline. Token decode failures are not part
/// of this type; they are reported alongside a successful outcome.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error("browser step '{stage}' failed: {source}")]
    Navigation {
        stage: &'static str,
        source: BrowserError,
    },

    #[error("login completed without a redirect to {redirect_uri}")]
    RedirectNotCaptured { redirect_uri: String },

    #[error("could not extract the authorization code: {0}")]
    CodeExtraction(#[from] CodeExtractionError),

    #[error(transparent)]
    HttpExchange(#[from] HttpExchangeError),
}

impl FlowError {
    pub(crate) fn navigation(stage: &'static str) -> impl FnOnce(BrowserError) -> FlowError {
        move |source| FlowError::Navigation { stage, source }
    }
}
