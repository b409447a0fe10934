//! Scripted OAuth2 authorization-code login against a Cognito-style hosted UI.
//!
//! The pipeline is strictly linear: a headless browser signs in through the
//! hosted login form ([`authorize`]), the authorization code is read from the
//! intercepted redirect ([`query`]), exchanged for tokens and used to fetch
//! the user profile ([`client`]), and finally the tokens are decoded for
//! inspection ([`jwt`]). [`AuthCodeFlow`] strings the steps together.
//!
//! This crate is meant for tests and CI. Token decoding performs no signature
//! or expiry verification and must never back a trust decision.

pub mod authorize;
pub mod casing;
pub mod client;
pub mod config;
pub mod error;
pub mod flow;
pub mod jwt;
pub mod query;
mod token_data;

pub use client::OAuthClient;
pub use config::FlowConfig;
pub use error::ConfigError;
pub use error::ExchangeStage;
pub use error::FlowError;
pub use error::HttpExchangeError;
pub use flow::AuthCodeFlow;
pub use flow::DecodedTokens;
pub use flow::FlowOptions;
pub use flow::FlowOutcome;
pub use jwt::DecodedJwt;
pub use jwt::TokenDecodeError;
pub use jwt::decode_jwt;
pub use query::CodeExtractionError;
pub use query::extract_code;
pub use token_data::TokenSet;
pub use token_data::UserProfile;

pub use authcode_browser::BrowserConfig;
