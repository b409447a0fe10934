use crate::error::ConfigError;
use std::fmt;

pub const AUTH_DOMAIN_ENV_VAR: &str = "AUTH_DOMAIN";
pub const CLIENT_ID_ENV_VAR: &str = "CLIENT_ID";
pub const CLIENT_SECRET_ENV_VAR: &str = "CLIENT_SECRET";
pub const REDIRECT_URI_ENV_VAR: &str = "REDIRECT_URI";
pub const USERNAME_ENV_VAR: &str = "USERNAME";
pub const PASSWORD_ENV_VAR: &str = "PASSWORD";

/// Inputs for one login run. Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct FlowConfig {
    pub domain: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub username: String,
    pub password: String,
}

impl FlowConfig {
    /// Build from a lookup keyed by environment variable name. Empty or
    /// whitespace-only values count as missing. Every missing name is
    /// reported, not just the first. Values are stored exactly as given;
    /// only the domain is normalized.
    pub fn from_lookup<F>(mut lookup: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut take = |name: &'static str| {
            let value = lookup(name).filter(|v| !v.trim().is_empty());
            if value.is_none() {
                missing.push(name);
            }
            value.unwrap_or_default()
        };

        let domain = take(AUTH_DOMAIN_ENV_VAR);
        let client_id = take(CLIENT_ID_ENV_VAR);
        let client_secret = take(CLIENT_SECRET_ENV_VAR);
        let redirect_uri = take(REDIRECT_URI_ENV_VAR);
        let username = take(USERNAME_ENV_VAR);
        let password = take(PASSWORD_ENV_VAR);

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        Ok(Self {
            domain: normalize_domain(&domain),
            client_id,
            client_secret,
            redirect_uri,
            username,
            password,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// `https://{domain}`, the root all three provider endpoints hang off.
    pub fn base_url(&self) -> String {
        format!("https://{}", self.domain)
    }
}

/// Accept `auth.example.com`, `https://auth.example.com` or
/// `auth.example.com/` and keep only the host part.
fn normalize_domain(domain: &str) -> String {
    let domain = domain.trim();
    let domain = domain
        .strip_prefix("https://")
        .or_else(|| domain.strip_prefix("http://"))
        .unwrap_or(domain);
    domain.trim_end_matches('/').to_string()
}

impl fmt::Debug for FlowConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowConfig")
            .field("domain", &self.domain)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, String> {
        HashMap::from([
            (AUTH_DOMAIN_ENV_VAR, "auth.example.com".to_string()),
            (CLIENT_ID_ENV_VAR, "client-1".to_string()),
            (CLIENT_SECRET_ENV_VAR, "s3cret".to_string()),
            (REDIRECT_URI_ENV_VAR, "https://app.example.com/callback".to_string()),
            (USERNAME_ENV_VAR, "alice".to_string()),
            (PASSWORD_ENV_VAR, "hunter2".to_string()),
        ])
    }

    #[test]
    fn builds_from_complete_lookup() {
        let env = full_env();
        let cfg = FlowConfig::from_lookup(|k| env.get(k).cloned()).expect("config");
        assert_eq!(cfg.domain, "auth.example.com");
        assert_eq!(cfg.client_id, "client-1");
        assert_eq!(cfg.redirect_uri, "https://app.example.com/callback");
        assert_eq!(cfg.base_url(), "https://auth.example.com");
    }

    #[test]
    fn missing_client_id_is_reported() {
        let mut env = full_env();
        env.remove(CLIENT_ID_ENV_VAR);
        let err = FlowConfig::from_lookup(|k| env.get(k).cloned()).unwrap_err();
        assert_eq!(err, ConfigError::Missing(vec![CLIENT_ID_ENV_VAR]));
        assert!(err.to_string().contains("CLIENT_ID"));
    }

    #[test]
    fn blank_values_count_as_missing_and_all_are_listed() {
        let mut env = full_env();
        env.insert(PASSWORD_ENV_VAR, "   ".to_string());
        env.remove(AUTH_DOMAIN_ENV_VAR);
        let err = FlowConfig::from_lookup(|k| env.get(k).cloned()).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Missing(vec![AUTH_DOMAIN_ENV_VAR, PASSWORD_ENV_VAR])
        );
    }

    #[test]
    fn credentials_keep_surrounding_whitespace() {
        let mut env = full_env();
        env.insert(PASSWORD_ENV_VAR, " pass word ".to_string());
        env.insert(CLIENT_SECRET_ENV_VAR, "secret ".to_string());
        let cfg = FlowConfig::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert_eq!(cfg.password, " pass word ");
        assert_eq!(cfg.client_secret, "secret ");
    }

    #[test]
    fn domain_scheme_and_trailing_slash_are_dropped() {
        let mut env = full_env();
        env.insert(AUTH_DOMAIN_ENV_VAR, " https://auth.example.com/".to_string());
        let cfg = FlowConfig::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert_eq!(cfg.domain, "auth.example.com");
    }

    #[test]
    fn debug_redacts_secrets() {
        let env = full_env();
        let cfg = FlowConfig::from_lookup(|k| env.get(k).cloned()).unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("client-1"));
    }
}
