use crate::authorize;
use crate::client::OAuthClient;
use crate::config::FlowConfig;
use crate::error::FlowError;
use crate::error::HttpExchangeError;
use crate::jwt::DecodedJwt;
use crate::jwt::TokenDecodeError;
use crate::jwt::decode_jwt;
use crate::token_data::TokenSet;
use crate::token_data::UserProfile;
use authcode_browser::BrowserConfig;
use serde_json::Value;
use serde_json::json;
use tracing::info;
use tracing::warn;

/// Knobs that are not part of the provider configuration.
#[derive(Debug, Clone)]
pub struct FlowOptions {
    pub browser: BrowserConfig,
    /// Call the userinfo endpoint after the token exchange.
    pub fetch_profile: bool,
    /// Replace `https://{domain}` as the root of every provider URL.
    pub base_url: Option<String>,
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self {
            browser: BrowserConfig::default(),
            fetch_profile: true,
            base_url: None,
        }
    }
}

/// Per-token decode results. A token that fails to decode is recorded here
/// and does not end the run.
#[derive(Debug)]
pub struct DecodedTokens {
    pub access_token: Result<DecodedJwt, TokenDecodeError>,
    pub id_token: Option<Result<DecodedJwt, TokenDecodeError>>,
    pub refresh_token: Option<Result<DecodedJwt, TokenDecodeError>>,
}

impl DecodedTokens {
    /// Decode every token present in `tokens`. No verification happens.
    pub fn from_tokens(tokens: &TokenSet) -> Self {
        let access_token = decode_jwt(&tokens.access_token);
        if let Err(e) = &access_token {
            warn!("access token could not be decoded: {e}");
        }
        let id_token = tokens.id_token.as_deref().map(|token| {
            let decoded = decode_jwt(token);
            if let Err(e) = &decoded {
                warn!("id token could not be decoded: {e}");
            }
            decoded
        });
        let refresh_token = tokens.refresh_token.as_deref().map(|token| {
            let decoded = decode_jwt(token);
            if let Err(e) = &decoded {
                // Cognito refresh tokens are encrypted, not signed JWTs.
                warn!("refresh token is not a decodable JWT: {e}");
            }
            decoded
        });
        Self {
            access_token,
            id_token,
            refresh_token,
        }
    }

    fn to_json(&self) -> Value {
        fn entry(decoded: &Result<DecodedJwt, TokenDecodeError>) -> Value {
            match decoded {
                Ok(jwt) => json!({ "header": jwt.header, "claims": jwt.claims }),
                Err(e) => json!({ "error": e.to_string() }),
            }
        }
        json!({
            "accessToken": entry(&self.access_token),
            "idToken": self.id_token.as_ref().map(entry),
            "refreshToken": self.refresh_token.as_ref().map(entry),
        })
    }
}

/// Everything one successful run produced.
#[derive(Debug)]
pub struct FlowOutcome {
    pub code: String,
    pub tokens: TokenSet,
    pub profile: Option<UserProfile>,
    pub decoded: DecodedTokens,
}

impl FlowOutcome {
    /// One JSON document with the code, the raw tokens, the profile and the
    /// unverified token contents.
    pub fn to_json(&self) -> Value {
        json!({
            "code": self.code,
            "tokens": self.tokens,
            "profile": self.profile,
            "decoded": self.decoded.to_json(),
        })
    }
}

/// Authorization-code login from browser sign-in to decoded tokens.
pub struct AuthCodeFlow {
    config: FlowConfig,
    options: FlowOptions,
    client: OAuthClient,
}

impl AuthCodeFlow {
    pub fn new(config: FlowConfig, options: FlowOptions) -> Self {
        let client = match &options.base_url {
            Some(base_url) => OAuthClient::with_base_url(base_url.clone()),
            None => OAuthClient::for_domain(&config.domain),
        };
        Self {
            config,
            options,
            client,
        }
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    pub fn client(&self) -> &OAuthClient {
        &self.client
    }

    pub fn authorize_url(&self) -> String {
        self.client
            .authorize_url(&self.config.client_id, &self.config.redirect_uri)
    }

    /// Run the browser half of the flow and return the authorization code.
    pub async fn obtain_code(&self) -> Result<String, FlowError> {
        let url = self.authorize_url();
        info!("starting browser login at {url}");
        authorize::obtain_code(&self.options.browser, &url, &self.config).await
    }

    pub async fn exchange(&self, code: &str) -> Result<TokenSet, HttpExchangeError> {
        self.client
            .exchange_code(
                &self.config.client_id,
                &self.config.client_secret,
                &self.config.redirect_uri,
                code,
            )
            .await
    }

    pub async fn fetch_profile(&self, tokens: &TokenSet) -> Result<UserProfile, HttpExchangeError> {
        self.client.fetch_user_info(&tokens.access_token).await
    }

    /// Everything after the code is in hand: exchange, profile, decode.
    pub async fn complete(&self, code: String) -> Result<FlowOutcome, FlowError> {
        let tokens = self.exchange(&code).await?;
        info!("token exchange succeeded");

        let profile = if self.options.fetch_profile {
            let profile = self.fetch_profile(&tokens).await?;
            info!("fetched user profile");
            Some(profile)
        } else {
            None
        };

        let decoded = DecodedTokens::from_tokens(&tokens);
        Ok(FlowOutcome {
            code,
            tokens,
            profile,
            decoded,
        })
    }

    pub async fn run(&self) -> Result<FlowOutcome, FlowError> {
        let code = self.obtain_code().await?;
        info!("authorization code captured");
        self.complete(code).await
    }
}
