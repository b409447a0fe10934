use authcode_login::BrowserConfig;
use authcode_login::ConfigError;
use authcode_login::FlowConfig;
use authcode_login::FlowOptions;
use authcode_login::config::AUTH_DOMAIN_ENV_VAR;
use authcode_login::config::CLIENT_ID_ENV_VAR;
use authcode_login::config::CLIENT_SECRET_ENV_VAR;
use authcode_login::config::PASSWORD_ENV_VAR;
use authcode_login::config::REDIRECT_URI_ENV_VAR;
use authcode_login::config::USERNAME_ENV_VAR;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use std::path::PathBuf;
use std::time::Duration;

/// Sign in through an OAuth2 hosted UI with a headless browser and print the
/// resulting tokens.
///
/// Every provider setting can come from a flag, the environment or a `.env`
/// file in the current directory.
#[derive(Parser, Debug)]
#[command(name = "authcode", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[clap(flatten)]
    pub login: LoginArgs,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the full login flow (the default).
    Login(LoginArgs),

    /// Decode a JWT without verifying it and print its header and claims.
    Decode(DecodeArgs),
}

#[derive(Args, Debug, Default, Clone)]
pub struct LoginArgs {
    /// Hosted UI domain, e.g. `auth.example.com`.
    #[arg(long, env = AUTH_DOMAIN_ENV_VAR)]
    pub domain: Option<String>,

    #[arg(long, env = CLIENT_ID_ENV_VAR)]
    pub client_id: Option<String>,

    #[arg(long, env = CLIENT_SECRET_ENV_VAR, hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Redirect URI registered for the app client. The browser is stopped as
    /// soon as the provider redirects here.
    #[arg(long, env = REDIRECT_URI_ENV_VAR)]
    pub redirect_uri: Option<String>,

    #[arg(long, env = USERNAME_ENV_VAR)]
    pub username: Option<String>,

    #[arg(long, env = PASSWORD_ENV_VAR, hide_env_values = true)]
    pub password: Option<String>,

    /// Show the browser window.
    #[arg(long, default_value_t = false)]
    pub headed: bool,

    /// Chrome/Chromium binary to launch instead of the auto-detected one.
    #[arg(long = "chrome", value_name = "PATH")]
    pub chrome: Option<PathBuf>,

    /// Launch Chromium with `--no-sandbox` (needed as root in containers).
    #[arg(long, default_value_t = false)]
    pub no_sandbox: bool,

    /// Upper bound in seconds for the login form and each navigation to settle.
    #[arg(long, value_name = "N")]
    pub timeout_secs: Option<u64>,

    /// Do not call the userinfo endpoint.
    #[arg(long, default_value_t = false)]
    pub skip_profile: bool,

    /// Print one JSON document instead of the human-readable summary.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl LoginArgs {
    /// Resolve the provider settings. Flags win over the environment because
    /// clap already applied the `env` fallbacks.
    pub fn flow_config(&self) -> Result<FlowConfig, ConfigError> {
        FlowConfig::from_lookup(|name| {
            let value = match name {
                AUTH_DOMAIN_ENV_VAR => &self.domain,
                CLIENT_ID_ENV_VAR => &self.client_id,
                CLIENT_SECRET_ENV_VAR => &self.client_secret,
                REDIRECT_URI_ENV_VAR => &self.redirect_uri,
                USERNAME_ENV_VAR => &self.username,
                PASSWORD_ENV_VAR => &self.password,
                _ => return None,
            };
            value.clone()
        })
    }

    pub fn flow_options(&self) -> FlowOptions {
        let mut browser = BrowserConfig {
            headless: !self.headed,
            chrome_executable: self.chrome.clone(),
            no_sandbox: self.no_sandbox,
            ..BrowserConfig::default()
        };
        if let Some(secs) = self.timeout_secs {
            browser = browser.with_wait_timeout(Duration::from_secs(secs));
        }
        FlowOptions {
            browser,
            fetch_profile: !self.skip_profile,
            base_url: None,
        }
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// The token to decode.
    pub token: String,
}
