mod cli;
mod output;

pub use cli::Cli;
pub use cli::Command;
pub use cli::DecodeArgs;
pub use cli::LoginArgs;

use anyhow::Context;
use authcode_login::AuthCodeFlow;
use authcode_login::decode_jwt;
use std::io::IsTerminal;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub async fn run_main(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        command,
        login,
        verbose,
    } = cli;

    init_tracing(verbose);

    match command {
        Some(Command::Decode(args)) => run_decode(&args),
        Some(Command::Login(args)) => run_login(&args).await,
        None => run_login(&login).await,
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        // Fall back to `default_level` if RUST_LOG is unset or invalid.
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run_login(args: &LoginArgs) -> anyhow::Result<()> {
    // Nothing touches the browser or the network until every setting resolves.
    let config = args.flow_config()?;
    info!("logging in as {} via {}", config.username, config.domain);

    let flow = AuthCodeFlow::new(config, args.flow_options());
    let outcome = flow.run().await?;

    if args.json {
        output::print_json(&outcome.to_json())?;
    } else {
        output::print_outcome(&outcome);
    }
    Ok(())
}

fn run_decode(args: &DecodeArgs) -> anyhow::Result<()> {
    let decoded = decode_jwt(&args.token).context("failed to decode token")?;
    output::print_json(&output::decoded_jwt_json(&decoded))
}
