//! Entry-point for the `authcode` binary.
use authcode_cli::Cli;
use authcode_cli::run_main;
use clap::Parser;

#[tokio::main]
async fn main() {
    // A local `.env` fills in whatever the real environment does not set, and
    // has to be loaded before clap reads its `env` fallbacks.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    if let Err(e) = run_main(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
