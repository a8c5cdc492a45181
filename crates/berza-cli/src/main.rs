mod cli;
mod error;
mod run;
mod store;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(error) = run::run(cli).await {
        eprintln!("error: {error}");
        std::process::exit(error.exit_code());
    }
}
