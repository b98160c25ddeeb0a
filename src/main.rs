use anyhow::Result;
use bank_ledger::cli::Cli;
use bank_ledger::config::Config;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so statements on stdout stay clean.
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.config());
    cli.run().await
}
