use clap::Parser;

mod cli;
mod commands;
mod logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let config = cli.server_config()?;
    logging::init(&config.log_level, &config.log_format)?;
    tracing::debug!(?config, "effective configuration");
    commands::run_command(cli, config).await
}
