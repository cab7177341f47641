mod auth;
mod cache;
mod cli;
mod config;
mod dashboard;
mod error;
mod gitlab;
mod output;
mod overview;
mod status;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting pipewatch");
    cli.execute().await?;

    Ok(())
}
