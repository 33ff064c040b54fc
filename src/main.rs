mod auth;
mod cli;
mod config;
mod error;
mod providers;
mod status;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    info!("Starting woodbar");
    cli.execute().await?;

    Ok(())
}
