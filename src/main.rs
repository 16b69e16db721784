#![warn(clippy::pedantic)]

use anyhow::Result;
use clap::Parser;

mod cli;
mod event;
mod github;
mod index;
mod queue;
mod server;
mod utils;

#[tokio::main]
async fn main() -> Result<()> {
    cli::init_tracing();

    let cli = cli::Cli::parse();

    match cli.command {
        cli::Commands::Serve(args) => {
            server::serve(args).await?;
        }
    }
    Ok(())
}
