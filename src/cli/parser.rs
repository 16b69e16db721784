use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use secrecy::SecretString;

use crate::queue::OverflowPolicy;

#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Start web hook server
    Serve(ServeArgs),
}

#[derive(Args)]
pub(crate) struct ServeArgs {
    /// IP and port to listen on
    #[arg(default_value = "0.0.0.0:3000")]
    pub(crate) addr: String,
    /// GitHub App ID
    #[arg(long, env = "APP_ID")]
    pub(crate) app_id: u64,
    /// Path to the GitHub App's private key (PEM)
    #[arg(long, env = "PRIVATE_KEY_PATH")]
    pub(crate) private_key_path: PathBuf,
    /// Webhook secret as configured on GitHub
    #[arg(long, env = "WEBHOOK_SECRET")]
    pub(crate) webhook_secret: Option<SecretString>,
    /// Root directory shared with the indexer container (default: ~/.tabby)
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Maximum number of pending indexing jobs
    #[arg(long, default_value_t = 100)]
    pub(crate) queue_capacity: usize,
    /// What to do with new jobs while the queue is full
    #[arg(long, value_enum, default_value_t = OverflowPolicy::Block)]
    pub(crate) on_full: OverflowPolicy,
    /// HTTP proxy to route the indexer container through (development setups)
    #[arg(long, env = "DEV_PROXY")]
    pub(crate) dev_proxy: Option<String>,
}
