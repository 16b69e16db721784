use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;

use crate::cli::ServeArgs;
use crate::github;
use crate::index::IndexerSettings;
use crate::queue::{self, TaskQueue};
use crate::utils::get_credential;

mod listener;
mod signature;

pub(crate) async fn serve(args: ServeArgs) -> Result<()> {
    // If secret has not been passed via CLI or env, get it as a credential.
    let secret = args
        .webhook_secret
        .ok_or(())
        .or_else(|()| get_credential("webhook_secret"))?;
    let app_key = std::fs::read(&args.private_key_path).with_context(|| {
        format!(
            "failed to read app private key at {}",
            args.private_key_path.display()
        )
    })?;
    let github_client = Arc::new(github::app_client(args.app_id, &app_key)?);
    let data_dir = match args.data_dir {
        Some(dir) => dir,
        None => directories::BaseDirs::new()
            .context("no home dir")?
            .home_dir()
            .join(".tabby"),
    };
    let settings = Arc::new(IndexerSettings {
        data_dir,
        proxy_url: args.dev_proxy,
    });

    let (mut tasks, receiver) = TaskQueue::channel(args.queue_capacity, args.on_full);
    let consumer = tokio::spawn(queue::consume(receiver));

    let service = listener::listen(tasks.clone(), secret, github_client, settings);
    let tcp_listener = TcpListener::bind(&args.addr).await?;
    tracing::info!("Listening on {}", args.addr);
    axum::serve(tcp_listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Already-queued jobs drain before the sentinel ends the consumer loop.
    tasks.stop().await?;
    consumer.await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {error}");
    }
}
