mod args;
mod commands;

use crate::args::Cli;
use anyhow::Context;
use clap::Parser;
use rlist_domain::config::{AppConfig, LoggingConfig};
use rlist_kernel::config::load_config;
use rlist_logger::Logger;
use rlist_storage::SnapshotStore;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg: AppConfig =
        load_config(Some(&cli.config)).context("Critical: Configuration is malformed")?;
    if let Some(snapshot) = cli.snapshot {
        cfg.storage.snapshot = snapshot;
    }

    let _log = init_logger(&cfg.logging)?;

    let store = SnapshotStore::builder()
        .path(&cfg.storage.snapshot)
        .connect()
        .await
        .context("Failed to open the snapshot store")?;

    commands::run(cli.command, cfg.registry, &store).await
}

fn init_logger(logging: &LoggingConfig) -> anyhow::Result<Logger> {
    let builder = Logger::builder().name(env!("CARGO_PKG_NAME")).level_name(&logging.level)?;
    let logger = match &logging.directory {
        Some(directory) => builder.directory(directory).json(logging.json).init()?,
        None => builder.init()?,
    };
    Ok(logger)
}
