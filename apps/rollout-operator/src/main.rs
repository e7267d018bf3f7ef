//! rollout-operator - control-plane operator for pipeline, interstep-buffer-
//! service, numaflow-controller and mono-vertex rollouts.
//!
//! This binary is a thin driver: it owns argument parsing, configuration
//! loading/hot-reload, and the outer reconcile loop. The actual USDE,
//! upgrade-strategy and progressive-rollout logic lives in `rollout-reconcile`.

mod cli;
mod fixtures;
mod logging;
mod worker;

use clap::Parser;
use cli::Cli;
use rollout_config::{spawn_watcher, Config, ConfigStore};
use rollout_events::channel;
use rollout_orchestrator::fake::FakeOrchestrator;
use rollout_registry::Registry;
use std::process::ExitCode;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_tracing(cli.debug, cli.json_logs);

    if let Err(err) = run(cli).await {
        error!("rollout-operator exited with an error: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run(cli: Cli) -> Result<(), rollout_errors::Error> {
    let config = match &cli.config {
        Some(path) => Config::load_from_file(path).await?,
        None => Config::default(),
    };
    let store = ConfigStore::new(config);

    let _watch_handle = match &cli.config {
        Some(path) => match spawn_watcher(path, store.clone()) {
            Ok(handle) => Some(handle),
            Err(err) => {
                warn!("configuration hot-reload disabled: {err}");
                None
            }
        },
        None => None,
    };

    let registry = Registry::new();
    let orchestrator = FakeOrchestrator::new();
    let (event_tx, mut event_rx) = channel();

    let log_task = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            logging::log_event(&event);
        }
    });

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            ctrl_c_cancel.cancel();
        }
    });

    info!("starting rollout-operator, watching {}", cli.rollouts_dir.display());

    loop {
        if cancel.is_cancelled() {
            break;
        }

        let rollouts = fixtures::load_all(&cli.rollouts_dir)
            .await
            .map_err(|err| rollout_errors::Error::internal(err.to_string()))?;
        let config = store.snapshot().await;

        let results = worker::reconcile_batch(
            rollouts,
            &config,
            &registry,
            &orchestrator,
            event_tx.clone(),
            &cancel,
        )
        .await;
        info!("reconciled {} rollout(s)", results.len());

        if cli.once {
            break;
        }

        tokio::select! {
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(std::time::Duration::from_secs(cli.interval_seconds)) => {}
        }
    }

    drop(event_tx);
    let _ = log_task.await;
    Ok(())
}
