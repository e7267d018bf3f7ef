//! File-watcher bridging `notify`'s callback thread into the async reload
//! loop that keeps a [`crate::ConfigStore`] current.

use crate::{Config, ConfigStore};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use rollout_errors::{ConfigError, Error};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Owns the background reload task and the underlying OS file watcher.
/// Dropping or calling [`WatchHandle::shutdown`] stops reloading; the store
/// keeps serving whatever configuration was last loaded.
pub struct WatchHandle {
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
    cancel: CancellationToken,
}

impl WatchHandle {
    pub fn shutdown(self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

/// Starts watching `path` for changes, reloading `store` on every write
/// event. Returns once the watcher is installed; the reload loop itself
/// runs in the background.
///
/// # Errors
///
/// Returns an error if the underlying OS file watcher cannot be installed.
pub fn spawn_watcher(path: &Path, store: ConfigStore) -> Result<WatchHandle, Error> {
    let (tx, mut rx) = mpsc::unbounded_channel::<notify::Result<Event>>();
    let watched_path: PathBuf = path.to_path_buf();

    let mut watcher: RecommendedWatcher =
        notify::recommended_watcher(move |res: notify::Result<Event>| {
            // The notify callback runs on its own thread; this send is
            // synchronous and non-blocking, safe to call from there.
            let _ = tx.send(res);
        })
        .map_err(|e| ConfigError::WatchFailed {
            path: watched_path.display().to_string(),
            message: e.to_string(),
        })?;

    watcher
        .watch(path, RecursiveMode::NonRecursive)
        .map_err(|e| ConfigError::WatchFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    let cancel = CancellationToken::new();
    let task_cancel = cancel.clone();
    let reload_path = path.to_path_buf();
    let task = tokio::spawn(async move {
        loop {
            tokio::select! {
                () = task_cancel.cancelled() => break,
                event = rx.recv() => {
                    let Some(event) = event else { break };
                    if event.is_err() {
                        continue;
                    }
                    match Config::load_from_file(&reload_path).await {
                        Ok(config) => store.replace(config).await,
                        Err(err) => {
                            tracing::warn!(path = %reload_path.display(), error = %err, "config reload failed, keeping previous configuration");
                        }
                    }
                }
            }
        }
    });

    Ok(WatchHandle {
        _watcher: watcher,
        task,
        cancel,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reload_picks_up_a_file_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        tokio::fs::write(&path, "log_level = \"info\"\n").await.unwrap();

        let store = ConfigStore::new(Config::load_from_file(&path).await.unwrap());
        let handle = spawn_watcher(&path, store.clone()).unwrap();

        tokio::fs::write(&path, "log_level = \"debug\"\n").await.unwrap();

        let mut observed_debug = false;
        for _ in 0..50 {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            if store.snapshot().await.log_level == "debug" {
                observed_debug = true;
                break;
            }
        }
        assert!(observed_debug, "watcher never picked up the file change");
        handle.shutdown();
    }
}
