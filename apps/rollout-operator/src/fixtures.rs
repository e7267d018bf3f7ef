//! Loads rollout resources from a directory of JSON files.
//!
//! Stands in for the watch/admission layer that would list and stream
//! rollout resources from a real cluster; that layer, and the typed CRD
//! parsing it would do, are out of scope for this crate (see DESIGN.md).

use rollout_types::Rollout;
use std::path::Path;
use tracing::warn;

/// Reads every `*.json` file in `dir` and parses it as a [`Rollout`].
/// A file that fails to parse is skipped with a warning rather than
/// aborting the whole pass: one malformed fixture shouldn't block
/// reconciliation of the others.
///
/// # Errors
///
/// Returns an error if `dir` itself cannot be read.
pub async fn load_all(dir: &Path) -> Result<Vec<Rollout>, std::io::Error> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut rollouts = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping unreadable rollout fixture");
                continue;
            }
        };
        match serde_json::from_str::<Rollout>(&contents) {
            Ok(rollout) => rollouts.push(rollout),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping malformed rollout fixture");
            }
        }
    }

    Ok(rollouts)
}
