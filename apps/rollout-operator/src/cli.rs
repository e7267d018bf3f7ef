use clap::Parser;
use std::path::PathBuf;

/// Reconciles pipeline, interstep-buffer-service, controller and mono-vertex
/// rollouts against the fixtures found in `rollouts_dir`.
#[derive(Parser)]
#[command(name = "rollout-operator")]
#[command(about = "Rollout control-plane operator", long_about = None)]
pub struct Cli {
    /// Path to the operator's TOML configuration file. Hot-reloaded on write.
    #[arg(long, env = "ROLLOUT_OPERATOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory of rollout resources (one JSON document per file),
    /// reconciled on every pass. Stands in for the watch/admission layer
    /// that would otherwise list and stream rollout resources from a real
    /// cluster, which is out of scope for this crate (see DESIGN.md).
    #[arg(long)]
    pub rollouts_dir: PathBuf,

    /// Reconcile every fixture once and exit, instead of looping forever.
    #[arg(long)]
    pub once: bool,

    /// Seconds between reconcile passes when not running with `--once`.
    #[arg(long, default_value_t = 30)]
    pub interval_seconds: u64,

    /// Emit debug-level tracing output.
    #[arg(long)]
    pub debug: bool,

    /// Emit newline-delimited JSON logs instead of human-readable text.
    #[arg(long)]
    pub json_logs: bool,
}
