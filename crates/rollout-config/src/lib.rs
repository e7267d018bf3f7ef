#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Operator configuration, hot-reloaded from a file on disk — §6/§9.
//!
//! Follows the teacher's single-writer/many-reader discipline: one
//! `Arc<RwLock<Config>>` behind [`ConfigStore`], readers call
//! [`ConfigStore::snapshot`] and get an owned, deep-cloned `Config` rather
//! than a guard, so no reader can hold a lock across an `await` point or
//! observe a torn update mid-reload.

mod types;
mod watch;

pub use types::{GeneralConfig, NamespaceOverride, NamespaceOverrides, ProgressiveConfig, ResourceFilterRule};
pub use watch::{spawn_watcher, WatchHandle};

use rollout_errors::{ConfigError, Error};
use rollout_types::strategy::Strategy;
use rollout_types::RolloutKind;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// The full configuration surface (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Wire value, one of `apply | pause-and-drain | progressive | no-strategy`.
    #[serde(default = "default_upgrade_strategy")]
    pub default_upgrade_strategy: String,

    #[serde(default)]
    pub pipeline_spec_excluded_paths: Vec<String>,

    #[serde(default)]
    pub isb_service_spec_excluded_paths: Vec<String>,

    #[serde(default)]
    pub permitted_riders: Vec<ResourceFilterRule>,

    /// Forwarded unchanged; never interpreted by the core.
    #[serde(default)]
    pub numaflow_controller_image_names: Vec<String>,

    #[serde(default)]
    pub namespace_overrides: NamespaceOverrides,

    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub progressive: ProgressiveConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            default_upgrade_strategy: default_upgrade_strategy(),
            pipeline_spec_excluded_paths: Vec::new(),
            isb_service_spec_excluded_paths: Vec::new(),
            permitted_riders: Vec::new(),
            numaflow_controller_image_names: Vec::new(),
            namespace_overrides: NamespaceOverrides::new(),
            general: GeneralConfig::default(),
            progressive: ProgressiveConfig::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_upgrade_strategy() -> String {
    "pause-and-drain".to_string()
}

impl Config {
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse as TOML.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;
        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;
        Ok(config)
    }

    /// Resolves `default_upgrade_strategy`, falling back to the conservative
    /// `Ppnd` when the wire value is `no-strategy` or unrecognised (an
    /// administrator writing "no-strategy" still needs the classifier to
    /// produce something usable; see `DESIGN.md`).
    #[must_use]
    pub fn default_strategy(&self) -> Strategy {
        Strategy::parse_config_value(&self.default_upgrade_strategy).unwrap_or(Strategy::Ppnd)
    }

    /// Resolves the effective default strategy for `namespace`, honouring a
    /// per-namespace override when present and recognised.
    #[must_use]
    pub fn strategy_for_namespace(&self, namespace: &str) -> Strategy {
        self.namespace_overrides
            .get(namespace)
            .and_then(NamespaceOverride::resolved_strategy)
            .unwrap_or_else(|| self.default_strategy())
    }

    #[must_use]
    pub fn excluded_paths_for(&self, kind: RolloutKind) -> &[String] {
        match kind {
            RolloutKind::PipelineRollout => &self.pipeline_spec_excluded_paths,
            RolloutKind::IsbServiceRollout => &self.isb_service_spec_excluded_paths,
            RolloutKind::NumaflowControllerRollout | RolloutKind::MonoVertexRollout => &[],
        }
    }

    #[must_use]
    pub fn rider_is_permitted(&self, kind: &str, group_version: &str) -> bool {
        self.permitted_riders.iter().any(|r| r.matches(kind, group_version))
    }
}

/// Shared, hot-reloadable configuration handle. Cheap to `Clone` (`Arc` internally).
#[derive(Clone)]
pub struct ConfigStore {
    inner: Arc<RwLock<Config>>,
}

impl ConfigStore {
    #[must_use]
    pub fn new(initial: Config) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    /// Returns a deep-cloned snapshot; never hands out a guard, so holding
    /// the result across an `.await` can never stall a concurrent reload.
    pub async fn snapshot(&self) -> Config {
        self.inner.read().await.clone()
    }

    /// Installs `config` as the new current configuration. The only writer;
    /// called from [`watch::spawn_watcher`]'s reload loop or directly by
    /// callers that manage their own reload schedule.
    pub async fn replace(&self, config: Config) {
        *self.inner.write().await = config;
    }
}
