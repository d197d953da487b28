use config::shared::OrchestratorConfig;
use config::{load_config, ConfigLoadError};
use serde::{Deserialize, Serialize};

/// Configuration for the attempt runner.
///
/// The runner executes one replication attempt from local files: the attempt request
/// and the pre-hydrated replication spec are read from disk, and oversized outputs are
/// offloaded into a local directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunnerConfig {
    /// Path of the JSON file holding the attempt request to execute.
    pub request_path: String,
    /// Path of the JSON file holding the pre-hydrated replication spec.
    pub spec_path: String,
    /// Directory offloaded payloads are written under.
    #[serde(default = "default_payload_dir")]
    pub payload_dir: String,
    /// Path the resulting sync output is written to; stdout when unset.
    #[serde(default)]
    pub output_path: Option<String>,
    /// Configuration of the attempt orchestrator itself.
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

fn default_payload_dir() -> String {
    "payloads".to_string()
}

/// Loads the [`RunnerConfig`] from the layered configuration sources.
pub fn load_runner_config() -> Result<RunnerConfig, ConfigLoadError> {
    load_config::<RunnerConfig>()
}
