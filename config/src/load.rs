use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::environment::Environment;

/// Directory holding the layered configuration files, relative to the working directory.
const CONFIGURATION_DIR: &str = "configuration";

/// Prefix of environment variables that override configuration values.
const ENV_PREFIX: &str = "APP";

/// Errors that can occur while loading the application configuration.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read the process environment: {0}")]
    Environment(#[from] std::io::Error),

    #[error("failed to read or deserialize the configuration: {0}")]
    Config(#[from] rust_cli_config::ConfigError),
}

/// Loads the application configuration for the current [`Environment`].
///
/// Configuration is layered: `configuration/base.yaml` is read first, then
/// `configuration/{env}.yaml` on top of it, and finally `APP_`-prefixed environment
/// variables override individual values. Nested fields use `__` as the separator, e.g.
/// `APP_ORCHESTRATOR__MESSAGE_SIZE_LIMIT=1048576`.
pub fn load_config<T>() -> Result<T, ConfigLoadError>
where
    T: DeserializeOwned,
{
    let environment = Environment::load()?;
    let base_dir = std::env::current_dir().map_err(ConfigLoadError::Environment)?;
    let configuration_dir = base_dir.join(CONFIGURATION_DIR);

    let environment_filename = format!("{environment}.yaml");

    let settings = rust_cli_config::Config::builder()
        .add_source(
            rust_cli_config::File::from(configuration_dir.join("base.yaml")).required(false),
        )
        .add_source(
            rust_cli_config::File::from(configuration_dir.join(environment_filename))
                .required(false),
        )
        .add_source(
            rust_cli_config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let config = settings.try_deserialize::<T>()?;

    Ok(config)
}
