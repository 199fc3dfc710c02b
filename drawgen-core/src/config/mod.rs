//! Provider configuration: schema, validation, and persistence
//!
//! The configuration is a single JSON document stored under one
//! well-known file name, mirroring the browser-side storage key it
//! replaces. Credentials may reference environment variables with
//! `${VAR}` syntax; references are resolved at load time.

mod env;
mod error;
mod schema;
mod secrets;

pub use error::ConfigError;
pub use schema::{ProviderConfig, ProviderKind};
pub use secrets::SecretString;

use std::fs;
use std::path::Path;

/// Default file name for the persisted configuration
pub const CONFIG_FILE: &str = "drawgen-config.json";

/// Load a provider configuration from a JSON file.
///
/// Environment variable references in `api_key` and `base_url` are
/// interpolated, then the non-empty invariant is enforced.
pub fn load_from_json<P: AsRef<Path>>(path: P) -> Result<ProviderConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;

    let mut config: ProviderConfig =
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_string_lossy().to_string(),
            message: e.to_string(),
        })?;

    env::interpolate_config_env_vars(&mut config)?;
    config.validate()?;
    Ok(config)
}

/// Save a provider configuration as pretty-printed JSON.
pub fn save_to_json<P: AsRef<Path>>(path: P, config: &ProviderConfig) -> Result<(), ConfigError> {
    let path = path.as_ref();
    let content = serde_json::to_string_pretty(config).map_err(|e| ConfigError::Parse {
        path: path.to_string_lossy().to_string(),
        message: e.to_string(),
    })?;

    fs::write(path, content).map_err(|e| ConfigError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })
}
