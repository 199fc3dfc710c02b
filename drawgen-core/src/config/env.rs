//! Environment variable interpolation for configuration values

use super::error::ConfigError;
use super::schema::ProviderConfig;
use super::secrets::SecretString;
use regex::Regex;
use std::env;

fn env_var_pattern() -> Regex {
    Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap()
}

/// Interpolate `${VAR}` references in the credential-bearing fields of a
/// loaded configuration. Only `api_key` and `base_url` are interpolated;
/// other fields are taken literally.
pub fn interpolate_config_env_vars(config: &mut ProviderConfig) -> Result<(), ConfigError> {
    let pattern = env_var_pattern();

    let api_key = config.api_key.expose_secret();
    if pattern.is_match(api_key) {
        let interpolated = interpolate_single_value(api_key)?;
        config.api_key = SecretString::new(interpolated);
    }

    if pattern.is_match(&config.base_url) {
        config.base_url = interpolate_single_value(&config.base_url)?;
    }

    Ok(())
}

/// Interpolate a single value that may contain one environment variable
fn interpolate_single_value(value: &str) -> Result<String, ConfigError> {
    let pattern = env_var_pattern();

    if let Some(cap) = pattern.captures(value) {
        let var_name = &cap[1];
        match env::var(var_name) {
            Ok(env_value) => Ok(value.replace(&cap[0], &env_value)),
            Err(_) => Err(ConfigError::EnvVarNotFound {
                var: var_name.to_string(),
            }),
        }
    } else {
        Ok(value.to_string())
    }
}
