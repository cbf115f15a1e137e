// Environment variable loading and validation

use crate::{ConfigError, Result};
use std::collections::HashMap;
use std::env;

/// Environment keys consumed by the AWS deployment path.
pub mod keys {
    /// AWS access key id.
    pub const AMZ_ID: &str = "AMZ_ID";
    /// AWS secret access key.
    pub const AMZ_SEC: &str = "AMZ_SEC";
    /// AWS region.
    pub const AMZ_REGION: &str = "AMZ_REGION";
}

/// Environment variable loader
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    /// Create a new environment loader
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Load all environment variables
    pub fn load(&self) -> Result<HashMap<String, String>> {
        let mut config = HashMap::new();

        for (key, value) in env::vars() {
            if let Some(ref prefix) = self.prefix {
                if key.starts_with(prefix) {
                    let trimmed_key = key.trim_start_matches(prefix).trim_start_matches('_');
                    config.insert(trimmed_key.to_lowercase(), value);
                }
            } else {
                config.insert(key, value);
            }
        }

        Ok(config)
    }

    /// Load a specific environment variable (prefix applied when set)
    pub fn load_var(&self, key: &str) -> Result<String> {
        let full_key = if let Some(ref prefix) = self.prefix {
            format!("{}_{}", prefix, key.to_uppercase())
        } else {
            key.to_uppercase()
        };

        env::var(&full_key).map_err(ConfigError::EnvError)
    }

    /// Load with default value
    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_var(key).unwrap_or_else(|_| default.to_string())
    }

    /// Return the subset of `required` that is absent or empty.
    ///
    /// Keys are looked up verbatim, without the loader prefix - they are
    /// absolute names like `AMZ_ID`.
    pub fn missing_keys(&self, required: &[String]) -> Vec<String> {
        required
            .iter()
            .filter(|key| !env::var(key.as_str()).is_ok_and(|value| !value.is_empty()))
            .cloned()
            .collect()
    }

    /// Fail with [`ConfigError::MissingKeys`] when any required key is
    /// absent or empty.
    pub fn check_required(&self, required: &[String]) -> Result<()> {
        let missing = self.missing_keys(required);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingKeys(missing))
        }
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Load a `.env` file into the process environment.
///
/// With no path, looks for `.env` in the working directory and ignores
/// its absence.
pub fn load_dotenv(path: Option<&str>) -> Result<()> {
    if let Some(path) = path {
        dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
    } else {
        dotenvy::dotenv().ok();
    }
    Ok(())
}
