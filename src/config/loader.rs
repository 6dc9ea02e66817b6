//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Project config (feedpulse.toml)
//! 3. Environment variables (FEEDPULSE_* prefix)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::types::Config;
use crate::types::{PipelineError, Result};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with the full resolution chain:
    /// defaults → project file → env vars
    pub fn load() -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        let project_path = Self::project_config_path();
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        // e.g. FEEDPULSE_STORE_ROOT -> store.root
        figment = figment.merge(Env::prefixed("FEEDPULSE_").split('_').lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| PipelineError::config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| PipelineError::config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Get path to the project config file
    pub fn project_config_path() -> PathBuf {
        PathBuf::from("feedpulse.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_file_merges_over_defaults() {
        let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            r#"
[store]
root = "/var/lib/feedpulse"

[discovery]
window_days = 3
"#
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(file.path()).unwrap();
        assert_eq!(
            config.store.root.as_deref(),
            Some(Path::new("/var/lib/feedpulse"))
        );
        assert_eq!(config.discovery.window_days, 3);
        // untouched sections keep their defaults
        assert_eq!(config.store.ingest_prefix, "ingest/");
    }

    #[test]
    fn test_load_from_file_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            r#"
[discovery]
window_days = 0
"#
        )
        .unwrap();

        assert!(ConfigLoader::load_from_file(file.path()).is_err());
    }
}
