//! Loads [`AppConfig`] by layering sources with the `config` crate.
//!
//! Resolution order: defaults, then the TOML config file, then `BIOGRAPHY_*`
//! environment variables. Nested keys use a double underscore, e.g.
//! `BIOGRAPHY_DATABASE__URL` or `BIOGRAPHY_SERVER__BIND`. Command line flags
//! are applied by the binary.

use crate::paths::BiographyPaths;
use biography_core::config::AppConfig;
use biography_core::{BiographyError, Result};
use config::{Config, ConfigError, Environment, File, FileFormat, Map};
use std::path::Path;

pub const ENV_PREFIX: &str = "BIOGRAPHY";

pub struct ConfigService;

impl ConfigService {
    /// Loads configuration from the file and the process environment.
    ///
    /// An explicit path must exist. Without one, the default location is
    /// tried and a missing file yields defaults.
    pub fn load(explicit: Option<&Path>) -> Result<AppConfig> {
        Self::load_with_env(explicit, None)
    }

    /// Like [`ConfigService::load`], reading variables from `env` instead of
    /// the process environment when given.
    pub fn load_with_env(
        explicit: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> Result<AppConfig> {
        let mut builder = Config::builder();
        match explicit {
            Some(path) => {
                builder =
                    builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
            }
            None => match BiographyPaths::config_file() {
                Ok(path) => {
                    tracing::debug!("[ConfigService] Looking for config at {}", path.display());
                    builder = builder.add_source(
                        File::from(path.as_path())
                            .format(FileFormat::Toml)
                            .required(false),
                    );
                }
                Err(e) => tracing::debug!("[ConfigService] {}, skipping config file", e),
            },
        }

        let config: AppConfig = builder
            .add_source(environment(env))
            .build()
            .and_then(|config| config.try_deserialize())
            .map_err(config_error)?;

        if let Some(path) = explicit {
            tracing::info!("[ConfigService] Loaded config from {}", path.display());
        }
        Ok(config)
    }
}

fn environment(source: Option<Map<String, String>>) -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("cache.featured_limits")
        .try_parsing(true)
        .ignore_empty(true)
        .source(source)
}

fn config_error(err: ConfigError) -> BiographyError {
    BiographyError::config(err.to_string())
}
