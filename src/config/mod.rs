//! Generator configuration
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `REPOSITORY_*` environment variables.

use figment::Figment;
use heck::ToSnakeCase;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub mod defaults;

use defaults::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory, relative to `app_path`, that holds generated repositories
    #[serde(default = "default_path_repository")]
    pub path_repository: String,
    /// Source root of the application
    #[serde(default = "default_app_path")]
    pub app_path: PathBuf,
    /// Module path of `app_path` as seen from generated code
    #[serde(default = "default_crate_path")]
    pub crate_path: String,
    /// Provider file, relative to `app_path`
    #[serde(default = "default_provider_path")]
    pub provider_path: PathBuf,
}

fn default_path_repository() -> String {
    DEFAULT_PATH_REPOSITORY.to_string()
}

fn default_app_path() -> PathBuf {
    PathBuf::from(DEFAULT_APP_PATH)
}

fn default_crate_path() -> String {
    DEFAULT_CRATE_PATH.to_string()
}

fn default_provider_path() -> PathBuf {
    PathBuf::from(DEFAULT_PROVIDER_PATH)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path_repository: default_path_repository(),
            app_path: default_app_path(),
            crate_path: default_crate_path(),
            provider_path: default_provider_path(),
        }
    }
}

impl Config {
    /// Load defaults, then `config_file` if it exists, then the environment
    pub fn load_from_file<P: AsRef<Path>>(config_file: P) -> Result<Self, figment::Error> {
        let config_file = config_file.as_ref();
        if config_file.exists() {
            info!("Loading configuration from {}", config_file.display());
        } else {
            debug!("No configuration file at {}, using defaults", config_file.display());
        }

        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
    }

    /// `path_repository` split on `/` and snake-cased, one entry per module
    pub fn repository_segments(&self) -> Vec<String> {
        self.path_repository
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| segment.to_snake_case())
            .collect()
    }

    /// Directory that receives one sub-directory per repository
    pub fn repository_root(&self) -> PathBuf {
        self.repository_segments()
            .iter()
            .fold(self.app_path.clone(), |path, segment| path.join(segment))
    }

    /// Absolute location of the provider file
    pub fn provider_file(&self) -> PathBuf {
        self.app_path.join(&self.provider_path)
    }
}
