//! Configuration default values

// Generator defaults
pub const DEFAULT_PATH_REPOSITORY: &str = "Repositories";
pub const DEFAULT_APP_PATH: &str = "src";
pub const DEFAULT_CRATE_PATH: &str = "crate";
pub const DEFAULT_PROVIDER_PATH: &str = "providers/repository_provider.rs";

// Loading defaults
pub const DEFAULT_CONFIG_FILE: &str = "repository.toml";
pub const ENV_PREFIX: &str = "REPOSITORY_";
