//! Configuration loading with `${ENV_VAR}` substitution.
//!
//! Config files: `waba.toml`, `waba.yaml`, `waba.yml` or `waba.json`.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{discover_and_load, find_config_file, load_config, save_config},
    schema::{SenderConfig, StorageConfig, WabaConfig},
};
