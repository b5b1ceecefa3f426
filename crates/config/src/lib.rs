//! Configuration loading for promoter.
//!
//! Config files are discovered as `promoter.{toml,yaml,yml,json}` in the
//! working directory, then in `~/.config/promoter/`. `${VAR}` placeholders are
//! substituted from the environment before parsing.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{
        TOKEN_ENV, clear_config_dir, config_dir, data_dir, discover_and_load, find_config_file,
        load_config, set_config_dir,
    },
    schema::{BootstrapConfig, BroadcastConfig, PromoterConfig, StorageConfig, TelegramConfig},
};
