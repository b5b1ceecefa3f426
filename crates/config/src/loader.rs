use std::{
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use {
    secrecy::Secret,
    tracing::{debug, warn},
};

use crate::{env_subst::substitute_env, schema::PromoterConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "promoter.toml",
    "promoter.yaml",
    "promoter.yml",
    "promoter.json",
];

/// Environment variable supplying the bot token when the file has none.
pub const TOKEN_ENV: &str = "PROMOTER_TELEGRAM_TOKEN";

/// Override for the config directory, set via `set_config_dir()`.
static CONFIG_DIR_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);

fn override_slot() -> MutexGuard<'static, Option<PathBuf>> {
    CONFIG_DIR_OVERRIDE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Set a custom config directory. When set, discovery only looks there.
pub fn set_config_dir(path: PathBuf) {
    *override_slot() = Some(path);
}

/// Clear the config directory override, restoring default discovery.
pub fn clear_config_dir() {
    *override_slot() = None;
}

fn config_dir_override() -> Option<PathBuf> {
    override_slot().clone()
}

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<PromoterConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    let mut config = parse_config(&raw, path)?;
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    Ok(config)
}

/// Fill values the file left out from the environment.
fn apply_env_overrides(config: &mut PromoterConfig, lookup: impl Fn(&str) -> Option<String>) {
    if config.telegram.token.is_none()
        && let Some(token) = lookup(TOKEN_ENV).filter(|t| !t.trim().is_empty())
    {
        debug!("telegram token taken from {TOKEN_ENV}");
        config.telegram.token = Some(Secret::new(token));
    }
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./promoter.{toml,yaml,yml,json}`
/// 2. `~/.config/promoter/promoter.{toml,yaml,yml,json}`
///
/// When nothing is found a default TOML file is written to the user config
/// directory and `PromoterConfig::default()` is returned. A file that fails
/// to parse is an error: silently running with a different admin or data
/// file is worse than not starting.
pub fn discover_and_load() -> anyhow::Result<PromoterConfig> {
    match find_config_file() {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            load_config(&path)
        },
        None => {
            debug!("no config file found, writing default config");
            let mut config = PromoterConfig::default();
            if let Err(e) = write_default_config(&config) {
                warn!(error = %e, "failed to write default config file");
            }
            apply_env_overrides(&mut config, |name| std::env::var(name).ok());
            Ok(config)
        },
    }
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    if let Some(dir) = config_dir_override() {
        return first_existing(&dir);
    }

    if let Some(path) = first_existing(Path::new(".")) {
        return Some(path);
    }

    home_dir().and_then(|h| first_existing(&h.join(".config").join("promoter")))
}

fn first_existing(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the config directory: override, or `~/.config/promoter/`.
pub fn config_dir() -> Option<PathBuf> {
    if let Some(dir) = config_dir_override() {
        return Some(dir);
    }
    home_dir().map(|h| h.join(".config").join("promoter"))
}

/// Returns the data directory: `~/.promoter/`, or `./.promoter` without a home.
pub fn data_dir() -> PathBuf {
    home_dir()
        .map(|h| h.join(".promoter"))
        .unwrap_or_else(|| PathBuf::from(".promoter"))
}

fn home_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

/// Write the default config file to the user config path unless one exists.
fn write_default_config(config: &PromoterConfig) -> anyhow::Result<()> {
    let path = config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("promoter.toml");
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("serialize config: {e}"))?;
    std::fs::write(&path, &toml_str)?;
    debug!(path = %path.display(), "wrote default config file");
    Ok(())
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<PromoterConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}
