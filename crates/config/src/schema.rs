//! Config schema: Telegram credentials, bootstrap values seeded into a fresh
//! state document, storage location and broadcast pacing.

use std::{
    num::{NonZeroU64, NonZeroUsize},
    path::PathBuf,
    time::Duration,
};

use {
    promoter_common::{
        Settings, UserId,
        types::{DEFAULT_BROADCAST_INTERVAL_HOURS, DEFAULT_MAX_ENTITIES_PER_LIST},
    },
    secrecy::Secret,
    serde::{Deserialize, Serialize},
};

use crate::loader::data_dir;

/// Root configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromoterConfig {
    pub telegram: TelegramConfig,
    pub bootstrap: BootstrapConfig,
    pub storage: StorageConfig,
    pub broadcast: BroadcastConfig,
}

/// Telegram bot credentials.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot API token. Never written back to disk.
    #[serde(skip_serializing)]
    pub token: Option<Secret<String>>,
}

/// Values read once at startup and stored into a fresh state document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// First administrator. `0` means unset.
    pub admin_id: i64,
    pub broadcast_interval_hours: NonZeroU64,
    pub max_entities_per_list: NonZeroUsize,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            admin_id: 0,
            broadcast_interval_hours: DEFAULT_BROADCAST_INTERVAL_HOURS,
            max_entities_per_list: DEFAULT_MAX_ENTITIES_PER_LIST,
        }
    }
}

impl BootstrapConfig {
    pub fn admin(&self) -> Option<UserId> {
        (self.admin_id != 0).then_some(UserId(self.admin_id))
    }

    pub fn settings(&self) -> Settings {
        Settings {
            broadcast_interval_hours: self.broadcast_interval_hours,
            max_entities_per_list: self.max_entities_per_list,
        }
    }
}

/// Where the state document lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: data_dir().join("state.json"),
        }
    }
}

/// Pacing of outbound list delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    /// Pause between consecutive sends, in milliseconds.
    pub send_delay_ms: u64,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            send_delay_ms: 1000,
        }
    }
}

impl BroadcastConfig {
    pub fn send_delay(&self) -> Duration {
        Duration::from_millis(self.send_delay_ms)
    }
}
