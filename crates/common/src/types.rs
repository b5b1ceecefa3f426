use std::{
    fmt,
    num::{NonZeroU64, NonZeroUsize, ParseIntError},
    str::FromStr,
    time::Duration,
};

use {
    chrono::{DateTime, NaiveDateTime, Utc},
    serde::{Deserialize, Deserializer, Serialize},
};

// ── Identifiers ──────────────────────────────────────────────────────────────

/// Platform chat identifier (channels and groups are negative on Telegram).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

/// Platform user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl UserId {
    /// Private chat with this user. Telegram uses the same number for both.
    pub fn chat(self) -> ChatId {
        ChatId(self.0)
    }
}

impl FromStr for ChatId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl FromStr for UserId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

// ── Entities ─────────────────────────────────────────────────────────────────

/// Kind of a registered chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Channel,
    Group,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Channel => "channel",
            Self::Group => "group",
        }
    }

    /// Leading marker used in rendered listings.
    pub fn marker(self) -> &'static str {
        match self {
            Self::Channel => "📺",
            Self::Group => "👥",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A channel or group registration, pending or approved.
///
/// Serialized field names follow the legacy data file so an existing
/// document loads without migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: ChatId,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub registrant_id: UserId,
    #[serde(rename = "registrant_username", default)]
    pub registrant_handle: Option<String>,
    #[serde(
        rename = "registration_date",
        deserialize_with = "deserialize_timestamp"
    )]
    pub registered_at: DateTime<Utc>,
}

/// Accepts RFC 3339 timestamps as well as naive ISO-8601 ones (read as UTC).
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(_) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|n| n.and_utc()),
    }
}

/// A user who has started the bot at least once. The roster is append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedUser {
    pub id: UserId,
    #[serde(rename = "username", default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl ProtectedUser {
    pub fn full_name(&self) -> String {
        match self.last_name.as_deref().filter(|l| !l.is_empty()) {
            Some(last) => format!("{} {last}", self.first_name),
            None => self.first_name.clone(),
        }
    }
}

// ── Moderation ───────────────────────────────────────────────────────────────

/// Admin decision on a pending registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Approve,
    Reject,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Settings ─────────────────────────────────────────────────────────────────

pub const DEFAULT_BROADCAST_INTERVAL_HOURS: NonZeroU64 = match NonZeroU64::new(24) {
    Some(n) => n,
    None => panic!("zero interval"),
};

pub const DEFAULT_MAX_ENTITIES_PER_LIST: NonZeroUsize = match NonZeroUsize::new(20) {
    Some(n) => n,
    None => panic!("zero list size"),
};

/// Broadcast settings stored in the state document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "schedule_interval_hours")]
    pub broadcast_interval_hours: NonZeroU64,
    #[serde(rename = "max_partners_per_list")]
    pub max_entities_per_list: NonZeroUsize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            broadcast_interval_hours: DEFAULT_BROADCAST_INTERVAL_HOURS,
            max_entities_per_list: DEFAULT_MAX_ENTITIES_PER_LIST,
        }
    }
}

impl Settings {
    pub fn broadcast_interval(&self) -> Duration {
        Duration::from_secs(self.broadcast_interval_hours.get().saturating_mul(3600))
    }
}
