use std::collections::BTreeSet;

use {
    promoter_common::{ChatId, Entity, ProtectedUser, Settings, UserId},
    serde::{Deserialize, Serialize},
};

/// Aggregate root of everything the service persists.
///
/// Field names on disk follow the legacy data file. Missing collections
/// default to empty so partially written documents from older versions load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDocument {
    #[serde(rename = "admin_ids", default)]
    pub admins: BTreeSet<UserId>,
    #[serde(rename = "pending_registrations", default)]
    pub pending: Vec<Entity>,
    #[serde(rename = "approved_partners", default)]
    pub approved: Vec<Entity>,
    #[serde(default)]
    pub protected_users: Vec<ProtectedUser>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(rename = "admin_privileged_channels", default)]
    pub privileged_channels: Vec<ChatId>,
}

impl StateDocument {
    /// Fresh document seeded with the bootstrap admin and settings.
    pub fn bootstrap(admin: Option<UserId>, settings: Settings) -> Self {
        Self {
            admins: admin.into_iter().collect(),
            pending: Vec::new(),
            approved: Vec::new(),
            protected_users: Vec::new(),
            settings,
            privileged_channels: Vec::new(),
        }
    }

    pub fn is_admin(&self, user: UserId) -> bool {
        self.admins.contains(&user)
    }

    pub fn is_pending(&self, id: ChatId) -> bool {
        self.pending.iter().any(|e| e.id == id)
    }

    pub fn is_approved(&self, id: ChatId) -> bool {
        self.approved.iter().any(|e| e.id == id)
    }
}
