use std::{
    collections::HashSet,
    sync::Mutex,
};

use {
    async_trait::async_trait,
    chrono::{TimeZone, Utc},
    promoter_channels::{ChannelOutbound, InviteLinkResolver, ResolveError, SendError},
    promoter_common::{ChatId, Entity, EntityKind, UserId},
};

pub fn entity(id: i64, kind: EntityKind) -> Entity {
    Entity {
        id: ChatId(id),
        title: format!("chat {id}"),
        kind,
        registrant_id: UserId(1000 + id),
        registrant_handle: None,
        registered_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

/// Resolves `https://t.me/+<id>` except for the listed chats.
#[derive(Default)]
pub struct StubLinks {
    failing: HashSet<ChatId>,
}

impl StubLinks {
    pub fn failing(ids: impl IntoIterator<Item = ChatId>) -> Self {
        Self {
            failing: ids.into_iter().collect(),
        }
    }
}

#[async_trait]
impl InviteLinkResolver for StubLinks {
    async fn resolve_invite_link(&self, chat: ChatId) -> Result<String, ResolveError> {
        if self.failing.contains(&chat) {
            return Err(ResolveError::new(chat, "bot is not an admin"));
        }
        Ok(format!("https://t.me/+{chat}"))
    }
}

/// Records every send; fails for the listed recipients.
#[derive(Default)]
pub struct RecordingOutbound {
    failing: HashSet<ChatId>,
    pub sent: Mutex<Vec<(ChatId, String)>>,
}

impl RecordingOutbound {
    pub fn failing(ids: impl IntoIterator<Item = ChatId>) -> Self {
        Self {
            failing: ids.into_iter().collect(),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<(ChatId, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChannelOutbound for RecordingOutbound {
    async fn send_text(&self, to: ChatId, text: &str) -> Result<(), SendError> {
        if self.failing.contains(&to) {
            return Err(SendError::new(to, "chat not found"));
        }
        self.sent.lock().unwrap().push((to, text.to_string()));
        Ok(())
    }
}
