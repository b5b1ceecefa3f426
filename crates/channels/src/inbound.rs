use std::{fmt, str::FromStr};

use promoter_common::{ChatId, EntityKind, ProtectedUser, UserId, Verdict};

/// Sender of an inbound update, as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub handle: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
}

impl From<UserProfile> for ProtectedUser {
    fn from(p: UserProfile) -> Self {
        Self {
            id: p.id,
            handle: p.handle,
            first_name: p.first_name,
            last_name: p.last_name,
        }
    }
}

/// A chat referenced by a forwarded message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatInfo {
    pub id: ChatId,
    pub title: String,
    pub kind: EntityKind,
}

/// Platform-neutral inbound update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// A user started the bot in a private chat.
    Start { user: UserProfile, chat: ChatId },
    /// A user forwarded a message from a channel or group to register it.
    ForwardedChat {
        chat: ChatInfo,
        from: UserProfile,
        reply_to: ChatId,
    },
    /// A plain text message, usually a menu label.
    MenuSelection {
        user: UserId,
        chat: ChatId,
        label: String,
    },
    /// An admin pressed an approve/reject button.
    ModerationCallback {
        action: CallbackAction,
        from: UserId,
        callback_id: String,
        reply_to: Option<ChatId>,
    },
    /// The bot was added to a new group.
    AddedToGroup { chat: ChatId },
}

/// Moderation decision encoded in button callback data as `approve_<id>` or
/// `reject_<id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallbackAction {
    pub verdict: Verdict,
    pub entity: ChatId,
}

impl CallbackAction {
    pub fn new(verdict: Verdict, entity: ChatId) -> Self {
        Self { verdict, entity }
    }

    pub fn callback_data(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CallbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.verdict, self.entity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized callback data: {0}")]
pub struct UnknownCallback(pub String);

impl FromStr for CallbackAction {
    type Err = UnknownCallback;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownCallback(s.to_string());
        let (verdict, id) = s.split_once('_').ok_or_else(unknown)?;
        let verdict = match verdict {
            "approve" => Verdict::Approve,
            "reject" => Verdict::Reject,
            _ => return Err(unknown()),
        };
        let entity = id.parse().map_err(|_| unknown())?;
        Ok(Self { verdict, entity })
    }
}
