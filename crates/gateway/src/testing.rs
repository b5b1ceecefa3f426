use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
    time::Duration,
};

use {
    async_trait::async_trait,
    promoter_broadcast::{BroadcastEngine, Broadcaster},
    promoter_channels::{ActionButton, ChannelOutbound, InviteLinkResolver, ResolveError, SendError},
    promoter_common::{ChatId, Settings, UserId},
    promoter_directory::Directory,
    promoter_store::PersistentStore,
    tokio_util::sync::CancellationToken,
};

use crate::state::GatewayState;

pub const ADMIN: UserId = UserId(999);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text {
        to: ChatId,
        text: String,
    },
    Menu {
        to: ChatId,
        text: String,
        rows: Vec<Vec<String>>,
    },
    Actions {
        to: ChatId,
        text: String,
        actions: Vec<ActionButton>,
    },
    Ack {
        callback_id: String,
        text: String,
    },
}

#[derive(Default)]
pub struct RecordingOutbound {
    sent: Mutex<Vec<Sent>>,
}

impl RecordingOutbound {
    fn push(&self, sent: Sent) {
        self.sent.lock().unwrap().push(sent);
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// Text of every message delivered to `chat`, in order.
    pub fn texts_to(&self, chat: ChatId) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text { to, text } | Sent::Menu { to, text, .. } | Sent::Actions { to, text, .. }
                    if to == chat =>
                {
                    Some(text)
                },
                _ => None,
            })
            .collect()
    }

    pub fn acks(&self) -> Vec<(String, String)> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Ack { callback_id, text } => Some((callback_id, text)),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ChannelOutbound for RecordingOutbound {
    async fn send_text(&self, to: ChatId, text: &str) -> Result<(), SendError> {
        self.push(Sent::Text {
            to,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_menu(&self, to: ChatId, text: &str, rows: &[Vec<String>]) -> Result<(), SendError> {
        self.push(Sent::Menu {
            to,
            text: text.to_string(),
            rows: rows.to_vec(),
        });
        Ok(())
    }

    async fn send_with_actions(
        &self,
        to: ChatId,
        text: &str,
        actions: &[ActionButton],
    ) -> Result<(), SendError> {
        self.push(Sent::Actions {
            to,
            text: text.to_string(),
            actions: actions.to_vec(),
        });
        Ok(())
    }

    async fn acknowledge(&self, callback_id: &str, text: &str) -> Result<(), SendError> {
        self.push(Sent::Ack {
            callback_id: callback_id.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }
}

/// Resolves `https://t.me/+<id>` for every chat except 7.
pub struct StubLinks {
    failing: HashSet<ChatId>,
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

pub fn gateway(dir: &tempfile::TempDir) -> (GatewayState, Arc<RecordingOutbound>) {
    let store = PersistentStore::new(dir.path().join("state.json"))
        .with_bootstrap(Some(ADMIN), Settings::default());
    let directory = Arc::new(Directory::open(store).unwrap());
    let outbound = Arc::new(RecordingOutbound::default());
    let links = Arc::new(StubLinks {
        failing: HashSet::from([ChatId(7)]),
    });
    let broadcaster = Arc::new(Broadcaster::new(
        Arc::clone(&directory),
        outbound.clone(),
        links.clone(),
        BroadcastEngine::new(Duration::ZERO),
    ));
    let state = GatewayState::new(
        directory,
        broadcaster,
        outbound.clone(),
        links,
        CancellationToken::new(),
    );
    (state, outbound)
}
