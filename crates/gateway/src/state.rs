use std::sync::Arc;

use {
    promoter_broadcast::Broadcaster,
    promoter_channels::{ChannelOutbound, InviteLinkResolver},
    promoter_common::ChatId,
    promoter_directory::Directory,
    tokio_util::sync::CancellationToken,
    tracing::warn,
};

/// Shared handles used by every event handler. Cheap to clone.
#[derive(Clone)]
pub struct GatewayState {
    pub directory: Arc<Directory>,
    pub broadcaster: Arc<Broadcaster>,
    pub outbound: Arc<dyn ChannelOutbound>,
    pub links: Arc<dyn InviteLinkResolver>,
    /// Cancelled on shutdown; manual broadcasts stop with it.
    pub cancel: CancellationToken,
    /// Bot account handle used for add-to-chat deep links.
    pub bot_handle: Option<String>,
}

impl GatewayState {
    pub fn new(
        directory: Arc<Directory>,
        broadcaster: Arc<Broadcaster>,
        outbound: Arc<dyn ChannelOutbound>,
        links: Arc<dyn InviteLinkResolver>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            directory,
            broadcaster,
            outbound,
            links,
            cancel,
            bot_handle: None,
        }
    }

    pub fn with_bot_handle(mut self, handle: Option<String>) -> Self {
        self.bot_handle = handle;
        self
    }

    /// Send a plain reply; failures are logged and dropped.
    pub async fn reply(&self, to: ChatId, text: &str) {
        if let Err(e) = self.outbound.send_text(to, text).await {
            warn!(%to, error = %e, "reply failed");
        }
    }

    /// Resolve an invite link, `None` when the platform refuses.
    pub async fn invite_link(&self, chat: ChatId) -> Option<String> {
        match self.links.resolve_invite_link(chat).await {
            Ok(link) => Some(link),
            Err(e) => {
                warn!(%chat, error = %e, "invite link lookup failed");
                None
            },
        }
    }
}
