//! Resolver used when no platform connection exists (CLI previews).

use {async_trait::async_trait, promoter_common::ChatId};

use crate::plugin::{InviteLinkResolver, ResolveError};

/// Never resolves: every chat renders with the unavailable-link placeholder.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineLinks;

#[async_trait]
impl InviteLinkResolver for OfflineLinks {
    async fn resolve_invite_link(&self, chat: ChatId) -> Result<String, ResolveError> {
        Err(ResolveError::new(chat, "no platform connection"))
    }
}
