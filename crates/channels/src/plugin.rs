use std::sync::Arc;

use {
    anyhow::Result,
    async_trait::async_trait,
    promoter_common::ChatId,
    tokio::sync::mpsc,
};

use crate::inbound::{CallbackAction, InboundEvent};

/// Core channel plugin trait. Each messaging platform implements this.
#[async_trait]
pub trait ChannelPlugin: Send + Sync {
    /// Channel identifier (e.g. "telegram").
    fn id(&self) -> &str;

    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Connect and start forwarding inbound events into `events`.
    async fn start(&mut self, events: mpsc::Sender<InboundEvent>) -> Result<()>;

    /// Stop receiving updates. Outbound adapters stay usable.
    async fn stop(&mut self) -> Result<()>;

    /// Adapter for sending messages.
    fn outbound(&self) -> Arc<dyn ChannelOutbound>;

    /// Adapter for resolving chat invite links.
    fn links(&self) -> Arc<dyn InviteLinkResolver>;

    /// Public handle of the bot account, known once started.
    fn bot_handle(&self) -> Option<String> {
        None
    }
}

/// Send messages to a chat.
///
/// Only `send_text` is required. Platforms without keyboards or buttons
/// fall back to plain text through the default methods.
#[async_trait]
pub trait ChannelOutbound: Send + Sync {
    async fn send_text(&self, to: ChatId, text: &str) -> Result<(), SendError>;

    /// Send text with a persistent reply keyboard, one label per button.
    async fn send_menu(&self, to: ChatId, text: &str, _rows: &[Vec<String>]) -> Result<(), SendError> {
        self.send_text(to, text).await
    }

    /// Send text with inline action buttons attached.
    async fn send_with_actions(
        &self,
        to: ChatId,
        text: &str,
        _actions: &[ActionButton],
    ) -> Result<(), SendError> {
        self.send_text(to, text).await
    }

    /// Answer a button press so the client stops its loading indicator.
    async fn acknowledge(&self, _callback_id: &str, _text: &str) -> Result<(), SendError> {
        Ok(())
    }
}

/// Inline button attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionButton {
    pub label: String,
    pub target: ButtonTarget,
}

/// What pressing an [`ActionButton`] does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonTarget {
    /// Report a moderation decision back to the bot.
    Callback(CallbackAction),
    /// Open a link.
    Url(String),
}

impl ActionButton {
    pub fn callback(label: impl Into<String>, action: CallbackAction) -> Self {
        Self {
            label: label.into(),
            target: ButtonTarget::Callback(action),
        }
    }

    pub fn url(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: ButtonTarget::Url(url.into()),
        }
    }
}

/// Look up an invite link for a registered chat.
#[async_trait]
pub trait InviteLinkResolver: Send + Sync {
    async fn resolve_invite_link(&self, chat: ChatId) -> Result<String, ResolveError>;
}

/// Delivery of one message to one recipient failed.
#[derive(Debug, Clone, thiserror::Error)]
#[error("send to {to} failed: {reason}")]
pub struct SendError {
    pub to: ChatId,
    pub reason: String,
}

impl SendError {
    pub fn new(to: ChatId, reason: impl Into<String>) -> Self {
        Self {
            to,
            reason: reason.into(),
        }
    }
}

/// No invite link could be produced for a chat.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invite link for {chat} unavailable: {reason}")]
pub struct ResolveError {
    pub chat: ChatId,
    pub reason: String,
}

impl ResolveError {
    pub fn new(chat: ChatId, reason: impl Into<String>) -> Self {
        Self {
            chat,
            reason: reason.into(),
        }
    }
}
