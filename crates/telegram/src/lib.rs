//! Telegram channel plugin built on teloxide.
//!
//! Long-polls the Bot API, translates updates into
//! [`InboundEvent`](promoter_channels::InboundEvent)s and exposes message
//! sending and invite-link export to the core.

pub mod handlers;
pub mod outbound;
pub mod plugin;

pub use {outbound::TelegramOutbound, plugin::TelegramPlugin};
