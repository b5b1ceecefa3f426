//! Channel plugin system.
//!
//! A messaging platform implements [`ChannelPlugin`]: it turns platform
//! updates into [`InboundEvent`]s and exposes outbound sending and invite-link
//! resolution to the core. The core never talks to a platform directly.

pub mod inbound;
pub mod offline;
pub mod plugin;

pub use {
    inbound::{CallbackAction, ChatInfo, InboundEvent, UnknownCallback, UserProfile},
    offline::OfflineLinks,
    plugin::{
        ActionButton, ButtonTarget, ChannelOutbound, ChannelPlugin, InviteLinkResolver, ResolveError, SendError,
    },
};
