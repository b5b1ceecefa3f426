//! Registration directory: the lifecycle of channel/group registrations,
//! moderation by admins, and the single-writer handle that owns the state
//! document.
//!
//! [`registry`] holds pure operations on a [`StateDocument`]; [`Directory`]
//! applies them under one lock and persists each change before it becomes
//! visible.

pub mod directory;
pub mod error;
pub mod moderation;
pub mod registry;

pub use {
    directory::{Directory, NetworkOverview},
    error::{DirectoryError, InvariantViolation},
    moderation::NotificationIntent,
    promoter_store::StateDocument,
    registry::{NewRegistration, Registrations},
};
