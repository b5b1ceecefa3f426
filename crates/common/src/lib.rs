//! Shared domain records for the promoter workspace.
//!
//! Everything that crosses a crate boundary (chat and user identifiers,
//! registered entities, the protected-user roster, broadcast settings) lives
//! here so the store, the directory and the channel adapters agree on one
//! shape.

pub mod types;

pub use types::{ChatId, Entity, EntityKind, ProtectedUser, Settings, UserId, Verdict};
