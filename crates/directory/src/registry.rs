//! Pure registration operations over a [`StateDocument`].
//!
//! Nothing here locks or persists; [`Directory`](crate::Directory) wraps each
//! call in its single-writer section.

use std::collections::HashSet;

use {
    chrono::{DateTime, Utc},
    promoter_common::{ChatId, Entity, EntityKind, UserId},
    promoter_store::StateDocument,
};

use crate::error::{DirectoryError, InvariantViolation};

/// A registration request before it is timestamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRegistration {
    pub id: ChatId,
    pub title: String,
    pub kind: EntityKind,
    pub registrant_id: UserId,
    pub registrant_handle: Option<String>,
}

/// A registrant's entities of one kind, split by membership set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registrations {
    pub approved: Vec<Entity>,
    pub pending: Vec<Entity>,
}

impl Registrations {
    pub fn is_empty(&self) -> bool {
        self.approved.is_empty() && self.pending.is_empty()
    }
}

/// Append a new pending entity. Fails if the chat is pending or approved.
pub fn register_pending(
    doc: &mut StateDocument,
    reg: NewRegistration,
    now: DateTime<Utc>,
) -> Result<Entity, DirectoryError> {
    if doc.is_pending(reg.id) || doc.is_approved(reg.id) {
        return Err(DirectoryError::Duplicate(reg.id));
    }
    let entity = Entity {
        id: reg.id,
        title: reg.title,
        kind: reg.kind,
        registrant_id: reg.registrant_id,
        registrant_handle: reg.registrant_handle,
        registered_at: now,
    };
    doc.pending.push(entity.clone());
    Ok(entity)
}

pub fn find_by_registrant(
    doc: &StateDocument,
    registrant: UserId,
    kind: EntityKind,
) -> Registrations {
    let select = |set: &[Entity]| -> Vec<Entity> {
        set.iter()
            .filter(|e| e.registrant_id == registrant && e.kind == kind)
            .cloned()
            .collect()
    };
    Registrations {
        approved: select(&doc.approved),
        pending: select(&doc.pending),
    }
}

fn take_pending(doc: &mut StateDocument, id: ChatId) -> Result<Entity, DirectoryError> {
    let pos = doc
        .pending
        .iter()
        .position(|e| e.id == id)
        .ok_or(DirectoryError::NotFound(id))?;
    Ok(doc.pending.remove(pos))
}

/// Move a pending entity, unchanged, to the end of the approved set.
pub fn approve(doc: &mut StateDocument, id: ChatId) -> Result<Entity, DirectoryError> {
    let entity = take_pending(doc, id)?;
    doc.approved.push(entity.clone());
    Ok(entity)
}

/// Drop a pending entity. Rejected registrations are not archived.
pub fn reject(doc: &mut StateDocument, id: ChatId) -> Result<Entity, DirectoryError> {
    take_pending(doc, id)
}

/// Every chat id is in at most one set, and at most once in it.
pub fn check_invariants(doc: &StateDocument) -> Result<(), InvariantViolation> {
    let mut pending = HashSet::new();
    for e in &doc.pending {
        if !pending.insert(e.id) {
            return Err(InvariantViolation::Repeated(e.id, "pending"));
        }
    }
    let mut approved = HashSet::new();
    for e in &doc.approved {
        if !approved.insert(e.id) {
            return Err(InvariantViolation::Repeated(e.id, "approved"));
        }
        if pending.contains(&e.id) {
            return Err(InvariantViolation::InBothSets(e.id));
        }
    }
    Ok(())
}
