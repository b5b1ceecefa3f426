use {
    chrono::Utc,
    promoter_common::{Entity, EntityKind, ProtectedUser, Settings, UserId},
    promoter_store::{PersistentStore, StateDocument, StoreError},
    rand::seq::IndexedRandom,
    tokio::sync::Mutex,
    tracing::{debug, info},
};

use crate::{
    error::DirectoryError,
    registry::{self, NewRegistration, Registrations},
};

/// Owner of the in-memory state document.
///
/// Every mutation runs inside one critical section: the document is cloned,
/// the change applied to the clone, the clone saved, and only then swapped
/// in. A failed save leaves the in-memory document as it was.
pub struct Directory {
    store: PersistentStore,
    state: Mutex<StateDocument>,
}

/// Approved network summary shown to admins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkOverview {
    pub channels: Vec<String>,
    pub groups: Vec<String>,
}

impl NetworkOverview {
    pub fn total(&self) -> usize {
        self.channels.len() + self.groups.len()
    }
}

impl Directory {
    pub fn new(store: PersistentStore, doc: StateDocument) -> Self {
        Self {
            store,
            state: Mutex::new(doc),
        }
    }

    /// Load the document from `store` and take ownership of it.
    pub fn open(store: PersistentStore) -> Result<Self, StoreError> {
        let doc = store.load()?;
        info!(
            pending = doc.pending.len(),
            approved = doc.approved.len(),
            admins = doc.admins.len(),
            "directory loaded"
        );
        Ok(Self::new(store, doc))
    }

    pub fn store(&self) -> &PersistentStore {
        &self.store
    }

    /// Consistent copy of the whole document.
    pub async fn snapshot(&self) -> StateDocument {
        self.state.lock().await.clone()
    }

    pub(crate) async fn read<R>(&self, f: impl FnOnce(&StateDocument) -> R) -> R {
        let state = self.state.lock().await;
        f(&state)
    }

    /// Apply `f` and persist the result as one logical operation.
    ///
    /// Nothing is written when `f` fails or leaves the document unchanged.
    pub(crate) async fn mutate<R>(
        &self,
        f: impl FnOnce(&mut StateDocument) -> Result<R, DirectoryError>,
    ) -> Result<R, DirectoryError> {
        let mut state = self.state.lock().await;
        let mut working = state.clone();
        let out = f(&mut working)?;
        if working != *state {
            self.store.save(&working)?;
            *state = working;
        }
        Ok(out)
    }

    // ── Registration ─────────────────────────────────────────────────────────

    pub async fn register(&self, reg: NewRegistration) -> Result<Entity, DirectoryError> {
        let entity = self
            .mutate(|doc| registry::register_pending(doc, reg, Utc::now()))
            .await?;
        info!(chat = %entity.id, kind = %entity.kind, registrant = %entity.registrant_id, "registration pending");
        Ok(entity)
    }

    pub async fn registrations_of(&self, registrant: UserId, kind: EntityKind) -> Registrations {
        self.read(|doc| registry::find_by_registrant(doc, registrant, kind))
            .await
    }

    // ── Roster ───────────────────────────────────────────────────────────────

    /// Add a user to the protected roster. Returns `false` if already present.
    pub async fn record_user(&self, user: ProtectedUser) -> Result<bool, DirectoryError> {
        let id = user.id;
        let added = self
            .mutate(|doc| {
                if doc.protected_users.iter().any(|u| u.id == user.id) {
                    return Ok(false);
                }
                doc.protected_users.push(user);
                Ok(true)
            })
            .await?;
        if added {
            debug!(user = %id, "user added to protected roster");
        }
        Ok(added)
    }

    pub async fn is_admin(&self, user: UserId) -> bool {
        self.read(|doc| doc.is_admin(user)).await
    }

    pub async fn protected_users(
        &self,
        actor: UserId,
    ) -> Result<Vec<ProtectedUser>, DirectoryError> {
        self.read(|doc| {
            authorize(doc, actor)?;
            Ok(doc.protected_users.clone())
        })
        .await
    }

    // ── Approved network ─────────────────────────────────────────────────────

    pub async fn approved_of_kind(&self, kind: EntityKind) -> Vec<Entity> {
        self.read(|doc| {
            doc.approved
                .iter()
                .filter(|e| e.kind == kind)
                .cloned()
                .collect()
        })
        .await
    }

    /// Up to `count` approved entities of `kind`, picked at random.
    pub async fn featured(&self, kind: EntityKind, count: usize) -> Vec<Entity> {
        let candidates = self.approved_of_kind(kind).await;
        candidates
            .choose_multiple(&mut rand::rng(), count)
            .cloned()
            .collect()
    }

    pub async fn network_overview(&self, actor: UserId) -> Result<NetworkOverview, DirectoryError> {
        self.read(|doc| {
            authorize(doc, actor)?;
            let titles = |kind: EntityKind| -> Vec<String> {
                doc.approved
                    .iter()
                    .filter(|e| e.kind == kind)
                    .map(|e| e.title.clone())
                    .collect()
            };
            Ok(NetworkOverview {
                channels: titles(EntityKind::Channel),
                groups: titles(EntityKind::Group),
            })
        })
        .await
    }

    /// Approved entities and settings read in one critical section.
    pub async fn distribution_snapshot(&self) -> (Vec<Entity>, Settings) {
        self.read(|doc| (doc.approved.clone(), doc.settings)).await
    }

    pub async fn settings(&self) -> Settings {
        self.read(|doc| doc.settings).await
    }
}

pub(crate) fn authorize(doc: &StateDocument, actor: UserId) -> Result<(), DirectoryError> {
    if doc.is_admin(actor) {
        Ok(())
    } else {
        Err(DirectoryError::PermissionDenied(actor))
    }
}
