//! Admin moderation of pending registrations.

use {
    promoter_common::{ChatId, Entity, UserId, Verdict},
    tracing::info,
};

use crate::{
    directory::{Directory, authorize},
    error::DirectoryError,
    registry,
};

/// Who to tell about a moderation outcome, and what.
///
/// Returned by [`Directory::decide`]; the caller owns the actual send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationIntent {
    pub recipient: UserId,
    pub entity: Entity,
    pub verdict: Verdict,
}

impl NotificationIntent {
    /// Message for the registrant.
    pub fn message(&self) -> String {
        let kind = self.entity.kind;
        let title = &self.entity.title;
        match self.verdict {
            Verdict::Approve => format!(
                "🎉 Congratulations! Your {kind} '{title}' was approved and is now part of our network!"
            ),
            Verdict::Reject => format!("😔 Unfortunately, your {kind} '{title}' was not approved."),
        }
    }

    /// Confirmation for the admin who decided.
    pub fn admin_summary(&self) -> String {
        match self.verdict {
            Verdict::Approve => format!("✅ Registration of '{}' approved.", self.entity.title),
            Verdict::Reject => format!("❌ Registration of '{}' rejected.", self.entity.title),
        }
    }
}

impl Directory {
    /// Pending registrations in the order they were submitted.
    pub async fn list_pending(&self, actor: UserId) -> Result<Vec<Entity>, DirectoryError> {
        self.read(|doc| {
            authorize(doc, actor)?;
            Ok(doc.pending.clone())
        })
        .await
    }

    /// Approve or reject a pending registration and persist the result.
    pub async fn decide(
        &self,
        actor: UserId,
        id: ChatId,
        verdict: Verdict,
    ) -> Result<NotificationIntent, DirectoryError> {
        let entity = self
            .mutate(|doc| {
                authorize(doc, actor)?;
                match verdict {
                    Verdict::Approve => registry::approve(doc, id),
                    Verdict::Reject => registry::reject(doc, id),
                }
            })
            .await?;
        info!(chat = %id, admin = %actor, %verdict, "registration moderated");
        Ok(NotificationIntent {
            recipient: entity.registrant_id,
            entity,
            verdict,
        })
    }
}
