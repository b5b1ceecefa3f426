use std::{fmt::Write, num::NonZeroUsize};

use {
    promoter_channels::InviteLinkResolver,
    promoter_common::Entity,
    tracing::warn,
};

/// Placeholder rendered in place of a link that could not be resolved.
pub const LINK_UNAVAILABLE: &str = "(link unavailable)";

/// A bounded, contiguous slice of the approved entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// Zero-based position among the batches of one run.
    pub index: usize,
    pub entities: Vec<Entity>,
}

impl Batch {
    /// One-based number shown in the list header.
    pub fn number(&self) -> usize {
        self.index + 1
    }
}

/// Text of one batch, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBatch {
    pub number: usize,
    pub text: String,
    /// Entities rendered with the placeholder instead of a link.
    pub unresolved: usize,
}

/// Split `approved` into order-preserving batches of at most `max_per_batch`.
pub fn build_batches(approved: &[Entity], max_per_batch: NonZeroUsize) -> Vec<Batch> {
    approved
        .chunks(max_per_batch.get())
        .enumerate()
        .map(|(index, chunk)| Batch {
            index,
            entities: chunk.to_vec(),
        })
        .collect()
}

/// Render one batch, resolving an invite link for every entity.
///
/// A link that fails to resolve degrades that line to the placeholder; it
/// never stops the rest of the batch from rendering.
pub async fn render_batch(batch: &Batch, links: &dyn InviteLinkResolver) -> RenderedBatch {
    let mut text = format!("📢 Promotion list {}\n\n", batch.number());
    let mut unresolved = 0;

    for entity in &batch.entities {
        let marker = entity.kind.marker();
        match links.resolve_invite_link(entity.id).await {
            Ok(link) => {
                let _ = writeln!(text, "{marker} {} - {link}", entity.title);
            },
            Err(e) => {
                warn!(chat = %entity.id, title = %entity.title, error = %e, "invite link unavailable");
                let _ = writeln!(text, "{marker} {} {LINK_UNAVAILABLE}", entity.title);
                unresolved += 1;
            },
        }
    }

    RenderedBatch {
        number: batch.number(),
        text,
        unresolved,
    }
}
