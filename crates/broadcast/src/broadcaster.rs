use std::sync::Arc;

use {
    promoter_channels::{ChannelOutbound, InviteLinkResolver},
    promoter_common::ChatId,
    promoter_directory::Directory,
    tokio::sync::Mutex,
    tokio_util::sync::CancellationToken,
    tracing::info,
};

use crate::{
    engine::{BroadcastEngine, DistributeError, DistributionOutcome},
    list::{build_batches, render_batch},
};

/// One promotion-list run against the live directory.
///
/// Manual and scheduled triggers share one `Broadcaster`; overlapping runs
/// queue behind each other instead of interleaving sends.
pub struct Broadcaster {
    directory: Arc<Directory>,
    outbound: Arc<dyn ChannelOutbound>,
    links: Arc<dyn InviteLinkResolver>,
    engine: BroadcastEngine,
    run_lock: Mutex<()>,
}

impl Broadcaster {
    pub fn new(
        directory: Arc<Directory>,
        outbound: Arc<dyn ChannelOutbound>,
        links: Arc<dyn InviteLinkResolver>,
        engine: BroadcastEngine,
    ) -> Self {
        Self {
            directory,
            outbound,
            links,
            engine,
            run_lock: Mutex::new(()),
        }
    }

    /// Build, render and distribute lists for the current approved set.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<DistributionOutcome, DistributeError> {
        let _running = self.run_lock.lock().await;

        let (approved, settings) = self.directory.distribution_snapshot().await;
        if approved.is_empty() {
            info!("no approved entities, skipping promotion lists");
            return Ok(DistributionOutcome::default());
        }

        let batches = build_batches(&approved, settings.max_entities_per_list);
        let mut rendered = Vec::with_capacity(batches.len());
        for batch in &batches {
            rendered.push(render_batch(batch, self.links.as_ref()).await);
        }
        let recipients: Vec<ChatId> = approved.iter().map(|e| e.id).collect();

        info!(
            lists = rendered.len(),
            recipients = recipients.len(),
            "sending promotion lists"
        );
        let outcome = self
            .engine
            .distribute(&rendered, &recipients, self.outbound.as_ref(), cancel)
            .await?;
        info!(
            delivered = outcome.delivered,
            failed = outcome.failed,
            cancelled = outcome.cancelled,
            "promotion lists finished"
        );
        Ok(outcome)
    }
}
