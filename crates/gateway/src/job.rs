use std::sync::Arc;

use {
    anyhow::Result,
    async_trait::async_trait,
    promoter_broadcast::Broadcaster,
    promoter_cron::ScheduledJob,
    tokio_util::sync::CancellationToken,
    tracing::info,
};

/// Periodic promotion-list run.
pub struct ScheduledBroadcast {
    broadcaster: Arc<Broadcaster>,
}

impl ScheduledBroadcast {
    pub fn new(broadcaster: Arc<Broadcaster>) -> Self {
        Self { broadcaster }
    }
}

#[async_trait]
impl ScheduledJob for ScheduledBroadcast {
    fn name(&self) -> &str {
        "promotion-lists"
    }

    async fn run(&self, cancel: &CancellationToken) -> Result<()> {
        let outcome = self.broadcaster.run(cancel).await?;
        info!(
            batches = outcome.batches,
            delivered = outcome.delivered,
            failed = outcome.failed,
            "scheduled promotion lists done"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::testing::{ADMIN, gateway},
        promoter_common::{ChatId, EntityKind, Verdict},
        promoter_cron::Scheduler,
        promoter_directory::NewRegistration,
        std::time::Duration,
    };

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_tick_sends_lists() {
        let dir = tempfile::tempdir().unwrap();
        let (state, outbound) = gateway(&dir);
        for id in [10, 11] {
            state
                .directory
                .register(NewRegistration {
                    id: ChatId(id),
                    title: format!("chat {id}"),
                    kind: EntityKind::Channel,
                    registrant_id: ADMIN,
                    registrant_handle: None,
                })
                .await
                .unwrap();
            state
                .directory
                .decide(ADMIN, ChatId(id), Verdict::Approve)
                .await
                .unwrap();
        }

        let every = Duration::from_secs(24 * 3600);
        let cancel = CancellationToken::new();
        let handle = Scheduler::new(every).unwrap().spawn(
            Arc::new(ScheduledBroadcast::new(state.broadcaster.clone())),
            cancel.clone(),
        );

        tokio::time::sleep(every + Duration::from_secs(1)).await;
        assert_eq!(handle.runs(), 1);
        assert_eq!(outbound.texts_to(ChatId(10)).len(), 1);
        assert_eq!(outbound.texts_to(ChatId(11)).len(), 1);

        cancel.cancel();
        handle.join().await.unwrap();
    }
}
