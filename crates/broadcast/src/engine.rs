use std::time::Duration;

use {
    promoter_channels::{ChannelOutbound, SendError},
    promoter_common::ChatId,
    tokio_util::sync::CancellationToken,
    tracing::{debug, warn},
};

use crate::list::RenderedBatch;

/// Structural problems that stop a distribution before any send.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DistributeError {
    #[error("promotion list {0} rendered to an empty message")]
    EmptyBatch(usize),
}

/// Counts of one distribution run.
#[derive(Debug, Clone, Default)]
pub struct DistributionOutcome {
    pub batches: usize,
    pub delivered: usize,
    pub failed: usize,
    pub failures: Vec<SendError>,
    /// The run stopped early on shutdown.
    pub cancelled: bool,
}

impl DistributionOutcome {
    pub fn attempted(&self) -> usize {
        self.delivered + self.failed
    }
}

/// Sends rendered batches to recipients at a fixed pace.
#[derive(Debug, Clone)]
pub struct BroadcastEngine {
    delay: Duration,
}

impl BroadcastEngine {
    /// `delay` is observed between any two consecutive sends.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Send every batch to every recipient.
    ///
    /// A failed send is logged and counted; it never stops delivery to the
    /// remaining recipients. Cancellation is honored between sends.
    pub async fn distribute(
        &self,
        batches: &[RenderedBatch],
        recipients: &[ChatId],
        outbound: &dyn ChannelOutbound,
        cancel: &CancellationToken,
    ) -> Result<DistributionOutcome, DistributeError> {
        if let Some(empty) = batches.iter().find(|b| b.text.trim().is_empty()) {
            return Err(DistributeError::EmptyBatch(empty.number));
        }

        let mut outcome = DistributionOutcome {
            batches: batches.len(),
            ..Default::default()
        };
        let mut first = true;

        'batches: for batch in batches {
            for &to in recipients {
                if !first && !self.pause(cancel).await {
                    outcome.cancelled = true;
                    break 'batches;
                }
                if cancel.is_cancelled() {
                    outcome.cancelled = true;
                    break 'batches;
                }
                first = false;

                match outbound.send_text(to, &batch.text).await {
                    Ok(()) => {
                        debug!(%to, list = batch.number, "promotion list delivered");
                        outcome.delivered += 1;
                    },
                    Err(e) => {
                        warn!(%to, list = batch.number, error = %e, "promotion list delivery failed");
                        outcome.failed += 1;
                        outcome.failures.push(e);
                    },
                }
            }
        }

        Ok(outcome)
    }

    /// Wait out the send delay. Returns `false` if cancelled meanwhile.
    async fn pause(&self, cancel: &CancellationToken) -> bool {
        if self.delay.is_zero() {
            return true;
        }
        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(self.delay) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::testing::RecordingOutbound,
        std::collections::HashMap,
        tokio::time::Instant,
    };

    fn rendered(numbers: &[usize]) -> Vec<RenderedBatch> {
        numbers
            .iter()
            .map(|&number| RenderedBatch {
                number,
                text: format!("list {number}"),
                unresolved: 0,
            })
            .collect()
    }

    fn recipients(n: i64) -> Vec<ChatId> {
        (1..=n).map(ChatId).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_are_isolated() {
        let outbound = RecordingOutbound::failing([ChatId(2), ChatId(4)]);
        let engine = BroadcastEngine::new(Duration::from_millis(10));

        let outcome = engine
            .distribute(&rendered(&[1]), &recipients(5), &outbound, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.delivered, 3);
        assert_eq!(outcome.failed, 2);
        assert!(!outcome.cancelled);
        let failed: Vec<ChatId> = outcome.failures.iter().map(|e| e.to).collect();
        assert_eq!(failed, vec![ChatId(2), ChatId(4)]);

        let to: Vec<ChatId> = outbound.sent().into_iter().map(|(to, _)| to).collect();
        assert_eq!(to, vec![ChatId(1), ChatId(3), ChatId(5)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_reachable_recipient_gets_each_batch_once() {
        let outbound = RecordingOutbound::failing([ChatId(3)]);
        let engine = BroadcastEngine::new(Duration::from_millis(10));

        let outcome = engine
            .distribute(&rendered(&[1, 2, 3]), &recipients(4), &outbound, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome.batches, 3);
        assert_eq!(outcome.delivered, 9);
        assert_eq!(outcome.failed, 3);

        let mut per_recipient: HashMap<ChatId, Vec<String>> = HashMap::new();
        for (to, text) in outbound.sent() {
            per_recipient.entry(to).or_default().push(text);
        }
        assert_eq!(per_recipient.len(), 3);
        for texts in per_recipient.values() {
            assert_eq!(texts, &vec!["list 1", "list 2", "list 3"]);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_applies_per_send() {
        let outbound = RecordingOutbound::default();
        let engine = BroadcastEngine::new(Duration::from_secs(1));

        let started = Instant::now();
        engine
            .distribute(&rendered(&[1, 2]), &recipients(3), &outbound, &CancellationToken::new())
            .await
            .unwrap();
        // Six sends, five gaps between them.
        assert_eq!(started.elapsed(), Duration::from_secs(5));
        assert_eq!(outbound.sent().len(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_between_sends() {
        let outbound = RecordingOutbound::default();
        let engine = BroadcastEngine::new(Duration::from_secs(1));
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(2500)).await;
            trigger.cancel();
        });

        let outcome = engine
            .distribute(&rendered(&[1]), &recipients(10), &outbound, &cancel)
            .await
            .unwrap();
        assert!(outcome.cancelled);
        assert_eq!(outcome.delivered, 3);
        assert_eq!(outbound.sent().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_batch_is_structural_error() {
        let outbound = RecordingOutbound::default();
        let engine = BroadcastEngine::new(Duration::ZERO);
        let mut batches = rendered(&[1, 2]);
        batches[1].text.clear();

        let err = engine
            .distribute(&batches, &recipients(2), &outbound, &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err, DistributeError::EmptyBatch(2));
        assert!(outbound.sent().is_empty());
    }

    #[tokio::test]
    async fn test_no_recipients_or_batches() {
        let outbound = RecordingOutbound::default();
        let engine = BroadcastEngine::new(Duration::ZERO);
        let cancel = CancellationToken::new();

        let outcome = engine.distribute(&[], &recipients(3), &outbound, &cancel).await.unwrap();
        assert_eq!(outcome.attempted(), 0);
        let outcome = engine.distribute(&rendered(&[1]), &[], &outbound, &cancel).await.unwrap();
        assert_eq!(outcome.attempted(), 0);
        assert_eq!(outcome.batches, 1);
    }
}
