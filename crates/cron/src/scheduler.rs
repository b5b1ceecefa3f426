use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use {
    anyhow::{Result, bail},
    async_trait::async_trait,
    tokio::{
        sync::watch,
        task::JoinHandle,
        time::{Instant, MissedTickBehavior},
    },
    tokio_util::sync::CancellationToken,
    tracing::{debug, info, warn},
};

/// Work executed on every tick.
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    fn name(&self) -> &str;

    /// Run once. Long runs should check `cancel` and return early.
    async fn run(&self, cancel: &CancellationToken) -> Result<()>;
}

/// Lifecycle of a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Created, not yet spawned.
    Idle,
    /// Waiting for the next tick.
    Armed { every: Duration },
    /// The job is executing.
    Running,
    /// Cancelled; the task has exited or is about to.
    Stopped,
}

/// Runs a job at a fixed interval. The interval is bound when the scheduler
/// is created and does not change afterwards.
pub struct Scheduler {
    every: Duration,
    state: watch::Sender<SchedulerState>,
}

impl Scheduler {
    pub fn new(every: Duration) -> Result<Self> {
        if every.is_zero() {
            bail!("scheduler interval must be positive");
        }
        let (state, _) = watch::channel(SchedulerState::Idle);
        Ok(Self { every, state })
    }

    pub fn every(&self) -> Duration {
        self.every
    }

    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    /// Arm the scheduler on a new task. The first run happens one full
    /// interval from now; late ticks are delayed rather than bunched up.
    pub fn spawn(self, job: Arc<dyn ScheduledJob>, cancel: CancellationToken) -> SchedulerHandle {
        let Self { every, state } = self;
        let runs = Arc::new(AtomicU64::new(0));
        let receiver = state.subscribe();

        state.send_replace(SchedulerState::Armed { every });
        info!(job = job.name(), every_secs = every.as_secs(), "scheduler armed");

        let task_runs = Arc::clone(&runs);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {},
                }

                state.send_replace(SchedulerState::Running);
                debug!(job = job.name(), "scheduled job starting");
                if let Err(e) = job.run(&cancel).await {
                    warn!(job = job.name(), error = %e, "scheduled job failed");
                }
                task_runs.fetch_add(1, Ordering::Relaxed);

                if cancel.is_cancelled() {
                    break;
                }
                state.send_replace(SchedulerState::Armed { every });
            }

            state.send_replace(SchedulerState::Stopped);
            info!(job = job.name(), "scheduler stopped");
        });

        SchedulerHandle {
            state: receiver,
            runs,
            task,
        }
    }
}

/// Handle to a spawned scheduler.
pub struct SchedulerHandle {
    state: watch::Receiver<SchedulerState>,
    runs: Arc<AtomicU64>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SchedulerState> {
        self.state.clone()
    }

    /// Completed job runs, successful or not.
    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::Relaxed)
    }

    /// Wait for the scheduler task to exit after cancellation.
    pub async fn join(self) -> Result<()> {
        self.task.await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        rstest::rstest,
        tokio::sync::Notify,
    };

    const HOUR: Duration = Duration::from_secs(3600);

    struct CountingJob {
        fail: bool,
    }

    #[async_trait]
    impl ScheduledJob for CountingJob {
        fn name(&self) -> &str {
            "counting"
        }

        async fn run(&self, _cancel: &CancellationToken) -> Result<()> {
            if self.fail {
                bail!("boom");
            }
            Ok(())
        }
    }

    /// Blocks until released, so the running state can be observed.
    struct GatedJob {
        release: Notify,
    }

    #[async_trait]
    impl ScheduledJob for GatedJob {
        fn name(&self) -> &str {
            "gated"
        }

        async fn run(&self, _cancel: &CancellationToken) -> Result<()> {
            self.release.notified().await;
            Ok(())
        }
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert!(Scheduler::new(Duration::ZERO).is_err());
        let scheduler = Scheduler::new(HOUR).unwrap();
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert_eq!(scheduler.every(), HOUR);
    }

    #[rstest]
    #[case(false)]
    #[case(true)]
    #[tokio::test(start_paused = true)]
    async fn test_runs_once_per_interval(#[case] fail: bool) {
        let cancel = CancellationToken::new();
        let handle = Scheduler::new(HOUR)
            .unwrap()
            .spawn(Arc::new(CountingJob { fail }), cancel.clone());
        assert_eq!(handle.state(), SchedulerState::Armed { every: HOUR });

        tokio::time::sleep(HOUR - Duration::from_secs(1)).await;
        assert_eq!(handle.runs(), 0, "no run before the first interval");

        tokio::time::sleep(HOUR * 3).await;
        assert_eq!(handle.runs(), 3);

        cancel.cancel();
        let mut state = handle.subscribe();
        state
            .wait_for(|s| *s == SchedulerState::Stopped)
            .await
            .unwrap();
        handle.join().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_state_machine_transitions() {
        let cancel = CancellationToken::new();
        let job = Arc::new(GatedJob {
            release: Notify::new(),
        });
        let handle = Scheduler::new(HOUR)
            .unwrap()
            .spawn(job.clone(), cancel.clone());
        let mut state = handle.subscribe();

        state
            .wait_for(|s| *s == SchedulerState::Running)
            .await
            .unwrap();
        assert_eq!(handle.runs(), 0);

        job.release.notify_one();
        state
            .wait_for(|s| matches!(s, SchedulerState::Armed { .. }))
            .await
            .unwrap();
        assert_eq!(handle.runs(), 1);

        cancel.cancel();
        handle.join().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_while_armed_stops_without_running() {
        let cancel = CancellationToken::new();
        let handle = Scheduler::new(HOUR)
            .unwrap()
            .spawn(Arc::new(CountingJob { fail: false }), cancel.clone());

        tokio::time::sleep(Duration::from_secs(60)).await;
        cancel.cancel();
        let mut state = handle.subscribe();
        state
            .wait_for(|s| *s == SchedulerState::Stopped)
            .await
            .unwrap();
        assert_eq!(handle.runs(), 0);
        handle.join().await.unwrap();
    }
}
