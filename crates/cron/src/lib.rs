//! Fixed-interval job scheduling.
//!
//! A [`Scheduler`] runs one [`ScheduledJob`] every interval on its own task
//! until its cancellation token fires. Its lifecycle is observable through a
//! `watch` channel.

pub mod scheduler;

pub use scheduler::{ScheduledJob, Scheduler, SchedulerHandle, SchedulerState};
