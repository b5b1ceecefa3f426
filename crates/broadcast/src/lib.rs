//! Promotion list distribution.
//!
//! Approved entities are cut into bounded batches ([`list`]), each batch is
//! rendered into one message, and every message is sent to every approved
//! chat at a fixed pace ([`engine`]). [`Broadcaster`] ties one run together
//! against the live directory.

pub mod broadcaster;
pub mod engine;
pub mod list;

#[cfg(test)]
pub(crate) mod testing;

pub use {
    broadcaster::Broadcaster,
    engine::{BroadcastEngine, DistributeError, DistributionOutcome},
    list::{Batch, LINK_UNAVAILABLE, RenderedBatch, build_batches, render_batch},
};
