//! Pluggable queueing disciplines for emulated link behaviors.
//!
//! A link behavior that shapes rather than drops needs somewhere to park
//! packets while they wait for capacity. The [`NetworkQueue`] trait is that
//! seam: the behavior owns the queue exclusively, peeks its head to compute
//! delivery times, dequeues once capacity is available, and periodically
//! drains the packets the queue gave up on so they can be reported as
//! dropped.

#![doc(issue_tracker_base_url = "https://github.com/linksim-rs/linksim/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

use std::fmt;

use linksim_common::{PacketInFlightInfo, Timestamp};

mod leaky_bucket;

pub use leaky_bucket::{LeakyBucketQueue, LeakyBucketQueueFactory};

/// A queue of packets waiting for link capacity.
///
/// The queue owns its admission and drop policy; the owning behavior never
/// second-guesses it. Packets the queue drops on its own must be surfaced
/// exactly once through [`dequeue_dropped_packets`](Self::dequeue_dropped_packets).
pub trait NetworkQueue: Send + fmt::Debug {
    /// Offers `packet` to the queue. Returns `false` if the queue refuses it,
    /// e.g. because it is at capacity.
    fn enqueue_packet(&mut self, packet: PacketInFlightInfo) -> bool;

    /// The packet that would be dequeued next, without removing it.
    fn peek_next_packet(&self) -> Option<PacketInFlightInfo>;

    /// Removes and returns the next packet, due for delivery at `now`.
    fn dequeue_packet(&mut self, now: Timestamp) -> Option<PacketInFlightInfo>;

    /// Drains the packets the queue dropped on its own (e.g. overflow
    /// eviction) since the last call.
    fn dequeue_dropped_packets(&mut self) -> Vec<PacketInFlightInfo>;

    /// `true` if no packet is waiting. Dropped packets pending collection do
    /// not count as waiting.
    fn is_empty(&self) -> bool;
}

/// Produces queues for behaviors assembled by a builder, one per link node.
pub trait NetworkQueueFactory {
    fn create_queue(&self) -> Box<dyn NetworkQueue>;
}
