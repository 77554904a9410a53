use std::fmt;

use crate::{PacketDeliveryInfo, PacketInFlightInfo, Timestamp};

/// One direction of an emulated link.
///
/// An implementation decides, for every packet sent onto the link, whether
/// and when it comes out the other end. All three methods must be called from
/// a single logical sequence with monotonically non-decreasing timestamps;
/// violations are programming errors, not modeled network events.
pub trait NetworkBehavior: Send + fmt::Debug {
    /// Called once per packet sent onto the link, in non-decreasing
    /// `send_time` order.
    ///
    /// Returns whether the packet was accepted for eventual (or immediate)
    /// delivery. `true` does not mean delivered: with a queue attached the
    /// packet may still wait, and the actual outcome is only observable via
    /// [`dequeue_deliverable_packets`](Self::dequeue_deliverable_packets).
    fn enqueue_packet(&mut self, packet: PacketInFlightInfo) -> bool;

    /// Drains every delivery and drop decided since the previous call.
    /// `now` must be at least any previously supplied timestamp. Destructive:
    /// each record is returned exactly once.
    fn dequeue_deliverable_packets(&mut self, now: Timestamp) -> Vec<PacketDeliveryInfo>;

    /// Advisory hint for the scheduler: the earliest instant at which a
    /// packet could become deliverable, or `None` if nothing is scheduled.
    fn next_delivery_time(&self) -> Option<Timestamp>;
}

pub type NodeId = usize;

/// Owner of emulated link nodes.
///
/// The manager schedules installed behaviors on their serialized execution
/// context and advances their clock; behaviors only ever see timestamps the
/// manager hands them.
pub trait NetworkEmulationManager {
    /// Installs `behavior` as a new emulated link node and returns its id.
    fn create_emulated_node(&mut self, behavior: Box<dyn NetworkBehavior>) -> NodeId;
}
