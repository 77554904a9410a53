use std::collections::VecDeque;

use linksim_common::{PacketInFlightInfo, Timestamp};

use crate::{NetworkQueue, NetworkQueueFactory};

/// FIFO packet queue, unbounded by default, with an optional packet-count
/// capacity.
///
/// When a capacity is set and the queue is full, new packets are refused at
/// the door. Packets already queued can be evicted from the head with
/// [`drop_oldest_packet`](Self::drop_oldest_packet); every packet the queue
/// gives up on is surfaced exactly once through `dequeue_dropped_packets`.
#[derive(Debug, Default)]
pub struct LeakyBucketQueue {
    packets: VecDeque<PacketInFlightInfo>,
    dropped: Vec<PacketInFlightInfo>,
    max_packet_capacity: Option<usize>,
}

impl LeakyBucketQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds the queue to `capacity` packets. Applies to future admissions
    /// only; packets already queued stay queued.
    pub fn set_max_packet_capacity(&mut self, capacity: usize) {
        self.max_packet_capacity = Some(capacity);
    }

    /// Evicts the packet at the head of the queue into the dropped list.
    pub fn drop_oldest_packet(&mut self) {
        if let Some(packet) = self.packets.pop_front() {
            tracing::trace!(packet_id = packet.packet_id, "evicting oldest queued packet");
            self.dropped.push(packet);
        }
    }
}

impl NetworkQueue for LeakyBucketQueue {
    fn enqueue_packet(&mut self, packet: PacketInFlightInfo) -> bool {
        if self.max_packet_capacity.is_some_and(|capacity| self.packets.len() >= capacity) {
            tracing::trace!(packet_id = packet.packet_id, "queue full, refusing packet");
            return false;
        }
        self.packets.push_back(packet);
        true
    }

    fn peek_next_packet(&self) -> Option<PacketInFlightInfo> {
        self.packets.front().copied()
    }

    fn dequeue_packet(&mut self, _now: Timestamp) -> Option<PacketInFlightInfo> {
        self.packets.pop_front()
    }

    fn dequeue_dropped_packets(&mut self) -> Vec<PacketInFlightInfo> {
        std::mem::take(&mut self.dropped)
    }

    fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }
}

/// Factory producing [`LeakyBucketQueue`]s with a shared capacity setting.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeakyBucketQueueFactory {
    max_packet_capacity: Option<usize>,
}

impl LeakyBucketQueueFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every queue built by this factory is bounded to `capacity` packets.
    pub fn with_max_packet_capacity(mut self, capacity: usize) -> Self {
        self.max_packet_capacity = Some(capacity);
        self
    }
}

impl NetworkQueueFactory for LeakyBucketQueueFactory {
    fn create_queue(&self) -> Box<dyn NetworkQueue> {
        let mut queue = LeakyBucketQueue::new();
        if let Some(capacity) = self.max_packet_capacity {
            queue.set_max_packet_capacity(capacity);
        }
        Box::new(queue)
    }
}
