use std::sync::atomic::{AtomicUsize, Ordering};

use rustc_hash::FxHashMap;

use linksim_common::{
    DataSize, NetworkBehavior, NetworkEmulationManager, NodeId, PacketDeliveryInfo,
    PacketInFlightInfo, Timestamp,
};

static NODE_ID_NEXT: AtomicUsize = AtomicUsize::new(1);

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),
    #[error("cannot advance simulated time backwards: {target} < {now}")]
    TimeReversal { now: Timestamp, target: Timestamp },
}

pub type Result<T> = std::result::Result<T, Error>;

/// A delivery record tagged with the node that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeDelivery {
    pub node: NodeId,
    pub delivery: PacketDeliveryInfo,
}

#[derive(Debug)]
struct EmulatedNode {
    behavior: Box<dyn NetworkBehavior>,
}

/// Deterministic owner of emulated link nodes on a simulated clock.
///
/// Behaviors are installed as nodes and polled when their advertised next
/// delivery time comes up. Time only moves when [`advance_to`](Self::advance_to)
/// is called, so a scripted run always replays to the same delivery
/// timestamps.
#[derive(Debug)]
pub struct SimulatedNetwork {
    nodes: FxHashMap<NodeId, EmulatedNode>,
    now: Timestamp,
    next_packet_id: u64,
}

impl SimulatedNetwork {
    pub fn new() -> Self {
        Self::at(Timestamp::micros(0))
    }

    /// Starts the simulated clock at `now`.
    pub fn at(now: Timestamp) -> Self {
        Self { nodes: FxHashMap::default(), now, next_packet_id: 1 }
    }

    pub fn now(&self) -> Timestamp {
        self.now
    }

    /// Sends a `size`-sized packet onto `node` at the current simulated time
    /// and returns the behavior's admission result.
    pub fn send_packet(&mut self, node: NodeId, size: DataSize) -> Result<bool> {
        let now = self.now;
        let entry = self.nodes.get_mut(&node).ok_or(Error::NodeNotFound(node))?;
        let packet_id = self.next_packet_id;
        self.next_packet_id += 1;
        let accepted = entry.behavior.enqueue_packet(PacketInFlightInfo::new(size, now, packet_id));
        tracing::trace!(node, packet_id, %size, accepted, "packet sent onto link");
        Ok(accepted)
    }

    /// Advances the simulated clock to `target`, polling every node at each
    /// advertised delivery time on the way there. Records come back in
    /// delivery order; simultaneous deliveries are ordered by node id.
    pub fn advance_to(&mut self, target: Timestamp) -> Result<Vec<NodeDelivery>> {
        if target < self.now {
            return Err(Error::TimeReversal { now: self.now, target });
        }
        let _span = tracing::debug_span!("advance", from = %self.now, to = %target).entered();

        let mut deliveries = Vec::new();
        loop {
            // Earliest advertised wakeup that is not past the target.
            let due = self
                .nodes
                .iter()
                .filter_map(|(id, node)| node.behavior.next_delivery_time().map(|at| (at, *id)))
                .filter(|(at, _)| *at <= target)
                .min();
            let Some((at, id)) = due else { break };

            // A node may advertise a time already reached (e.g. an immediate
            // delivery staged at enqueue); the clock never moves backwards.
            self.now = self.now.max(at);
            let node = self.nodes.get_mut(&id).expect("node advertised a delivery");
            for delivery in node.behavior.dequeue_deliverable_packets(self.now) {
                deliveries.push(NodeDelivery { node: id, delivery });
            }
        }
        self.now = target;

        tracing::debug!(count = deliveries.len(), "deliveries collected");
        Ok(deliveries)
    }
}

impl Default for SimulatedNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkEmulationManager for SimulatedNetwork {
    fn create_emulated_node(&mut self, behavior: Box<dyn NetworkBehavior>) -> NodeId {
        let id = NODE_ID_NEXT.fetch_add(1, Ordering::Relaxed);
        self.nodes.insert(id, EmulatedNode { behavior });
        tracing::debug!(node = id, "created emulated node");
        id
    }
}
