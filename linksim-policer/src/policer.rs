use std::sync::Arc;

use parking_lot::Mutex;

use linksim_common::{
    DataSize, NetworkBehavior, PacketDeliveryInfo, PacketInFlightInfo, SequenceChecker, TimeDelta,
    Timestamp,
};
use linksim_queue::NetworkQueue;

use crate::TokenBucketConfig;

/// Forwards enqueued packets at the configured rate limit.
///
/// Implemented with the token bucket algorithm
/// (<https://en.wikipedia.org/wiki/Token_bucket>), allowing bursts of packets
/// through. The bucket has a maximum size and a constant refill rate; a
/// packet is delivered once there are enough tokens to cover it. Without a
/// queue, packets over the rate limit are dropped instead of queued, which is
/// the typical setup for policing inbound traffic.
///
/// Enqueue and poll must come from one logical sequence with non-decreasing
/// timestamps; only [`update_config`](Self::update_config) (and
/// [`ConfigHandle`](crate::ConfigHandle)) may be driven from elsewhere.
#[derive(Debug)]
pub struct TokenBucketPolicer {
    sequence_checker: SequenceChecker,
    config: Arc<Mutex<TokenBucketConfig>>,
    queue: Option<Box<dyn NetworkQueue>>,

    tokens: DataSize,
    deliverable: Vec<PacketDeliveryInfo>,
    last_refill: Option<Timestamp>,
    next_delivery: Option<Timestamp>,
}

impl TokenBucketPolicer {
    /// Policer without a queue: packets over the rate limit are dropped at
    /// enqueue time.
    pub fn new(config: TokenBucketConfig) -> Self {
        Self::build(config, None)
    }

    /// Policer backed by `queue`: packets over the rate limit wait in the
    /// queue, subject to the queue's own admission policy.
    pub fn with_queue(config: TokenBucketConfig, queue: Box<dyn NetworkQueue>) -> Self {
        Self::build(config, Some(queue))
    }

    fn build(config: TokenBucketConfig, queue: Option<Box<dyn NetworkQueue>>) -> Self {
        Self {
            sequence_checker: SequenceChecker::new(),
            tokens: config.burst,
            config: Arc::new(Mutex::new(config)),
            queue,
            deliverable: Vec::new(),
            last_refill: None,
            next_delivery: None,
        }
    }

    /// Applies `configure` to the current configuration under the config
    /// lock. May be called from any thread.
    pub fn update_config(&self, configure: impl FnOnce(&mut TokenBucketConfig)) {
        let mut config = self.config.lock();
        configure(&mut config);
        tracing::debug!(burst = %config.burst, rate = %config.rate, "link policer reconfigured");
    }

    pub(crate) fn shared_config(&self) -> Arc<Mutex<TokenBucketConfig>> {
        Arc::clone(&self.config)
    }

    /// Credits the bucket with the tokens accrued since the previous refill,
    /// clamped to the configured burst.
    ///
    /// The first refill only records the timestamp: tokens must not accrue
    /// for the time before the policer saw its first packet.
    fn refill_tokens(&mut self, now: Timestamp) {
        let last = *self.last_refill.get_or_insert(now);
        debug_assert!(now >= last, "link time went backwards: {now} < {last}");
        let elapsed = now - last;
        if elapsed > TimeDelta::ZERO {
            let config = self.config.lock();
            self.tokens = self.tokens.saturating_add(config.rate * elapsed).min(config.burst);
        }
        self.last_refill = Some(now);
    }

    /// The instant at which `packet` could be dequeued, given the current
    /// token level: `now` if it is already covered, the exact future instant
    /// at which accrued tokens first cover it, or `None` if that never
    /// happens (no packet, or a zero refill rate).
    fn next_dequeue_time(
        &self,
        now: Timestamp,
        packet: Option<PacketInFlightInfo>,
    ) -> Option<Timestamp> {
        let packet = packet?;
        if packet.size <= self.tokens {
            return Some(now);
        }
        let config = self.config.lock();
        if config.rate.is_zero() {
            return None;
        }
        Some(now + (packet.size - self.tokens) / config.rate)
    }

    /// Debits the bucket for `packet` and stages its delivery record.
    /// Dropped packets never come through here: drops consume no tokens.
    fn stage_delivery(&mut self, now: Timestamp, packet: PacketInFlightInfo) {
        self.tokens -= packet.size;
        self.deliverable.push(PacketDeliveryInfo::delivered(packet, now));
        self.next_delivery = Some(now);
    }
}

impl NetworkBehavior for TokenBucketPolicer {
    fn enqueue_packet(&mut self, packet: PacketInFlightInfo) -> bool {
        self.sequence_checker.check();
        let now = packet.send_time;
        self.refill_tokens(now);
        match self.queue.take() {
            Some(mut queue) => {
                let accepted = queue.enqueue_packet(packet);
                if self.next_delivery.is_none() {
                    self.next_delivery = self.next_dequeue_time(now, queue.peek_next_packet());
                }
                self.queue = Some(queue);
                accepted
            }
            None => {
                // The only admission point: deliver right away or drop.
                if self.next_dequeue_time(now, Some(packet)) == Some(now) {
                    self.stage_delivery(now, packet);
                    true
                } else {
                    tracing::trace!(
                        packet_id = packet.packet_id,
                        size = %packet.size,
                        "out of tokens and no queue, dropping packet"
                    );
                    false
                }
            }
        }
    }

    fn dequeue_deliverable_packets(&mut self, now: Timestamp) -> Vec<PacketDeliveryInfo> {
        self.sequence_checker.check();
        self.refill_tokens(now);
        self.next_delivery = None;
        if let Some(mut queue) = self.queue.take() {
            while let Some(due) = self.next_dequeue_time(now, queue.peek_next_packet()) {
                if due > now {
                    break;
                }
                let packet =
                    queue.dequeue_packet(now).expect("queue must yield the packet it just peeked");
                self.stage_delivery(now, packet);
            }
            for packet in queue.dequeue_dropped_packets() {
                tracing::trace!(packet_id = packet.packet_id, "queue dropped packet");
                self.deliverable.push(PacketDeliveryInfo::dropped(packet));
            }
            self.next_delivery = self.next_dequeue_time(now, queue.peek_next_packet());
            self.queue = Some(queue);
        }
        std::mem::take(&mut self.deliverable)
    }

    fn next_delivery_time(&self) -> Option<Timestamp> {
        self.next_delivery
    }
}
