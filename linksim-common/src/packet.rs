use crate::{DataSize, Timestamp};

/// A packet in flight across an emulated link. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketInFlightInfo {
    /// Size on the wire, counted against the link budget.
    pub size: DataSize,
    /// The instant the packet was sent onto the link.
    pub send_time: Timestamp,
    /// Opaque id assigned by the sender, unique per link.
    pub packet_id: u64,
}

impl PacketInFlightInfo {
    pub const fn new(size: DataSize, send_time: Timestamp, packet_id: u64) -> Self {
        Self { size, send_time, packet_id }
    }
}

/// The reported outcome for one packet: delivered at an instant, or dropped.
///
/// Exactly one record is produced per packet that entered a link. A dropped
/// packet carries no receive time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketDeliveryInfo {
    pub packet_id: u64,
    /// `None` means the packet never arrived.
    pub receive_time: Option<Timestamp>,
}

impl PacketDeliveryInfo {
    pub const fn delivered(packet: PacketInFlightInfo, receive_time: Timestamp) -> Self {
        Self { packet_id: packet.packet_id, receive_time: Some(receive_time) }
    }

    pub const fn dropped(packet: PacketInFlightInfo) -> Self {
        Self { packet_id: packet.packet_id, receive_time: None }
    }

    pub const fn is_received(&self) -> bool {
        self.receive_time.is_some()
    }
}
