#![doc(issue_tracker_base_url = "https://github.com/linksim-rs/linksim/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod behavior;
mod packet;
mod rate;
mod sequence;
mod size;
mod time;

pub use behavior::{NetworkBehavior, NetworkEmulationManager, NodeId};
pub use packet::{PacketDeliveryInfo, PacketInFlightInfo};
pub use rate::DataRate;
pub use sequence::SequenceChecker;
pub use size::DataSize;
pub use time::{TimeDelta, Timestamp};

#[allow(non_upper_case_globals)]
pub mod constants {
    pub const KiB: u32 = 1024;
    pub const MiB: u32 = 1024 * KiB;

    /// Conventional Ethernet MTU, a typical emulated packet size in bytes.
    pub const MTU_ETHERNET: u32 = 1500;
}
