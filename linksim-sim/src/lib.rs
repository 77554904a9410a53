#![doc(issue_tracker_base_url = "https://github.com/linksim-rs/linksim/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod network;

pub use network::{Error, NodeDelivery, Result, SimulatedNetwork};
