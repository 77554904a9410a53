#![doc(issue_tracker_base_url = "https://github.com/linksim-rs/linksim/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub use linksim_common::*;
pub use linksim_policer::*;
pub use linksim_queue::*;
pub use linksim_sim as sim;
