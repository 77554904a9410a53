//! Token-bucket traffic policing for emulated network links.
//!
//! The [`TokenBucketPolicer`] forwards enqueued packets at a configured rate
//! limit, letting bursts through up to the bucket size. Attach a queue and it
//! shapes; leave the queue off and it polices, dropping whatever exceeds the
//! budget. Typically installed on an emulated link to exercise congestion
//! control and bandwidth estimation under constrained conditions.

#![doc(issue_tracker_base_url = "https://github.com/linksim-rs/linksim/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod builder;
mod config;
mod policer;

pub use builder::TokenBucketNodeBuilder;
pub use config::{ConfigHandle, TokenBucketConfig};
pub use policer::TokenBucketPolicer;
