use std::fmt;

use linksim_common::{DataRate, DataSize, NetworkEmulationManager, NodeId};
use linksim_queue::NetworkQueueFactory;

use crate::{ConfigHandle, TokenBucketConfig, TokenBucketPolicer};

/// Builder for an emulated link node policed by a [`TokenBucketPolicer`].
///
/// Accumulates burst, rate and an optional queue factory, then materializes
/// the policer and installs it on the owning emulation manager. With no queue
/// factory set, the policer drops packets that don't fit in the burst. With
/// nothing configured at all, the node drops every packet (see
/// [`TokenBucketConfig`]).
pub struct TokenBucketNodeBuilder<'a> {
    net: &'a mut dyn NetworkEmulationManager,
    config: TokenBucketConfig,
    queue_factory: Option<&'a dyn NetworkQueueFactory>,
}

impl<'a> TokenBucketNodeBuilder<'a> {
    pub fn new(net: &'a mut dyn NetworkEmulationManager) -> Self {
        Self { net, config: TokenBucketConfig::default(), queue_factory: None }
    }

    /// Sets the maximum size of the token bucket.
    pub fn burst(mut self, burst: DataSize) -> Self {
        self.config.burst = burst;
        self
    }

    /// Sets the refill rate.
    pub fn rate(mut self, rate: DataRate) -> Self {
        self.config.rate = rate;
        self
    }

    /// Queue packets over the rate limit in a queue built by `factory`,
    /// instead of dropping them.
    pub fn queue_factory(mut self, factory: &'a dyn NetworkQueueFactory) -> Self {
        self.queue_factory = Some(factory);
        self
    }

    /// Installs the policer on the emulation manager as a new link node.
    pub fn build(self) -> NodeId {
        let policer = self.make_policer();
        self.net.create_emulated_node(Box::new(policer))
    }

    /// Like [`build`](Self::build), but also returns a handle that can adjust
    /// rate and burst later without recreating the node.
    pub fn build_with_config_handle(self) -> (NodeId, ConfigHandle) {
        let policer = self.make_policer();
        let handle = ConfigHandle::new(policer.shared_config());
        (self.net.create_emulated_node(Box::new(policer)), handle)
    }

    fn make_policer(&self) -> TokenBucketPolicer {
        match self.queue_factory {
            Some(factory) => TokenBucketPolicer::with_queue(self.config, factory.create_queue()),
            None => TokenBucketPolicer::new(self.config),
        }
    }
}

impl fmt::Debug for TokenBucketNodeBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenBucketNodeBuilder")
            .field("config", &self.config)
            .field("has_queue_factory", &self.queue_factory.is_some())
            .finish_non_exhaustive()
    }
}
