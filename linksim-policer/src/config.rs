use std::sync::Arc;

use parking_lot::Mutex;

use linksim_common::{DataRate, DataSize};

/// Configuration for a [`TokenBucketPolicer`](crate::TokenBucketPolicer).
///
/// The default has no burst and no rate: an unconfigured policer drops every
/// packet instead of passing traffic through unthrottled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenBucketConfig {
    /// Maximum token capacity of the bucket.
    pub burst: DataSize,
    /// Constant refill rate. A zero rate never refills: once the bucket is
    /// drained, nothing more is delivered until the config changes.
    pub rate: DataRate,
}

impl TokenBucketConfig {
    pub const fn new(burst: DataSize, rate: DataRate) -> Self {
        Self { burst, rate }
    }

    /// Sets the maximum token capacity.
    pub fn with_burst(mut self, burst: DataSize) -> Self {
        self.burst = burst;
        self
    }

    /// Sets the refill rate.
    pub fn with_rate(mut self, rate: DataRate) -> Self {
        self.rate = rate;
        self
    }
}

/// Cloneable handle to a live policer's configuration.
///
/// Updates take the same lock the policer takes when reading the config, so a
/// refill observes either the old or the new config in full, never a mix.
/// May be used from any thread, including while the owning sequence is
/// enqueuing and polling.
#[derive(Debug, Clone)]
pub struct ConfigHandle {
    config: Arc<Mutex<TokenBucketConfig>>,
}

impl ConfigHandle {
    pub(crate) fn new(config: Arc<Mutex<TokenBucketConfig>>) -> Self {
        Self { config }
    }

    /// Applies `configure` to the live configuration.
    pub fn update(&self, configure: impl FnOnce(&mut TokenBucketConfig)) {
        let mut config = self.config.lock();
        configure(&mut config);
        tracing::debug!(burst = %config.burst, rate = %config.rate, "link policer reconfigured");
    }

    /// Returns a copy of the current configuration.
    pub fn current(&self) -> TokenBucketConfig {
        *self.config.lock()
    }
}
