//! Global request spacing
//!
//! One limiter is created per batch and shared (behind an `Arc`) by the URL
//! resolver, the HTTP backend and the browser backend, so every outbound
//! request of the batch waits on the same quota.

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, direct::NotKeyed},
};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub struct Politeness {
    limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    interval: Duration,
}

impl Politeness {
    /// At most one request per `interval`; a zero interval disables spacing
    pub fn new(interval: Duration) -> Self {
        let limiter = Quota::with_period(interval)
            .map(|quota| RateLimiter::direct(quota.allow_burst(NonZeroU32::MIN)));
        Self { limiter, interval }
    }

    pub fn shared(interval: Duration) -> Arc<Self> {
        Arc::new(Self::new(interval))
    }

    pub fn disabled() -> Arc<Self> {
        Self::shared(Duration::ZERO)
    }

    pub fn is_enabled(&self) -> bool {
        self.limiter.is_some()
    }

    /// Wait for the next request slot
    pub async fn wait(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
            debug!("⚖️ request slot granted ({:?} spacing)", self.interval);
        }
    }
}

impl std::fmt::Debug for Politeness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Politeness")
            .field("interval", &self.interval)
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
