//! Mock fetch sources for tests
//!
//! Scripted sources with controllable latency and call counters, so tier
//! admission and cache behavior can be asserted without network access.

use super::FetchSource;
use crate::types::Signal;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Returns a fixed list of signals after an optional delay
pub struct MockSource {
    name: String,
    signals: Vec<Signal>,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl MockSource {
    pub fn new(name: impl Into<String>, signals: Vec<Signal>) -> Self {
        Self {
            name: name.into(),
            signals,
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Handle to the call counter, usable after the source is moved
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FetchSource for MockSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, _query: &str) -> Vec<Signal> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.signals.clone()
    }
}

/// Always panics; used to assert fetcher containment
pub struct PanickingSource;

#[async_trait]
impl FetchSource for PanickingSource {
    fn name(&self) -> &str {
        "panicking"
    }

    async fn fetch(&self, _query: &str) -> Vec<Signal> {
        panic!("fetcher blew up");
    }
}

/// Shorthand for a one-item source
pub fn single_signal(source: &str, title: &str) -> Vec<Signal> {
    vec![Signal::new(
        source,
        title,
        format!("{} details", title),
        "https://example.com",
        "",
    )]
}
