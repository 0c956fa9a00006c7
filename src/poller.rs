use log::{debug, info};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::api_client::ApiClient;
use crate::error::ApiError;
use crate::view::View;

pub const BACKOFF_INCREMENT: Duration = Duration::from_millis(2000);

/// Delays before successive fetches: 0, increment, 2 * increment, ...
/// Never resets and has no upper bound.
#[derive(Debug, Clone)]
pub struct Backoff {
    next: Duration,
    increment: Duration,
}

impl Backoff {
    pub fn new(increment: Duration) -> Self {
        Self {
            next: Duration::ZERO,
            increment,
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(BACKOFF_INCREMENT)
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let delay = self.next;
        self.next = self.next.saturating_add(self.increment);
        Some(delay)
    }
}

/// Something that can produce the recent activity fragment.
pub trait ActivitySource {
    fn fetch_fragment(&self) -> impl Future<Output = Result<String, ApiError>> + Send;
}

impl ActivitySource for ApiClient {
    async fn fetch_fragment(&self) -> Result<String, ApiError> {
        self.fetch_recent_activity().await
    }
}

pub struct RecentActivityPoller<S> {
    source: S,
    backoff: Backoff,
}

impl<S: ActivitySource> RecentActivityPoller<S> {
    pub fn new(source: S, increment: Duration) -> Self {
        Self {
            source,
            backoff: Backoff::new(increment),
        }
    }

    /// One fetch; the region is only touched when the fetch succeeds.
    pub async fn poll_once<V: View>(&self, view: &mut V) -> Result<(), ApiError> {
        let fragment = self.source.fetch_fragment().await?;
        view.replace_activity_fragment(&fragment);
        Ok(())
    }

    /// Polls until the process ends. Returns at once if the page has no
    /// activity region.
    pub async fn run<V: View>(mut self, view: &mut V) {
        if !view.has_activity_region() {
            return;
        }
        loop {
            self.cycle(view).await;
        }
    }

    /// Like [`run`](Self::run) but stops after `cycles` fetches. Returns the
    /// number of successful fetches.
    pub async fn run_for<V: View>(mut self, view: &mut V, cycles: u32) -> u32 {
        if !view.has_activity_region() {
            return 0;
        }
        let mut succeeded = 0;
        for _ in 0..cycles {
            if self.cycle(view).await {
                succeeded += 1;
            }
        }
        info!("Recent activity poller finished {} cycles", cycles);
        succeeded
    }

    async fn cycle<V: View>(&mut self, view: &mut V) -> bool {
        let delay = self.backoff.next().unwrap_or(Duration::ZERO);
        sleep(delay).await;
        match self.poll_once(view).await {
            Ok(()) => true,
            Err(e) => {
                // Failures are silent on the page; the next wait is longer.
                debug!("Recent activity fetch failed: {}", e);
                false
            }
        }
    }
}
