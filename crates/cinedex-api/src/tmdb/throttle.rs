//! Request pacing for the TMDB API.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Default minimum interval between requests (~40 req/s).
const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(25);

/// Spaces outgoing requests at least `min_interval` apart.
///
/// Each caller reserves the next free slot under a short lock and then
/// sleeps outside of it, so concurrent operations queue up in slot order
/// instead of serializing on the lock.
#[derive(Debug)]
pub struct RequestThrottle {
    /// Minimum interval between requests.
    min_interval: Duration,
    /// Start time of the most recently reserved slot.
    last_slot: Mutex<Option<Instant>>,
}

impl RequestThrottle {
    /// Creates a throttle with the given minimum interval.
    pub(crate) const fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_slot: Mutex::new(None),
        }
    }

    /// Creates a throttle with the default interval (25ms).
    pub(crate) const fn default_interval() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }

    /// Reserves the next slot and returns the instant it starts.
    fn reserve(&self) -> Instant {
        let now = Instant::now();
        let mut last = self
            .last_slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let slot = last
            .and_then(|prev| prev.checked_add(self.min_interval))
            .map_or(now, |next| next.max(now));
        *last = Some(slot);
        slot
    }

    /// Waits until the caller's reserved slot arrives.
    pub async fn acquire(&self) {
        let slot = self.reserve();
        let wait = slot.saturating_duration_since(Instant::now());
        if !wait.is_zero() {
            tracing::trace!(wait_ms = wait.as_millis(), "throttling TMDB request");
            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[tokio::test]
    async fn test_first_request_no_wait() {
        // Arrange
        let throttle = RequestThrottle::new(Duration::from_secs(1));

        // Act
        let start = Instant::now();
        throttle.acquire().await;
        let elapsed = start.elapsed();

        // Assert
        assert!(elapsed < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_min_interval_between_requests() {
        // Arrange
        let throttle = RequestThrottle::new(Duration::from_millis(50));

        // Act
        let start = Instant::now();
        throttle.acquire().await;
        throttle.acquire().await;
        let elapsed = start.elapsed();

        // Assert
        assert!(elapsed >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_concurrent_callers_get_distinct_slots() {
        // Arrange
        let throttle = RequestThrottle::new(Duration::from_millis(40));

        // Act
        let start = Instant::now();
        tokio::join!(throttle.acquire(), throttle.acquire(), throttle.acquire());
        let elapsed = start.elapsed();

        // Assert: third caller waits for two intervals
        assert!(elapsed >= Duration::from_millis(80));
    }

    #[test]
    fn test_reserve_records_slot() {
        // Arrange
        let throttle = RequestThrottle::new(Duration::ZERO);

        // Act
        let slot = throttle.reserve();

        // Assert
        assert_eq!(*throttle.last_slot.lock().unwrap(), Some(slot));
    }

    #[test]
    fn test_default_interval() {
        // Arrange & Act
        let throttle = RequestThrottle::default_interval();

        // Assert
        assert_eq!(throttle.min_interval, Duration::from_millis(25));
    }
}
