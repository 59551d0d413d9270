// Randomized request pacing

use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

/// A bounded uniform random delay, slept before a network call. Best-effort
/// cover against burst-shaped request patterns; not a guarantee.
#[derive(Debug, Clone, Copy)]
pub struct Pacing {
    min_ms: u64,
    max_ms: u64,
}

impl Pacing {
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: max_ms.max(min_ms),
        }
    }

    pub fn none() -> Self {
        Self::new(0, 0)
    }

    pub async fn wait(&self) {
        if self.max_ms == 0 {
            return;
        }
        let ms = rand::thread_rng().gen_range(self.min_ms..=self.max_ms);
        sleep(Duration::from_millis(ms)).await;
    }
}

/// The delays used at each stage of a channel run.
#[derive(Debug, Clone, Copy)]
pub struct PacingPolicy {
    /// Before the flat channel listing
    pub scan: Pacing,
    /// Before each per-item metadata probe
    pub probe: Pacing,
    /// Before each download
    pub fetch: Pacing,
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self {
            scan: Pacing::new(3000, 5000),
            probe: Pacing::new(500, 1000),
            fetch: Pacing::new(1000, 2000),
        }
    }
}

impl PacingPolicy {
    /// No delays at all; for tests.
    pub fn disabled() -> Self {
        Self {
            scan: Pacing::none(),
            probe: Pacing::none(),
            fetch: Pacing::none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_are_normalized() {
        let pacing = Pacing::new(500, 100);
        assert_eq!(pacing.min_ms, 100);
        assert_eq!(pacing.max_ms, 500);
    }

    #[tokio::test]
    async fn test_disabled_pacing_returns_immediately() {
        let start = std::time::Instant::now();
        PacingPolicy::disabled().scan.wait().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
