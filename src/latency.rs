//! Simulated processing latency.
//!
//! Delays are scheduled timer completions (`tokio::time::sleep`), so a
//! waiting call never blocks the runtime thread it was polled on.

use std::time::Duration;

/// Resolve to `value` after `millis` milliseconds.
pub async fn simulate_delay<T>(value: T, millis: u64) -> T {
    if millis > 0 {
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_delay_elapses_virtual_time() {
        let start = Instant::now();
        let value = simulate_delay(5, 800).await;
        assert_eq!(value, 5);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(800) && elapsed < Duration::from_millis(850));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_delays_overlap() {
        let start = Instant::now();
        let (a, b) = tokio::join!(simulate_delay("a", 700), simulate_delay("b", 1200));
        assert_eq!((a, b), ("a", "b"));
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(1200) && elapsed < Duration::from_millis(1250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_delay() {
        let start = Instant::now();
        simulate_delay((), 0).await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
