//! Trailing-edge debouncing of a stream of input values.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Collapses bursts of values into the latest one after a quiet period.
///
/// Each new value restarts the quiet window, so a value is only emitted once
/// no newer value arrived for `quiet`. Intermediate values are dropped.
pub struct Debounced<T> {
    input: mpsc::UnboundedReceiver<T>,
    quiet: Duration,
}

impl<T> Debounced<T> {
    pub fn new(input: mpsc::UnboundedReceiver<T>, quiet: Duration) -> Self {
        Self { input, quiet }
    }

    /// Waits for the next settled value.
    ///
    /// Returns `None` once the input is closed and nothing is pending. If the
    /// input closes during a quiet window, the pending value is emitted
    /// right away.
    pub async fn next(&mut self) -> Option<T> {
        let mut latest = self.input.recv().await?;

        loop {
            match timeout(self.quiet, self.input.recv()).await {
                Ok(Some(value)) => latest = value,
                Ok(None) | Err(_) => return Some(latest),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{Instant, sleep};

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_latest_value() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut debounced = Debounced::new(rx, Duration::from_millis(200));
        let start = Instant::now();

        tokio::spawn(async move {
            tx.send("r").unwrap();
            sleep(Duration::from_millis(50)).await;
            tx.send("ri").unwrap();
            sleep(Duration::from_millis(50)).await;
            tx.send("ric").unwrap();
            sleep(Duration::from_millis(160)).await;
            tx.send("rick").unwrap();
            sleep(Duration::from_millis(1000)).await;
        });

        assert_eq!(debounced.next().await, Some("rick"));
        assert_eq!(start.elapsed(), Duration::from_millis(460));

        // Exactly one event for the whole burst
        assert_eq!(debounced.next().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separated_values_are_each_emitted() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut debounced = Debounced::new(rx, Duration::from_millis(200));

        tokio::spawn(async move {
            tx.send(1).unwrap();
            sleep(Duration::from_millis(300)).await;
            tx.send(2).unwrap();
            sleep(Duration::from_millis(300)).await;
        });

        assert_eq!(debounced.next().await, Some(1));
        assert_eq!(debounced.next().await, Some(2));
        assert_eq!(debounced.next().await, None);
    }
}
