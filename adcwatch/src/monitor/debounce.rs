use std::future;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::{sleep, Sleep};

/// One-shot, explicitly re-armable software timer.
///
/// Holds at most one pending deadline. Arming replaces any prior deadline;
/// firing never repeats on its own.
#[derive(Debug, Default)]
pub struct DebounceTimer {
    deadline: Option<Pin<Box<Sleep>>>,
}

impl DebounceTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the timer to fire `timeout` from now, replacing any pending
    /// deadline.
    pub fn arm(&mut self, timeout: Duration) {
        self.deadline = Some(Box::pin(sleep(timeout)));
    }

    /// Clears any pending deadline without side effects.
    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Completes exactly once per armed deadline, consuming it; pends forever
    /// while disarmed. Cancel-safe: a wait that is dropped before completing
    /// leaves the deadline in place.
    pub async fn expired(&mut self) {
        match self.deadline.as_mut() {
            Some(deadline) => {
                deadline.as_mut().await;
                self.deadline = None;
            }
            None => future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Waits on the timer against a deadline, returning whether it fired.
    async fn fires_within(timer: &mut DebounceTimer, ms: u64) -> bool {
        tokio::select! {
            _ = timer.expired() => true,
            _ = sleep(Duration::from_millis(ms)) => false,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_armed_timer_fires_once() {
        let mut timer = DebounceTimer::new();
        timer.arm(Duration::from_millis(100));
        assert!(timer.is_armed());

        assert!(fires_within(&mut timer, 200).await);
        assert!(!timer.is_armed(), "deadline is consumed by firing");
        assert!(!fires_within(&mut timer, 200).await, "no self-repeat");
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarmed_timer_pends() {
        let mut timer = DebounceTimer::new();
        assert!(!fires_within(&mut timer, 200).await);

        timer.arm(Duration::from_millis(100));
        timer.disarm();
        assert!(!timer.is_armed());
        assert!(!fires_within(&mut timer, 200).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_replaces_deadline() {
        let mut timer = DebounceTimer::new();
        timer.arm(Duration::from_millis(100));
        timer.arm(Duration::from_millis(500));

        assert!(!fires_within(&mut timer, 200).await, "old deadline is gone");
        assert!(fires_within(&mut timer, 500).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupted_wait_keeps_deadline() {
        let mut timer = DebounceTimer::new();
        timer.arm(Duration::from_millis(300));

        assert!(!fires_within(&mut timer, 100).await);
        assert!(timer.is_armed());
        assert!(fires_within(&mut timer, 300).await);
    }
}
