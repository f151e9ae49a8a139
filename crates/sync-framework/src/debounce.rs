//! # Debounce Gate
//!
//! Coalesces bursts of filter edits (typically free-text search) into one fetch after a
//! quiet period. The gate is a single deadline, not a task: the controller's event loop
//! waits on [`DebounceGate::elapsed`] next to its mailbox, and re-arming simply moves the
//! deadline. Dropping the gate is all teardown needs.

use std::time::Duration;
use tokio::time::Instant;

/// What kind of trigger a state change produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Fetch after the quiet period, restarting it if already running.
    Debounced,
    /// Fetch now. A running quiet period is left as is.
    Immediate,
}

/// Single-deadline debounce timer.
#[derive(Debug)]
pub struct DebounceGate {
    delay: Duration,
    deadline: Option<Instant>,
}

impl DebounceGate {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Starts or restarts the quiet period from now.
    pub fn arm(&mut self) {
        self.deadline = Some(Instant::now() + self.delay);
    }

    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Resolves when the armed deadline passes; never resolves while disarmed.
    ///
    /// The gate stays armed afterwards. Callers disarm once they act on it.
    pub async fn elapsed(&self) {
        match self.deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_rearm_moves_deadline() {
        let mut gate = DebounceGate::new(Duration::from_millis(300));
        let start = Instant::now();
        gate.arm();
        tokio::time::sleep(Duration::from_millis(200)).await;
        gate.arm();

        gate.elapsed().await;
        assert_eq!(start.elapsed(), Duration::from_millis(500));
        assert!(gate.is_armed());
        gate.disarm();
        assert!(gate.deadline().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarmed_gate_never_fires() {
        let gate = DebounceGate::new(Duration::from_millis(10));
        let fired = tokio::time::timeout(Duration::from_secs(60), gate.elapsed()).await;
        assert!(fired.is_err());
    }
}
