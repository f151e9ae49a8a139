//! # Concurrency Guard
//!
//! At most one fetch per controller. The flag is engaged before the network call and
//! released on every terminal outcome: success, failure or cancellation.

/// Single in-flight flag.
#[derive(Debug, Default)]
pub struct ConcurrencyGuard {
    engaged: bool,
}

impl ConcurrencyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engages the guard. Returns `false` (and changes nothing) if it already was.
    pub fn try_engage(&mut self) -> bool {
        if self.engaged {
            return false;
        }
        self.engaged = true;
        true
    }

    pub fn release(&mut self) {
        self.engaged = false;
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_engage_is_refused() {
        let mut guard = ConcurrencyGuard::new();
        assert!(guard.try_engage());
        assert!(!guard.try_engage());
        guard.release();
        assert!(!guard.is_engaged());
        assert!(guard.try_engage());
    }

    #[test]
    fn test_release_when_idle_is_harmless() {
        let mut guard = ConcurrencyGuard::new();
        guard.release();
        assert!(!guard.is_engaged());
        assert!(guard.try_engage());
        assert!(guard.is_engaged());
    }
}
