//! Debounce & Busy Gate
//!
//! Decides whether a user stimulus may start a new cycle.

use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Admission gate for user stimuli.
///
/// A stimulus is admitted only if enough time has passed since the previous
/// admission, no cycle is in flight, and no persona is still speaking or queued.
/// Rejections leave the gate untouched; they are not retried.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    min_input_gap: Duration,
    last_admitted_at: Option<Instant>,
}

impl AdmissionGate {
    pub fn new(min_input_gap: Duration) -> Self {
        Self {
            min_input_gap,
            last_admitted_at: None,
        }
    }

    pub fn last_admitted_at(&self) -> Option<Instant> {
        self.last_admitted_at
    }

    /// Returns `true` and records `now` if the stimulus is admitted.
    pub fn try_admit(&mut self, now: Instant, session_busy: bool, registry_busy: bool) -> bool {
        if let Some(last) = self.last_admitted_at {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.min_input_gap {
                debug!(?elapsed, "Stimulus rejected: within debounce window");
                return false;
            }
        }
        if session_busy {
            debug!("Stimulus rejected: a cycle is in flight");
            return false;
        }
        // Checked even when the session is idle; a queue may still be draining.
        if registry_busy {
            debug!("Stimulus rejected: a persona is still speaking");
            return false;
        }
        self.last_admitted_at = Some(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debounce_rejects_without_mutation() {
        let mut gate = AdmissionGate::new(Duration::from_millis(800));
        let t0 = Instant::now();

        assert!(gate.try_admit(t0, false, false));
        assert!(!gate.try_admit(t0 + Duration::from_millis(500), false, false));
        assert_eq!(gate.last_admitted_at(), Some(t0));

        assert!(gate.try_admit(t0 + Duration::from_millis(800), false, false));
        assert_eq!(
            gate.last_admitted_at(),
            Some(t0 + Duration::from_millis(800))
        );
    }

    #[test]
    fn test_busy_session_rejects() {
        let mut gate = AdmissionGate::new(Duration::from_millis(800));
        let t0 = Instant::now();

        assert!(!gate.try_admit(t0, true, false));
        assert_eq!(gate.last_admitted_at(), None);
    }

    #[test]
    fn test_busy_registry_rejects_even_when_session_idle() {
        let mut gate = AdmissionGate::new(Duration::ZERO);
        let t0 = Instant::now();

        assert!(!gate.try_admit(t0, false, true));
        assert_eq!(gate.last_admitted_at(), None);
        assert!(gate.try_admit(t0, false, false));
    }
}
