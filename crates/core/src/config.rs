//! Scheduling knobs for the interaction core.
//!
//! Every field has a default matching the pacing the character was tuned
//! for; the service layer overrides them from the environment.

use std::time::Duration;
use tokio::time::Instant;

/// Per-persona playback pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingConfig {
    /// Minimum silence between the end of one line and the start of the next
    /// line on the same queue.
    pub min_gap: Duration,
    /// Assumed clip length when the audio reference carries no duration.
    pub fallback_clip: Duration,
    /// Extra time granted past the expected clip length before the completion
    /// signal is considered stalled.
    pub completion_grace: Duration,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_gap: Duration::from_millis(650),
            fallback_clip: Duration::from_secs(2),
            completion_grace: Duration::from_millis(50),
        }
    }
}

impl PacingConfig {
    /// How long the next item must still wait before it may start.
    pub fn remaining_gap(&self, last_ended_at: Option<Instant>, now: Instant) -> Duration {
        match last_ended_at {
            Some(ended) => self
                .min_gap
                .saturating_sub(now.saturating_duration_since(ended)),
            None => Duration::ZERO,
        }
    }

    /// Upper bound on how long a single clip may take to report completion.
    pub fn playback_budget(&self, expected: Option<Duration>) -> Duration {
        expected.unwrap_or(self.fallback_clip) + self.completion_grace
    }
}

/// Interaction counts after which the mood advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoodThresholds {
    /// `Warm` once the count is strictly greater than this.
    pub warm_after: u64,
    /// `Reflective` once the count is strictly greater than this.
    pub reflective_after: u64,
}

impl Default for MoodThresholds {
    fn default() -> Self {
        Self {
            warm_after: 5,
            reflective_after: 12,
        }
    }
}

/// Everything the session needs to gate, resolve and pace a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulingConfig {
    pub min_input_gap: Duration,
    pub pacing: PacingConfig,
    pub moods: MoodThresholds,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            min_input_gap: Duration::from_millis(800),
            pacing: PacingConfig::default(),
            moods: MoodThresholds::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SchedulingConfig::default();
        assert_eq!(config.min_input_gap, Duration::from_millis(800));
        assert_eq!(config.pacing.min_gap, Duration::from_millis(650));
        assert_eq!(config.moods.warm_after, 5);
        assert_eq!(config.moods.reflective_after, 12);
    }

    #[test]
    fn test_remaining_gap() {
        let pacing = PacingConfig::default();
        let ended = Instant::now();

        assert_eq!(pacing.remaining_gap(None, ended), Duration::ZERO);
        assert_eq!(
            pacing.remaining_gap(Some(ended), ended + Duration::from_millis(10)),
            Duration::from_millis(640)
        );
        assert_eq!(
            pacing.remaining_gap(Some(ended), ended + Duration::from_secs(1)),
            Duration::ZERO
        );
    }

    #[test]
    fn test_playback_budget() {
        let pacing = PacingConfig::default();
        assert_eq!(pacing.playback_budget(None), Duration::from_millis(2050));
        assert_eq!(
            pacing.playback_budget(Some(Duration::from_millis(900))),
            Duration::from_millis(950)
        );
    }
}
