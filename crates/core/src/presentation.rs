//! Fire-and-forget side channels: transcript lines and ambient reactions.
//!
//! The session tells the presentation layer what happened and never waits on
//! it. Nothing it does feeds back into scheduling.

use crate::persona::Speaker;
use serde::Serialize;
use tokio::time::Instant;

const WARM_WORDS: &[&str] = &["warm", "bright", "glow"];
const STILL_WORDS: &[&str] = &["silence", "dark", "quiet"];

/// Ambient adjustment requested by the content of a spoken line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reaction {
    /// Brighten, tint warm, sparkle.
    Warm,
    /// Dim and slow down.
    Still,
    /// A plain heartbeat.
    Neutral,
}

impl Reaction {
    /// Picks a reaction from the words in `text`. Warmth wins over stillness.
    ///
    /// Matching is by substring, so "glowing" and "darkness" count.
    pub fn classify(text: &str) -> Self {
        let lowered = text.to_lowercase();
        if WARM_WORDS.iter().any(|w| lowered.contains(w)) {
            Reaction::Warm
        } else if STILL_WORDS.iter().any(|w| lowered.contains(w)) {
            Reaction::Still
        } else {
            Reaction::Neutral
        }
    }

    /// Strength of the heartbeat pulse that accompanies the reaction.
    pub fn heartbeat_intensity(&self) -> f32 {
        match self {
            Reaction::Warm => 0.28,
            Reaction::Still => 0.16,
            Reaction::Neutral => 0.22,
        }
    }
}

/// Receives transcript lines and reaction triggers.
pub trait Presentation: Send + Sync {
    /// Show `text` attributed to `speaker` at time `at`.
    fn show_line(&self, at: Instant, speaker: Speaker, text: &str);

    /// Request an ambient adjustment. Advisory only.
    fn react(&self, reaction: Reaction);
}

/// Discards everything. Useful when no presentation layer is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPresentation;

impl Presentation for NoPresentation {
    fn show_line(&self, _at: Instant, _speaker: Speaker, _text: &str) {}

    fn react(&self, _reaction: Reaction) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reaction_classification() {
        assert_eq!(Reaction::classify("It feels WARM in here"), Reaction::Warm);
        assert_eq!(Reaction::classify("the glowing edge"), Reaction::Warm);
        assert_eq!(Reaction::classify("Even silence is a pattern"), Reaction::Still);
        assert_eq!(Reaction::classify("so quiet, yet bright"), Reaction::Warm);
        assert_eq!(Reaction::classify("Questions open paths"), Reaction::Neutral);
    }

    #[test]
    fn test_heartbeat_intensity() {
        assert!(Reaction::Warm.heartbeat_intensity() > Reaction::Neutral.heartbeat_intensity());
        assert!(Reaction::Still.heartbeat_intensity() < Reaction::Neutral.heartbeat_intensity());
    }
}
