//! Terminal presentation: transcript lines and reactions go to the log.

use duet_core::{Presentation, Reaction, Speaker};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::time::Instant;
use tracing::info;

/// Number of transcript lines kept on screen.
pub const TRANSCRIPT_LINES: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptLine {
    pub speaker: String,
    pub text: String,
}

/// A [`Presentation`] that logs every line and keeps a short rolling transcript.
#[derive(Debug, Default)]
pub struct LogPresentation {
    transcript: Mutex<VecDeque<TranscriptLine>>,
}

impl LogPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent lines, oldest first.
    pub fn transcript(&self) -> Vec<TranscriptLine> {
        match self.transcript.lock() {
            Ok(lines) => lines.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        }
    }
}

impl Presentation for LogPresentation {
    fn show_line(&self, at: Instant, speaker: Speaker, text: &str) {
        let delay = at.saturating_duration_since(Instant::now());
        info!(speaker = speaker.label(), ?delay, "{text}");

        let mut lines = match self.transcript.lock() {
            Ok(lines) => lines,
            Err(poisoned) => poisoned.into_inner(),
        };
        lines.push_back(TranscriptLine {
            speaker: speaker.label().to_string(),
            text: text.to_string(),
        });
        while lines.len() > TRANSCRIPT_LINES {
            lines.pop_front();
        }
    }

    fn react(&self, reaction: Reaction) {
        info!(
            ?reaction,
            heartbeat = reaction.heartbeat_intensity(),
            "Ambient reaction"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duet_core::Persona;

    #[test]
    fn test_transcript_keeps_last_lines() {
        let presentation = LogPresentation::new();
        let now = Instant::now();
        for i in 0..9 {
            let speaker = if i % 2 == 0 {
                Speaker::User
            } else {
                Speaker::Persona(Persona::Core)
            };
            presentation.show_line(now, speaker, &format!("line {i}"));
        }

        let transcript = presentation.transcript();
        assert_eq!(transcript.len(), TRANSCRIPT_LINES);
        assert_eq!(transcript[0].text, "line 3");
        assert_eq!(transcript[5].text, "line 8");
        assert_eq!(transcript[5].speaker, "You");
        assert_eq!(transcript[4].speaker, "Core");
    }

    #[test]
    fn test_reactions_leave_transcript_alone() {
        let presentation = LogPresentation::new();
        presentation.react(Reaction::Warm);
        assert!(presentation.transcript().is_empty());
    }
}
