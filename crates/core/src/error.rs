//! Fault types for the scheduling core.

use thiserror::Error;

/// Why a queued speech item did not finish playing.
#[derive(Debug, Error)]
pub enum SpeechError {
    /// The playback primitive reported a failure (missing asset, device error, ...).
    #[error("playback failed: {0:#}")]
    Playback(#[source] anyhow::Error),

    /// The item was dropped from its queue before it started playing.
    #[error("speech item was cancelled before playback")]
    Cancelled,
}

/// A reply from the oracle that does not satisfy the reply contract.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReplyValidationError {
    #[error("reply text is empty")]
    EmptyText,
    #[error("reply text is {0} characters, the limit is {limit}", limit = crate::oracle::MAX_REPLY_CHARS)]
    TextTooLong(usize),
    #[error("reply has no audio reference")]
    MissingAudio,
    #[error("intent '{0}' is not currently allowed")]
    IntentNotAllowed(crate::persona::Intent),
}

/// A fault that ended an admitted cycle without spoken output.
#[derive(Debug, Error)]
pub enum CycleError {
    /// The oracle could not produce a usable reply.
    #[error("reply oracle failed: {0:#}")]
    Oracle(#[source] anyhow::Error),

    /// The spoken line faulted or was cancelled.
    #[error(transparent)]
    Speech(#[from] SpeechError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::Intent;

    #[test]
    fn test_error_display() {
        assert_eq!(
            SpeechError::Cancelled.to_string(),
            "speech item was cancelled before playback"
        );
        assert_eq!(
            ReplyValidationError::TextTooLong(300).to_string(),
            "reply text is 300 characters, the limit is 240"
        );
        assert_eq!(
            ReplyValidationError::IntentNotAllowed(Intent::AskWarmth).to_string(),
            "intent 'ask_warmth' is not currently allowed"
        );
    }

    #[test]
    fn test_cycle_error_wraps_speech_error() {
        let err: CycleError = SpeechError::Cancelled.into();
        assert!(matches!(err, CycleError::Speech(SpeechError::Cancelled)));
        assert_eq!(err.to_string(), "speech item was cancelled before playback");

        let oracle = CycleError::Oracle(anyhow::anyhow!("connection reset"));
        assert_eq!(oracle.to_string(), "reply oracle failed: connection reset");
    }
}
