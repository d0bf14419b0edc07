//! Reply Oracle
//!
//! The oracle turns what the user did into something the character says: a
//! persona, an intent label, a line of text and the audio asset that voices it.
//! How it decides (remote model, template bank, heuristics) is its own business;
//! the session only relies on the contract defined here.

use crate::error::ReplyValidationError;
use crate::persona::{Intent, Mood, Persona};
use crate::playback::AudioRef;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Longest line, in characters, the character is allowed to speak in one reply.
pub const MAX_REPLY_CHARS: usize = 240;

/// A proposed reply. The persona is only a proposal; the resolver has the final say.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleReply {
    pub persona: Persona,
    pub intent: Intent,
    pub text: String,
    pub audio: AudioRef,
}

impl OracleReply {
    /// Checks the reply against the contract every oracle must honour.
    pub fn validate(&self, allowed_intents: &[Intent]) -> Result<(), ReplyValidationError> {
        if self.text.trim().is_empty() {
            return Err(ReplyValidationError::EmptyText);
        }
        let chars = self.text.chars().count();
        if chars > MAX_REPLY_CHARS {
            return Err(ReplyValidationError::TextTooLong(chars));
        }
        if self.audio.uri.trim().is_empty() {
            return Err(ReplyValidationError::MissingAudio);
        }
        // Reflect is the universal fallback and is always acceptable.
        if self.intent != Intent::Reflect && !allowed_intents.contains(&self.intent) {
            return Err(ReplyValidationError::IntentNotAllowed(self.intent));
        }
        Ok(())
    }
}

/// Produces replies to user stimuli.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReplyOracle: Send + Sync {
    /// Produces a reply for `user_text` (empty for a click).
    ///
    /// # Arguments
    ///
    /// * `user_text` - What the user typed, or an empty string for a click.
    /// * `mood` - The mood of the cycle being answered.
    /// * `allowed_intents` - Intents the reply may carry besides `Reflect`.
    async fn get_reply(
        &self,
        user_text: &str,
        mood: Mood,
        allowed_intents: &[Intent],
    ) -> Result<OracleReply>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(intent: Intent, text: &str) -> OracleReply {
        OracleReply {
            persona: Persona::Core,
            intent,
            text: text.to_string(),
            audio: AudioRef::new("voice/core/curious-00.mp3"),
        }
    }

    #[test]
    fn test_validate_accepts_well_formed_reply() {
        assert_eq!(reply(Intent::Greet, "Is someone there?").validate(&Intent::ALL), Ok(()));
    }

    #[test]
    fn test_validate_length_limit() {
        let at_limit = "a".repeat(MAX_REPLY_CHARS);
        assert!(reply(Intent::Reflect, &at_limit).validate(&Intent::ALL).is_ok());

        let over = "a".repeat(MAX_REPLY_CHARS + 1);
        assert_eq!(
            reply(Intent::Reflect, &over).validate(&Intent::ALL),
            Err(ReplyValidationError::TextTooLong(MAX_REPLY_CHARS + 1))
        );
    }

    #[test]
    fn test_validate_rejects_missing_parts() {
        assert_eq!(
            reply(Intent::Reflect, "   ").validate(&Intent::ALL),
            Err(ReplyValidationError::EmptyText)
        );

        let mut silent = reply(Intent::Reflect, "Hello.");
        silent.audio = AudioRef::new("");
        assert_eq!(
            silent.validate(&Intent::ALL),
            Err(ReplyValidationError::MissingAudio)
        );
    }

    #[test]
    fn test_validate_intent_allow_list() {
        let allowed = [Intent::Greet];
        assert!(reply(Intent::Greet, "Hi.").validate(&allowed).is_ok());
        assert!(reply(Intent::Reflect, "Hm.").validate(&allowed).is_ok());
        assert_eq!(
            reply(Intent::AskLight, "Light.").validate(&allowed),
            Err(ReplyValidationError::IntentNotAllowed(Intent::AskLight))
        );
    }
}
