//! Interaction and speech scheduling for a two-persona conversation.
//!
//! A user stimulus passes the [`gate`], the [`session`] asks a
//! [`ReplyOracle`](oracle::ReplyOracle) for a line, the [`resolver`] decides
//! who says it, and the [`speech_queue`] plays it with pacing. Audio output and
//! presentation sit behind the [`Playback`](playback::Playback) and
//! [`Presentation`](presentation::Presentation) traits.

pub mod config;
pub mod error;
pub mod gate;
pub mod intent;
pub mod oracle;
pub mod persona;
pub mod playback;
pub mod presentation;
pub mod resolver;
pub mod session;
pub mod speech_queue;
pub mod template_oracle;

#[cfg(test)]
mod testing;

pub use config::{MoodThresholds, PacingConfig, SchedulingConfig};
pub use error::{CycleError, ReplyValidationError, SpeechError};
pub use oracle::{OracleReply, ReplyOracle};
pub use persona::{Intent, Mood, Persona, Speaker};
pub use playback::{AudioRef, Playback};
pub use presentation::{NoPresentation, Presentation, Reaction};
pub use session::{CycleOutcome, InteractionSession, SessionSnapshot, SpokenLine, Stimulus};
pub use speech_queue::{PerRoleQueue, SpeechCompletion, SpeechQueueRegistry};
pub use template_oracle::{NarratorOdds, TemplateOracle};
