//! Role/Mood Resolver
//!
//! Decides the mood a cycle is asked in and which persona finally speaks.

use crate::config::MoodThresholds;
use crate::oracle::OracleReply;
use crate::persona::{Mood, Persona};
use crate::session::SessionSnapshot;

/// Final decision for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub persona: Persona,
    pub mood: Mood,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver {
    thresholds: MoodThresholds,
}

impl Resolver {
    pub fn new(thresholds: MoodThresholds) -> Self {
        Self { thresholds }
    }

    /// Mood for a session that has completed `interaction_count` cycles.
    pub fn mood_for(&self, interaction_count: u64) -> Mood {
        if interaction_count > self.thresholds.reflective_after {
            Mood::Reflective
        } else if interaction_count > self.thresholds.warm_after {
            Mood::Warm
        } else {
            Mood::Curious
        }
    }

    /// Applies the anti-repeat rule: the narrator never speaks twice in a row.
    pub fn final_persona(proposed: Persona, last: Option<Persona>) -> Persona {
        match (proposed, last) {
            (Persona::Narrator, Some(Persona::Narrator)) => Persona::Core,
            _ => proposed,
        }
    }

    /// Resolves `reply` against the session as it stood when the cycle began.
    pub fn resolve(&self, reply: &OracleReply, session: &SessionSnapshot) -> Resolution {
        Resolution {
            persona: Self::final_persona(reply.persona, session.last_persona),
            mood: self.mood_for(session.interaction_count),
        }
    }
}
