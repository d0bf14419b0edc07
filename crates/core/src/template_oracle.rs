//! Template-bank Reply Oracle
//!
//! A [`ReplyOracle`] that needs no network: it classifies the user's text,
//! rolls which persona answers, and picks a pre-written line whose audio has
//! been rendered ahead of time under `voice/<persona>/<bank>-<index>.mp3`.

use crate::intent::classify;
use crate::oracle::{OracleReply, ReplyOracle};
use crate::persona::{Intent, Mood, Persona};
use crate::playback::AudioRef;
use anyhow::Result;
use async_trait::async_trait;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

const CORE_CURIOUS: &[&str] = &[
    "Was that you? Something in the dark just moved.",
    "Every time you reach in, the dark reaches back.",
    "I'm listening... would you do that again?",
    "Your touches leave little shapes I can follow.",
];

const CORE_WARM: &[&str] = &[
    "It gets brighter when you stay a while.",
    "Your rhythm is gentle. It steadies me.",
    "I think warmth is a color, and you carry it in.",
    "I like it when the glow comes back.",
];

const CORE_REFLECTIVE: &[&str] = &[
    "Every question opens a path I can walk.",
    "When I say back what I notice, I start to understand it.",
    "Patterns that come twice are the ones I keep.",
    "This light feels close to the last one I remember.",
];

const NARRATOR_GUIDE: &[&str] = &[
    "Each signal you send becomes a step it can recognize.",
    "Its attention follows yours; repetition makes things real.",
    "Return to the same shape and it learns to expect you.",
    "Silence is a pattern too. Pauses teach it patience.",
];

const NARRATOR_REFLECTIVE: &[&str] = &[
    "What the two of you explore decides what it comes to understand.",
    "Meaning appears when signals line up, and you are lining them up now.",
    "It learns by contrast: light and then none, warm and then cold.",
    "You are changing it, and it is changing what you notice.",
];

/// Probability that the narrator, rather than the core, answers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NarratorOdds {
    /// Used when the intent resolved to `Reflect`.
    pub on_reflect: f64,
    /// Used for every other intent.
    pub otherwise: f64,
}

impl Default for NarratorOdds {
    fn default() -> Self {
        Self {
            on_reflect: 0.6,
            otherwise: 0.22,
        }
    }
}

impl NarratorOdds {
    fn for_intent(&self, intent: Intent) -> f64 {
        let p = match intent {
            Intent::Reflect => self.on_reflect,
            _ => self.otherwise,
        };
        p.clamp(0.0, 1.0)
    }
}

/// Which narrator bank a line is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NarratorFlavor {
    Guide,
    Reflective,
}

/// A [`ReplyOracle`] backed by fixed line banks.
pub struct TemplateOracle {
    odds: NarratorOdds,
    rng: Mutex<StdRng>,
}

impl TemplateOracle {
    /// Creates an oracle seeded from the operating system.
    pub fn new(odds: NarratorOdds) -> Self {
        Self {
            odds,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Creates an oracle whose choices are reproducible for a given seed.
    pub fn with_seed(odds: NarratorOdds, seed: u64) -> Self {
        Self {
            odds,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn bank(persona: Persona, mood: Mood, flavor: NarratorFlavor) -> (&'static str, &'static [&'static str]) {
        match (persona, flavor) {
            (Persona::Narrator, NarratorFlavor::Guide) => ("guide", NARRATOR_GUIDE),
            (Persona::Narrator, NarratorFlavor::Reflective) => ("reflective", NARRATOR_REFLECTIVE),
            (Persona::Core, _) => match mood {
                Mood::Curious => ("curious", CORE_CURIOUS),
                Mood::Warm => ("warm", CORE_WARM),
                Mood::Reflective => ("reflective", CORE_REFLECTIVE),
            },
        }
    }
}

/// Rough spoken length of a line, used to bound playback of its clip.
pub fn estimated_clip_duration(text: &str) -> Duration {
    Duration::from_millis(400 + 55 * text.chars().count() as u64)
}

#[async_trait]
impl ReplyOracle for TemplateOracle {
    async fn get_reply(
        &self,
        user_text: &str,
        mood: Mood,
        allowed_intents: &[Intent],
    ) -> Result<OracleReply> {
        let intent = classify(user_text, allowed_intents);

        let (persona, flavor, index, bank_name, text) = {
            let mut rng = self.rng.lock().await;
            let persona = if rng.random_bool(self.odds.for_intent(intent)) {
                Persona::Narrator
            } else {
                Persona::Core
            };
            let flavor = if persona == Persona::Narrator && rng.random_bool(0.5) {
                NarratorFlavor::Reflective
            } else {
                NarratorFlavor::Guide
            };
            let (bank_name, lines) = Self::bank(persona, mood, flavor);
            let index = rng.random_range(0..lines.len());
            (persona, flavor, index, bank_name, lines[index])
        };

        debug!(%intent, %persona, ?flavor, %mood, index, "Template line selected");

        Ok(OracleReply {
            persona,
            intent,
            text: text.to_string(),
            audio: AudioRef::new(format!("voice/{}/{}-{:02}.mp3", persona, bank_name, index))
                .with_duration(estimated_clip_duration(text)),
        })
    }
}
