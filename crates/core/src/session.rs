//! Interaction Session
//!
//! The orchestrator for one conversation. Each admitted stimulus runs one
//! cycle: `Idle → Admitted → AwaitingReply → Speaking → Idle`.
//!
//! 1. The gate decides whether the stimulus may start a cycle; if so the
//!    session's single admission slot is taken.
//! 2. The mood for the cycle is computed and the oracle is asked for a reply.
//! 3. The resolver picks the persona that finally speaks.
//! 4. The line is shown, a reaction is triggered, and the clip is queued on
//!    that persona's queue.
//! 5. The cycle waits for the clip to finish, commits the counters, and gives
//!    the slot back.
//!
//! The slot is a scoped permit, so it is returned on every exit path, faults
//! included. Counters only move when a line was actually spoken.

use crate::config::SchedulingConfig;
use crate::error::CycleError;
use crate::gate::AdmissionGate;
use crate::oracle::ReplyOracle;
use crate::persona::{Intent, Mood, Persona, Speaker};
use crate::playback::AudioRef;
use crate::presentation::{Presentation, Reaction};
use crate::resolver::Resolver;
use crate::speech_queue::SpeechQueueRegistry;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;
use tracing::{debug, info, instrument};

/// Lead time for echoing what the user said.
const USER_LINE_LEAD: Duration = Duration::from_millis(20);
/// Lead time for showing what the persona is about to say.
const PERSONA_LINE_LEAD: Duration = Duration::from_millis(60);

/// A user-originated event that may start a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stimulus {
    Click,
    Text(String),
}

impl Stimulus {
    /// Text handed to the oracle. Clicks carry none.
    pub fn user_text(&self) -> &str {
        match self {
            Stimulus::Click => "",
            Stimulus::Text(text) => text,
        }
    }
}

impl fmt::Display for Stimulus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stimulus::Click => write!(f, "click"),
            Stimulus::Text(text) => write!(f, "text({} chars)", text.chars().count()),
        }
    }
}

/// Point-in-time view of the session counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub interaction_count: u64,
    pub mood: Mood,
    pub last_persona: Option<Persona>,
    pub busy: bool,
}

/// The line a completed cycle spoke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpokenLine {
    pub persona: Persona,
    pub intent: Intent,
    pub mood: Mood,
    pub text: String,
    pub audio: AudioRef,
}

/// How a stimulus was handled when it did not fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The gate declined the stimulus. Nothing changed.
    Rejected,
    /// A full cycle ran and this line was spoken.
    Spoke(SpokenLine),
}

#[derive(Debug)]
struct SessionState {
    interaction_count: u64,
    mood: Mood,
    last_persona: Option<Persona>,
    gate: AdmissionGate,
    allowed_intents: Vec<Intent>,
}

/// Drives one conversation between the user and the two personas.
pub struct InteractionSession {
    resolver: Resolver,
    oracle: Arc<dyn ReplyOracle>,
    registry: SpeechQueueRegistry,
    presentation: Arc<dyn Presentation>,
    /// Single-slot admission lock. Held for the whole cycle.
    cycle_slot: Arc<Semaphore>,
    state: Mutex<SessionState>,
}

impl InteractionSession {
    pub fn new(
        config: &SchedulingConfig,
        oracle: Arc<dyn ReplyOracle>,
        registry: SpeechQueueRegistry,
        presentation: Arc<dyn Presentation>,
    ) -> Self {
        Self {
            resolver: Resolver::new(config.moods),
            oracle,
            registry,
            presentation,
            cycle_slot: Arc::new(Semaphore::new(1)),
            state: Mutex::new(SessionState {
                interaction_count: 0,
                mood: Mood::default(),
                last_persona: None,
                gate: AdmissionGate::new(config.min_input_gap),
                allowed_intents: Intent::ALL.to_vec(),
            }),
        }
    }

    pub fn registry(&self) -> &SpeechQueueRegistry {
        &self.registry
    }

    /// `true` while a cycle is in flight.
    pub fn is_busy(&self) -> bool {
        self.cycle_slot.available_permits() == 0
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().await;
        SessionSnapshot {
            interaction_count: state.interaction_count,
            mood: state.mood,
            last_persona: state.last_persona,
            busy: self.is_busy(),
        }
    }

    pub async fn allowed_intents(&self) -> Vec<Intent> {
        self.state.lock().await.allowed_intents.clone()
    }

    /// Replaces the intents the oracle may answer with. `Reflect` is always kept.
    pub async fn set_allowed_intents(&self, intents: Vec<Intent>) {
        let mut intents = intents;
        if !intents.contains(&Intent::Reflect) {
            intents.push(Intent::Reflect);
        }
        info!(?intents, "Allowed intents updated");
        self.state.lock().await.allowed_intents = intents;
    }

    /// Handles one stimulus from start to finish.
    ///
    /// Returns [`CycleOutcome::Rejected`] without side effects if the gate
    /// declines. Otherwise the call suspends until the reply has been spoken
    /// or the cycle faulted.
    #[instrument(name = "cycle", skip_all, fields(%stimulus))]
    pub async fn handle(&self, stimulus: Stimulus) -> Result<CycleOutcome, CycleError> {
        let admitted_at = Instant::now();
        let Some(_slot) = self.try_admit(admitted_at).await else {
            return Ok(CycleOutcome::Rejected);
        };

        let (snapshot, allowed) = self.begin_cycle().await;
        info!(count = snapshot.interaction_count, mood = %snapshot.mood, "Stimulus admitted");

        if let Stimulus::Text(text) = &stimulus {
            self.presentation
                .show_line(admitted_at + USER_LINE_LEAD, Speaker::User, text);
        }

        let reply = self
            .oracle
            .get_reply(stimulus.user_text(), snapshot.mood, &allowed)
            .await
            .map_err(CycleError::Oracle)?;
        reply
            .validate(&allowed)
            .map_err(|e| CycleError::Oracle(e.into()))?;

        let resolution = self.resolver.resolve(&reply, &snapshot);
        if resolution.persona != reply.persona {
            debug!(proposed = %reply.persona, "Narrator would repeat itself; core answers instead");
        }

        self.presentation.show_line(
            Instant::now() + PERSONA_LINE_LEAD,
            Speaker::Persona(resolution.persona),
            &reply.text,
        );
        self.presentation.react(Reaction::classify(&reply.text));

        let completion = self
            .registry
            .enqueue(resolution.persona, reply.audio.clone())
            .await;
        completion.await?;

        let mut state = self.state.lock().await;
        state.interaction_count += 1;
        state.last_persona = Some(resolution.persona);
        info!(
            persona = %resolution.persona,
            intent = %reply.intent,
            count = state.interaction_count,
            "Line spoken"
        );

        Ok(CycleOutcome::Spoke(SpokenLine {
            persona: resolution.persona,
            intent: reply.intent,
            mood: resolution.mood,
            text: reply.text,
            audio: reply.audio,
        }))
    }

    /// Drops every line still waiting to be spoken. Cycles waiting on them
    /// fail with a cancellation fault and release the session.
    pub async fn cancel_pending(&self) -> usize {
        self.registry.clear_all().await
    }

    /// Takes the admission slot if the gate lets `now` through.
    ///
    /// The slot, the gate and the registry are checked under the state lock,
    /// so two stimuli arriving together cannot both be admitted.
    async fn try_admit(&self, now: Instant) -> Option<OwnedSemaphorePermit> {
        let mut state = self.state.lock().await;
        let slot = self.cycle_slot.clone().try_acquire_owned().ok();
        let registry_busy = self.registry.is_busy().await;
        if state.gate.try_admit(now, slot.is_none(), registry_busy) {
            slot
        } else {
            None
        }
    }

    /// Recomputes the mood for the upcoming cycle and captures what it needs.
    async fn begin_cycle(&self) -> (SessionSnapshot, Vec<Intent>) {
        let mut state = self.state.lock().await;
        state.mood = self.resolver.mood_for(state.interaction_count);
        let snapshot = SessionSnapshot {
            interaction_count: state.interaction_count,
            mood: state.mood,
            last_persona: state.last_persona,
            busy: true,
        };
        (snapshot, state.allowed_intents.clone())
    }
}
