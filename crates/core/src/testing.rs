//! Test doubles shared by the unit tests of this crate.

use crate::oracle::{OracleReply, ReplyOracle};
use crate::persona::{Intent, Mood, Persona, Speaker};
use crate::playback::{AudioRef, Playback};
use crate::presentation::{Presentation, Reaction};
use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::{Instant, sleep};

/// One observed call to [`FakePlayback::play`].
#[derive(Debug, Clone)]
pub struct Run {
    pub uri: String,
    pub started: Instant,
    /// `None` if the play future was dropped before it finished.
    pub ended: Option<Instant>,
}

/// Playback that "plays" each clip by sleeping for a fixed time.
pub struct FakePlayback {
    clip: Duration,
    failing: HashSet<String>,
    runs: Mutex<Vec<Run>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl FakePlayback {
    pub fn new(clip: Duration) -> Self {
        Self {
            clip,
            failing: HashSet::new(),
            runs: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }

    /// Makes every play of `uri` fail after the clip length.
    pub fn failing(mut self, uri: &str) -> Self {
        self.failing.insert(uri.to_string());
        self
    }

    pub fn runs(&self) -> Vec<Run> {
        self.runs.lock().unwrap().clone()
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

struct ActiveGuard<'a>(&'a AtomicUsize);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Playback for FakePlayback {
    async fn play(&self, audio: &AudioRef) -> Result<()> {
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = ActiveGuard(&self.active);
        self.max_active.fetch_max(now_active, Ordering::SeqCst);

        let index = {
            let mut runs = self.runs.lock().unwrap();
            runs.push(Run {
                uri: audio.uri.clone(),
                started: Instant::now(),
                ended: None,
            });
            runs.len() - 1
        };

        sleep(self.clip).await;
        self.runs.lock().unwrap()[index].ended = Some(Instant::now());

        if self.failing.contains(&audio.uri) {
            bail!("asset '{}' could not be decoded", audio.uri);
        }
        Ok(())
    }
}

/// Builds a reply whose clip carries no duration.
pub fn reply(persona: Persona, intent: Intent, text: &str, uri: &str) -> OracleReply {
    OracleReply {
        persona,
        intent,
        text: text.to_string(),
        audio: AudioRef::new(uri),
    }
}

/// What the session asked the oracle.
#[derive(Debug, Clone, PartialEq)]
pub struct OracleCall {
    pub user_text: String,
    pub mood: Mood,
    pub allowed: Vec<Intent>,
}

/// Oracle that answers from a script, after an optional delay.
///
/// `None` entries produce a transport failure. Once the script runs out every
/// call gets a plain core reply.
pub struct ScriptedOracle {
    delay: Duration,
    script: Mutex<VecDeque<Option<OracleReply>>>,
    calls: Mutex<Vec<OracleCall>>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self {
            delay: Duration::ZERO,
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn then(self, reply: OracleReply) -> Self {
        self.script.lock().unwrap().push_back(Some(reply));
        self
    }

    pub fn then_fail(self) -> Self {
        self.script.lock().unwrap().push_back(None);
        self
    }

    pub fn calls(&self) -> Vec<OracleCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReplyOracle for ScriptedOracle {
    async fn get_reply(
        &self,
        user_text: &str,
        mood: Mood,
        allowed_intents: &[Intent],
    ) -> Result<OracleReply> {
        self.calls.lock().unwrap().push(OracleCall {
            user_text: user_text.to_string(),
            mood,
            allowed: allowed_intents.to_vec(),
        });
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Some(reply)) => Ok(reply),
            Some(None) => Err(anyhow!("reply service unavailable")),
            None => Ok(reply(Persona::Core, Intent::Reflect, "I'm listening.", "voice/core/default.mp3")),
        }
    }
}

/// Presentation that remembers what it was told.
#[derive(Default)]
pub struct RecordingPresentation {
    lines: Mutex<Vec<(Instant, Speaker, String)>>,
    reactions: Mutex<Vec<Reaction>>,
}

impl RecordingPresentation {
    pub fn lines(&self) -> Vec<(Instant, Speaker, String)> {
        self.lines.lock().unwrap().clone()
    }

    pub fn reactions(&self) -> Vec<Reaction> {
        self.reactions.lock().unwrap().clone()
    }
}

impl Presentation for RecordingPresentation {
    fn show_line(&self, at: Instant, speaker: Speaker, text: &str) {
        self.lines
            .lock()
            .unwrap()
            .push((at, speaker, text.to_string()));
    }

    fn react(&self, reaction: Reaction) {
        self.reactions.lock().unwrap().push(reaction);
    }
}
