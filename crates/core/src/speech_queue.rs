//! Per-persona speech queues.
//!
//! Each persona owns a [`PerRoleQueue`]: a FIFO of audio clips played one at a
//! time with a minimum gap between the end of one clip and the start of the
//! next. The [`SpeechQueueRegistry`] holds one queue per persona and answers
//! whether anyone is still speaking.
//!
//! Queues are independent. Nothing here prevents the core and the narrator from
//! speaking at the same time; the session's admission slot is what keeps a
//! conversation to one line at a time.

use crate::config::PacingConfig;
use crate::error::SpeechError;
use crate::persona::Persona;
use crate::playback::{AudioRef, Playback};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{Mutex, oneshot};
use tokio::time::{Instant, sleep, timeout};
use tracing::{Instrument, debug, info, warn};

type CompletionResult = Result<(), SpeechError>;

/// A clip waiting in (or being played by) a queue.
#[derive(Debug)]
pub struct SpeechItem {
    pub persona: Persona,
    pub audio: AudioRef,
    completion: oneshot::Sender<CompletionResult>,
}

impl SpeechItem {
    fn finish(self, result: CompletionResult) {
        if self.completion.send(result).is_err() {
            debug!(persona = %self.persona, audio = %self.audio, "Nobody was waiting for this line");
        }
    }
}

/// Resolves once the enqueued clip has finished playing, failed, or been cancelled.
#[derive(Debug)]
#[must_use = "a completion does nothing unless awaited"]
pub struct SpeechCompletion {
    rx: oneshot::Receiver<CompletionResult>,
}

impl Future for SpeechCompletion {
    type Output = CompletionResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // A dropped sender means the queue went away with the item still in it.
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(SpeechError::Cancelled)))
    }
}

#[derive(Debug, Default)]
struct QueueState {
    pending: VecDeque<SpeechItem>,
    playing: bool,
    draining: bool,
    last_ended_at: Option<Instant>,
}

struct QueueInner {
    persona: Persona,
    pacing: PacingConfig,
    playback: Arc<dyn Playback>,
    state: Mutex<QueueState>,
}

/// FIFO playback scheduler for one persona.
#[derive(Clone)]
pub struct PerRoleQueue {
    inner: Arc<QueueInner>,
}

impl PerRoleQueue {
    pub fn new(persona: Persona, playback: Arc<dyn Playback>, pacing: PacingConfig) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                persona,
                pacing,
                playback,
                state: Mutex::new(QueueState::default()),
            }),
        }
    }

    pub fn persona(&self) -> Persona {
        self.inner.persona
    }

    /// Appends `audio` to the queue and returns a handle that resolves when it
    /// has been played.
    ///
    /// Starts a drain task if none is running; otherwise the running one picks
    /// the item up in order.
    pub async fn enqueue(&self, audio: AudioRef) -> SpeechCompletion {
        let (tx, rx) = oneshot::channel();
        let item = SpeechItem {
            persona: self.inner.persona,
            audio,
            completion: tx,
        };

        let mut state = self.inner.state.lock().await;
        debug!(persona = %self.inner.persona, audio = %item.audio, queued = state.pending.len(), "Line enqueued");
        state.pending.push_back(item);
        if !state.draining {
            state.draining = true;
            let inner = self.inner.clone();
            let span = tracing::debug_span!("speech_queue", persona = %inner.persona);
            tokio::spawn(drain(inner).instrument(span));
        }

        SpeechCompletion { rx }
    }

    /// `true` while a clip is playing or waiting to play.
    pub async fn is_busy(&self) -> bool {
        let state = self.inner.state.lock().await;
        state.playing || !state.pending.is_empty()
    }

    pub async fn pending_len(&self) -> usize {
        self.inner.state.lock().await.pending.len()
    }

    /// Drops every clip that has not started yet, rejecting each with
    /// [`SpeechError::Cancelled`]. A clip already playing runs to completion.
    ///
    /// Returns the number of clips dropped.
    pub async fn clear(&self) -> usize {
        let dropped: Vec<SpeechItem> = {
            let mut state = self.inner.state.lock().await;
            state.pending.drain(..).collect()
        };
        let count = dropped.len();
        for item in dropped {
            item.finish(Err(SpeechError::Cancelled));
        }
        if count > 0 {
            info!(persona = %self.inner.persona, count, "Cleared pending lines");
        }
        count
    }
}

/// Plays queued items until the queue is empty. At most one runs per queue.
async fn drain(inner: Arc<QueueInner>) {
    loop {
        let wait = {
            let mut state = inner.state.lock().await;
            if state.pending.is_empty() {
                state.draining = false;
                return;
            }
            inner.pacing.remaining_gap(state.last_ended_at, Instant::now())
        };
        if !wait.is_zero() {
            debug!(?wait, "Holding for minimum gap");
            sleep(wait).await;
        }

        // The head may have been cleared while we were waiting.
        let item = {
            let mut state = inner.state.lock().await;
            match state.pending.pop_front() {
                Some(item) => {
                    state.playing = true;
                    item
                }
                None => continue,
            }
        };

        let result = play_bounded(&inner, &item.audio).await;

        {
            let mut state = inner.state.lock().await;
            state.last_ended_at = Some(Instant::now());
            state.playing = false;
        }
        item.finish(result);
    }
}

/// Plays one clip, treating it as finished if completion is not reported in time.
async fn play_bounded(inner: &QueueInner, audio: &AudioRef) -> CompletionResult {
    let budget = inner.pacing.playback_budget(audio.duration);
    debug!(%audio, ?budget, "Playback started");
    match timeout(budget, inner.playback.play(audio)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            warn!(%audio, error = ?e, "Playback failed");
            Err(SpeechError::Playback(e))
        }
        Err(_) => {
            warn!(%audio, ?budget, "Playback did not report completion in time; treating as finished");
            Ok(())
        }
    }
}

/// Owns one [`PerRoleQueue`] per persona.
#[derive(Clone)]
pub struct SpeechQueueRegistry {
    core: PerRoleQueue,
    narrator: PerRoleQueue,
}

impl SpeechQueueRegistry {
    pub fn new(playback: Arc<dyn Playback>, pacing: PacingConfig) -> Self {
        Self {
            core: PerRoleQueue::new(Persona::Core, playback.clone(), pacing),
            narrator: PerRoleQueue::new(Persona::Narrator, playback, pacing),
        }
    }

    pub fn queue(&self, persona: Persona) -> &PerRoleQueue {
        match persona {
            Persona::Core => &self.core,
            Persona::Narrator => &self.narrator,
        }
    }

    pub async fn enqueue(&self, persona: Persona, audio: AudioRef) -> SpeechCompletion {
        self.queue(persona).enqueue(audio).await
    }

    /// `true` if any persona is speaking or has lines waiting.
    pub async fn is_busy(&self) -> bool {
        for persona in Persona::ALL {
            if self.queue(persona).is_busy().await {
                return true;
            }
        }
        false
    }

    pub async fn clear(&self, persona: Persona) -> usize {
        self.queue(persona).clear().await
    }

    pub async fn clear_all(&self) -> usize {
        let mut dropped = 0;
        for persona in Persona::ALL {
            dropped += self.queue(persona).clear().await;
        }
        dropped
    }
}
