use async_trait::async_trait;
use duet_core::{AudioRef, Playback};
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Stands in for an audio device: each clip "plays" for its expected length.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedPlayback {
    fallback_clip: Duration,
}

impl SimulatedPlayback {
    pub fn new(fallback_clip: Duration) -> Self {
        Self { fallback_clip }
    }

    fn clip_length(&self, audio: &AudioRef) -> Duration {
        audio.duration.unwrap_or(self.fallback_clip)
    }
}

#[async_trait]
impl Playback for SimulatedPlayback {
    async fn play(&self, audio: &AudioRef) -> anyhow::Result<()> {
        let length = self.clip_length(audio);
        debug!(%audio, ?length, "Playing clip");
        sleep(length).await;
        Ok(())
    }
}
