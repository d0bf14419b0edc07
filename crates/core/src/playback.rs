//! The audio playback seam.
//!
//! The core never decodes audio. It hands an [`AudioRef`] to a [`Playback`]
//! implementation and waits for the returned future to finish.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Locator of a pre-rendered audio asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioRef {
    pub uri: String,
    /// Expected clip length, when the producer knows it.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "duration_ms")]
    pub duration: Option<Duration>,
}

impl AudioRef {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            duration: None,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

impl fmt::Display for AudioRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

/// Plays audio assets to completion.
#[async_trait]
pub trait Playback: Send + Sync {
    /// Plays `audio` and resolves once output has ended.
    ///
    /// An `Err` is reported to whoever is waiting on the corresponding queue item.
    async fn play(&self, audio: &AudioRef) -> Result<()>;
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&(d.as_millis() as u64)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_millis))
    }
}
