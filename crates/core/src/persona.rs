use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two voices the character can speak with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    Core,
    Narrator,
}

impl Persona {
    pub const ALL: [Persona; 2] = [Persona::Core, Persona::Narrator];

    /// Display name used on transcript lines.
    pub fn label(&self) -> &'static str {
        match self {
            Persona::Core => "Core",
            Persona::Narrator => "Narrator",
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Persona::Core => write!(f, "core"),
            Persona::Narrator => write!(f, "narrator"),
        }
    }
}

/// Coarse affective state that progresses with the number of completed cycles.
///
/// Never set directly: see [`crate::resolver::Resolver::mood_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    #[default]
    Curious,
    Warm,
    Reflective,
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mood::Curious => write!(f, "curious"),
            Mood::Warm => write!(f, "warm"),
            Mood::Reflective => write!(f, "reflective"),
        }
    }
}

/// What the user appears to be asking for. `Reflect` is the catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greet,
    AskLight,
    AskWarmth,
    Reflect,
}

impl Intent {
    pub const ALL: [Intent; 4] = [
        Intent::Greet,
        Intent::AskLight,
        Intent::AskWarmth,
        Intent::Reflect,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Greet => "greet",
            Intent::AskLight => "ask_light",
            Intent::AskWarmth => "ask_warmth",
            Intent::Reflect => "reflect",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Intent::ALL
            .into_iter()
            .find(|intent| intent.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("unknown intent '{}'", s.trim()))
    }
}

/// Who a transcript line is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Persona(Persona),
}

impl Speaker {
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::User => "You",
            Speaker::Persona(persona) => persona.label(),
        }
    }
}
