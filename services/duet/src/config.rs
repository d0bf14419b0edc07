use duet_core::{Intent, NarratorOdds, SchedulingConfig};
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub scheduling: SchedulingConfig,
    pub narrator_odds: NarratorOdds,
    pub allowed_intents: Vec<Intent>,
    pub seed: Option<u64>,
    pub log_level: Level,
}

fn parse_var<T>(name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(None),
    }
}

fn millis_var(name: &str, default: Duration) -> Result<Duration, ConfigError> {
    Ok(parse_var::<u64>(name)?
        .map(Duration::from_millis)
        .unwrap_or(default))
}

fn probability_var(name: &str, default: f64) -> Result<f64, ConfigError> {
    match parse_var::<f64>(name)? {
        Some(p) if (0.0..=1.0).contains(&p) => Ok(p),
        Some(p) => Err(ConfigError::InvalidValue(
            name.to_string(),
            format!("{p} is not a probability between 0 and 1"),
        )),
        None => Ok(default),
    }
}

fn intents_var(name: &str) -> Result<Vec<Intent>, ConfigError> {
    let Ok(raw) = std::env::var(name) else {
        return Ok(Intent::ALL.to_vec());
    };
    let mut intents = raw
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.parse::<Intent>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), e))?;
    if !intents.contains(&Intent::Reflect) {
        intents.push(Intent::Reflect);
    }
    Ok(intents)
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let defaults = SchedulingConfig::default();
        let mut scheduling = defaults.clone();
        scheduling.min_input_gap = millis_var("DUET_MIN_INPUT_GAP_MS", defaults.min_input_gap)?;
        scheduling.pacing.min_gap = millis_var("DUET_MIN_GAP_MS", defaults.pacing.min_gap)?;
        scheduling.pacing.fallback_clip =
            millis_var("DUET_FALLBACK_CLIP_MS", defaults.pacing.fallback_clip)?;
        scheduling.moods.warm_after =
            parse_var("DUET_WARM_AFTER")?.unwrap_or(defaults.moods.warm_after);
        scheduling.moods.reflective_after =
            parse_var("DUET_REFLECTIVE_AFTER")?.unwrap_or(defaults.moods.reflective_after);
        if scheduling.moods.reflective_after < scheduling.moods.warm_after {
            return Err(ConfigError::InvalidValue(
                "DUET_REFLECTIVE_AFTER".to_string(),
                format!(
                    "must not be below DUET_WARM_AFTER ({})",
                    scheduling.moods.warm_after
                ),
            ));
        }

        let odds = NarratorOdds::default();
        let narrator_odds = NarratorOdds {
            on_reflect: probability_var("DUET_NARRATOR_ODDS_REFLECT", odds.on_reflect)?,
            otherwise: probability_var("DUET_NARRATOR_ODDS", odds.otherwise)?,
        };

        let allowed_intents = intents_var("DUET_ALLOWED_INTENTS")?;
        let seed = parse_var::<u64>("DUET_SEED")?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            scheduling,
            narrator_odds,
            allowed_intents,
            seed,
            log_level,
        })
    }
}
