//! Main Entrypoint for the Duet console
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment and the command line.
//! 2. Wiring a session to the template oracle, simulated playback and the log presentation.
//! 3. Feeding input lines to the session, one task per stimulus.
//! 4. Clearing pending speech and waiting for in-flight cycles on shutdown.

use anyhow::Context;
use clap::Parser;
use duet_core::{
    CycleError, CycleOutcome, InteractionSession, SpeechQueueRegistry, TemplateOracle,
};
use duet_service::{
    command::{self, Command},
    config::Config,
    playback::SimulatedPlayback,
    presentation::LogPresentation,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

#[derive(Debug, Parser)]
#[command(version, about = "Talk to the core and its narrator from the terminal")]
struct Args {
    /// Read input lines from this file instead of stdin.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Seed for the reply oracle. Overrides DUET_SEED.
    #[arg(long)]
    seed: Option<u64>,
}

async fn open_input(script: Option<&PathBuf>) -> anyhow::Result<Box<dyn AsyncBufRead + Unpin + Send>> {
    match script {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open script {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(tokio::io::stdin()))),
    }
}

fn report(result: Result<CycleOutcome, CycleError>) {
    match result {
        Ok(CycleOutcome::Rejected) => debug!("Input ignored"),
        Ok(CycleOutcome::Spoke(line)) => {
            debug!(persona = %line.persona, audio = %line.audio, "Cycle finished")
        }
        Err(CycleError::Speech(e)) => warn!(error = %e, "Line was not spoken"),
        Err(e) => error!(error = %e, "Cycle failed"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let args = Args::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Building session...");

    // --- 3. Build the Session ---
    let oracle = match args.seed.or(config.seed) {
        Some(seed) => {
            info!(seed, "Using seeded reply oracle.");
            TemplateOracle::with_seed(config.narrator_odds, seed)
        }
        None => TemplateOracle::new(config.narrator_odds),
    };
    let playback = Arc::new(SimulatedPlayback::new(config.scheduling.pacing.fallback_clip));
    let registry = SpeechQueueRegistry::new(playback, config.scheduling.pacing);
    let presentation = Arc::new(LogPresentation::new());
    let session = Arc::new(InteractionSession::new(
        &config.scheduling,
        Arc::new(oracle),
        registry,
        presentation.clone(),
    ));
    session
        .set_allowed_intents(config.allowed_intents.clone())
        .await;

    // --- 4. Read Input ---
    let mut lines = open_input(args.script.as_ref()).await?.lines();
    let mut cycles = JoinSet::new();
    let mut interrupted = false;
    info!("Ready. Type to talk, /click to poke, /quit to leave.");

    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal.");
                interrupted = true;
                break;
            }
            line = lines.next_line() => line.context("Failed to read input")?,
        };
        let Some(line) = line else {
            info!("End of input.");
            break;
        };

        match command::parse(&line) {
            Ok(None) => {}
            Ok(Some(Command::Stimulus(stimulus))) => {
                let session = session.clone();
                cycles.spawn(async move { session.handle(stimulus).await });
            }
            Ok(Some(Command::SetIntents(intents))) => session.set_allowed_intents(intents).await,
            Ok(Some(Command::Wait(pause))) => tokio::time::sleep(pause).await,
            Ok(Some(Command::Status)) => {
                let snapshot = session.snapshot().await;
                info!(
                    snapshot = %serde_json::to_string(&snapshot)?,
                    transcript = %serde_json::to_string(&presentation.transcript())?,
                    "Status"
                );
            }
            Ok(Some(Command::Quit)) => break,
            Err(e) => warn!(error = %e, "Could not read that"),
        }

        while let Some(finished) = cycles.try_join_next() {
            report(finished.context("Cycle task panicked")?);
        }
    }

    // --- 5. Shut Down ---
    if interrupted {
        let dropped = session.cancel_pending().await;
        info!(dropped, "Pending lines cleared.");
    }
    while let Some(finished) = cycles.join_next().await {
        report(finished.context("Cycle task panicked")?);
    }
    let dropped = session.cancel_pending().await;
    if dropped > 0 {
        info!(dropped, "Pending lines cleared.");
    }

    let final_state = session.snapshot().await;
    info!(
        interactions = final_state.interaction_count,
        mood = %final_state.mood,
        "Session has shut down."
    );
    Ok(())
}
