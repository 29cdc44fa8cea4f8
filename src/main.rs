//! counselor: a terminal Socratic counselor
//!
//! Answers every question with another question, gets angry after the
//! third "why" in a row, and plays an ambient loop once the user has
//! pressed a key.
//!
//! - Explicit escalation state machine with a single pending timer
//! - Audio engine that starts only on a user gesture
//! - Terminal display with highlighted replies

mod audio;
mod config;
mod display;
mod events;
mod input;
mod lifecycle;
mod replies;
mod session;
mod state;

use anyhow::Result;
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::audio::{AudioEngineAdapter, TracingBackend};
use crate::config::Config;
use crate::display::TerminalDisplay;
use crate::events::SessionEvent;
use crate::input::{InputFormat, InputListener};
use crate::lifecycle::ShutdownSignal;
use crate::session::{InteractionCoordinator, RandomSources};
use crate::state::EscalationController;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so the session on stdout stays readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "counselor starting");

    let config = Config::load()?;
    info!(?config, "configuration loaded");

    let shutdown = ShutdownSignal::new();

    // Input listener -> coordinator
    let (input_tx, input_rx) = mpsc::channel(32);
    // Coordinator -> observers
    let (event_tx, mut event_rx) = broadcast::channel::<SessionEvent>(64);

    let random = RandomSources::new(config.seed);
    let controller = EscalationController::new(config.timings(), random.replies);
    let audio = AudioEngineAdapter::new(TracingBackend::new(config.muted));
    let mut coordinator = InteractionCoordinator::new(
        controller,
        audio,
        TerminalDisplay::stdout(),
        random.palette,
        event_tx,
    );

    let input_listener = InputListener::new(input_tx, config.input);
    input_listener.start()?;
    info!(format = ?config.input, "input listener started");

    if config.input == InputFormat::Lines {
        println!("Ask the counselor anything.");
    }

    tokio::select! {
        _ = coordinator.run(input_rx) => {
            info!("session ended");
        }

        _ = async {
            loop {
                match event_rx.recv().await {
                    Ok(event) => {
                        let json = serde_json::to_string(&event).unwrap_or_default();
                        info!(%event, %json, "session event");
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "session event receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        } => {
            info!("session event logger exited");
        }

        result = shutdown.wait() => {
            match result {
                Ok(()) => info!("shutdown signal received"),
                Err(e) => error!(?e, "shutdown signal handler failed"),
            }
        }
    }

    info!("shutting down...");
    if input_listener.is_running() {
        input_listener.stop();
    }
    info!("counselor stopped");

    Ok(())
}
