//! Line input listener
//!
//! Reads input line by line on a dedicated thread. In `Lines` format each
//! line is a key-press gesture followed by a submission. In `Json` format
//! each line is one [`HostMessage`], so a host can report clicks and
//! key-presses separately from submissions.

use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::gesture::{Gesture, InputEvent, UserGesture};

/// How input lines are interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputFormat {
    /// Every line is a typed question
    #[default]
    Lines,
    /// Every line is a JSON-encoded [`HostMessage`]
    Json,
}

/// Messages from a host embedding the counselor
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostMessage {
    /// Pointer click anywhere on the page
    Click,
    /// Key pressed anywhere on the page
    KeyPress,
    /// Question submitted from the input field
    Submit { text: String },
}

impl From<HostMessage> for InputEvent {
    fn from(message: HostMessage) -> Self {
        match message {
            HostMessage::Click => InputEvent::Gesture(UserGesture::new(Gesture::Click)),
            HostMessage::KeyPress => InputEvent::Gesture(UserGesture::new(Gesture::KeyPress)),
            HostMessage::Submit { text } => InputEvent::Submit(text),
        }
    }
}

/// Listener forwarding user input to the coordinator
pub struct InputListener {
    event_tx: mpsc::Sender<InputEvent>,
    format: InputFormat,
    running: Arc<AtomicBool>,
}

impl InputListener {
    /// Create a new input listener
    pub fn new(event_tx: mpsc::Sender<InputEvent>, format: InputFormat) -> Self {
        Self {
            event_tx,
            format,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start reading standard input
    pub fn start(&self) -> Result<(), InputError> {
        self.start_reading(|| io::stdin().lock())
    }

    /// Start reading from the reader built by `open` on the listener thread.
    ///
    /// The listener runs until the reader is exhausted, the coordinator
    /// goes away, or `stop()` is called.
    pub fn start_reading<R, F>(&self, open: F) -> Result<(), InputError>
    where
        R: BufRead,
        F: FnOnce() -> R + Send + 'static,
    {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(InputError::AlreadyRunning);
        }

        let event_tx = self.event_tx.clone();
        let format = self.format;
        let running = Arc::clone(&self.running);

        let spawned = thread::Builder::new()
            .name("input-listener".to_string())
            .spawn(move || {
                info!(?format, "input listener thread started");

                if let Err(e) = read_lines(open(), format, &event_tx, &running) {
                    error!(?e, "input listener error");
                }

                running.store(false, Ordering::SeqCst);
                info!("input listener thread stopped");
            });

        if let Err(e) = spawned {
            self.running.store(false, Ordering::SeqCst);
            return Err(InputError::ThreadSpawn(e.to_string()));
        }

        Ok(())
    }

    /// Stop forwarding input; takes effect at the next line
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Check if the listener is currently running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Errors that can occur in the input listener
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("input listener is already running")]
    AlreadyRunning,

    #[error("failed to spawn listener thread: {0}")]
    ThreadSpawn(String),

    #[error("failed to read input: {0}")]
    Read(#[from] io::Error),
}

fn read_lines<R: BufRead>(
    reader: R,
    format: InputFormat,
    event_tx: &mpsc::Sender<InputEvent>,
    running: &AtomicBool,
) -> Result<(), InputError> {
    for line in reader.lines() {
        if !running.load(Ordering::SeqCst) {
            break;
        }
        let line = line?;

        for event in decode_line(format, line) {
            if event_tx.blocking_send(event).is_err() {
                warn!("failed to send input event - channel closed?");
                return Ok(());
            }
        }
    }

    debug!("input stream ended");
    Ok(())
}

fn decode_line(format: InputFormat, line: String) -> Vec<InputEvent> {
    match format {
        InputFormat::Lines => vec![
            InputEvent::Gesture(UserGesture::new(Gesture::KeyPress)),
            InputEvent::Submit(line),
        ],
        InputFormat::Json => {
            if line.trim().is_empty() {
                return Vec::new();
            }
            match serde_json::from_str::<HostMessage>(&line) {
                Ok(message) => vec![message.into()],
                Err(e) => {
                    warn!(%e, "skipping malformed host message");
                    Vec::new()
                }
            }
        }
    }
}
