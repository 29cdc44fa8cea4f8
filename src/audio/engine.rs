//! Audio engine lifecycle
//!
//! Wraps an [`AudioBackend`] and guarantees that the context and the
//! transport are each started at most once, and that the noise layer is
//! toggled in on/off pairs. The backend only hears about noise while the
//! context is running; before that the noise state is tracked alone.

use tracing::{debug, info, warn};

use crate::input::UserGesture;

use super::score::{AmbientScore, NoiseSpec, ANGRY_NOISE, COUNSELOR_SCORE};

/// Errors reported by an audio backend
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("audio context activation was not allowed")]
    NotAllowed,

    #[error("audio output unavailable: {0}")]
    Unavailable(String),

    #[error("loop is already started")]
    AlreadyStarted,
}

/// Primitives consumed from the underlying audio engine
pub trait AudioBackend {
    /// Request the audio context to run; may be refused
    fn resume_context(&mut self) -> Result<(), AudioError>;
    /// Start the transport clock at `bpm`
    fn start_transport(&mut self, bpm: f64) -> Result<(), AudioError>;
    /// Schedule `score` to loop forever on the transport
    fn start_loop(&mut self, score: &AmbientScore) -> Result<(), AudioError>;
    /// Start the noise generator
    fn start_noise(&mut self, noise: &NoiseSpec) -> Result<(), AudioError>;
    /// Stop the noise generator
    fn stop_noise(&mut self) -> Result<(), AudioError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextState {
    #[default]
    Suspended,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Stopped,
    Started,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoiseState {
    #[default]
    Off,
    On,
}

/// Lifecycle state of the audio engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AudioState {
    pub context: ContextState,
    pub transport: TransportState,
    pub noise: NoiseState,
}

/// Owns the audio backend and its lifecycle state
pub struct AudioEngineAdapter<B: AudioBackend> {
    backend: B,
    state: AudioState,
    score: AmbientScore,
    noise: NoiseSpec,
    /// Whether the backend generator is actually sounding
    backend_noise: bool,
}

impl<B: AudioBackend> AudioEngineAdapter<B> {
    /// Adapter playing the counselor score and angry noise
    pub fn new(backend: B) -> Self {
        Self::with_score(backend, COUNSELOR_SCORE, ANGRY_NOISE)
    }

    pub fn with_score(backend: B, score: AmbientScore, noise: NoiseSpec) -> Self {
        Self {
            backend,
            state: AudioState::default(),
            score,
            noise,
            backend_noise: false,
        }
    }

    pub fn state(&self) -> AudioState {
        self.state
    }

    /// Context running and loop started
    pub fn is_running(&self) -> bool {
        self.state.context == ContextState::Running
            && self.state.transport == TransportState::Started
    }

    /// Activate the context and start the loop on a user gesture.
    ///
    /// Safe to call on every gesture: only the first successful call has an
    /// effect. Returns whether audio is now fully running. A refused
    /// activation leaves the context suspended for the next gesture.
    pub fn ensure_started(&mut self, gesture: &UserGesture) -> bool {
        if self.state.context == ContextState::Suspended {
            match self.backend.resume_context() {
                Ok(()) => {
                    self.state.context = ContextState::Running;
                    info!(gesture = %gesture.kind(), "audio context running");
                }
                Err(e) => {
                    warn!(%e, "audio context activation failed, retrying on next gesture");
                    return false;
                }
            }
        }

        self.start_loop();
        if self.state.noise == NoiseState::On {
            self.sound_noise();
        }
        self.is_running()
    }

    /// Start the transport and the melody loop once the context runs
    pub fn start_loop(&mut self) {
        if self.state.transport == TransportState::Started {
            return;
        }
        if self.state.context != ContextState::Running {
            debug!("loop start deferred until the audio context runs");
            return;
        }

        let started = self
            .backend
            .start_transport(self.score.bpm)
            .and_then(|_| self.backend.start_loop(&self.score));
        match started {
            Ok(()) => {
                self.state.transport = TransportState::Started;
                let notes = self.score.notes.len();
                info!(bpm = self.score.bpm, notes, "ambient loop started");
            }
            Err(e) => warn!(%e, "failed to start ambient loop"),
        }
    }

    /// Turn the angry noise layer on
    pub fn start_noise(&mut self) {
        if self.state.noise == NoiseState::On {
            warn!("noise already on");
            return;
        }
        self.state.noise = NoiseState::On;
        debug!(color = %self.noise.color, volume_db = self.noise.volume_db, "noise on");
        self.sound_noise();
    }

    /// Turn the angry noise layer off
    pub fn stop_noise(&mut self) {
        if self.state.noise == NoiseState::Off {
            debug!("noise already off");
            return;
        }
        if self.backend_noise {
            if let Err(e) = self.backend.stop_noise() {
                warn!(%e, "failed to stop noise");
            }
            self.backend_noise = false;
        }
        self.state.noise = NoiseState::Off;
        debug!("noise off");
    }

    fn sound_noise(&mut self) {
        if self.backend_noise {
            return;
        }
        if self.state.context != ContextState::Running {
            debug!("noise kept silent until the audio context runs");
            return;
        }
        match self.backend.start_noise(&self.noise) {
            Ok(()) => self.backend_noise = true,
            Err(e) => warn!(%e, "failed to start noise"),
        }
    }
}
