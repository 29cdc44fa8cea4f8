//! Headless audio backend
//!
//! Drives the score on a tokio task and reports every note and noise
//! transition through tracing instead of a sound device.

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{info, trace};

use super::engine::{AudioBackend, AudioError};
use super::score::{AmbientScore, NoiseSpec};

/// Backend that plays the score into the log
pub struct TracingBackend {
    muted: bool,
    player: Option<JoinHandle<()>>,
}

impl TracingBackend {
    pub fn new(muted: bool) -> Self {
        Self {
            muted,
            player: None,
        }
    }

    /// Whether the loop task is alive
    #[cfg(test)]
    pub fn is_playing(&self) -> bool {
        self.player.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl AudioBackend for TracingBackend {
    /// Refused outside a tokio runtime, where no loop could be scheduled
    fn resume_context(&mut self) -> Result<(), AudioError> {
        Handle::try_current()
            .map(|_| ())
            .map_err(|_| AudioError::NotAllowed)
    }

    fn start_transport(&mut self, bpm: f64) -> Result<(), AudioError> {
        info!(bpm, muted = self.muted, "transport started");
        Ok(())
    }

    fn start_loop(&mut self, score: &AmbientScore) -> Result<(), AudioError> {
        if self.player.is_some() {
            return Err(AudioError::AlreadyStarted);
        }
        let handle =
            Handle::try_current().map_err(|e| AudioError::Unavailable(e.to_string()))?;
        let score = score.clone();
        let muted = self.muted;

        self.player = Some(handle.spawn(async move {
            let mut pass_start = Instant::now();
            loop {
                for note in score.notes {
                    sleep_until(pass_start + score.offset_of(note)).await;
                    if !muted {
                        trace!(pitch = note.pitch, beats = note.beats, "note");
                    }
                }
                pass_start += score.loop_length();
                sleep_until(pass_start).await;
            }
        }));
        Ok(())
    }

    fn start_noise(&mut self, noise: &NoiseSpec) -> Result<(), AudioError> {
        if !self.muted {
            info!(color = %noise.color, volume_db = noise.volume_db, "noise started");
        }
        Ok(())
    }

    fn stop_noise(&mut self) -> Result<(), AudioError> {
        if !self.muted {
            info!("noise stopped");
        }
        Ok(())
    }
}

impl Drop for TracingBackend {
    fn drop(&mut self) {
        if let Some(player) = self.player.take() {
            player.abort();
        }
    }
}
