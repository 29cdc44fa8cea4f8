//! Events module for session observers
//!
//! Structured events emitted by the coordinator as the conversation and
//! the audio engine change state.

use serde::{Deserialize, Serialize};

use crate::display::Palette;
use crate::state::ReplyKind;

/// Events emitted by the coordinator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A submission was ignored (empty or input locked)
    SubmissionRejected,

    /// A reply is pending behind the reveal delay
    ReplyPending,

    /// The pending reply was revealed
    ReplyRevealed {
        kind: ReplyKind,
        text: String,
        /// Highlight color used for this reveal
        color: Palette,
    },

    /// The third consecutive "why" made the counselor angry
    AngryEntered,

    /// The angry episode ended
    AngryRecovered {
        /// Duration in milliseconds that the angry mode lasted
        duration_ms: u64,
    },

    /// Audio context running and ambient loop started
    AudioStarted,

    /// Noise layer switched on
    NoiseStarted,

    /// Noise layer switched off
    NoiseStopped,
}

impl std::fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionEvent::SubmissionRejected => write!(f, "SUBMISSION_REJECTED"),
            SessionEvent::ReplyPending => write!(f, "REPLY_PENDING"),
            SessionEvent::ReplyRevealed { kind, color, .. } => {
                write!(f, "REPLY_REVEALED ({}, {})", kind, color)
            }
            SessionEvent::AngryEntered => write!(f, "ANGRY_ENTERED"),
            SessionEvent::AngryRecovered { duration_ms } => {
                write!(f, "ANGRY_RECOVERED ({}ms)", duration_ms)
            }
            SessionEvent::AudioStarted => write!(f, "AUDIO_STARTED"),
            SessionEvent::NoiseStarted => write!(f, "NOISE_STARTED"),
            SessionEvent::NoiseStopped => write!(f, "NOISE_STOPPED"),
        }
    }
}
