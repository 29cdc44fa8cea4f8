//! The single outstanding scheduled transition

use serde::{Deserialize, Serialize};
use tokio::time::{Duration, Instant};

/// What happens when the pending timer fires
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerKind {
    /// Reveal a normal or echo reply after the "thinking" pause
    RevealReply(Reply),
    /// End the angry episode
    AngryRecovery,
}

/// Reply waiting to be revealed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub kind: ReplyKind,
    pub text: String,
}

/// Where a revealed reply came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    /// Picked from the catalog
    Normal,
    /// Fixed answer to a repeated trigger phrase
    Echo,
}

impl std::fmt::Display for ReplyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplyKind::Normal => write!(f, "normal"),
            ReplyKind::Echo => write!(f, "echo"),
        }
    }
}

/// A scheduled transition with its deadline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTimer {
    pub kind: TimerKind,
    pub scheduled_at: Instant,
    pub due_at: Instant,
}

impl PendingTimer {
    /// Schedule `kind` to fire `delay` after `now`
    pub fn schedule(kind: TimerKind, now: Instant, delay: Duration) -> Self {
        Self {
            kind,
            scheduled_at: now,
            due_at: now + delay,
        }
    }

    /// Whether the deadline has been reached at `now`
    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.due_at
    }
}
