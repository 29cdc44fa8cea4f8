//! Escalation state machine
//!
//! Classifies submissions, counts consecutive trigger phrases and owns the
//! single pending timer that returns the conversation to Idle.

use rand::RngCore;
use tokio::time::{Duration, Instant};
use tracing::{debug, info};

use crate::replies::{ResponseSelector, ECHO_REPLY};

use super::timer::{PendingTimer, Reply, ReplyKind, TimerKind};

/// The normalized trigger phrase
pub const TRIGGER_PHRASE: &str = "why";

/// Consecutive trigger submissions that cause an angry episode
pub const ESCALATION_THRESHOLD: u32 = 3;

/// Reveal delay, in time-units
pub const REPLY_DELAY_UNITS: u32 = 3;

/// Recovery delay, in time-units
pub const RECOVERY_DELAY_UNITS: u32 = 5;

/// Interaction phase of the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Waiting for a submission, input enabled
    Idle,
    /// A reply is "thinking", input locked
    AwaitingReply,
    /// Angry interruption, input locked until recovery
    Angry,
}

impl Default for Mode {
    fn default() -> Self {
        Self::Idle
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Idle => write!(f, "Idle"),
            Mode::AwaitingReply => write!(f, "AwaitingReply"),
            Mode::Angry => write!(f, "Angry"),
        }
    }
}

/// Conversation state for one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversationState {
    /// Consecutive count of the trigger phrase
    pub repeat_count: u32,
    /// Current interaction phase
    pub mode: Mode,
}

impl ConversationState {
    /// Input is locked whenever a reply or recovery is pending
    pub fn input_locked(&self) -> bool {
        self.mode != Mode::Idle
    }
}

/// Outcome of classifying one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Empty input or submitted while locked; nothing happens
    Reject,
    /// Non-trigger input answered from the catalog
    NormalReply(String),
    /// Trigger phrase below the threshold
    EchoReply(String),
    /// Trigger phrase reached the threshold
    AngryEscalation,
}

/// A timer-driven transition back to Idle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fired {
    /// The reveal delay elapsed for this reply
    Revealed(Reply),
    /// The angry episode ended
    Recovered { duration_ms: u64 },
}

/// Delays applied to each timed transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub reply_delay: Duration,
    pub recovery_delay: Duration,
}

impl Timings {
    /// Derive delays from the length of one time-unit
    pub fn from_time_unit(unit: Duration) -> Self {
        Self {
            reply_delay: unit * REPLY_DELAY_UNITS,
            recovery_delay: unit * RECOVERY_DELAY_UNITS,
        }
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self::from_time_unit(Duration::from_secs(1))
    }
}

/// The conversation state machine
pub struct EscalationController {
    state: ConversationState,
    pending: Option<PendingTimer>,
    timings: Timings,
    selector: ResponseSelector,
    rng: Box<dyn RngCore + Send>,
    /// Time when current non-Idle mode was entered
    mode_entered_at: Option<Instant>,
}

impl EscalationController {
    /// Create a controller drawing catalog replies from `rng`
    pub fn new(timings: Timings, rng: Box<dyn RngCore + Send>) -> Self {
        Self {
            state: ConversationState::default(),
            pending: None,
            timings,
            selector: ResponseSelector::new(TRIGGER_PHRASE),
            rng,
            mode_entered_at: None,
        }
    }

    /// Current conversation state
    pub fn state(&self) -> ConversationState {
        self.state
    }

    /// The outstanding timer, if any
    #[cfg(test)]
    pub fn pending(&self) -> Option<&PendingTimer> {
        self.pending.as_ref()
    }

    /// Deadline of the outstanding timer
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|timer| timer.due_at)
    }

    /// Classify a raw submission and advance the state machine
    pub fn classify(&mut self, raw_input: &str, now: Instant) -> Decision {
        let question = raw_input.trim();

        if question.is_empty() {
            debug!("empty submission rejected");
            return Decision::Reject;
        }
        if self.state.input_locked() {
            debug!(mode = %self.state.mode, "submission rejected while input locked");
            return Decision::Reject;
        }

        if !is_trigger(question) {
            self.state.repeat_count = 0;
            let text = self.selector.pick(&mut self.rng, false).to_string();
            self.await_reply(ReplyKind::Normal, &text, now);
            return Decision::NormalReply(text);
        }

        self.state.repeat_count += 1;
        debug!(repeat_count = self.state.repeat_count, "trigger phrase");

        if self.state.repeat_count < ESCALATION_THRESHOLD {
            self.await_reply(ReplyKind::Echo, ECHO_REPLY, now);
            return Decision::EchoReply(ECHO_REPLY.to_string());
        }

        // Escalation skips the reveal delay entirely
        self.transition_to(Mode::AwaitingReply, now);
        self.state.repeat_count = 0;
        self.transition_to(Mode::Angry, now);
        self.pending = Some(PendingTimer::schedule(
            TimerKind::AngryRecovery,
            now,
            self.timings.recovery_delay,
        ));
        Decision::AngryEscalation
    }

    /// Fire the pending timer if its deadline has been reached
    pub fn poll(&mut self, now: Instant) -> Option<Fired> {
        if !self.pending.as_ref()?.is_due(now) {
            return None;
        }
        let timer = self.pending.take()?;

        let fired = match timer.kind {
            TimerKind::RevealReply(reply) => Fired::Revealed(reply),
            TimerKind::AngryRecovery => {
                self.state.repeat_count = 0;
                Fired::Recovered {
                    duration_ms: now.duration_since(timer.scheduled_at).as_millis() as u64,
                }
            }
        };
        self.transition_to(Mode::Idle, now);

        Some(fired)
    }

    fn await_reply(&mut self, kind: ReplyKind, text: &str, now: Instant) {
        self.transition_to(Mode::AwaitingReply, now);
        self.pending = Some(PendingTimer::schedule(
            TimerKind::RevealReply(Reply {
                kind,
                text: text.to_string(),
            }),
            now,
            self.timings.reply_delay,
        ));
    }

    /// Perform a mode transition
    fn transition_to(&mut self, new_mode: Mode, now: Instant) {
        let old_mode = self.state.mode;
        let duration_ms = self
            .mode_entered_at
            .map(|t| now.duration_since(t).as_millis() as u64)
            .unwrap_or(0);

        info!(
            from = %old_mode,
            to = %new_mode,
            duration_ms = duration_ms,
            repeat_count = self.state.repeat_count,
            "mode transition"
        );

        self.state.mode = new_mode;
        self.mode_entered_at = if new_mode != Mode::Idle {
            Some(now)
        } else {
            None
        };
    }
}

/// Trimmed, case-folded equality with the trigger phrase
pub fn is_trigger(input: &str) -> bool {
    input.trim().to_lowercase() == TRIGGER_PHRASE
}
