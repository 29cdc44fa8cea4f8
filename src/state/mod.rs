//! Conversation state machine
//!
//! Three modes:
//! - Idle: waiting for a question, input enabled
//! - AwaitingReply: a reply is revealed after the reply delay
//! - Angry: entered on the third consecutive "why", held for the recovery delay

mod machine;
mod timer;

pub use machine::{Decision, EscalationController, Fired, Timings, TRIGGER_PHRASE};
pub use timer::ReplyKind;

#[cfg(test)]
pub use machine::Mode;
