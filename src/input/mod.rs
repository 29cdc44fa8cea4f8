//! Input module for user gestures and submissions
//!
//! Reads questions from the terminal and turns each line into a gesture
//! plus a submission for the coordinator.

mod gesture;
mod listener;

pub use gesture::{InputEvent, UserGesture};
pub use listener::{InputFormat, InputListener};

#[cfg(test)]
pub use gesture::Gesture;
