//! Ambient audio
//!
//! The melody loop starts on the first user gesture and then runs for the
//! rest of the session; only the noise layer follows the angry episodes.

mod backend;
mod engine;
mod score;

pub use backend::TracingBackend;
pub use engine::{AudioBackend, AudioEngineAdapter, NoiseState};

#[cfg(test)]
pub use engine::testing;
