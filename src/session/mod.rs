//! Counselor session wiring
//!
//! One coordinator owns the conversation state, the audio engine and the
//! display for the lifetime of the process.

mod coordinator;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

pub use coordinator::InteractionCoordinator;

/// Mixed into the seed so the palette stream differs from the reply stream
const PALETTE_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

/// Independent random sources for reply selection and highlight colors
pub struct RandomSources {
    pub replies: Box<dyn RngCore + Send>,
    pub palette: Box<dyn RngCore + Send>,
}

impl RandomSources {
    /// Seeded sources are reproducible; unseeded ones draw from entropy
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self {
                replies: Box::new(StdRng::seed_from_u64(seed)),
                palette: Box::new(StdRng::seed_from_u64(seed ^ PALETTE_STREAM)),
            },
            None => Self {
                replies: Box::new(StdRng::from_entropy()),
                palette: Box::new(StdRng::from_entropy()),
            },
        }
    }
}
