//! The ambient melody loop and noise layer parameters

use tokio::time::Duration;

/// Beats per measure (4/4)
pub const BEATS_PER_MEASURE: u32 = 4;

/// One note of the loop; positions and lengths are in beats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    pub pitch: &'static str,
    pub at_beat: u32,
    pub beats: u32,
}

const fn note(pitch: &'static str, measure: u32, beat: u32, beats: u32) -> Note {
    Note {
        pitch,
        at_beat: measure * BEATS_PER_MEASURE + beat,
        beats,
    }
}

const HALF: u32 = 2;
const WHOLE: u32 = 4;

/// A looping melody
#[derive(Debug, Clone, PartialEq)]
pub struct AmbientScore {
    pub bpm: f64,
    pub loop_measures: u32,
    pub notes: &'static [Note],
}

/// The counselor's background loop
pub const COUNSELOR_SCORE: AmbientScore = AmbientScore {
    bpm: 72.0,
    loop_measures: 6,
    notes: &[
        note("C3", 0, 0, HALF),
        note("G3", 0, 2, HALF),
        note("E3", 1, 0, WHOLE),
        note("A3", 2, 0, HALF),
        note("G3", 2, 2, HALF),
        note("F3", 3, 0, WHOLE),
        note("D3", 4, 0, HALF),
        note("G3", 4, 2, HALF),
        note("C3", 5, 0, WHOLE),
    ],
};

impl AmbientScore {
    /// Length of one beat
    pub fn beat(&self) -> Duration {
        Duration::from_secs_f64(60.0 / self.bpm)
    }

    /// Length of one full pass through the loop
    pub fn loop_length(&self) -> Duration {
        self.beat().mul_f64((self.loop_measures * BEATS_PER_MEASURE) as f64)
    }

    /// Offset of `note` from the start of the loop
    pub fn offset_of(&self, note: &Note) -> Duration {
        self.beat().mul_f64(note.at_beat as f64)
    }
}

/// Color of the noise generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseColor {
    Pink,
}

impl std::fmt::Display for NoiseColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoiseColor::Pink => write!(f, "pink"),
        }
    }
}

/// Noise layer played during the angry episode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseSpec {
    pub color: NoiseColor,
    pub volume_db: f32,
}

pub const ANGRY_NOISE: NoiseSpec = NoiseSpec {
    color: NoiseColor::Pink,
    volume_db: -20.0,
};
