//! Canned Socratic replies
//!
//! The catalog is immutable data; selection is a pure function of the
//! supplied random source.

use rand::seq::SliceRandom;
use rand::Rng;

/// Reply given to the first and second consecutive trigger submissions
pub const ECHO_REPLY: &str = "Why not?";

/// Shown immediately on escalation
pub const ANGRY_REPLY: &str = "WHY DO YOU KEEP ASKING ME THAT?!";

/// Shown when the angry episode ends
pub const RECOVERY_REPLY: &str = "ok, why dont we start again";

/// Catalog of normal replies
pub const CATALOG: &[&str] = &[
    "Why?",
    "But why is that?",
    "Why do you say that?",
    "Why do you feel that way?",
    "Could you elaborate on why that is?",
    "Why do you think that is the reason?",
    "And why is that important to you?",
    "Why do you believe that leads to your conclusion?",
    "Why that specific word choice?",
    "Tell me more about the 'why' of it.",
    "Interesting. Why do you believe that to be true?",
    "And why does that matter so much?",
    "Why do you think that's the underlying reason?",
    "Why has this come up for you now?",
    "Why do you think that is the source of this feeling?",
    "Why does that particular detail stand out?",
    "And what's behind that 'why' for you?",
];

/// Picks replies from [`CATALOG`]
#[derive(Debug, Clone)]
pub struct ResponseSelector {
    trigger: String,
}

impl ResponseSelector {
    /// Create a selector that knows which word counts as the trigger phrase
    pub fn new(trigger: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into().to_lowercase(),
        }
    }

    /// Uniformly pick one catalog entry.
    ///
    /// With `exclude_trigger` set, entries that say nothing but the trigger
    /// word (ignoring case and punctuation, e.g. "Why?") are skipped.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R, exclude_trigger: bool) -> &'static str {
        let candidates: Vec<&'static str> = CATALOG
            .iter()
            .copied()
            .filter(|reply| !exclude_trigger || !self.is_bare_trigger(reply))
            .collect();

        // The catalog always keeps non-trigger entries, so this never falls back
        candidates.choose(rng).copied().unwrap_or(CATALOG[0])
    }

    fn is_bare_trigger(&self, reply: &str) -> bool {
        let bare: String = reply
            .chars()
            .filter(|c| c.is_alphanumeric() || c.is_whitespace())
            .collect();
        bare.trim().to_lowercase() == self.trigger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_pick_is_deterministic_for_fixed_source() {
        let selector = ResponseSelector::new("why");
        let mut rng = StepRng::new(0, 0);
        assert_eq!(selector.pick(&mut rng, false), CATALOG[0]);
        assert_eq!(selector.pick(&mut rng, false), CATALOG[0]);
    }

    #[test]
    fn test_pick_excluding_trigger_skips_bare_why() {
        let selector = ResponseSelector::new("why");
        let mut rng = StepRng::new(0, 0);
        // CATALOG[0] is "Why?", so the first remaining candidate is next
        assert_eq!(selector.pick(&mut rng, true), CATALOG[1]);

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            assert_ne!(selector.pick(&mut rng, true), "Why?");
        }
    }

    #[test]
    fn test_pick_covers_catalog() {
        let selector = ResponseSelector::new("why");
        let mut rng = StdRng::seed_from_u64(42);
        let seen: HashSet<_> = (0..2000).map(|_| selector.pick(&mut rng, false)).collect();
        assert_eq!(seen.len(), CATALOG.len());
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let selector = ResponseSelector::new("why");
        let mut a = StdRng::seed_from_u64(3);
        let mut b = StdRng::seed_from_u64(3);
        let first: Vec<_> = (0..10).map(|_| selector.pick(&mut a, false)).collect();
        let second: Vec<_> = (0..10).map(|_| selector.pick(&mut b, false)).collect();
        assert_eq!(first, second);
    }
}
