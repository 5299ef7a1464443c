//! Randomized quality scores for completed reps and failed attempts.
//!
//! Scores are deliberately drawn from integer bands rather than computed
//! exactly, so repeated identical reps do not read back identical numbers.
//! Better quality always maps to a band at least as high.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Inclusive integer score range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreBand {
    pub low: u8,
    pub high: u8,
}

impl ScoreBand {
    pub const fn new(low: u8, high: u8) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, value: u8) -> bool {
        (self.low..=self.high).contains(&value)
    }
}

/// Completed-rep bands, checked in order: the first whose ratio floor is
/// strictly exceeded applies.
pub const COMPLETED_BANDS: [(f32, ScoreBand); 2] = [
    (0.8, ScoreBand::new(95, 100)),
    (0.5, ScoreBand::new(85, 94)),
];
/// Band for completed reps below every ratio floor.
pub const COMPLETED_FALLBACK: ScoreBand = ScoreBand::new(75, 84);

/// Failed-attempt bands, checked in order: the first whose shortfall ceiling
/// is strictly above the attempt's shortfall applies.
pub const FAILED_BANDS: [(f32, ScoreBand); 2] = [
    (15.0, ScoreBand::new(60, 70)),
    (30.0, ScoreBand::new(40, 59)),
];
/// Band for attempts that fell short by 30 degrees or more.
pub const FAILED_FALLBACK: ScoreBand = ScoreBand::new(20, 39);

/// Whether a score belongs to a counted rep or an abandoned attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepOutcome {
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepScore {
    pub value: u8,
    pub outcome: RepOutcome,
}

/// Share of form-passing active frames that were perfect; 0 with no frames.
pub fn quality_ratio(perfect_frames: u32, standard_frames: u32) -> f32 {
    let total = perfect_frames + standard_frames;
    if total == 0 {
        return 0.0;
    }
    perfect_frames as f32 / total as f32
}

/// Sole source of score draws.
pub struct ScoringEngine<R = StdRng> {
    rng: R,
}

impl ScoringEngine<StdRng> {
    /// Engine seeded from the operating system.
    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> ScoringEngine<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn completed_band(ratio: f32) -> ScoreBand {
        COMPLETED_BANDS
            .iter()
            .find(|(floor, _)| ratio > *floor)
            .map(|(_, band)| *band)
            .unwrap_or(COMPLETED_FALLBACK)
    }

    pub fn failed_band(shortfall: f32) -> ScoreBand {
        FAILED_BANDS
            .iter()
            .find(|(ceiling, _)| shortfall < *ceiling)
            .map(|(_, band)| *band)
            .unwrap_or(FAILED_FALLBACK)
    }

    pub fn completed_rep(&mut self, ratio: f32) -> RepScore {
        RepScore {
            value: self.draw(Self::completed_band(ratio)),
            outcome: RepOutcome::Completed,
        }
    }

    pub fn failed_attempt(&mut self, shortfall: f32) -> RepScore {
        RepScore {
            value: self.draw(Self::failed_band(shortfall)),
            outcome: RepOutcome::Failed,
        }
    }

    fn draw(&mut self, band: ScoreBand) -> u8 {
        self.rng.random_range(band.low..=band.high)
    }
}
