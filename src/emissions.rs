use crate::{error::BuildError, Key};
use debug_unsafe::slice::SliceGetter;
use strum::{EnumCount, IntoEnumIterator};

/// Probability of a keystroke landing on one particular neighbouring key.
pub const DEFAULT_SLIP_PROBABILITY: f64 = 0.1;

/// Emission matrix `B`: log P(observed key | intended key).
///
/// Every neighbour of the intended key receives the slip probability, the intended
/// key keeps the rest of the mass, and all other keys are impossible.
#[derive(Clone, Debug, PartialEq)]
pub struct Emissions {
    slip_probability: f64,
    log_probabilities: Box<[f64]>,
}

impl Default for Emissions {
    #[inline]
    fn default() -> Self {
        Self::fill(DEFAULT_SLIP_PROBABILITY)
    }
}

impl Emissions {
    /// Fails if the slip probability is outside `0..=1`, or if some key has so many
    /// neighbours that nothing would be left for the key itself.
    pub fn new(slip_probability: f64) -> Result<Self, BuildError> {
        if !(0.0..=1.0).contains(&slip_probability) {
            return Err(BuildError::SlipProbability(slip_probability));
        }
        if let Some(key) =
            Key::iter().find(|k| self_probability(*k, slip_probability) < -f64::EPSILON)
        {
            return Err(BuildError::SlipOverflow {
                key,
                probability: slip_probability,
            });
        }

        Ok(Self::fill(slip_probability))
    }

    fn fill(slip_probability: f64) -> Self {
        let mut log_probabilities =
            vec![f64::NEG_INFINITY; Key::COUNT * Key::COUNT].into_boxed_slice();
        let slip = slip_probability.ln();

        for (intended, row) in Key::iter().zip(log_probabilities.chunks_exact_mut(Key::COUNT)) {
            for &neighbour in intended.neighbours() {
                *row.get_safe_unchecked_mut(neighbour as usize) = slip;
            }
            *row.get_safe_unchecked_mut(intended as usize) =
                self_probability(intended, slip_probability).max(0.0).ln();
        }

        Self {
            slip_probability,
            log_probabilities,
        }
    }

    #[inline(always)]
    pub fn slip_probability(&self) -> f64 {
        self.slip_probability
    }

    /// Log-probability of observing `observed` when `intended` was meant.
    #[inline]
    pub fn get(&self, intended: Key, observed: Key) -> f64 {
        self.log_probability(intended as usize, observed as usize)
    }

    /// `B[intended][observed]`, indices must be in `0..N`
    #[inline(always)]
    pub(crate) fn log_probability(&self, intended: usize, observed: usize) -> f64 {
        *self
            .log_probabilities
            .get_safe_unchecked(intended * Key::COUNT + observed)
    }
}

/// `1 - n * p`. When `p` is one slip in a whole number `d` of keystrokes,
/// computed as `(d - n) / d`, which is exact for the default `p`.
#[inline]
fn self_probability(key: Key, slip_probability: f64) -> f64 {
    let neighbours = key.neighbours().len() as f64;
    let keystrokes = slip_probability.recip();
    if keystrokes.is_finite() && keystrokes.fract() == 0.0 {
        (keystrokes - neighbours) / keystrokes
    } else {
        1.0 - neighbours * slip_probability
    }
}
