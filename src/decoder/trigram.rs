use super::{first_max, key_at};
use crate::{Emissions, Key, Transitions};
use debug_unsafe::slice::SliceGetter;
use itertools::iproduct;
use strum::EnumCount;

const N: usize = Key::COUNT;
const BOUNDARY: usize = Key::Boundary as usize;
/// Cells in one time slice: every (previous, current) key pair.
const SLICE: usize = N * N;

/// Second order Viterbi trellis. A state is the pair of the two latest keys,
/// so every time step holds an `N x N` slice indexed by `(previous, current)`.
///
/// `backpointers[t][j][k]` is the key `i` at `t - 2` on the best path whose
/// keys at `t - 1` and `t` are `j` and `k`.
pub(super) struct TrigramTrellis {
    len: usize,
    scores: Vec<f64>,
    backpointers: Vec<usize>,
}

#[inline(always)]
const fn cell(previous: usize, current: usize) -> usize {
    previous * N + current
}

impl TrigramTrellis {
    /// Runs in `O(len * N^3)`, the dominant cost of decoding long texts.
    pub(super) fn forward(
        transitions: &Transitions,
        emissions: &Emissions,
        observed: &[Key],
    ) -> Self {
        let len = observed.len();
        let mut scores = vec![f64::NEG_INFINITY; len * SLICE];
        let mut backpointers = vec![BOUNDARY; len * SLICE];

        let Some(&first) = observed.first() else {
            return Self {
                len,
                scores,
                backpointers,
            };
        };

        // only the context of two boundaries is reachable before the first key
        for current in 0..N {
            *scores.get_safe_unchecked_mut(cell(BOUNDARY, current)) =
                transitions.trigram(BOUNDARY, BOUNDARY, current)
                    + emissions.log_probability(current, first as usize);
        }

        for (t, &key) in observed.iter().enumerate().skip(1) {
            let (done, rest) = scores.split_at_mut(t * SLICE);
            let previous = &done[(t - 1) * SLICE..];
            let current = &mut rest[..SLICE];
            let pointers = &mut backpointers[t * SLICE..(t + 1) * SLICE];

            for ((j, k), (score, pointer)) in
                iproduct!(0..N, 0..N).zip(current.iter_mut().zip(pointers))
            {
                let emission = emissions.log_probability(k, key as usize);
                let (best_i, best) = first_max((0..N).map(|i| {
                    *previous.get_safe_unchecked(cell(i, j))
                        + transitions.trigram(i, j, k)
                        + emission
                }));
                *score = best;
                *pointer = best_i;
            }
        }

        Self {
            len,
            scores,
            backpointers,
        }
    }

    /// Best path and its log-probability. The best final pair is the first
    /// maximum of the last slice in row-major order.
    pub(super) fn best_path(&self) -> (Vec<Key>, f64) {
        if self.len == 0 {
            return (Vec::new(), 0.0);
        }

        let last_slice = &self.scores[(self.len - 1) * SLICE..];
        let (best_cell, score) = first_max(last_slice.iter().copied());
        let (mut previous, mut current) = (best_cell / N, best_cell % N);

        let mut path = vec![Key::Boundary; self.len];
        for t in (0..self.len).rev() {
            *path.get_safe_unchecked_mut(t) = key_at(current);
            let before = *self
                .backpointers
                .get_safe_unchecked(t * SLICE + cell(previous, current));
            current = previous;
            previous = before;
        }

        (path, score)
    }

    #[cfg(test)]
    pub(super) fn score(&self, t: usize, previous: Key, current: Key) -> f64 {
        self.scores[t * SLICE + cell(previous as usize, current as usize)]
    }

    #[cfg(test)]
    pub(super) fn backpointer(&self, t: usize, previous: Key, current: Key) -> Key {
        key_at(self.backpointers[t * SLICE + cell(previous as usize, current as usize)])
    }

    #[cfg(test)]
    pub(super) fn scores(&self) -> &[f64] {
        &self.scores
    }
}
