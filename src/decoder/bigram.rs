use super::{first_max, key_at};
use crate::{Emissions, Key, Transitions};
use debug_unsafe::slice::SliceGetter;
use strum::EnumCount;

const N: usize = Key::COUNT;
const BOUNDARY: usize = Key::Boundary as usize;

/// First order Viterbi trellis, one row of `N` states per time step.
///
/// `backpointers[t][s]` is the state at `t - 1` on the best path ending in `s` at `t`.
/// Row 0 points at the boundary that virtually precedes the input.
pub(super) struct BigramTrellis {
    len: usize,
    scores: Vec<f64>,
    backpointers: Vec<usize>,
}

impl BigramTrellis {
    pub(super) fn forward(
        transitions: &Transitions,
        emissions: &Emissions,
        observed: &[Key],
    ) -> Self {
        let len = observed.len();
        let mut scores = vec![f64::NEG_INFINITY; len * N];
        let mut backpointers = vec![BOUNDARY; len * N];

        let Some(&first) = observed.first() else {
            return Self {
                len,
                scores,
                backpointers,
            };
        };

        for (state, score) in scores.iter_mut().take(N).enumerate() {
            *score = transitions.bigram(BOUNDARY, state)
                + emissions.log_probability(state, first as usize);
        }

        for (t, &key) in observed.iter().enumerate().skip(1) {
            let (done, rest) = scores.split_at_mut(t * N);
            let previous = &done[(t - 1) * N..];
            let current = &mut rest[..N];
            let pointers = &mut backpointers[t * N..(t + 1) * N];

            for (state, (score, pointer)) in current.iter_mut().zip(pointers).enumerate() {
                let emission = emissions.log_probability(state, key as usize);
                let (best_previous, best) = first_max(
                    previous
                        .iter()
                        .enumerate()
                        .map(|(prev, &v)| v + transitions.bigram(prev, state) + emission),
                );
                *score = best;
                *pointer = best_previous;
            }
        }

        Self {
            len,
            scores,
            backpointers,
        }
    }

    /// Best path and its log-probability, walked back from the best final state.
    /// Empty trellis gives an empty path with the probability of 1.
    pub(super) fn best_path(&self) -> (Vec<Key>, f64) {
        if self.len == 0 {
            return (Vec::new(), 0.0);
        }

        let last_row = &self.scores[(self.len - 1) * N..];
        let (mut state, score) = first_max(last_row.iter().copied());

        let mut path = vec![Key::Boundary; self.len];
        for t in (0..self.len).rev() {
            *path.get_safe_unchecked_mut(t) = key_at(state);
            state = *self.backpointers.get_safe_unchecked(t * N + state);
        }

        (path, score)
    }

    #[cfg(test)]
    pub(super) fn score(&self, t: usize, state: Key) -> f64 {
        self.scores[t * N + state as usize]
    }

    #[cfg(test)]
    pub(super) fn backpointer(&self, t: usize, state: Key) -> Key {
        key_at(self.backpointers[t * N + state as usize])
    }

    #[cfg(test)]
    pub(super) fn scores(&self) -> &[f64] {
        &self.scores
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{keys_from_str, Order};
    use float_cmp::approx_eq;
    use strum::IntoEnumIterator;

    fn trellis(transitions: &Transitions, emissions: &Emissions, observed: &str) -> BigramTrellis {
        BigramTrellis::forward(transitions, emissions, &keys_from_str(observed).unwrap())
    }

    #[test]
    fn test_empty() {
        let t = trellis(&Transitions::new(Order::Bi, 0.0), &Emissions::default(), "");
        assert!(t.scores().is_empty());
        assert_eq!(t.best_path(), (Vec::new(), 0.0));
    }

    #[test]
    fn test_initialization() {
        let mut transitions = Transitions::new(Order::Bi, -1.0);
        transitions.set(&[Key::Boundary], Key::L, -0.25);
        let emissions = Emissions::default();
        let t = trellis(&transitions, &emissions, "o");

        for state in Key::iter() {
            let expected = transitions.get(&[Key::Boundary], state) + emissions.get(state, Key::O);
            assert_eq!(t.score(0, state), expected);
            assert_eq!(t.backpointer(0, state), Key::Boundary);
        }
        assert!(approx_eq!(
            f64,
            t.score(0, Key::L),
            -0.25 + 0.1_f64.ln(),
            ulps = 2
        ));
    }

    #[test]
    fn test_recurrence() {
        let transitions = Transitions::new(Order::Bi, 0.0);
        let emissions = Emissions::default();
        let t = trellis(&transitions, &emissions, "ol");

        // best predecessor of `l` at t = 1 is `o`, which was typed exactly
        assert_eq!(t.backpointer(1, Key::L), Key::O);
        assert!(approx_eq!(
            f64,
            t.score(1, Key::L),
            emissions.get(Key::O, Key::O) + emissions.get(Key::L, Key::L),
            ulps = 2
        ));
    }

    #[test]
    fn test_scores_are_log_probabilities() {
        let mut transitions = Transitions::new(Order::Bi, 0.0);
        transitions.set(&[Key::H], Key::E, -0.3);
        transitions.set(&[Key::E], Key::L, -1.7);
        transitions.set(&[Key::L], Key::Boundary, f64::NEG_INFINITY);
        let t = trellis(&transitions, &Emissions::default(), "hello world#");

        assert!(t.scores().iter().all(|&v| v <= 0.0));
        assert!(!t.scores().iter().any(|v| v.is_nan()));
    }

    #[test]
    fn test_impossible_cells_point_to_first_state() {
        let t = trellis(
            &Transitions::new(Order::Bi, 0.0),
            &Emissions::new(0.0).unwrap(),
            "ab",
        );
        assert_eq!(t.score(1, Key::Z), f64::NEG_INFINITY);
        assert_eq!(t.backpointer(1, Key::Z), Key::A);
        assert_eq!(t.backpointer(1, Key::B), Key::A);
    }

    #[test]
    fn test_tie_picks_lowest_predecessor() {
        let mut transitions = Transitions::new(Order::Bi, f64::NEG_INFINITY);
        // `w` and `e` both neighbour `s`, and are equally likely after the boundary
        transitions.set(&[Key::Boundary], Key::W, 0.0);
        transitions.set(&[Key::Boundary], Key::E, 0.0);
        transitions.set(&[Key::W], Key::S, 0.0);
        transitions.set(&[Key::E], Key::S, 0.0);
        transitions.set(&[Key::S], Key::Boundary, 0.0);
        let t = trellis(&transitions, &Emissions::default(), "ss#");

        assert_eq!(t.score(0, Key::W), t.score(0, Key::E));
        assert_eq!(t.backpointer(1, Key::S), Key::E);

        let (path, score) = t.best_path();
        assert_eq!(path, vec![Key::E, Key::S, Key::Boundary]);
        assert!(approx_eq!(
            f64,
            score,
            0.1_f64.ln() + 0.4_f64.ln(),
            epsilon = 1e-12
        ));
    }
}
