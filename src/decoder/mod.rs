use crate::{
    error::{BuildError, DecodeError},
    key::{keys_from_str, keys_to_string, BOUNDARY_CHAR},
    Emissions, Key, Order, Transitions,
};
use ::std::{iter, path::Path};
use debug_unsafe::option::OptionUnwrapper;

mod bigram;
mod builder;
mod trigram;

use bigram::BigramTrellis;
pub use builder::DecoderBuilder;
use trigram::TrigramTrellis;

/// Index and value of the first maximum. All `-inf` (or empty) gives index 0.
#[inline]
fn first_max(values: impl Iterator<Item = f64>) -> (usize, f64) {
    let mut best = (0, f64::NEG_INFINITY);
    for (i, v) in values.enumerate() {
        if v > best.1 {
            best = (i, v);
        }
    }
    best
}

/// `index` must be in `0..N`
#[inline(always)]
fn key_at(index: usize) -> Key {
    Key::from_repr(index).unwrap_safe_unchecked()
}

/// Corrects keyboard slips with Viterbi decoding over a hidden Markov model:
/// the transitions are a bigram or trigram language model over keys,
/// the emissions are the chances of hitting a neighbouring key.
///
/// Matrices are read-only after construction, and every decode call owns its
/// trellis, so one decoder can serve any number of threads.
#[derive(Clone, Debug)]
pub struct Decoder {
    transitions: Transitions,
    emissions: Emissions,
}

impl Decoder {
    /// Decoder with the default unseen transition value and slip probability.
    /// Without `probabilities` every transition keeps the unseen value.
    pub fn new(order: Order, probabilities: Option<&Path>) -> Result<Self, BuildError> {
        let mut builder = DecoderBuilder::new(order);
        if let Some(path) = probabilities {
            builder = builder.probabilities(path);
        }
        builder.build()
    }

    #[inline]
    pub(crate) fn from_parts(transitions: Transitions, emissions: Emissions) -> Self {
        Self {
            transitions,
            emissions,
        }
    }

    #[inline(always)]
    pub fn order(&self) -> Order {
        self.transitions.order()
    }

    #[inline(always)]
    pub fn transitions(&self) -> &Transitions {
        &self.transitions
    }

    #[inline(always)]
    pub fn emissions(&self) -> &Emissions {
        &self.emissions
    }

    fn best_path(&self, observed: &[Key]) -> (Vec<Key>, f64) {
        match self.order() {
            Order::Bi => {
                BigramTrellis::forward(&self.transitions, &self.emissions, observed).best_path()
            }
            Order::Tri => {
                TrigramTrellis::forward(&self.transitions, &self.emissions, observed).best_path()
            }
        }
    }

    /// Most probable intended keys, one per observed key, trailing boundaries included.
    #[inline]
    pub fn decode_keys(&self, observed: &[Key]) -> Vec<Key> {
        self.best_path(observed).0
    }

    /// Like [`Decoder::decode`], also returning the log-probability of the decoded path.
    pub fn decode_scored(&self, observed: &str) -> Result<(String, f64), DecodeError> {
        let observed = keys_from_str(observed)?;
        let (mut path, log_probability) = self.best_path(&observed);
        path.truncate(path.len().saturating_sub(self.order().context_len()));

        Ok((keys_to_string(&path), log_probability))
    }

    /// Decodes text that already ends with the boundary markers, one for a bigram
    /// model and two for a trigram model. The markers are dropped from the result.
    #[inline]
    pub fn decode(&self, observed: &str) -> Result<String, DecodeError> {
        self.decode_scored(observed).map(|(text, _)| text)
    }

    /// Like [`Decoder::correct`], also returning the log-probability of the decoded path.
    pub fn correct_scored(&self, text: &str) -> Result<(String, f64), DecodeError> {
        let context_len = self.order().context_len();
        let mut observed = String::with_capacity(text.len() + context_len);
        observed.push_str(text);
        observed.extend(iter::repeat_n(BOUNDARY_CHAR, context_len));

        self.decode_scored(&observed)
    }

    /// Appends the boundary markers required by the model order, then decodes.
    #[inline]
    pub fn correct(&self, text: &str) -> Result<String, DecodeError> {
        self.correct_scored(text).map(|(text, _)| text)
    }

    /// Corrects every text, in parallel where threads are available.
    pub fn correct_all<T: AsRef<str> + Sync>(
        &self,
        texts: &[T],
    ) -> Vec<Result<String, DecodeError>> {
        #[cfg(not(target_family = "wasm"))]
        {
            use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

            texts.par_iter().map(|t| self.correct(t.as_ref())).collect()
        }
        #[cfg(target_family = "wasm")]
        {
            texts.iter().map(|t| self.correct(t.as_ref())).collect()
        }
    }
}
