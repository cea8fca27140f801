use crate::{
    error::LoadError,
    order::{Order, CONTEXT_MAX_LEN},
    Key,
};
use ::std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};
use arrayvec::ArrayVec;
use debug_unsafe::slice::SliceGetter;
use strum::EnumCount;

/// Log-probability of every transition missing from the probabilities file.
///
/// `0.0` means certainty, so an unseen transition is never penalized. Use
/// [`f64::NEG_INFINITY`] to forbid unseen transitions instead.
pub const DEFAULT_UNSEEN_LOG_PROBABILITY: f64 = 0.0;

const RECORD_MAX_LEN: usize = CONTEXT_MAX_LEN + 2;

/// Dense transition matrix `A`: log P(next key | previous keys).
///
/// Stored flattened, the last key varies fastest:
/// `A[i][j]` is at `i * N + j`, `A[i][j][k]` is at `(i * N + j) * N + k`.
#[derive(Clone, Debug, PartialEq)]
pub struct Transitions {
    order: Order,
    log_probabilities: Box<[f64]>,
}

impl Transitions {
    /// Matrix with every transition set to `unseen`.
    #[inline]
    pub fn new(order: Order, unseen: f64) -> Self {
        Self {
            order,
            log_probabilities: vec![unseen; order.matrix_len()].into_boxed_slice(),
        }
    }

    /// Reads `i j logprob` (bigram) or `i j k logprob` (trigram) records, one per line.
    /// Blank lines are skipped, later records overwrite earlier ones.
    ///
    /// The first malformed record aborts the load.
    pub fn from_reader(
        order: Order,
        reader: impl BufRead,
        unseen: f64,
    ) -> Result<Self, LoadError> {
        let mut transitions = Self::new(order, unseen);
        let mut records = 0;

        for (line_idx, line) in reader.lines().enumerate() {
            let line = line.map_err(LoadError::Io)?;
            if let Some((cell, log_probability)) = parse_record(order, line_idx + 1, &line)? {
                *transitions.log_probabilities.get_safe_unchecked_mut(cell) = log_probability;
                records += 1;
            }
        }

        tracing::debug!(?order, records, "transitions loaded");

        Ok(transitions)
    }

    pub fn from_path(
        order: Order,
        path: impl AsRef<Path>,
        unseen: f64,
    ) -> Result<Self, LoadError> {
        let path = path.as_ref();
        tracing::debug!(?path, "loading transitions");
        let file = File::open(path).map_err(LoadError::Io)?;
        Self::from_reader(order, BufReader::new(file), unseen)
    }

    #[inline(always)]
    pub fn order(&self) -> Order {
        self.order
    }

    /// Log-probability of `next` following `context` (oldest key first).
    ///
    /// # Panics
    /// If `context` length differs from the order's context length.
    #[inline]
    pub fn get(&self, context: &[Key], next: Key) -> f64 {
        self.log_probabilities[self.cell(context, next)]
    }

    /// # Panics
    /// If `context` length differs from the order's context length.
    #[inline]
    pub fn set(&mut self, context: &[Key], next: Key, log_probability: f64) {
        let cell = self.cell(context, next);
        self.log_probabilities[cell] = log_probability;
    }

    fn cell(&self, context: &[Key], next: Key) -> usize {
        assert_eq!(
            context.len(),
            self.order.context_len(),
            "context length must match {:?}",
            self.order
        );
        context
            .iter()
            .chain([&next])
            .fold(0, |cell, &key| cell * Key::COUNT + key as usize)
    }

    /// `A[prev][next]`, indices must be in `0..N`
    #[inline(always)]
    pub(crate) fn bigram(&self, prev: usize, next: usize) -> f64 {
        debug_assert_eq!(self.order, Order::Bi);
        *self
            .log_probabilities
            .get_safe_unchecked(prev * Key::COUNT + next)
    }

    /// `A[first][second][next]`, indices must be in `0..N`
    #[inline(always)]
    pub(crate) fn trigram(&self, first: usize, second: usize, next: usize) -> f64 {
        debug_assert_eq!(self.order, Order::Tri);
        *self
            .log_probabilities
            .get_safe_unchecked((first * Key::COUNT + second) * Key::COUNT + next)
    }
}

/// `-inf..=0`, NaN excluded
#[inline]
pub(crate) fn is_log_probability(value: f64) -> bool {
    value <= 0.0
}

/// Returns the flattened cell and its log-probability, or `None` for a blank line.
fn parse_record(
    order: Order,
    line: usize,
    text: &str,
) -> Result<Option<(usize, f64)>, LoadError> {
    let found = text.split_ascii_whitespace().count();
    if found == 0 {
        return Ok(None);
    }
    if found != order.record_len() {
        return Err(LoadError::FieldCount {
            line,
            expected: order.record_len(),
            found,
        });
    }

    let fields: ArrayVec<&str, RECORD_MAX_LEN> = text.split_ascii_whitespace().collect();
    let Some((log_probability_field, index_fields)) = fields.split_last() else {
        return Ok(None);
    };

    let mut cell = 0;
    for field in index_fields {
        let index: usize = atoi_simd::parse(field.as_bytes()).map_err(|_| LoadError::Index {
            line,
            field: (*field).to_owned(),
        })?;
        if index >= Key::COUNT {
            return Err(LoadError::IndexRange { line, index });
        }
        cell = cell * Key::COUNT + index;
    }

    let log_probability = log_probability_field
        .parse::<f64>()
        .ok()
        .filter(|p| is_log_probability(*p))
        .ok_or_else(|| LoadError::LogProbability {
            line,
            field: (*log_probability_field).to_owned(),
        })?;

    Ok(Some((cell, log_probability)))
}
