use crate::Key;
use ::std::io;
use strum::EnumCount;
use thiserror::Error;

/// Failure while reading a transition probabilities file.
/// Lines are counted from 1.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Probabilities read error")]
    Io(#[source] io::Error),
    #[error("Line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("Line {line}: invalid key index {field:?}")]
    Index { line: usize, field: String },
    #[error("Line {line}: key index {index} is out of range 0..{}", Key::COUNT)]
    IndexRange { line: usize, index: usize },
    #[error("Line {line}: invalid log-probability {field:?}")]
    LogProbability { line: usize, field: String },
}

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Transitions load error")]
    Load(#[from] LoadError),
    #[error("Unseen transition log-probability {0} is not in range -inf..=0")]
    UnseenTransition(f64),
    #[error("Slip probability {0} is not in range 0..=1")]
    SlipProbability(f64),
    #[error("Slip probability {probability} leaves no probability for {key:?} itself")]
    SlipOverflow { key: Key, probability: f64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Character {ch:?} at position {position} is not on the keyboard")]
    UnknownChar { ch: char, position: usize },
}
