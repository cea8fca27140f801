//! # Keyboard slip correction
//!
//! Finds the most probable intended text behind noisy keystrokes with Viterbi decoding
//! of a hidden Markov model:
//! - transitions: a bigram ([`Order::Bi`]) or trigram ([`Order::Tri`]) language model
//!   over 28 [`Key`]s (`a`..`z`, space and the `#` boundary), read from a file of
//!   precomputed log-probabilities;
//! - emissions: the chance that a keystroke slipped onto a neighbouring QWERTY key.
//!
//! Probability files hold one record per line: `i j logprob` for bigrams,
//! `i j k logprob` for trigrams, where indices are [`Key`] discriminants.
//!
//! # Example
//! ```rust
//! use slipgram::{DecoderBuilder, Order, Transitions};
//!
//! let records = "27 7 -0.1\n7 4 -0.1\n4 11 -0.5\n11 11 -0.3\n11 14 -0.5\n14 27 -0.2\n";
//! let transitions =
//!     Transitions::from_reader(Order::Bi, records.as_bytes(), f64::NEG_INFINITY).unwrap();
//! let decoder = DecoderBuilder::new(Order::Bi)
//!     .transitions(transitions)
//!     .build()
//!     .unwrap();
//!
//! // the caller appends one boundary marker for bigrams, two for trigrams
//! assert_eq!(decoder.decode("helol#").unwrap(), "hello");
//! // or lets the decoder do it
//! assert_eq!(decoder.correct("helol").unwrap(), "hello");
//! ```
//!
//! A [`Decoder`] is immutable once built and can be shared between threads.
//! Bigram decoding costs `O(len * 28^2)`, trigram decoding `O(len * 28^3)`.

mod decoder;
mod emissions;
mod error;
mod key;
mod order;
mod transitions;

pub use decoder::{Decoder, DecoderBuilder};
pub use emissions::{Emissions, DEFAULT_SLIP_PROBABILITY};
pub use error::{BuildError, DecodeError, LoadError};
pub use key::{keys_from_str, keys_to_string, Key, BOUNDARY_CHAR};
pub use order::Order;
pub use transitions::{Transitions, DEFAULT_UNSEEN_LOG_PROBABILITY};
