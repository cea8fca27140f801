use crate::Key;
use strum::EnumCount;
use strum_macros::{EnumCount, EnumIter};

/// Longest context a model can condition on.
pub(crate) const CONTEXT_MAX_LEN: usize = 2;

/// Order of the language model: how many previous keys condition the next one.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, EnumCount, EnumIter,
)]
#[repr(usize)]
pub enum Order {
    #[default]
    Bi = 1,
    Tri = 2,
}

impl Order {
    /// Number of keys in the context, also the number of boundary
    /// markers that terminate an observed sequence.
    #[inline(always)]
    pub const fn context_len(self) -> usize {
        self as usize
    }

    /// Fields in one probability record: the indices plus the log-probability.
    #[inline(always)]
    pub const fn record_len(self) -> usize {
        self.context_len() + 2
    }

    /// Number of cells of the dense transition matrix.
    #[inline]
    pub const fn matrix_len(self) -> usize {
        let mut len = Key::COUNT;
        let mut i = 0;
        while i < self.context_len() {
            len *= Key::COUNT;
            i += 1;
        }
        len
    }
}
