use crate::error::DecodeError;
use strum_macros::{EnumCount, EnumIter, FromRepr};

/// Character rendered for [`Key::Boundary`].
pub const BOUNDARY_CHAR: char = '#';

/// A key of the closed keyboard alphabet: `a`..`z`, space and the sentence boundary.
///
/// The discriminant is the row/column index into the transition and emission matrices.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumCount, EnumIter, FromRepr,
)]
#[repr(usize)]
pub enum Key {
    A = 0,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Space,
    /// Virtual state before the first and after the last typed key
    Boundary,
}

impl Key {
    #[inline]
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            'a'..='z' => Self::from_repr(ch as usize - 'a' as usize),
            ' ' => Some(Self::Space),
            BOUNDARY_CHAR => Some(Self::Boundary),
            _ => None,
        }
    }

    #[inline]
    pub const fn into_char(self) -> char {
        match self {
            Self::Space => ' ',
            Self::Boundary => BOUNDARY_CHAR,
            // letters are 0..26
            letter => (b'a' + letter as u8) as char,
        }
    }

    /// Keys physically adjacent on a QWERTY keyboard.
    /// The table is symmetric, and no key has more than 10 neighbours.
    pub const fn neighbours(self) -> &'static [Key] {
        use Key::*;
        match self {
            Q => &[W, A],
            W => &[Q, E, A, S],
            E => &[W, R, S, D],
            R => &[E, T, D, F],
            T => &[R, Y, F, G],
            Y => &[T, U, G, H],
            U => &[Y, I, H, J],
            I => &[U, O, J, K],
            O => &[I, P, K, L],
            P => &[O, L],
            A => &[Q, W, S, Z],
            S => &[W, E, A, D, Z, X],
            D => &[E, R, S, F, X, C],
            F => &[R, T, D, G, C, V],
            G => &[T, Y, F, H, V, B],
            H => &[Y, U, G, J, B, N],
            J => &[U, I, H, K, N, M],
            K => &[I, O, J, L, M],
            L => &[O, P, K],
            Z => &[A, S, X],
            X => &[S, D, Z, C],
            C => &[D, F, X, V, Space],
            V => &[F, G, C, B, Space],
            B => &[G, H, V, N, Space],
            N => &[H, J, B, M, Space],
            M => &[J, K, N, Space],
            Space => &[C, V, B, N, M],
            Boundary => &[],
        }
    }
}

/// Converts text into keys. Any character outside the alphabet is an error.
pub fn keys_from_str(text: &str) -> Result<Vec<Key>, DecodeError> {
    text.chars()
        .enumerate()
        .map(|(position, ch)| {
            Key::from_char(ch).ok_or(DecodeError::UnknownChar { ch, position })
        })
        .collect()
}

#[inline]
pub fn keys_to_string(keys: &[Key]) -> String {
    keys.iter().map(|k| k.into_char()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use strum::{EnumCount, IntoEnumIterator};

    #[test]
    fn test_alphabet_size() {
        assert_eq!(Key::COUNT, 28);
        assert_eq!(Key::Space as usize, 26);
        assert_eq!(Key::Boundary as usize, 27);
    }

    #[test]
    fn test_char_index_roundtrip() {
        for (i, key) in Key::iter().enumerate() {
            assert_eq!(key as usize, i);
            assert_eq!(Key::from_repr(i), Some(key));
            assert_eq!(Key::from_char(key.into_char()), Some(key));
        }
        assert_eq!(Key::from_repr(Key::COUNT), None);
    }

    #[rstest(
        ch,
        expected,
        case('a', Some(Key::A)),
        case('o', Some(Key::O)),
        case('z', Some(Key::Z)),
        case(' ', Some(Key::Space)),
        case(BOUNDARY_CHAR, Some(Key::Boundary)),
        case('A', None),
        case('1', None),
        case('å', None),
        case('\n', None)
    )]
    fn test_from_char(ch: char, expected: Option<Key>) {
        assert_eq!(Key::from_char(ch), expected);
    }

    #[test]
    fn test_neighbours_symmetric() {
        for key in Key::iter() {
            for &n in key.neighbours() {
                assert_ne!(n, key);
                assert!(
                    n.neighbours().contains(&key),
                    "{key:?} lists {n:?}, but not vice versa"
                );
            }
        }
    }

    #[test]
    fn test_neighbours_bounded() {
        assert!(Key::iter().all(|k| k.neighbours().len() <= 10));
        assert!(Key::Boundary.neighbours().is_empty());
        assert!(Key::O.neighbours().contains(&Key::L));
    }

    #[test]
    fn test_keys_from_str() {
        assert_eq!(
            keys_from_str("ab #").unwrap(),
            vec![Key::A, Key::B, Key::Space, Key::Boundary]
        );
        assert!(keys_from_str("").unwrap().is_empty());

        let err = keys_from_str("heLlo").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::UnknownChar {
                ch: 'L',
                position: 2
            }
        ));
    }

    #[test]
    fn test_keys_to_string() {
        assert_eq!(
            keys_to_string(&[Key::H, Key::I, Key::Space, Key::Boundary]),
            "hi #"
        );
    }
}
