use core::fmt;

/// Errors returned when decoding an [`ArbiterId`] from text.
///
/// [`ArbiterId`]: crate::ArbiterId
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum DecodeError {
    /// The input string was empty.
    Empty,
    /// The input length is not accepted by the format.
    InvalidLength { len: usize },
    /// A byte outside the format's alphabet was found at `index`.
    InvalidAscii { byte: u8, index: usize },
    /// The decoded value is at least `2^63` and cannot be an id.
    Overflow,
    /// The input described a negative number.
    Negative,
    /// The base64 input carried non-zero padding bits in its last character.
    NonCanonical,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty input"),
            Self::InvalidLength { len } => write!(f, "invalid length: {len}"),
            Self::InvalidAscii { byte, index } => {
                write!(f, "invalid ascii byte {byte:#04x} at index {index}")
            }
            Self::Overflow => f.write_str("value overflows a positive 63-bit id"),
            Self::Negative => f.write_str("value is negative"),
            Self::NonCanonical => f.write_str("non-canonical trailing bits"),
        }
    }
}

impl core::error::Error for DecodeError {}
