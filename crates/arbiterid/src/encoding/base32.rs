use super::radix::Alphabet;
use crate::{ArbiterId, DecodeError, IdCodec};

/// Variable-length base-32 over the alphabet
/// `ybndrfg8ejkmcpqxot1uwisza345h769` (not RFC 4648), most significant digit
/// first, no padding.
///
/// Zero encodes as the single character `y`. Inputs are case-sensitive and
/// at most 13 characters long.
///
/// # Example
///
/// ```
/// use arbiterid::{ArbiterId, Base32, IdCodec};
///
/// assert_eq!(Base32::encode(ArbiterId::ZERO), "y");
/// assert_eq!(Base32::decode("by"), Ok(ArbiterId::from_raw(32)));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Base32;

impl Base32 {
    /// Longest encoding of a 63-bit value.
    pub const MAX_LEN: usize = 13;

    pub(crate) const ALPHABET: Alphabet =
        Alphabet::new(b"ybndrfg8ejkmcpqxot1uwisza345h769", Some(Self::MAX_LEN));
}

impl IdCodec for Base32 {
    const NAME: &'static str = "base32";

    fn encode(id: ArbiterId) -> String {
        Self::ALPHABET.encode(id.to_raw())
    }

    fn decode(encoded: &str) -> Result<ArbiterId, DecodeError> {
        Self::ALPHABET.decode(encoded)
    }
}

impl ArbiterId {
    pub fn to_base32(&self) -> String {
        Base32::encode(*self)
    }

    /// # Errors
    ///
    /// See [`Base32`].
    pub fn parse_base32(encoded: &str) -> Result<Self, DecodeError> {
        Base32::decode(encoded)
    }
}
