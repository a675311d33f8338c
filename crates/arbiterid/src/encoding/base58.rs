use super::radix::Alphabet;
use crate::{ArbiterId, DecodeError, IdCodec};

/// Variable-length base-58 over the alphabet
/// `123456789abcdefghijkmnopqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ`, most
/// significant digit first.
///
/// Like Bitcoin's alphabet this omits `0`, `O`, `I` and `l`, but lowercase
/// letters sort before uppercase. The value is treated as an integer, not as a
/// byte string, so zero encodes as the single character `1`. Inputs are at
/// most 11 characters long.
///
/// # Example
///
/// ```
/// use arbiterid::{ArbiterId, Base58, IdCodec};
///
/// assert_eq!(Base58::encode(ArbiterId::ZERO), "1");
/// assert_eq!(Base58::decode("21"), Ok(ArbiterId::from_raw(58)));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Base58;

impl Base58 {
    /// Longest encoding of a 63-bit value.
    pub const MAX_LEN: usize = 11;

    pub(crate) const ALPHABET: Alphabet = Alphabet::new(
        b"123456789abcdefghijkmnopqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ",
        Some(Self::MAX_LEN),
    );
}

impl IdCodec for Base58 {
    const NAME: &'static str = "base58";

    fn encode(id: ArbiterId) -> String {
        Self::ALPHABET.encode(id.to_raw())
    }

    fn decode(encoded: &str) -> Result<ArbiterId, DecodeError> {
        Self::ALPHABET.decode(encoded)
    }
}

impl ArbiterId {
    pub fn to_base58(&self) -> String {
        Base58::encode(*self)
    }

    /// # Errors
    ///
    /// See [`Base58`].
    pub fn parse_base58(encoded: &str) -> Result<Self, DecodeError> {
        Base58::decode(encoded)
    }
}
