use super::radix::Alphabet;
use crate::{ArbiterId, DecodeError, IdCodec};

/// Plain base-10, the canonical external form of an id.
///
/// Decoding accepts leading zeros but no sign or whitespace.
#[derive(Clone, Copy, Debug, Default)]
pub struct Decimal;

impl Decimal {
    const ALPHABET: Alphabet = Alphabet::new(b"0123456789", None);
}

impl IdCodec for Decimal {
    const NAME: &'static str = "decimal";

    fn encode(id: ArbiterId) -> String {
        id.to_raw().to_string()
    }

    fn decode(encoded: &str) -> Result<ArbiterId, DecodeError> {
        Self::ALPHABET.decode(encoded)
    }
}

impl ArbiterId {
    /// Parses a base-10 string. Same as [`str::parse`].
    ///
    /// # Errors
    ///
    /// Fails on empty input, non-digits, or values of `2^63` and above.
    pub fn parse_decimal(encoded: &str) -> Result<Self, DecodeError> {
        Decimal::decode(encoded)
    }
}
