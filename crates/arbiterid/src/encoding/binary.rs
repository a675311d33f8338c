use super::radix::Alphabet;
use crate::{ArbiterId, DecodeError, IdCodec};

/// Base-2, encoded as exactly 63 zero-padded digits.
///
/// Decoding accepts any number of `0`/`1` digits as long as the value fits.
#[derive(Clone, Copy, Debug, Default)]
pub struct Binary;

impl Binary {
    /// Width of an encoded id.
    pub const WIDTH: usize = 63;

    const ALPHABET: Alphabet = Alphabet::new(b"01", None);
}

impl IdCodec for Binary {
    const NAME: &'static str = "binary";

    fn encode(id: ArbiterId) -> String {
        format!("{:0width$b}", id.to_raw(), width = Self::WIDTH)
    }

    fn decode(encoded: &str) -> Result<ArbiterId, DecodeError> {
        Self::ALPHABET.decode(encoded)
    }
}

impl ArbiterId {
    /// Encodes the id as 63 binary digits.
    pub fn to_base2(&self) -> String {
        Binary::encode(*self)
    }

    /// # Errors
    ///
    /// See [`Binary`].
    pub fn parse_base2(encoded: &str) -> Result<Self, DecodeError> {
        Binary::decode(encoded)
    }
}
