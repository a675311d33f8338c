use crate::{ArbiterId, DecodeError, IdCodec};

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";
const NO_VALUE: u8 = 255;
const BITS_PER_CHAR: u32 = 6;
/// Zero bits appended after the 64 data bits to fill the last character.
const PAD_BITS: u32 = 2;

const LOOKUP: [u8; 256] = {
    let mut lut = [NO_VALUE; 256];
    let mut i = 0;
    while i < ALPHABET.len() {
        lut[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    lut
};

/// URL-safe base64 (RFC 4648 §5) of the id's 8 big-endian bytes, without
/// padding. Always exactly 11 characters.
///
/// # Example
///
/// ```
/// use arbiterid::{ArbiterId, Base64, IdCodec};
///
/// assert_eq!(Base64::encode(ArbiterId::ZERO), "AAAAAAAAAAA");
/// assert_eq!(Base64::decode("AAAAAAAAAAE"), Ok(ArbiterId::from_raw(1)));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Base64;

impl Base64 {
    /// Length of every encoded id.
    pub const LEN: usize = 11;
}

impl IdCodec for Base64 {
    const NAME: &'static str = "base64";

    fn encode(id: ArbiterId) -> String {
        let acc = u128::from_be_bytes({
            let mut bytes = [0_u8; 16];
            bytes[8..].copy_from_slice(&id.to_raw().to_be_bytes());
            bytes
        }) << PAD_BITS;

        (0..Self::LEN)
            .rev()
            .map(|i| {
                let index = (acc >> (i as u32 * BITS_PER_CHAR)) & 0x3F;
                char::from(ALPHABET[index as usize])
            })
            .collect()
    }

    fn decode(encoded: &str) -> Result<ArbiterId, DecodeError> {
        if encoded.is_empty() {
            return Err(DecodeError::Empty);
        }
        if encoded.len() != Self::LEN {
            return Err(DecodeError::InvalidLength { len: encoded.len() });
        }

        let mut acc = 0_u128;
        for (index, byte) in encoded.bytes().enumerate() {
            let value = LOOKUP[byte as usize];
            if value == NO_VALUE {
                return Err(DecodeError::InvalidAscii { byte, index });
            }
            acc = (acc << BITS_PER_CHAR) | u128::from(value);
        }

        if acc & ((1 << PAD_BITS) - 1) != 0 {
            return Err(DecodeError::NonCanonical);
        }
        let raw = u64::try_from(acc >> PAD_BITS).map_err(|_| DecodeError::Overflow)?;
        ArbiterId::try_from(raw)
    }
}

impl ArbiterId {
    pub fn to_base64(&self) -> String {
        Base64::encode(*self)
    }

    /// # Errors
    ///
    /// See [`Base64`].
    pub fn parse_base64(encoded: &str) -> Result<Self, DecodeError> {
        Base64::decode(encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_zero() {
        assert_eq!(Base64::encode(ArbiterId::ZERO), "AAAAAAAAAAA");
        assert_eq!(Base64::decode("AAAAAAAAAAA"), Ok(ArbiterId::ZERO));
    }

    #[test]
    fn matches_rfc4648_url_alphabet() {
        // bytes 00 20 00 00 00 00 00 00
        let id = ArbiterId::from_raw(1 << 53);
        assert_eq!(id.to_base64(), "ACAAAAAAAAA");
        // bytes 7f ff ff ff ff ff ff ff
        let max = ArbiterId::from_raw(ArbiterId::MAX_RAW);
        assert_eq!(max.to_base64(), "f_________8");
        assert_eq!(ArbiterId::parse_base64("f_________8"), Ok(max));
        assert_eq!(ArbiterId::from_raw(0x3e).to_base64(), "AAAAAAAAAD4");
        assert_eq!(ArbiterId::from_raw(0xfb).to_base64(), "AAAAAAAAAPs");
    }

    #[test]
    fn rejects_top_bit() {
        assert_eq!(Base64::decode("__________8"), Err(DecodeError::Overflow));
        assert_eq!(Base64::decode("gAAAAAAAAAA"), Err(DecodeError::Overflow));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(Base64::decode(""), Err(DecodeError::Empty));
        // 7 and 9 decoded bytes
        assert_eq!(
            Base64::decode("AAAAAAAAAA"),
            Err(DecodeError::InvalidLength { len: 10 })
        );
        assert_eq!(
            Base64::decode("AAAAAAAAAAAA"),
            Err(DecodeError::InvalidLength { len: 12 })
        );
        assert_eq!(
            Base64::decode("AAAAAAAAAA="),
            Err(DecodeError::InvalidAscii {
                byte: b'=',
                index: 10
            })
        );
        assert_eq!(
            Base64::decode("AAAAAAAAA+A"),
            Err(DecodeError::InvalidAscii {
                byte: b'+',
                index: 9
            })
        );
        assert_eq!(Base64::decode("AAAAAAAAAAB"), Err(DecodeError::NonCanonical));
    }
}
