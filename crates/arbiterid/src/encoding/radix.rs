use crate::{ArbiterId, DecodeError};

const NO_VALUE: u8 = 255;

/// A positional numeral system over a fixed ASCII alphabet, most significant
/// digit first.
pub(crate) struct Alphabet {
    chars: &'static [u8],
    lookup: [u8; 256],
    /// Longest accepted input, if bounded.
    max_len: Option<usize>,
}

impl Alphabet {
    pub(crate) const fn new(chars: &'static [u8], max_len: Option<usize>) -> Self {
        assert!(chars.len() >= 2 && chars.len() < NO_VALUE as usize);
        let mut lookup = [NO_VALUE; 256];
        let mut i = 0;
        while i < chars.len() {
            lookup[chars[i] as usize] = i as u8;
            i += 1;
        }
        Self {
            chars,
            lookup,
            max_len,
        }
    }

    const fn base(&self) -> u64 {
        self.chars.len() as u64
    }

    /// Encodes `raw` with the fewest digits; zero is the first character.
    pub(crate) fn encode(&self, mut raw: u64) -> String {
        // 64 digits covers any u64 in base 2
        let mut buf = [0_u8; 64];
        let mut i = buf.len();
        loop {
            i -= 1;
            buf[i] = self.chars[(raw % self.base()) as usize];
            raw /= self.base();
            if raw == 0 {
                break;
            }
        }
        buf[i..].iter().map(|&b| char::from(b)).collect()
    }

    pub(crate) fn decode(&self, encoded: &str) -> Result<ArbiterId, DecodeError> {
        if encoded.is_empty() {
            return Err(DecodeError::Empty);
        }
        if let Some(max_len) = self.max_len {
            if encoded.len() > max_len {
                return Err(DecodeError::InvalidLength { len: encoded.len() });
            }
        }

        let mut acc = 0_u64;
        for (index, byte) in encoded.bytes().enumerate() {
            let digit = self.lookup[byte as usize];
            if digit == NO_VALUE {
                return Err(DecodeError::InvalidAscii { byte, index });
            }
            acc = acc
                .checked_mul(self.base())
                .and_then(|acc| acc.checked_add(u64::from(digit)))
                .ok_or(DecodeError::Overflow)?;
        }

        ArbiterId::try_from(acc)
    }
}
