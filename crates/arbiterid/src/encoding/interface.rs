use core::{fmt, str::FromStr};

use crate::{ArbiterId, Base32, Base58, Base64, Binary, Decimal, DecodeError};

/// A reversible text representation of an [`ArbiterId`].
///
/// For every valid id, `decode(&encode(id)) == Ok(id)`. Decoding never
/// accepts a value with the reserved top bit set.
pub trait IdCodec {
    /// Short lowercase name of the format.
    const NAME: &'static str;

    /// Encodes the id.
    fn encode(id: ArbiterId) -> String;

    /// Decodes an id.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] describing the first problem found in the
    /// input.
    fn decode(encoded: &str) -> Result<ArbiterId, DecodeError>;
}

/// Selects one of the five codecs at runtime.
///
/// # Example
///
/// ```
/// use arbiterid::{ArbiterId, Encoding};
///
/// let encoding: Encoding = "base58".parse().unwrap();
/// let id = ArbiterId::from_raw(42);
/// let text = encoding.encode(id);
/// assert_eq!(encoding.decode(&text), Ok(id));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Encoding {
    #[default]
    Decimal,
    Binary,
    Base32,
    Base58,
    Base64,
}

impl Encoding {
    pub const ALL: [Self; 5] = [
        Self::Decimal,
        Self::Binary,
        Self::Base32,
        Self::Base58,
        Self::Base64,
    ];

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Decimal => Decimal::NAME,
            Self::Binary => Binary::NAME,
            Self::Base32 => Base32::NAME,
            Self::Base58 => Base58::NAME,
            Self::Base64 => Base64::NAME,
        }
    }

    pub fn encode(&self, id: ArbiterId) -> String {
        match self {
            Self::Decimal => Decimal::encode(id),
            Self::Binary => Binary::encode(id),
            Self::Base32 => Base32::encode(id),
            Self::Base58 => Base58::encode(id),
            Self::Base64 => Base64::encode(id),
        }
    }

    /// # Errors
    ///
    /// See [`IdCodec::decode`].
    pub fn decode(&self, encoded: &str) -> Result<ArbiterId, DecodeError> {
        match self {
            Self::Decimal => Decimal::decode(encoded),
            Self::Binary => Binary::decode(encoded),
            Self::Base32 => Base32::decode(encoded),
            Self::Base58 => Base58::decode(encoded),
            Self::Base64 => Base64::decode(encoded),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when parsing an unknown [`Encoding`] name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownEncoding(pub String);

impl fmt::Display for UnknownEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown encoding {:?}; expected one of decimal, binary, base32, base58, base64",
            self.0
        )
    }
}

impl core::error::Error for UnknownEncoding {}

impl FromStr for Encoding {
    type Err = UnknownEncoding;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "decimal" | "base10" => Ok(Self::Decimal),
            "binary" | "base2" => Ok(Self::Binary),
            "base32" => Ok(Self::Base32),
            "base58" => Ok(Self::Base58),
            "base64" => Ok(Self::Base64),
            _ => Err(UnknownEncoding(s.to_owned())),
        }
    }
}
