use core::{fmt, str::FromStr};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::{DecodeError, EPOCH_MILLIS, Error, Field, IdCodec, Result};

/// A 63-bit identifier packing a category, a millisecond timestamp, a node and
/// a per-millisecond sequence.
///
/// ```text
///  Bit Index:  63           63 62           53 52            12 11       10 9             0
///              +--------------+---------------+----------------+-----------+---------------+
///  Field:      | reserved (1) | category (10) | timestamp (41) | node (2)  | sequence (10) |
///              +--------------+---------------+----------------+-----------+---------------+
///              |<------------ MSB ------------- 64 bits ------------- LSB ---------------->|
/// ```
///
/// The timestamp counts milliseconds since [`EPOCH_MILLIS`]. The reserved
/// top bit is always zero for ids produced by this crate, so every id is a
/// valid non-negative `i64`.
///
/// Because the category occupies the most significant bits, ids only sort by
/// time within one category.
///
/// # Example
///
/// ```
/// use arbiterid::ArbiterId;
///
/// let id = ArbiterId::pack(1, 0, 0, 0).unwrap();
/// assert_eq!(id.to_raw(), 9_007_199_254_740_992);
/// assert_eq!(id.category(), 1);
/// assert_eq!(id.timestamp(), 0);
/// ```
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArbiterId {
    id: u64,
}

/// The four fields of an [`ArbiterId`] as stored, with the timestamp relative
/// to [`EPOCH_MILLIS`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Fields {
    pub category: u16,
    pub timestamp: u64,
    pub node: u8,
    pub sequence: u16,
}

/// The four fields of an [`ArbiterId`] with the timestamp as Unix
/// milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Components {
    pub category: u16,
    pub unix_millis: u64,
    pub node: u8,
    pub sequence: u16,
}

/// Converts a timestamp offset into Unix milliseconds.
pub const fn absolute_timestamp(timestamp: u64) -> u64 {
    timestamp + EPOCH_MILLIS
}

impl ArbiterId {
    /// Number of bits in the sequence field.
    pub const SEQUENCE_BITS: u32 = 10;
    /// Number of bits in the node field.
    pub const NODE_BITS: u32 = 2;
    /// Number of bits in the timestamp field.
    pub const TIMESTAMP_BITS: u32 = 41;
    /// Number of bits in the category field.
    pub const CATEGORY_BITS: u32 = 10;

    /// Bitmask for the 10-bit sequence field. Occupies bits 0 through 9.
    pub const SEQUENCE_MASK: u64 = (1 << Self::SEQUENCE_BITS) - 1;
    /// Bitmask for the 2-bit node field. Occupies bits 10 and 11.
    pub const NODE_MASK: u64 = (1 << Self::NODE_BITS) - 1;
    /// Bitmask for the 41-bit timestamp field. Occupies bits 12 through 52.
    pub const TIMESTAMP_MASK: u64 = (1 << Self::TIMESTAMP_BITS) - 1;
    /// Bitmask for the 10-bit category field. Occupies bits 53 through 62.
    pub const CATEGORY_MASK: u64 = (1 << Self::CATEGORY_BITS) - 1;

    pub const SEQUENCE_SHIFT: u32 = 0;
    pub const NODE_SHIFT: u32 = Self::SEQUENCE_SHIFT + Self::SEQUENCE_BITS;
    pub const TIMESTAMP_SHIFT: u32 = Self::NODE_SHIFT + Self::NODE_BITS;
    pub const CATEGORY_SHIFT: u32 = Self::TIMESTAMP_SHIFT + Self::TIMESTAMP_BITS;

    pub const MAX_SEQUENCE: u16 = Self::SEQUENCE_MASK as u16;
    pub const MAX_NODE: u8 = Self::NODE_MASK as u8;
    pub const MAX_TIMESTAMP: u64 = Self::TIMESTAMP_MASK;
    pub const MAX_CATEGORY: u16 = Self::CATEGORY_MASK as u16;

    /// Largest raw value an id may hold (`2^63 - 1`).
    pub const MAX_RAW: u64 = i64::MAX as u64;

    pub const ZERO: Self = Self { id: 0 };

    /// Packs the four fields without validation; each input is masked to its
    /// width.
    pub const fn from(category: u16, timestamp: u64, node: u8, sequence: u16) -> Self {
        let category = (category as u64 & Self::CATEGORY_MASK) << Self::CATEGORY_SHIFT;
        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let node = (node as u64 & Self::NODE_MASK) << Self::NODE_SHIFT;
        let sequence = (sequence as u64 & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
        Self {
            id: category | timestamp | node | sequence,
        }
    }

    /// Packs the four fields, rejecting any that exceed their width.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FieldOutOfRange`] naming the first offending field.
    pub fn pack(category: u16, timestamp: u64, node: u8, sequence: u16) -> Result<Self> {
        check(Field::Category, category.into(), Self::CATEGORY_MASK)?;
        check(Field::Timestamp, timestamp, Self::TIMESTAMP_MASK)?;
        check(Field::Node, node.into(), Self::NODE_MASK)?;
        check(Field::Sequence, sequence.into(), Self::SEQUENCE_MASK)?;
        Ok(Self::from(category, timestamp, node, sequence))
    }

    /// Splits the id into its stored fields.
    ///
    /// Total over every raw value; the reserved bit is ignored.
    pub const fn unpack(&self) -> Fields {
        Fields {
            category: self.category(),
            timestamp: self.timestamp(),
            node: self.node(),
            sequence: self.sequence(),
        }
    }

    /// Splits the id into its fields with an absolute timestamp.
    pub const fn components(&self) -> Components {
        Components {
            category: self.category(),
            unix_millis: self.unix_millis(),
            node: self.node(),
            sequence: self.sequence(),
        }
    }

    /// Extracts the category.
    pub const fn category(&self) -> u16 {
        ((self.id >> Self::CATEGORY_SHIFT) & Self::CATEGORY_MASK) as u16
    }

    /// Extracts the timestamp in milliseconds since [`EPOCH_MILLIS`].
    pub const fn timestamp(&self) -> u64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// Extracts the timestamp in Unix milliseconds.
    pub const fn unix_millis(&self) -> u64 {
        absolute_timestamp(self.timestamp())
    }

    /// Extracts the node.
    pub const fn node(&self) -> u8 {
        ((self.id >> Self::NODE_SHIFT) & Self::NODE_MASK) as u8
    }

    /// Extracts the sequence.
    pub const fn sequence(&self) -> u16 {
        ((self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK) as u16
    }

    /// Returns the raw packed value.
    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Wraps a raw value without checking the reserved bit.
    ///
    /// Use [`ArbiterId::try_from`] or [`ArbiterId::is_valid`] for untrusted
    /// input.
    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    /// Returns the id as an `i64`. Never negative for a valid id.
    pub const fn as_i64(&self) -> i64 {
        self.id as i64
    }

    /// Returns `true` if the reserved top bit is clear.
    pub const fn is_valid(&self) -> bool {
        self.id <= Self::MAX_RAW
    }

    /// Returns the embedded timestamp as a [`SystemTime`].
    pub fn to_system_time(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_millis(self.unix_millis())
    }

    /// Returns the embedded timestamp as a UTC date-time.
    #[cfg_attr(docsrs, doc(cfg(feature = "chrono")))]
    #[cfg(feature = "chrono")]
    pub fn to_datetime(&self) -> chrono::DateTime<chrono::Utc> {
        // 41 bits of milliseconds past 2025 is far inside chrono's range.
        chrono::DateTime::from_timestamp_millis(self.unix_millis() as i64).unwrap_or_default()
    }

    /// Returns the embedded timestamp in RFC 3339 form with millisecond
    /// precision, e.g. `2025-01-01T08:00:00.000Z`.
    #[cfg_attr(docsrs, doc(cfg(feature = "chrono")))]
    #[cfg(feature = "chrono")]
    pub fn to_iso8601(&self) -> String {
        self.to_datetime()
            .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
    }
}

fn check(field: Field, value: u64, max: u64) -> Result<()> {
    if value > max {
        return Err(Error::FieldOutOfRange {
            field,
            value: value.into(),
            max,
        });
    }
    Ok(())
}

impl fmt::Display for ArbiterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for ArbiterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArbiterId")
            .field("id", &self.id)
            .field("category", &self.category())
            .field("timestamp", &self.timestamp())
            .field("node", &self.node())
            .field("sequence", &self.sequence())
            .finish()
    }
}

impl FromStr for ArbiterId {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::Decimal::decode(s)
    }
}

impl TryFrom<u64> for ArbiterId {
    type Error = DecodeError;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        let id = Self::from_raw(raw);
        if !id.is_valid() {
            return Err(DecodeError::Overflow);
        }
        Ok(id)
    }
}

impl TryFrom<i64> for ArbiterId {
    type Error = DecodeError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        u64::try_from(raw)
            .map(Self::from_raw)
            .map_err(|_| DecodeError::Negative)
    }
}

impl From<ArbiterId> for u64 {
    fn from(id: ArbiterId) -> Self {
        id.to_raw()
    }
}

impl From<ArbiterId> for i64 {
    fn from(id: ArbiterId) -> Self {
        id.as_i64()
    }
}
