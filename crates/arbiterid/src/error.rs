use core::fmt;

use crate::{ArbiterId, DecodeError};

/// A result type defaulting to the crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Names one of the four packed fields of an [`ArbiterId`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Category,
    Timestamp,
    Node,
    Sequence,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Category => "category",
            Self::Timestamp => "timestamp",
            Self::Node => "node",
            Self::Sequence => "sequence",
        })
    }
}

/// All errors that `arbiterid` can produce.
///
/// Every variant carries the values that caused it so callers can log or map
/// them without string matching. None of them is fatal to the process; the
/// only panicking path is [`Generator::generate_or_panic`].
///
/// [`Generator::generate_or_panic`]: crate::Generator::generate_or_panic
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The node id given at construction is outside `0..=3`.
    InvalidNodeId { node: u8, max: u8 },

    /// The category passed to a generate call is outside `0..=1023`.
    InvalidCategory { category: u16, max: u16 },

    /// A value handed to [`ArbiterId::pack`] does not fit its bit field.
    ///
    /// `value` is signed and wide so that timestamps before the epoch can be
    /// reported as they were supplied.
    FieldOutOfRange { field: Field, value: i128, max: u64 },

    /// The sequence for a millisecond ran out and the wall clock did not move
    /// forward within the bounded wait.
    ClockStalled {
        /// The millisecond offset the generator was stuck on.
        timestamp: u64,
        /// The last clock sample taken before giving up.
        observed: u64,
        attempts: u32,
    },

    /// The elapsed time since the epoch no longer fits in 41 bits.
    TimestampOverflow { timestamp: u64, max: u64 },

    /// A freshly packed id was not strictly greater than the previous one.
    MonotonicityViolation {
        id: ArbiterId,
        last_id: ArbiterId,
        timestamp: u64,
        sequence: u16,
    },

    /// The caller-supplied millisecond has no sequence numbers left.
    SequenceExhausted { timestamp: u64 },

    /// A text representation could not be decoded.
    Decode(DecodeError),

    /// The generator's lock was poisoned by a panicking thread.
    ///
    /// Only reachable with the std mutex; `parking-lot` mutexes do not poison.
    #[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
    #[cfg(not(feature = "parking-lot"))]
    LockPoisoned,
}

impl Error {
    /// Returns `true` for errors caused by caller input rather than by the
    /// clock or by the generator itself.
    pub const fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidNodeId { .. }
                | Self::InvalidCategory { .. }
                | Self::FieldOutOfRange { .. }
                | Self::SequenceExhausted { .. }
                | Self::Decode(_)
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidNodeId { node, max } => {
                write!(f, "invalid node id {node}; expected 0..={max}")
            }
            Self::InvalidCategory { category, max } => {
                write!(f, "invalid category {category}; expected 0..={max}")
            }
            Self::FieldOutOfRange { field, value, max } => {
                write!(f, "{field} value {value} out of range 0..={max}")
            }
            Self::ClockStalled {
                timestamp,
                observed,
                attempts,
            } => write!(
                f,
                "clock stuck at {observed}ms after {attempts} attempts waiting to pass {timestamp}ms"
            ),
            Self::TimestampOverflow { timestamp, max } => write!(
                f,
                "timestamp {timestamp}ms overflows the maximum {max}ms since epoch"
            ),
            Self::MonotonicityViolation {
                id,
                last_id,
                timestamp,
                sequence,
            } => write!(
                f,
                "new id {id} is not greater than last id {last_id} (timestamp {timestamp}ms, sequence {sequence})"
            ),
            Self::SequenceExhausted { timestamp } => write!(
                f,
                "sequence exhausted for fixed timestamp {timestamp}ms; supply a later timestamp"
            ),
            Self::Decode(err) => write!(f, "decode error: {err}"),
            #[cfg(not(feature = "parking-lot"))]
            Self::LockPoisoned => f.write_str("generator lock poisoned"),
        }
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DecodeError> for Error {
    fn from(err: DecodeError) -> Self {
        Self::Decode(err)
    }
}

#[cfg(not(feature = "parking-lot"))]
use crate::generator::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
