use core::time::Duration;

/// Epoch of every [`ArbiterId`] timestamp, in milliseconds since the Unix
/// epoch.
///
/// Changing this value changes the meaning of every previously issued id's
/// timestamp field (but not their uniqueness).
///
/// [`ArbiterId`]: crate::ArbiterId
pub const EPOCH_MILLIS: u64 = 1_735_718_400_000;

/// [`EPOCH_MILLIS`] as a [`Duration`] since 1970-01-01 UTC.
pub const ARBITER_EPOCH: Duration = Duration::from_millis(EPOCH_MILLIS);

/// A source of wall-clock time for a [`Generator`].
///
/// Implementations return whole milliseconds elapsed since [`EPOCH_MILLIS`].
/// Nothing requires the values to be monotonic: the generator tolerates a
/// clock that steps backwards.
///
/// # Example
///
/// ```
/// use arbiterid::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis(), 1234);
/// ```
///
/// [`Generator`]: crate::Generator
pub trait TimeSource {
    /// Returns the number of milliseconds since [`EPOCH_MILLIS`].
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Box<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for std::sync::Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

