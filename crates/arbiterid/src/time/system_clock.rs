use std::time::{SystemTime, UNIX_EPOCH};

use crate::{ARBITER_EPOCH, TimeSource};

/// The production [`TimeSource`]: samples `SystemTime::now()` on every call.
///
/// This is a wall clock, so it can step backwards under NTP or manual
/// adjustment. The generator absorbs that; see [`Generator::generate`].
///
/// A system clock set before [`ARBITER_EPOCH`] reads as `0`.
///
/// [`Generator::generate`]: crate::Generator::generate
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        let offset = millis_since_epoch(SystemTime::now());
        u64::try_from(offset).unwrap_or(0)
    }
}

/// Returns the signed number of whole milliseconds between [`ARBITER_EPOCH`]
/// and `time`, truncated toward zero.
///
/// Times before the epoch produce negative values. Results beyond the `i64`
/// range saturate.
pub fn millis_since_epoch(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH + ARBITER_EPOCH) {
        Ok(after) => i64::try_from(after.as_millis()).unwrap_or(i64::MAX),
        Err(before) => {
            i64::try_from(before.duration().as_millis()).map_or(i64::MIN, |millis| -millis)
        }
    }
}
