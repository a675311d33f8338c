use core::time::Duration;
use std::time::{Instant, SystemTime};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    ArbiterId, EPOCH_MILLIS, Error, Field, GeneratorOptions, Result, SystemClock, TimeSource,
    generator::{Mutex, MutexGuard},
    millis_since_epoch,
};

/// How many times [`Generator::generate`] re-samples the clock after the
/// sequence for a millisecond runs out.
pub const MAX_ROLLOVER_WAIT_ATTEMPTS: u32 = 2_000;

/// Sleep between clock samples while waiting for the next millisecond.
pub const ROLLOVER_WAIT_INTERVAL: Duration = Duration::from_micros(50);

/// Minimum spacing between two clock-regression warnings of one generator.
pub const CLOCK_WARNING_INTERVAL: Duration = Duration::from_millis(1_000);

/// Backward steps up to this many milliseconds are treated as jitter.
const CLOCK_JITTER_MS: u64 = 1;

#[derive(Debug, Default)]
struct GeneratorState {
    timestamp: u64,
    sequence: u16,
    last_id: Option<ArbiterId>,
    clock_regressions: u64,
    last_warning: Option<Instant>,
}

/// A thread-safe ID generator for one node.
///
/// All mutable state sits behind a single mutex, so concurrent callers are
/// linearized and, with strict monotonicity on, every successful call returns
/// an id strictly greater than the one before it. State is committed only
/// after an id has been packed and checked; a failed call leaves the generator
/// exactly as it was.
///
/// Run at most one generator per node id; two generators with the same node
/// will produce colliding ids.
///
/// ## Recommended When
/// - One process owns a node id and hands ids to many threads
///
/// # Example
///
/// ```
/// use arbiterid::{Generator, GeneratorOptions};
///
/// let generator = Generator::with_options(1, GeneratorOptions::default().with_quiet(true))?;
///
/// let a = generator.generate(7)?;
/// let b = generator.generate(7)?;
/// assert!(a < b);
/// assert_eq!(a.category(), 7);
/// assert_eq!(a.node(), 1);
/// assert_eq!(generator.last_id(), b);
/// # Ok::<(), arbiterid::Error>(())
/// ```
#[derive(Debug)]
pub struct Generator<T = SystemClock> {
    node: u8,
    options: GeneratorOptions,
    state: Mutex<GeneratorState>,
    time: T,
}

impl Generator<SystemClock> {
    /// Creates a generator for `node` with default options and the system
    /// clock.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNodeId`] if `node > 3`.
    pub fn new(node: u8) -> Result<Self> {
        Self::with_options(node, GeneratorOptions::default())
    }

    /// Creates a generator for `node` with the system clock.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNodeId`] if `node > 3`.
    pub fn with_options(node: u8, options: GeneratorOptions) -> Result<Self> {
        Self::with_clock(node, options, SystemClock)
    }
}

impl<T> Generator<T>
where
    T: TimeSource,
{
    /// Creates a generator reading time from `time`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNodeId`] if `node > 3`.
    pub fn with_clock(node: u8, options: GeneratorOptions, time: T) -> Result<Self> {
        if node > ArbiterId::MAX_NODE {
            return Err(Error::InvalidNodeId {
                node,
                max: ArbiterId::MAX_NODE,
            });
        }

        #[cfg(feature = "tracing")]
        if !options.quiet {
            tracing::info!(
                node,
                strict_monotonicity = options.strict_monotonicity,
                quiet = options.quiet,
                "arbiterid generator initialized"
            );
        }

        Ok(Self {
            node,
            options,
            state: Mutex::new(GeneratorState::default()),
            time,
        })
    }

    pub const fn node(&self) -> u8 {
        self.node
    }

    pub const fn options(&self) -> GeneratorOptions {
        self.options
    }

    /// Returns the most recently generated id, or [`ArbiterId::ZERO`] before
    /// the first one.
    pub fn last_id(&self) -> ArbiterId {
        self.snapshot().last_id.unwrap_or(ArbiterId::ZERO)
    }

    /// Number of backward clock steps larger than 1 ms seen by
    /// [`Generator::generate`]. Counted even in quiet mode.
    pub fn clock_regressions(&self) -> u64 {
        self.snapshot().clock_regressions
    }

    /// Generates the next id for `category` from the current time.
    ///
    /// If the clock is behind the last used millisecond, the last millisecond
    /// is reused. If the 1024 sequence numbers of a millisecond are used up,
    /// the call sleeps in [`ROLLOVER_WAIT_INTERVAL`] steps (holding the lock)
    /// until the clock moves on, for at most [`MAX_ROLLOVER_WAIT_ATTEMPTS`]
    /// samples.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidCategory`] if `category > 1023`
    /// - [`Error::ClockStalled`] if the clock never advanced during the wait
    /// - [`Error::TimestampOverflow`] once the 41-bit timestamp is used up
    /// - [`Error::MonotonicityViolation`] if strict checking is on and the id
    ///   is not above the last one
    /// - [`Error::LockPoisoned`] if another thread panicked while holding the
    ///   lock (std mutex only)
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn generate(&self, category: u16) -> Result<ArbiterId> {
        check_category(category)?;

        let mut state = self.lock()?;
        let mut now = self.time.current_millis();

        if now < state.timestamp {
            self.on_clock_behind(&mut state, now);
            now = state.timestamp;
        }

        let sequence = if state.last_id.is_some() && now == state.timestamp {
            let next = (state.sequence + 1) & ArbiterId::MAX_SEQUENCE;
            if next == 0 {
                now = self.wait_for_next_millis(state.timestamp)?;
            }
            next
        } else {
            0
        };

        if now > ArbiterId::MAX_TIMESTAMP {
            #[cfg(feature = "tracing")]
            if !self.options.quiet {
                tracing::error!(
                    node = self.node,
                    timestamp = now,
                    max = ArbiterId::MAX_TIMESTAMP,
                    epoch = EPOCH_MILLIS,
                    "timestamp overflowed the 41-bit field"
                );
            }
            return Err(Error::TimestampOverflow {
                timestamp: now,
                max: ArbiterId::MAX_TIMESTAMP,
            });
        }

        self.commit(&mut state, category, now, sequence)
    }

    /// Generates an id for `category` at a caller-supplied wall-clock time.
    ///
    /// Deterministic: no clock is read, nothing waits, and backward steps are
    /// not smoothed over.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidCategory`] if `category > 1023`
    /// - [`Error::FieldOutOfRange`] if `time` is before the epoch or past the
    ///   41-bit horizon
    /// - [`Error::SequenceExhausted`] if `time` is the last used millisecond
    ///   and its sequence is used up
    /// - [`Error::MonotonicityViolation`] if strict checking is on and `time`
    ///   is earlier than the last used millisecond
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn generate_at(&self, category: u16, time: SystemTime) -> Result<ArbiterId> {
        self.generate_fixed(category, millis_since_epoch(time).into())
    }

    /// Like [`Generator::generate_at`], with the time given in Unix
    /// milliseconds.
    ///
    /// # Errors
    ///
    /// See [`Generator::generate_at`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn generate_at_unix_millis(&self, category: u16, unix_millis: i64) -> Result<ArbiterId> {
        self.generate_fixed(category, i128::from(unix_millis) - i128::from(EPOCH_MILLIS))
    }

    /// Like [`Generator::generate`], but panics instead of returning an error.
    ///
    /// # Panics
    ///
    /// Panics on any error [`Generator::generate`] can return.
    pub fn generate_or_panic(&self, category: u16) -> ArbiterId {
        match self.generate(category) {
            Ok(id) => id,
            Err(e) => {
                #[cfg(feature = "tracing")]
                if !self.options.quiet {
                    tracing::error!(node = self.node, category, error = %e, "id generation failed");
                }
                panic!("failed to generate id for category {category}: {e}")
            }
        }
    }

    fn generate_fixed(&self, category: u16, offset: i128) -> Result<ArbiterId> {
        check_category(category)?;
        let timestamp = u64::try_from(offset).map_err(|_| Error::FieldOutOfRange {
            field: Field::Timestamp,
            value: offset,
            max: ArbiterId::MAX_TIMESTAMP,
        })?;

        let mut state = self.lock()?;
        let sequence = if state.last_id.is_some() && timestamp == state.timestamp {
            if state.sequence == ArbiterId::MAX_SEQUENCE {
                return Err(Error::SequenceExhausted { timestamp });
            }
            state.sequence + 1
        } else {
            0
        };

        self.commit(&mut state, category, timestamp, sequence)
    }

    /// Packs the id and, if ordering holds, records it as the new state.
    fn commit(
        &self,
        state: &mut GeneratorState,
        category: u16,
        timestamp: u64,
        sequence: u16,
    ) -> Result<ArbiterId> {
        let id = ArbiterId::pack(category, timestamp, self.node, sequence)?;

        if self.options.strict_monotonicity {
            if let Some(last_id) = state.last_id {
                if id <= last_id {
                    return Err(self.cold_monotonicity_violation(id, last_id));
                }
            }
        }

        state.timestamp = timestamp;
        state.sequence = sequence;
        state.last_id = Some(id);
        Ok(id)
    }

    #[cold]
    #[inline(never)]
    fn on_clock_behind(&self, state: &mut GeneratorState, now: u64) {
        let behind = state.timestamp - now;
        if behind <= CLOCK_JITTER_MS {
            return;
        }
        state.clock_regressions += 1;
        if self.options.quiet {
            return;
        }

        let due = state
            .last_warning
            .is_none_or(|at| at.elapsed() >= CLOCK_WARNING_INTERVAL);
        if due {
            state.last_warning = Some(Instant::now());
            #[cfg(feature = "tracing")]
            tracing::warn!(
                node = self.node,
                now,
                last = state.timestamp,
                behind_ms = behind,
                regressions = state.clock_regressions,
                "clock moved backwards; reusing last timestamp"
            );
        }
    }

    /// Polls the clock until it passes `stuck`.
    #[cold]
    #[inline(never)]
    fn wait_for_next_millis(&self, stuck: u64) -> Result<u64> {
        let mut observed = stuck;
        for _ in 0..MAX_ROLLOVER_WAIT_ATTEMPTS {
            std::thread::sleep(ROLLOVER_WAIT_INTERVAL);
            observed = self.time.current_millis();
            if observed > stuck {
                return Ok(observed);
            }
        }

        #[cfg(feature = "tracing")]
        if !self.options.quiet {
            tracing::error!(
                node = self.node,
                timestamp = stuck,
                observed,
                attempts = MAX_ROLLOVER_WAIT_ATTEMPTS,
                "clock appears stuck"
            );
        }
        Err(Error::ClockStalled {
            timestamp: stuck,
            observed,
            attempts: MAX_ROLLOVER_WAIT_ATTEMPTS,
        })
    }

    #[cold]
    #[inline(never)]
    fn cold_monotonicity_violation(&self, id: ArbiterId, last_id: ArbiterId) -> Error {
        #[cfg(feature = "tracing")]
        if !self.options.quiet {
            tracing::error!(
                node = self.node,
                id = id.to_raw(),
                last_id = last_id.to_raw(),
                "monotonicity violation"
            );
        }
        Error::MonotonicityViolation {
            id,
            last_id,
            timestamp: id.timestamp(),
            sequence: id.sequence(),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, GeneratorState>> {
        #[cfg(feature = "parking-lot")]
        {
            Ok(self.state.lock())
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            Ok(self.state.lock()?)
        }
    }

    /// Locks for reading only. State is consistent even after a panic, so a
    /// poisoned std mutex is entered anyway.
    fn snapshot(&self) -> MutexGuard<'_, GeneratorState> {
        #[cfg(feature = "parking-lot")]
        {
            self.state.lock()
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            self.state
                .lock()
                .unwrap_or_else(crate::generator::PoisonError::into_inner)
        }
    }
}

fn check_category(category: u16) -> Result<()> {
    if category > ArbiterId::MAX_CATEGORY {
        return Err(Error::InvalidCategory {
            category,
            max: ArbiterId::MAX_CATEGORY,
        });
    }
    Ok(())
}
