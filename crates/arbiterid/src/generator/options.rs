/// Behavior flags for a [`Generator`].
///
/// # Example
///
/// ```
/// use arbiterid::GeneratorOptions;
///
/// let options = GeneratorOptions::default().with_quiet(true);
/// assert!(options.strict_monotonicity);
/// assert!(options.quiet);
/// ```
///
/// [`Generator`]: crate::Generator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GeneratorOptions {
    /// Fail with [`Error::MonotonicityViolation`] instead of returning an id
    /// that is not strictly greater than the previous one. Defaults to `true`.
    ///
    /// Ids of a lower category than the previous id compare lower, so a
    /// generator shared across categories should turn this off.
    ///
    /// [`Error::MonotonicityViolation`]: crate::Error::MonotonicityViolation
    pub strict_monotonicity: bool,

    /// Suppress the initialization banner, clock-regression warnings and
    /// error events. Defaults to `false`. Does not change behavior.
    pub quiet: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratorOptions {
    pub const fn new() -> Self {
        Self {
            strict_monotonicity: true,
            quiet: false,
        }
    }

    #[must_use]
    pub const fn with_strict_monotonicity(mut self, enable: bool) -> Self {
        self.strict_monotonicity = enable;
        self
    }

    #[must_use]
    pub const fn with_quiet(mut self, enable: bool) -> Self {
        self.quiet = enable;
        self
    }
}
