/// Settings for a trigger cycle.
///
/// Use the builder methods to customize, or [`Default`] for the standard
/// behavior: deferred events are replayed and nested emissions may go 64
/// levels deep.
///
/// # Examples
///
/// ```rust
/// use charmsim::Config;
///
/// let config = Config::default()
///     .with_include_deferred(false)   // skip replay of pending events
///     .with_max_emit_depth(16);       // fail fast on runaway emit loops
/// assert!(!config.include_deferred());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Config {
    include_deferred: bool,
    max_emit_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            include_deferred: true,
            max_emit_depth: 64,
        }
    }
}

impl Config {
    /// Whether pending events from the input state are redelivered before the
    /// triggering event. Default: true.
    pub fn with_include_deferred(mut self, include: bool) -> Self {
        self.include_deferred = include;
        self
    }

    pub fn include_deferred(&self) -> bool {
        self.include_deferred
    }

    /// Maximum nesting of emissions made from inside observers. The
    /// triggering event is depth 1, so values below 1 are raised to 1.
    /// Default: 64.
    pub fn with_max_emit_depth(mut self, depth: usize) -> Self {
        self.max_emit_depth = depth.max(1);
        self
    }

    pub fn max_emit_depth(&self) -> usize {
        // Also covers a zero read from JSON.
        self.max_emit_depth.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert!(config.include_deferred());
        assert_eq!(config.max_emit_depth(), 64);
    }

    #[test]
    fn zero_depth_still_allows_the_trigger() {
        assert_eq!(Config::default().with_max_emit_depth(0).max_emit_depth(), 1);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn zero_depth_from_json_is_raised() {
        let config: Config = serde_json::from_str(r#"{"max_emit_depth": 0}"#).unwrap();
        assert_eq!(config.max_emit_depth(), 1);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: Config = serde_json::from_str(r#"{"include_deferred": false}"#).unwrap();
        assert!(!config.include_deferred());
        assert_eq!(config.max_emit_depth(), 64);
    }
}
