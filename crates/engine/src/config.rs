//! Engine configuration

use gem_cascade_types::{
    DEFAULT_BOARD_SIZE, DEFAULT_GENERATION_ATTEMPTS, MAX_CASCADE_ROUNDS, STARTING_LEVEL,
};

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Board edge used by `initialize` callers that have no preference
    pub board_size: usize,
    /// Seed for the default RNG; `None` seeds from the operating system
    pub seed: Option<u32>,
    pub max_generation_attempts: u32,
    pub max_cascade_rounds: u32,
    pub starting_level: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            seed: None,
            max_generation_attempts: DEFAULT_GENERATION_ATTEMPTS,
            max_cascade_rounds: MAX_CASCADE_ROUNDS,
            starting_level: STARTING_LEVEL,
        }
    }
}

impl EngineConfig {
    /// Create from environment variables
    ///
    /// - `GEM_CASCADE_BOARD_SIZE`
    /// - `GEM_CASCADE_SEED`
    /// - `GEM_CASCADE_MAX_ATTEMPTS`
    /// - `GEM_CASCADE_MAX_CASCADES`
    /// - `GEM_CASCADE_START_LEVEL`
    ///
    /// Missing or unparseable values keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`EngineConfig::from_env`] over an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        fn parse<T: std::str::FromStr>(
            lookup: &impl Fn(&str) -> Option<String>,
            key: &str,
        ) -> Option<T> {
            lookup(key).and_then(|v| v.trim().parse().ok())
        }

        let defaults = Self::default();
        let parse_u32 = |key: &str| -> Option<u32> { parse(&lookup, key) };

        Self {
            board_size: parse(&lookup, "GEM_CASCADE_BOARD_SIZE").unwrap_or(defaults.board_size),
            seed: parse_u32("GEM_CASCADE_SEED").or(defaults.seed),
            max_generation_attempts: parse_u32("GEM_CASCADE_MAX_ATTEMPTS")
                .unwrap_or(defaults.max_generation_attempts),
            max_cascade_rounds: parse_u32("GEM_CASCADE_MAX_CASCADES")
                .unwrap_or(defaults.max_cascade_rounds),
            starting_level: parse_u32("GEM_CASCADE_START_LEVEL")
                .map(|l| l.max(1))
                .unwrap_or(defaults.starting_level),
        }
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_board_size(mut self, size: usize) -> Self {
        self.board_size = size;
        self
    }
}
