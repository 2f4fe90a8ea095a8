//! Orchestrator configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default per-turn deadline in seconds.
pub const DEFAULT_TURN_TIMEOUT_SECS: u64 = 120;

/// Default number of history pairs replayed into the prompt.
pub const DEFAULT_HISTORY_WINDOW: usize = 8;

/// Default number of exemplar pairs in the prompt.
pub const DEFAULT_EXEMPLAR_LIMIT: usize = 5;

/// Default persona file path.
pub const DEFAULT_PERSONA_FILE: &str = "PERSONA.json";

/// Settings shared by every turn.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Deadline applied to each turn.
    pub turn_timeout: Duration,
    /// Most recent user/assistant pairs kept from history.
    pub history_window: usize,
    /// Exemplar pairs included in the prompt.
    pub exemplar_limit: usize,
    /// Persona JSON file; the embedded persona is used when it is missing.
    pub persona_file: PathBuf,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            turn_timeout: Duration::from_secs(DEFAULT_TURN_TIMEOUT_SECS),
            history_window: DEFAULT_HISTORY_WINDOW,
            exemplar_limit: DEFAULT_EXEMPLAR_LIMIT,
            persona_file: PathBuf::from(DEFAULT_PERSONA_FILE),
        }
    }
}

impl OrchestratorConfig {
    /// Read configuration from environment variables.
    ///
    /// - `SEVENAI_TURN_TIMEOUT_SECS` (default: 120)
    /// - `SEVENAI_HISTORY_WINDOW` (default: 8)
    /// - `SEVENAI_EXEMPLAR_LIMIT` (default: 5)
    /// - `SEVENAI_PERSONA_FILE` (default: PERSONA.json)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            turn_timeout: env::var("SEVENAI_TURN_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.turn_timeout),
            history_window: env::var("SEVENAI_HISTORY_WINDOW")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.history_window),
            exemplar_limit: env::var("SEVENAI_EXEMPLAR_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.exemplar_limit),
            persona_file: env::var("SEVENAI_PERSONA_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.persona_file),
        }
    }

    /// Set the per-turn deadline.
    pub fn with_turn_timeout(mut self, timeout: Duration) -> Self {
        self.turn_timeout = timeout;
        self
    }

    /// Set the history window (in pairs).
    pub fn with_history_window(mut self, pairs: usize) -> Self {
        self.history_window = pairs;
        self
    }

    /// Set the exemplar limit.
    pub fn with_exemplar_limit(mut self, limit: usize) -> Self {
        self.exemplar_limit = limit;
        self
    }
}
