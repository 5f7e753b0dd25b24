use core::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_TIME_LIMIT_SECONDS: f64 = 60.0;

/// Knobs of a single solve, owned by the caller rather than process globals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Wall-clock budget handed to the solver backend.
    pub time_limit_seconds: f64,
    /// Upper bound on staff x day x shift x role assignment variables.
    pub max_decision_variables: usize,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            time_limit_seconds: DEFAULT_TIME_LIMIT_SECONDS,
            max_decision_variables: 250_000,
        }
    }
}

impl SolverSettings {
    /// Falls back to the default budget for non-positive or non-finite values.
    #[must_use]
    pub fn time_limit(&self) -> Duration {
        if self.time_limit_seconds > 0.0 {
            Duration::try_from_secs_f64(self.time_limit_seconds)
                .unwrap_or(Duration::from_secs_f64(DEFAULT_TIME_LIMIT_SECONDS))
        } else {
            Duration::from_secs_f64(DEFAULT_TIME_LIMIT_SECONDS)
        }
    }
}
