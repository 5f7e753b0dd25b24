use core::fmt::{self, Display};

use serde::Serialize;

use crate::domain::Schedule;

/// How a solve ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SolveStatus {
    Optimal,
    /// A solution was found but the time budget ran out before optimality
    /// was proven.
    Feasible,
    Infeasible,
    ModelInvalid,
    /// Raw backend status, e.g. `TIME_LIMIT`.
    Unknown(String),
    /// The request was rejected before a model was built.
    NotSolved,
}

impl SolveStatus {
    #[must_use]
    pub const fn has_solution(&self) -> bool {
        matches!(self, Self::Optimal | Self::Feasible)
    }
}

impl Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Optimal => f.write_str("OPTIMAL"),
            Self::Feasible => f.write_str("FEASIBLE"),
            Self::Infeasible => f.write_str("INFEASIBLE"),
            Self::ModelInvalid => f.write_str("MODEL_INVALID"),
            Self::Unknown(raw) => f.write_str(raw),
            Self::NotSolved => f.write_str("NOT_SOLVED"),
        }
    }
}

/// Result of [`crate::solve`]. Failures are carried as data: no schedule and
/// an explanatory warning.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveOutcome {
    pub schedule: Option<Schedule>,
    pub warnings: Vec<String>,
    pub elapsed_ms: u64,
    pub status: SolveStatus,
}

impl SolveOutcome {
    #[must_use]
    pub fn rejected(reason: impl Display) -> Self {
        Self {
            schedule: None,
            warnings: vec![reason.to_string()],
            elapsed_ms: 0,
            status: SolveStatus::NotSolved,
        }
    }
}
