use thiserror::Error;

use crate::domain::StaffId;
use crate::shifts::ShiftDefinitionError;

/// Caller errors detected before a model is built. The text is what ends up in
/// the warnings of a rejected solve.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Error: Staff list is empty or invalid.")]
    EmptyStaffList,
    #[error("Error: Could not extract valid staff IDs.")]
    NoValidStaffIds,
    #[error("Error: Duplicate staff id {0} in staff list.")]
    DuplicateStaffId(StaffId),
    #[error("Error: Invalid {field} for staff {id}: must be a finite number >= 0.")]
    InvalidHours { id: StaffId, field: &'static str },
    #[error("Error: Shift definitions are missing or invalid: {0}")]
    ShiftDefinitions(#[from] ShiftDefinitionError),
    #[error("Error: Problem too large ({variables} assignment variables, limit {limit}).")]
    TooLarge { variables: usize, limit: usize },
}
