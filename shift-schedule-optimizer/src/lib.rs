//! Weekly staff shift scheduling as a mixed integer program.
//!
//! [`solve`] validates a [`ScheduleRequest`], builds the assignment model,
//! weighs the soft goals into one objective, runs the solver under the
//! configured time budget and extracts the schedule with its warnings.

extern crate alloc;

pub mod domain;
pub mod error;
pub mod extract;
pub mod model;
pub mod objective;
pub mod outcome;
pub mod preprocess;
pub mod settings;
pub mod shifts;
pub mod solver;
pub mod time;

use std::time::Instant;

use tracing::{debug, error, info, info_span, warn};

pub use crate::domain::{
    Day, RoleName, Schedule, ScheduleRequest, ShiftDefinition, ShiftDefinitions, ShiftPreference,
    ShiftType, Staff, StaffId, TimeSpan, UnavailabilityEntry, WeeklyNeeds,
};
pub use crate::error::InputError;
pub use crate::outcome::{SolveOutcome, SolveStatus};
pub use crate::settings::SolverSettings;
pub use crate::shifts::{validate_shift_definitions, ShiftDefinitionError};
use crate::model::{Formulation, VariableIndex};
use crate::objective::Objective;
use crate::preprocess::Instance;
use crate::solver::SolverRun;

const INFEASIBLE_WARNING: &str = "Error: Could not generate any schedule due to conflicting hard \
                                  constraints (e.g., unavailability, max hours).";
const MODEL_INVALID_WARNING: &str = "Error: The scheduling model definition is invalid.";

/// Computes one week's schedule. Never fails: problems are reported as a
/// missing schedule plus warnings.
#[must_use]
pub fn solve(request: &ScheduleRequest, settings: &SolverSettings) -> SolveOutcome {
    let span = info_span!(
        "solve",
        staff = request.staff_list.len(),
        preference = ?request.shift_preference,
        staff_priority = request.staff_priority.len(),
    );
    let _entered = span.enter();

    let instance = match Instance::from_request(request, settings) {
        Ok(instance) => instance,
        Err(rejection) => {
            warn!(%rejection, "rejected request");
            return SolveOutcome::rejected(rejection);
        }
    };

    let started = Instant::now();
    let mut formulation = Formulation::build(&instance);
    let objective = Objective::build(&instance, &mut formulation);
    debug!(weights = ?objective.weights, "objective assembled");
    let Formulation {
        variables,
        constraints,
        index,
    } = formulation;
    let run = solver::run(
        variables,
        constraints,
        &index,
        objective.expression,
        settings.time_limit(),
    );
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    info!(status = %run.status, elapsed_ms, "solver finished");

    let status = run.status.clone();
    let (schedule, warnings) = conclude(run, &instance, &index);

    SolveOutcome {
        schedule,
        warnings,
        elapsed_ms,
        status,
    }
}

/// Schedule and warnings for a finished run. Only an optimal or feasible
/// run yields a schedule.
fn conclude(run: SolverRun, instance: &Instance, index: &VariableIndex) -> (Option<Schedule>, Vec<String>) {
    match (&run.status, run.values) {
        (status, Some(values)) if status.has_solution() => {
            let (schedule, warnings) = extract::extract(instance, index, &values);
            if schedule.is_empty() {
                info!("solution assigns nobody");
            }
            (Some(schedule), warnings)
        }
        (SolveStatus::Infeasible, _) => {
            error!("model reported infeasible");
            (None, vec![INFEASIBLE_WARNING.to_owned()])
        }
        (SolveStatus::ModelInvalid, _) => {
            error!("model reported invalid");
            (None, vec![MODEL_INVALID_WARNING.to_owned()])
        }
        (status, _) => (
            None,
            vec![format!(
                "Solver stopped without an optimal/feasible solution (Status: {status}). Time \
                 limit might be too short or model issues."
            )],
        ),
    }
}
