//! Runs a finished formulation on the configured backend under a time budget.

use core::time::Duration;
use std::collections::HashMap;

use good_lp::solvers::ObjectiveDirection::Maximisation;
use good_lp::solvers::{SolutionStatus, WithInitialSolution, WithTimeLimit};
use good_lp::{
    Constraint, Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable,
};
use tracing::{debug, warn};

use crate::model::VariableIndex;
use crate::outcome::SolveStatus;

/// Solved values of the variables extraction reads. Unknown variables read 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolvedValues(HashMap<Variable, f64>);

impl SolvedValues {
    #[must_use]
    pub fn value(&self, variable: Variable) -> f64 {
        self.0.get(&variable).copied().unwrap_or(0.0)
    }

    pub fn insert(&mut self, variable: Variable, value: f64) {
        self.0.insert(variable, value);
    }

    fn read<S: Solution>(solution: &S, watched: &[Variable]) -> Self {
        Self(
            watched
                .iter()
                .map(|variable| (*variable, solution.value(*variable)))
                .collect(),
        )
    }
}

pub struct SolverRun {
    pub status: SolveStatus,
    pub values: Option<SolvedValues>,
}

impl SolverRun {
    fn solved(status: SolveStatus, values: SolvedValues) -> Self {
        Self {
            status,
            values: Some(values),
        }
    }

    fn unsolved(status: SolveStatus) -> Self {
        Self {
            status,
            values: None,
        }
    }

    /// Status of a run that ended with a solution.
    #[must_use]
    pub fn status_of(status: SolutionStatus) -> SolveStatus {
        match status {
            SolutionStatus::Optimal => SolveStatus::Optimal,
            SolutionStatus::TimeLimit | SolutionStatus::GapLimit => SolveStatus::Feasible,
        }
    }

    #[must_use]
    pub fn failed(error: &ResolutionError) -> Self {
        let status = match error {
            ResolutionError::Infeasible => SolveStatus::Infeasible,
            // a maximised objective over bounded variables cannot be unbounded
            ResolutionError::Unbounded => SolveStatus::ModelInvalid,
            ResolutionError::Other(raw) => SolveStatus::Unknown((*raw).to_owned()),
            ResolutionError::Str(raw) => SolveStatus::Unknown(raw.clone()),
        };
        Self::unsolved(status)
    }
}

/// Maximises `objective` subject to `constraints` and reads back every
/// variable in `index`.
///
/// The backend stops itself once `budget` is spent and keeps its best
/// solution. It starts from the schedule that assigns nobody, so a run that
/// is cut short still has one.
#[must_use]
pub fn run(
    variables: ProblemVariables,
    constraints: Vec<Constraint>,
    index: &VariableIndex,
    objective: Expression,
    budget: Duration,
) -> SolverRun {
    let watched: Vec<Variable> = index
        .assign
        .values()
        .chain(index.shortage.values())
        .chain(&index.total_tenths)
        .chain(index.min_shortage.iter().flatten())
        .copied()
        .collect();
    debug!(
        variables = variables.len(),
        constraints = constraints.len(),
        budget_ms = budget.as_millis() as u64,
        backend = backend::NAME,
        "starting solver"
    );
    let problem = variables.optimise(Maximisation, objective);
    let model = backend::model(problem)
        .with_time_limit(budget.as_secs_f64())
        .with_initial_solution(index.empty_schedule.iter().copied());
    solve_model(model, constraints, &watched)
}

fn solve_model<M>(model: M, constraints: Vec<Constraint>, watched: &[Variable]) -> SolverRun
where
    M: SolverModel<Error = ResolutionError>,
{
    let model = constraints.into_iter().fold(model, SolverModel::with);
    match model.solve() {
        Ok(solution) => {
            let status = SolverRun::status_of(solution.status());
            if status == SolveStatus::Feasible {
                warn!("solver stopped before proving optimality");
            }
            SolverRun::solved(status, SolvedValues::read(&solution, watched))
        }
        Err(error) => SolverRun::failed(&error),
    }
}

#[cfg(not(feature = "coin_cbc"))]
mod backend {
    use good_lp::solvers::highs::{highs, HighsProblem};
    use good_lp::variable::UnsolvedProblem;

    pub const NAME: &str = "highs";

    /// Quiet HiGHS that only stops early on the time limit. Objective values
    /// are integral, so an absolute gap below 1 is a proof of optimality.
    pub fn model(problem: UnsolvedProblem) -> HighsProblem {
        highs(problem)
            .set_option("output_flag", false)
            .set_option("mip_rel_gap", 0.0)
            .set_option("mip_abs_gap", 0.5)
    }
}

#[cfg(feature = "coin_cbc")]
mod backend {
    use good_lp::solvers::coin_cbc::{coin_cbc, CoinCbcProblem};
    use good_lp::variable::UnsolvedProblem;

    pub const NAME: &str = "cbc";

    pub fn model(problem: UnsolvedProblem) -> CoinCbcProblem {
        let mut model = coin_cbc(problem);
        model.set_parameter("logLevel", "0");
        model.set_parameter("ratioGap", "0");
        model.set_parameter("allowableGap", "0.5");
        model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solution_statuses() {
        assert_eq!(
            SolverRun::status_of(SolutionStatus::Optimal),
            SolveStatus::Optimal
        );
        assert_eq!(
            SolverRun::status_of(SolutionStatus::TimeLimit),
            SolveStatus::Feasible
        );
        assert_eq!(
            SolverRun::status_of(SolutionStatus::GapLimit),
            SolveStatus::Feasible
        );
    }

    #[test]
    fn resolution_errors() {
        let status = |error: ResolutionError| SolverRun::failed(&error).status;
        assert_eq!(status(ResolutionError::Infeasible), SolveStatus::Infeasible);
        assert_eq!(status(ResolutionError::Unbounded), SolveStatus::ModelInvalid);
        assert_eq!(
            status(ResolutionError::Other("NoSolutionFound")),
            SolveStatus::Unknown("NoSolutionFound".to_owned())
        );
        assert_eq!(
            status(ResolutionError::Str("LoadError".to_owned())),
            SolveStatus::Unknown("LoadError".to_owned())
        );
        assert!(SolverRun::failed(&ResolutionError::Infeasible).values.is_none());
    }
}
