//! Solver driver.
//!
//! Configures and invokes the CP solver over the compiled model, maps the
//! four solver outcomes onto the two the caller cares about (usable result /
//! no result), and runs the policy-level fallback protocol: a strict
//! hard-workload attempt first, then a from-scratch re-solve under the
//! double-weighted soft policy if the first attempt produced zero rows.

use std::time::Instant;

use pumpkin_solver::optimisation::linear_sat_unsat::LinearSatUnsat;
use pumpkin_solver::optimisation::OptimisationDirection;
use pumpkin_solver::results::{OptimisationResult, ProblemSolution};
use pumpkin_solver::termination::TimeBudget;
use pumpkin_solver::Solver;
use rotaplan_core::{
    AssignmentTable, Finding, GroupName, PolicyVariant, Roster, SolveOptions, TeacherId,
};

use crate::extract::materialize;
use crate::indexes::RosterIndex;
use crate::model::AssignmentModel;
use crate::{constraints, objective, SolveError};

/// How the solve ended. Optimal and Feasible are both usable results.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolveOutcome {
    /// Proven optimal under the composed objective
    Optimal,
    /// A solution was found but optimality was not proven in the budget
    Feasible,
    /// Infeasible, or the budget expired with no solution at all
    NoSolution,
}

impl SolveOutcome {
    pub fn is_usable(&self) -> bool {
        !matches!(self, SolveOutcome::NoSolution)
    }
}

/// Per-teacher summary of a solved rotation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TeacherLoad {
    pub teacher: TeacherId,
    pub groups: Vec<GroupName>,
    /// Sum of the weekly session counts of the assigned groups
    pub weighted_sessions: u32,
}

/// Everything one solve (or fallback sequence) produced.
#[derive(Clone, Debug)]
pub struct SolveReport {
    pub assignments: AssignmentTable,
    pub outcome: SolveOutcome,
    /// Policy of the attempt that produced `assignments`
    pub policy: PolicyVariant,
    /// Every policy tried, in order
    pub attempts: Vec<PolicyVariant>,
    /// The seed this run used (drawn from entropy when not supplied)
    pub seed: u64,
    /// Final value of the combined objective, when a solution exists
    pub objective: Option<i64>,
    pub loads: Vec<TeacherLoad>,
    /// Findings the constraint compiler surfaced while building the model
    pub findings: Vec<Finding>,
    pub elapsed: std::time::Duration,
}

/// Build, constrain and solve one model under the options' policy.
pub fn solve(roster: &Roster, options: &SolveOptions) -> Result<SolveReport, SolveError> {
    let started = Instant::now();

    let seed = options.seed.unwrap_or_else(|| {
        let drawn = rand::random::<u64>();
        tracing::info!(seed = drawn, "no seed supplied, drew one from entropy (run is not reproducible)");
        drawn
    });

    tracing::info!(
        policy = %options.policy,
        seed,
        sessions = roster.sessions.len(),
        teachers = roster.teachers.len(),
        time_budget_secs = options.time_budget_secs,
        workers = options.workers,
        "starting solve"
    );

    let index = RosterIndex::build(roster);
    let mut model = AssignmentModel::build(roster, &index, seed)?;
    let compiled = constraints::compile(&mut model, roster, &index, options);
    let objective_var = objective::compose(&mut model, &compiled.penalties, &options.weights);

    let mut brancher = model.solver.default_brancher();
    let mut termination = TimeBudget::starting_now(options.time_budget());

    fn noop_callback<B>(_: &Solver, _: pumpkin_solver::results::SolutionReference, _: &B) {}
    let result = model.solver.optimise(
        &mut brancher,
        &mut termination,
        LinearSatUnsat::new(OptimisationDirection::Minimise, objective_var, noop_callback),
    );

    let (outcome, grid, objective) = match result {
        OptimisationResult::Optimal(solution) => {
            let objective = i64::from(solution.get_integer_value(objective_var));
            (SolveOutcome::Optimal, Some(read_grid(&model, &solution)), Some(objective))
        }
        OptimisationResult::Satisfiable(solution) => {
            let objective = i64::from(solution.get_integer_value(objective_var));
            (SolveOutcome::Feasible, Some(read_grid(&model, &solution)), Some(objective))
        }
        OptimisationResult::Unsatisfiable => (SolveOutcome::NoSolution, None, None),
        OptimisationResult::Unknown => (SolveOutcome::NoSolution, None, None),
    };

    let (assignments, loads) = match &grid {
        Some(grid) => materialize(roster, &index, grid),
        None => (AssignmentTable::default(), Vec::new()),
    };

    let elapsed = started.elapsed();
    tracing::info!(
        outcome = ?outcome,
        assignments = assignments.len(),
        objective,
        elapsed_ms = elapsed.as_millis() as u64,
        "solve finished"
    );

    Ok(SolveReport {
        assignments,
        outcome,
        policy: options.policy,
        attempts: vec![options.policy],
        seed,
        objective,
        loads,
        findings: compiled.findings,
        elapsed,
    })
}

/// The two-attempt fallback protocol.
///
/// Attempt 1 runs the strict hard-workload policy. If (and only if) it
/// yields zero assignments, attempt 2 re-solves from scratch under the
/// double-weighted soft policy; nothing carries over between attempts except
/// the roster itself, pins included. Attempts are strictly sequential.
pub fn solve_with_fallback(
    roster: &Roster,
    options: &SolveOptions,
) -> Result<SolveReport, SolveError> {
    let first = solve(roster, &options.with_policy(PolicyVariant::HardWorkload))?;
    if !first.assignments.is_empty() {
        return Ok(first);
    }

    tracing::warn!("hard workload policy produced no assignments, retrying with the relaxed policy");
    let mut second = solve(roster, &options.with_policy(PolicyVariant::DoubleWeightedWorkload))?;
    second.attempts = vec![PolicyVariant::HardWorkload, PolicyVariant::DoubleWeightedWorkload];
    Ok(second)
}

/// Read every decision variable out of a solution, teacher-major.
fn read_grid<S: ProblemSolution>(model: &AssignmentModel, solution: &S) -> Vec<Vec<bool>> {
    (0..model.teacher_count())
        .map(|t| {
            (0..model.group_count())
                .map(|g| solution.get_integer_value(model.var(t, g)) >= 1)
                .collect()
        })
        .collect()
}
