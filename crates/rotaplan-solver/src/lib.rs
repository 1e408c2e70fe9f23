//! # rotaplan-solver
//!
//! Constraint-programming assignment engine: the core of rotaplan.
//!
//! This crate provides:
//! - The assignment model builder (one 0/1 variable per teacher × group)
//! - The constraint compiler (every scheduling rule, policy-selected)
//! - The single-expression objective composer
//! - The solver driver with wall-clock budget, seed audit and the
//!   hard-to-soft fallback protocol
//! - The result materializer
//!
//! ## Example
//!
//! ```rust
//! use rotaplan_core::{Availability, ClassSession, ClockTime, Roster, SolveOptions, Teacher, Weekday};
//! use rotaplan_solver::RotationSolver;
//!
//! let roster = Roster::new(
//!     vec![ClassSession::new("CONV A1", Weekday::Segunda, ClockTime::new(8, 0))],
//!     vec![Teacher::new("Ana").weekday(Weekday::Segunda, Availability::Available)],
//! );
//! let solver = RotationSolver::new(SolveOptions { seed: Some(7), ..SolveOptions::default() });
//! let report = solver.solve(&roster).unwrap();
//! assert_eq!(report.assignments.teacher_for("CONV A1"), Some(&"Ana".to_string()));
//! ```

use rotaplan_core::{Roster, SolveOptions};
use thiserror::Error;

mod constraints;
mod driver;
mod extract;
mod indexes;
mod model;
mod objective;

pub use driver::{solve, solve_with_fallback, SolveOutcome, SolveReport, TeacherLoad};

/// Model-construction error: no partial model is ever built.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SolveError {
    #[error("cannot build a model over an empty session collection")]
    EmptySessions,

    #[error("cannot build a model over an empty teacher collection")]
    EmptyTeachers,
}

/// Facade over the driver holding one set of options.
#[derive(Clone, Debug, Default)]
pub struct RotationSolver {
    pub options: SolveOptions,
}

impl RotationSolver {
    pub fn new(options: SolveOptions) -> Self {
        Self { options }
    }

    /// One solve under the configured policy
    pub fn solve(&self, roster: &Roster) -> Result<SolveReport, SolveError> {
        driver::solve(roster, &self.options)
    }

    /// The two-attempt fallback protocol (hard workload, then relaxed)
    pub fn solve_with_fallback(&self, roster: &Roster) -> Result<SolveReport, SolveError> {
        driver::solve_with_fallback(roster, &self.options)
    }
}
