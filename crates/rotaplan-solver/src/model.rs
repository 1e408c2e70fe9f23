//! Assignment model builder.
//!
//! Declares one 0/1 decision variable per (teacher, group) pair over the full
//! Cartesian product. Ineligible pairs still get a variable; the constraint
//! compiler forces them to zero. All weekday recurrences of a group share one
//! variable, because a group is taught by one teacher across its whole week.
//!
//! Variable creation order is the roster order permuted by a seeded shuffle.
//! The shuffle is where the search-entropy seed becomes observable: the
//! solver's default search is deterministic for a fixed model, so identical
//! seed and roster reproduce the exact same run.

use pumpkin_solver::variables::DomainId;
use pumpkin_solver::Solver;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rotaplan_core::Roster;

use crate::indexes::RosterIndex;
use crate::SolveError;

/// The decision-variable grid plus the solver instance that owns it.
///
/// Owned by exactly one solve invocation and discarded after extraction.
pub(crate) struct AssignmentModel {
    pub(crate) solver: Solver,
    /// Teacher-major grid: `x[t][g]` is 1 iff teacher `t` takes group `g`
    x: Vec<Vec<DomainId>>,
    teacher_count: usize,
    group_count: usize,
}

impl AssignmentModel {
    /// Build the variable grid for a roster.
    ///
    /// Fails fast if either input collection is empty; no partial model is
    /// ever constructed.
    pub(crate) fn build(
        roster: &Roster,
        index: &RosterIndex<'_>,
        seed: u64,
    ) -> Result<Self, SolveError> {
        if roster.sessions.is_empty() {
            return Err(SolveError::EmptySessions);
        }
        if roster.teachers.is_empty() {
            return Err(SolveError::EmptyTeachers);
        }

        let teacher_count = roster.teachers.len();
        let group_count = index.groups().len();

        let mut order: Vec<(usize, usize)> = Vec::with_capacity(teacher_count * group_count);
        for t in 0..teacher_count {
            for g in 0..group_count {
                order.push((t, g));
            }
        }
        order.shuffle(&mut StdRng::seed_from_u64(seed));

        let mut solver = Solver::default();
        let mut grid: Vec<Vec<Option<DomainId>>> = vec![vec![None; group_count]; teacher_count];
        for (t, g) in order {
            grid[t][g] = Some(solver.new_bounded_integer(0, 1));
        }
        let x: Vec<Vec<DomainId>> = grid
            .into_iter()
            .map(|row| row.into_iter().map(|v| v.expect("full cartesian product")).collect())
            .collect();

        tracing::debug!(
            teachers = teacher_count,
            groups = group_count,
            variables = teacher_count * group_count,
            seed,
            "built assignment model"
        );

        Ok(Self { solver, x, teacher_count, group_count })
    }

    /// The variable for a (teacher, group) index pair
    pub(crate) fn var(&self, teacher: usize, group: usize) -> DomainId {
        self.x[teacher][group]
    }

    /// All variables of one teacher, in group order
    pub(crate) fn teacher_vars(&self, teacher: usize) -> &[DomainId] {
        &self.x[teacher]
    }

    /// All variables of one group, in teacher order
    pub(crate) fn group_vars(&self, group: usize) -> Vec<DomainId> {
        (0..self.teacher_count).map(|t| self.x[t][group]).collect()
    }

    pub(crate) fn teacher_count(&self) -> usize {
        self.teacher_count
    }

    pub(crate) fn group_count(&self) -> usize {
        self.group_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rotaplan_core::{ClassSession, ClockTime, Teacher, Weekday};

    fn roster() -> Roster {
        Roster::new(
            vec![
                ClassSession::new("A", Weekday::Segunda, ClockTime::new(8, 0)),
                ClassSession::new("A", Weekday::Quarta, ClockTime::new(8, 0)),
                ClassSession::new("B", Weekday::Segunda, ClockTime::new(9, 0)),
            ],
            vec![Teacher::new("Ana"), Teacher::new("Bruno")],
        )
    }

    #[test]
    fn grid_covers_cartesian_product_of_distinct_groups() {
        let roster = roster();
        let index = RosterIndex::build(&roster);
        let model = AssignmentModel::build(&roster, &index, 7).unwrap();
        // Two teachers, two distinct groups (A recurs but shares a variable)
        assert_eq!(model.teacher_count(), 2);
        assert_eq!(model.group_count(), 2);
        assert_eq!(model.teacher_vars(0).len(), 2);
        assert_eq!(model.group_vars(1).len(), 2);
    }

    #[test]
    fn empty_inputs_fail_fast() {
        let empty_sessions = Roster::new(vec![], vec![Teacher::new("Ana")]);
        let index = RosterIndex::build(&empty_sessions);
        assert!(matches!(
            AssignmentModel::build(&empty_sessions, &index, 0),
            Err(SolveError::EmptySessions)
        ));

        let empty_teachers = Roster::new(
            vec![ClassSession::new("A", Weekday::Segunda, ClockTime::new(8, 0))],
            vec![],
        );
        let index = RosterIndex::build(&empty_teachers);
        assert!(matches!(
            AssignmentModel::build(&empty_teachers, &index, 0),
            Err(SolveError::EmptyTeachers)
        ));
    }
}
