//! Result materializer.
//!
//! Turns the solved variable grid back into an assignment table, one row per
//! (teacher, group) variable that solved to 1, plus a per-teacher load
//! summary. Zero rows is a legitimate value: it is the signal that the
//! caller should retry under a relaxed policy.

use rotaplan_core::{AssignmentRow, AssignmentTable, Roster};

use crate::driver::TeacherLoad;
use crate::indexes::RosterIndex;

/// Build the assignment table and per-teacher loads from the solved grid.
///
/// Rows come out in (group, teacher) roster order, independent of the seeded
/// variable creation order, so identical solutions print identically.
pub(crate) fn materialize(
    roster: &Roster,
    index: &RosterIndex<'_>,
    grid: &[Vec<bool>],
) -> (AssignmentTable, Vec<TeacherLoad>) {
    let mut rows = Vec::new();
    for (g, group) in index.groups().iter().enumerate() {
        for (t, teacher) in roster.teachers.iter().enumerate() {
            if grid[t][g] {
                rows.push(AssignmentRow {
                    teacher: teacher.id.clone(),
                    group: (*group).to_string(),
                });
            }
        }
    }

    let loads = roster
        .teachers
        .iter()
        .enumerate()
        .map(|(t, teacher)| {
            let mut groups = Vec::new();
            let mut weighted_sessions = 0;
            for (g, group) in index.groups().iter().enumerate() {
                if grid[t][g] {
                    groups.push((*group).to_string());
                    weighted_sessions += index.sessions_of(g)[0].weekly_sessions;
                }
            }
            TeacherLoad { teacher: teacher.id.clone(), groups, weighted_sessions }
        })
        .collect();

    (AssignmentTable::new(rows), loads)
}
