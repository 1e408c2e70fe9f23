//! Merge-back of solved assignments onto the session rows.
//!
//! After a solve, the assignment table is folded into the session table so
//! the result can be exported and, on the next planning pass, re-fed with the
//! fresh assignments pinned: the new teacher becomes `teacher` and
//! `ultimo_professor`, the old `ultimo_professor` shifts to
//! `penultimo_professor`.

use rotaplan_core::{AssignmentTable, ClassSession};

/// Result of folding assignments back into the session rows
#[derive(Clone, Debug)]
pub struct MergeOutcome {
    /// Every session, with teacher and continuity history updated
    pub updated: Vec<ClassSession>,
    /// The subset that still has no teacher after the merge
    pub unfilled: Vec<ClassSession>,
}

/// Fold an assignment table into the session rows.
///
/// Sessions that already named a teacher and were not re-assigned keep their
/// teacher. History shifts only on rows that received a fresh assignment.
pub fn apply_assignments(sessions: &[ClassSession], assignments: &AssignmentTable) -> MergeOutcome {
    let mut updated = Vec::with_capacity(sessions.len());
    let mut unfilled = Vec::new();

    for session in sessions {
        let mut row = session.clone();
        if let Some(teacher) = assignments.teacher_for(&session.group) {
            row.previous_teacher = row.last_teacher.take();
            row.last_teacher = Some(teacher.clone());
            row.assigned = Some(teacher.clone());
        }
        if row.assigned.is_none() {
            unfilled.push(row.clone());
        }
        updated.push(row);
    }

    MergeOutcome { updated, unfilled }
}
