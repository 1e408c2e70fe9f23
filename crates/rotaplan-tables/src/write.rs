//! CSV writers for the normalized session table and the assignment table.

use std::io::Write;
use std::path::Path;

use rotaplan_core::{AssignmentTable, ClassSession};

use crate::{columns, TableError};

/// Write the normalized session table as CSV, one row per atomic session.
pub fn write_sessions_csv<W: Write>(
    writer: W,
    sessions: &[ClassSession],
) -> Result<(), TableError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record([
        columns::GROUP,
        columns::WEEKDAYS,
        columns::TIME,
        columns::UNIT,
        columns::STATUS,
        columns::MODALITY,
        columns::CATEGORY,
        columns::STAGE,
        columns::WEEKLY_SESSIONS,
        columns::TEACHER,
        columns::LAST_TEACHER,
        columns::PREVIOUS_TEACHER,
        columns::EXCLUDED_TEACHERS,
    ])?;

    for session in sessions {
        let time = session.time.as_hhmmss();
        let count = session.weekly_sessions.to_string();
        let excluded = session.excluded.join(", ");
        out.write_record([
            session.group.as_str(),
            session.weekday.as_str(),
            time.as_str(),
            session.unit.as_str(),
            session.mode.as_str(),
            session.modality.as_str(),
            session.category.as_str(),
            session.stage.as_str(),
            count.as_str(),
            session.assigned.as_deref().unwrap_or("-"),
            session.last_teacher.as_deref().unwrap_or("-"),
            session.previous_teacher.as_deref().unwrap_or("-"),
            excluded.as_str(),
        ])?;
    }
    out.flush()?;
    Ok(())
}

/// Write the raw assignment table as CSV.
pub fn write_assignments_csv<W: Write>(
    writer: W,
    assignments: &AssignmentTable,
) -> Result<(), TableError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record([columns::GROUP, columns::ASSIGNED_TEACHER])?;
    for row in &assignments.rows {
        out.write_record([row.group.as_str(), row.teacher.as_str()])?;
    }
    out.flush()?;
    Ok(())
}

/// Path-based convenience for `write_sessions_csv`
pub fn write_sessions_csv_file(path: &Path, sessions: &[ClassSession]) -> Result<(), TableError> {
    write_sessions_csv(std::fs::File::create(path)?, sessions)
}

/// Path-based convenience for `write_assignments_csv`
pub fn write_assignments_csv_file(
    path: &Path,
    assignments: &AssignmentTable,
) -> Result<(), TableError> {
    write_assignments_csv(std::fs::File::create(path)?, assignments)
}
