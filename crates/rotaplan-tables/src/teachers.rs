//! Teacher-table reader.
//!
//! One row per teacher. Besides the fixed `TEACHER`/`MEDIA`/`INTENSIVO`
//! columns, the table is column-per-flag: six weekday columns holding the
//! 0 / 0.5 / 1 tri-state, one `HH:MM:SS` column per session start time, the
//! two delivery-mode columns, and one column per free-text capability label
//! (unit, modality, category, stage). Columns are classified by header; every
//! unclassified header becomes a capability label.

use rotaplan_core::{
    Availability, CapabilityKey, ClockTime, DeliveryMode, Finding, FindingCode, Severity, Teacher,
    Weekday,
};

use crate::{columns, RawTable, TableError};

/// The parsed teacher table plus the column inventory the audit needs
#[derive(Clone, Debug)]
pub struct TeacherTable {
    pub teachers: Vec<Teacher>,
    /// Every `HH:MM:SS` column present in the table
    pub hour_columns: Vec<ClockTime>,
    /// Every capability key the table has a column for
    pub capability_columns: Vec<CapabilityKey>,
    pub findings: Vec<Finding>,
}

impl TeacherTable {
    /// Find a teacher by id
    pub fn teacher(&self, id: &str) -> Option<&Teacher> {
        self.teachers.iter().find(|t| t.id == id)
    }

    /// Whether an hour column exists for this time
    pub fn has_hour_column(&self, time: ClockTime) -> bool {
        self.hour_columns.contains(&time)
    }

    /// Whether a capability column exists for this key
    pub fn has_capability_column(&self, key: &CapabilityKey) -> bool {
        self.capability_columns.contains(key)
    }
}

enum ColumnKind {
    Id,
    TargetLoad,
    Weekday(Weekday),
    Hour(ClockTime),
    Mode(DeliveryMode),
    Intensive,
    Capability(String),
}

fn classify(header: &str) -> ColumnKind {
    match header {
        columns::TEACHER_ID => ColumnKind::Id,
        columns::TARGET_LOAD => ColumnKind::TargetLoad,
        columns::ONLINE => ColumnKind::Mode(DeliveryMode::Online),
        columns::PRESENCIAL => ColumnKind::Mode(DeliveryMode::Presencial),
        columns::INTENSIVE => ColumnKind::Intensive,
        other => {
            if let Some(day) = Weekday::from_label(other) {
                ColumnKind::Weekday(day)
            } else if let Ok(time) = ClockTime::from_hms(other) {
                ColumnKind::Hour(time)
            } else {
                ColumnKind::Capability(other.to_string())
            }
        }
    }
}

/// Parse the teacher table into `Teacher` records.
///
/// Requires the `TEACHER` column; every other column is classified by header.
/// Cell-level defects (bad tri-state, non-numeric flags) become findings and
/// fall back to the restrictive value.
pub fn read_teacher_table(table: &RawTable) -> Result<TeacherTable, TableError> {
    table.require_column(columns::TEACHER_ID)?;

    let kinds: Vec<ColumnKind> = table.headers().iter().map(|h| classify(h)).collect();

    let mut hour_columns = Vec::new();
    let mut capability_columns = Vec::new();
    for kind in &kinds {
        match kind {
            ColumnKind::Hour(time) => hour_columns.push(*time),
            ColumnKind::Mode(mode) => capability_columns.push(CapabilityKey::Mode(*mode)),
            ColumnKind::Capability(label) => {
                capability_columns.push(CapabilityKey::label(label.clone()));
            }
            _ => {}
        }
    }

    let mut teachers = Vec::new();
    let mut findings = Vec::new();

    let id_col = kinds
        .iter()
        .position(|k| matches!(k, ColumnKind::Id))
        .expect("TEACHER column checked above");

    for row in 0..table.row_count() {
        let id = table.cell(row, id_col).trim();
        if id.is_empty() {
            findings.push(Finding::new(
                FindingCode::R010MalformedCell,
                Severity::Warning,
                format!("teacher table row {} has a blank TEACHER cell, row skipped", row + 2),
            ));
            continue;
        }

        let mut teacher = Teacher::new(id);
        for (col, kind) in kinds.iter().enumerate() {
            let cell = table.cell(row, col);
            match kind {
                ColumnKind::Id => {}
                ColumnKind::TargetLoad => {
                    teacher.target_load = match parse_number(cell) {
                        Some(n) => n,
                        None => {
                            findings.push(bad_cell(id, columns::TARGET_LOAD, cell));
                            0
                        }
                    };
                }
                ColumnKind::Weekday(day) => {
                    let availability = Availability::from_cell(cell).unwrap_or_else(|_| {
                        findings.push(bad_cell(id, day.as_str(), cell));
                        Availability::Unavailable
                    });
                    teacher.weekdays.insert(*day, availability);
                }
                ColumnKind::Hour(time) => {
                    let flag = parse_flag(cell).unwrap_or_else(|| {
                        findings.push(bad_cell(id, &time.as_hhmmss(), cell));
                        false
                    });
                    teacher.hours.insert(*time, flag);
                }
                ColumnKind::Mode(mode) => {
                    let flag = parse_flag(cell).unwrap_or_else(|| {
                        findings.push(bad_cell(id, mode.as_str(), cell));
                        false
                    });
                    teacher.capabilities.insert(CapabilityKey::Mode(*mode), flag);
                }
                ColumnKind::Intensive => {
                    teacher.intensive_ok = parse_flag(cell).unwrap_or_else(|| {
                        findings.push(bad_cell(id, columns::INTENSIVE, cell));
                        false
                    });
                }
                ColumnKind::Capability(label) => {
                    let flag = parse_flag(cell).unwrap_or_else(|| {
                        findings.push(bad_cell(id, label, cell));
                        false
                    });
                    teacher.capabilities.insert(CapabilityKey::label(label.clone()), flag);
                }
            }
        }
        teachers.push(teacher);
    }

    tracing::info!(
        teachers = teachers.len(),
        hour_columns = hour_columns.len(),
        capability_columns = capability_columns.len(),
        "read teacher table"
    );
    Ok(TeacherTable { teachers, hour_columns, capability_columns, findings })
}

fn bad_cell(teacher: &str, column: &str, cell: &str) -> Finding {
    Finding::new(
        FindingCode::R010MalformedCell,
        Severity::Warning,
        format!("teacher '{teacher}': bad '{column}' cell '{}'", cell.trim()),
    )
}

/// 0/1 flag cell; blank means 0, float formatting tolerated
fn parse_flag(cell: &str) -> Option<bool> {
    match cell.trim() {
        "" | "0" | "0.0" => Some(false),
        "1" | "1.0" => Some(true),
        _ => None,
    }
}

/// Non-negative integer cell; tolerates float formatting like "6.0"
fn parse_number(cell: &str) -> Option<u32> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Some(0);
    }
    trimmed.parse::<u32>().ok().or_else(|| {
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|f| f.fract() == 0.0 && *f >= 0.0)
            .map(|f| f as u32)
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn teacher_table_fixture() -> RawTable {
        RawTable::new(
            vec![
                "TEACHER".into(),
                "MEDIA".into(),
                "SEGUNDA".into(),
                "TERÇA".into(),
                "08:00:00".into(),
                "19:00:00".into(),
                "ONLINE".into(),
                "PRESENCIAL".into(),
                "INTENSIVO".into(),
                "Espanhol".into(),
                "VIP".into(),
                "ESTAGIO_3".into(),
            ],
            vec![
                vec![
                    "Ana".into(), "6.0".into(), "1".into(), "0.5".into(), "1".into(),
                    "0".into(), "1".into(), "1".into(), "0".into(), "1".into(),
                    "0".into(), "1".into(),
                ],
                vec![
                    "Bruno".into(), "4".into(), "0".into(), "1".into(), "1".into(),
                    "1".into(), "0".into(), "1".into(), "1".into(), "0".into(),
                    "1".into(), "1".into(),
                ],
            ],
        )
    }

    #[test]
    fn columns_are_classified_by_header() {
        let out = read_teacher_table(&teacher_table_fixture()).unwrap();
        assert_eq!(out.hour_columns, vec![ClockTime::new(8, 0), ClockTime::new(19, 0)]);
        assert!(out.has_capability_column(&CapabilityKey::Mode(DeliveryMode::Online)));
        assert!(out.has_capability_column(&CapabilityKey::label("Espanhol")));
        assert!(out.has_capability_column(&CapabilityKey::label("ESTAGIO_3")));
        assert!(!out.has_capability_column(&CapabilityKey::label("Kids")));
        assert!(out.findings.is_empty());
    }

    #[test]
    fn tri_state_and_flags_parse_per_teacher() {
        let out = read_teacher_table(&teacher_table_fixture()).unwrap();
        let ana = out.teacher("Ana").unwrap();
        assert_eq!(ana.target_load, 6);
        assert_eq!(ana.availability_on(Weekday::Segunda), Availability::Available);
        assert_eq!(ana.availability_on(Weekday::Terca), Availability::Conditional);
        assert_eq!(ana.teaches_at(ClockTime::new(8, 0)), Some(true));
        assert_eq!(ana.teaches_at(ClockTime::new(19, 0)), Some(false));
        assert_eq!(ana.teaches_at(ClockTime::new(10, 0)), None);
        assert_eq!(ana.can(&CapabilityKey::Mode(DeliveryMode::Online)), Ok(true));
        assert!(!ana.intensive_ok);

        let bruno = out.teacher("Bruno").unwrap();
        assert!(bruno.intensive_ok);
        assert_eq!(bruno.can(&CapabilityKey::label("VIP")), Ok(true));
        assert_eq!(bruno.can(&CapabilityKey::Mode(DeliveryMode::Online)), Ok(false));
    }

    #[test]
    fn bad_cells_fall_back_restrictive_with_findings() {
        let table = RawTable::new(
            vec!["TEACHER".into(), "MEDIA".into(), "SEGUNDA".into(), "ONLINE".into()],
            vec![vec!["Ana".into(), "often".into(), "0.7".into(), "yes".into()]],
        );
        let out = read_teacher_table(&table).unwrap();
        let ana = out.teacher("Ana").unwrap();
        assert_eq!(ana.target_load, 0);
        assert_eq!(ana.availability_on(Weekday::Segunda), Availability::Unavailable);
        assert_eq!(ana.can(&CapabilityKey::Mode(DeliveryMode::Online)), Ok(false));
        assert_eq!(out.findings.len(), 3);
        assert!(out.findings.iter().all(|f| f.code == FindingCode::R010MalformedCell));
    }

    #[test]
    fn blank_id_rows_are_skipped() {
        let table = RawTable::new(
            vec!["TEACHER".into(), "MEDIA".into()],
            vec![vec!["".into(), "6".into()], vec!["Bia".into(), "5".into()]],
        );
        let out = read_teacher_table(&table).unwrap();
        assert_eq!(out.teachers.len(), 1);
        assert_eq!(out.findings.len(), 1);
    }

    #[test]
    fn missing_teacher_column_is_fatal() {
        let table = RawTable::new(vec!["MEDIA".into()], vec![]);
        assert!(matches!(
            read_teacher_table(&table),
            Err(TableError::MissingColumn(c)) if c == columns::TEACHER_ID
        ));
    }
}
