//! Class-table normalizer.
//!
//! The raw export packs a whole week of a group into one row: the weekday
//! cell may hold a `●`-separated list, the `EVERYDAY` literal, fused ordinal
//! markers (`2ª3ª`), or a `DOUBLE`/`Saturday - Triple` marker meaning the
//! slot repeats 2×/3× at one-hour increments. Normalization flattens all of
//! that into one `ClassSession` per atomic weekday+time occurrence.
//!
//! Cell-level defects never abort the run: the offending row (or day token)
//! is skipped and a finding records what was dropped.

use rotaplan_core::{
    ClassSession, ClockTime, DeliveryMode, Finding, FindingCode, Severity, TeacherId, Weekday,
};

use crate::{columns, RawTable, TableError};

/// Output of the normalizer: atomic sessions plus what was flagged on the way
#[derive(Clone, Debug)]
pub struct NormalizedClasses {
    pub sessions: Vec<ClassSession>,
    pub findings: Vec<Finding>,
}

/// Expand raw class rows into one `ClassSession` per weekday+time occurrence.
///
/// Requires the `nome grupo`, `dias da semana` and `horario` columns; every
/// other column is optional and defaults when absent.
pub fn normalize_classes(table: &RawTable) -> Result<NormalizedClasses, TableError> {
    let group_col = table.require_column(columns::GROUP)?;
    let days_col = table.require_column(columns::WEEKDAYS)?;
    let time_col = table.require_column(columns::TIME)?;

    let unit_col = table.column(columns::UNIT);
    let status_col = table.column(columns::STATUS);
    let modality_col = table.column(columns::MODALITY);
    let category_col = table.column(columns::CATEGORY);
    let stage_col = table.column(columns::STAGE);
    let count_col = table.column(columns::WEEKLY_SESSIONS);
    let teacher_col = table.column(columns::TEACHER);
    let last_col = table.column(columns::LAST_TEACHER);
    let previous_col = table.column(columns::PREVIOUS_TEACHER);
    let excluded_col = table.column(columns::EXCLUDED_TEACHERS);

    let mut sessions = Vec::new();
    let mut findings = Vec::new();

    for row in 0..table.row_count() {
        let group = table.cell(row, group_col).trim();
        if group.is_empty() {
            continue;
        }

        let time_text = table.cell(row, time_col);
        let base_time = match ClockTime::from_hms(time_text) {
            Ok(t) => t,
            Err(_) => {
                findings.push(Finding::new(
                    FindingCode::R010MalformedCell,
                    Severity::Warning,
                    format!("group '{group}': unparseable time '{}', row skipped", time_text.trim()),
                ));
                continue;
            }
        };

        let day_spec = expand_day_spec(table.cell(row, days_col));
        for bad in &day_spec.malformed {
            findings.push(Finding::new(
                FindingCode::R006MalformedWeekday,
                Severity::Warning,
                format!("group '{group}': unrecognized weekday label '{bad}'"),
            ));
        }
        if day_spec.weekdays.is_empty() {
            continue;
        }

        let mode = match status_col.map(|c| table.cell(row, c)) {
            None => DeliveryMode::Presencial,
            Some(cell) => DeliveryMode::from_status(cell).unwrap_or_else(|| {
                findings.push(Finding::new(
                    FindingCode::R010MalformedCell,
                    Severity::Warning,
                    format!("group '{group}': unknown status '{}', assuming PRESENCIAL", cell.trim()),
                ));
                DeliveryMode::Presencial
            }),
        };

        let weekly_sessions = match count_col.map(|c| table.cell(row, c)) {
            None => 1,
            Some(cell) if cell.trim().is_empty() => 1,
            Some(cell) => parse_count(cell).unwrap_or_else(|| {
                findings.push(Finding::new(
                    FindingCode::R010MalformedCell,
                    Severity::Warning,
                    format!("group '{group}': non-numeric '{}' cell '{}', assuming 1",
                        columns::WEEKLY_SESSIONS, cell.trim()),
                ));
                1
            }),
        };

        let unit = unit_col.map(|c| table.cell(row, c).trim().to_string()).unwrap_or_default();
        let modality =
            modality_col.map(|c| table.cell(row, c).trim().to_string()).unwrap_or_default();
        let category =
            category_col.map(|c| table.cell(row, c).trim().to_string()).unwrap_or_default();
        let stage = stage_col.map(|c| normalize_stage(table.cell(row, c))).unwrap_or_default();

        let assigned = teacher_col.and_then(|c| teacher_cell(table.cell(row, c)));
        let last_teacher = last_col.and_then(|c| teacher_cell(table.cell(row, c)));
        let previous_teacher = previous_col.and_then(|c| teacher_cell(table.cell(row, c)));
        let excluded = excluded_col
            .map(|c| excluded_list(table.cell(row, c)))
            .unwrap_or_default();

        for &weekday in &day_spec.weekdays {
            for hour_offset in 0..day_spec.repeats {
                let Some(time) = base_time.plus_hours(hour_offset) else {
                    findings.push(Finding::new(
                        FindingCode::R009SlotPastMidnight,
                        Severity::Warning,
                        format!(
                            "group '{group}': repeated slot {} + {hour_offset}h crosses midnight",
                            base_time.as_hhmmss()
                        ),
                    ));
                    continue;
                };
                sessions.push(ClassSession {
                    group: group.to_string(),
                    weekday,
                    time,
                    mode,
                    unit: unit.clone(),
                    modality: modality.clone(),
                    category: category.clone(),
                    stage: stage.clone(),
                    weekly_sessions,
                    assigned: assigned.clone(),
                    last_teacher: last_teacher.clone(),
                    previous_teacher: previous_teacher.clone(),
                    excluded: excluded.clone(),
                });
            }
        }
    }

    tracing::info!(
        sessions = sessions.len(),
        findings = findings.len(),
        "normalized class table"
    );
    Ok(NormalizedClasses { sessions, findings })
}

// ============================================================================
// Field parsers
// ============================================================================

struct DaySpec {
    weekdays: Vec<Weekday>,
    repeats: u16,
    malformed: Vec<String>,
}

/// Split a weekday cell into days and a repeat factor.
///
/// The text munging mirrors the export quirks: `EVERYDAY` stands for the five
/// weekdays, `●` separates day lists, ordinals can arrive fused (`2ª3ª`), and
/// `DOUBLE`/`- Triple` markers double/triple the slot instead of naming a day.
fn expand_day_spec(raw: &str) -> DaySpec {
    let spec = raw.replace("EVERYDAY", "2ª ● 3ª ● 4ª ● 5ª ● 6ª");

    let repeats = if spec.contains("Triple") {
        3
    } else if spec.contains("DOUBLE") {
        2
    } else {
        1
    };

    let cleaned = spec
        .replace('●', ",")
        .replace(' ', "")
        .replace("DOUBLE", ",")
        .replace("-Triple", "")
        .replace('ª', "ª,");

    let mut weekdays = Vec::new();
    let mut malformed = Vec::new();
    for token in cleaned.split(',').filter(|t| !t.is_empty()) {
        match Weekday::from_label(token) {
            Some(day) => weekdays.push(day),
            None => malformed.push(token.to_string()),
        }
    }

    DaySpec { weekdays, repeats, malformed }
}

/// Teacher cell with the `-`/blank/`nan` sentinels mapped to `None`
fn teacher_cell(cell: &str) -> Option<TeacherId> {
    let trimmed = cell.trim();
    if trimmed.is_empty() || trimmed == "-" || trimmed.eq_ignore_ascii_case("nan") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Comma-separated exclusion list, sentinels dropped
fn excluded_list(cell: &str) -> Vec<TeacherId> {
    cell.split(',').filter_map(teacher_cell).collect()
}

/// Weekly session count; tolerates float formatting like "2.0"
fn parse_count(cell: &str) -> Option<u32> {
    let trimmed = cell.trim();
    trimmed.parse::<u32>().ok().or_else(|| {
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|f| f.fract() == 0.0 && *f >= 0.0)
            .map(|f| f as u32)
    })
}

/// Numeric stages become `ESTAGIO_{n}`; text stages pass through
fn normalize_stage(cell: &str) -> String {
    let trimmed = cell.trim();
    match parse_count(trimmed) {
        Some(n) => format!("ESTAGIO_{n}"),
        None => trimmed.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn class_table(day_cell: &str, time_cell: &str) -> RawTable {
        RawTable::new(
            vec![
                columns::GROUP.into(),
                columns::WEEKDAYS.into(),
                columns::TIME.into(),
                columns::STATUS.into(),
                columns::STAGE.into(),
                columns::WEEKLY_SESSIONS.into(),
                columns::TEACHER.into(),
            ],
            vec![vec![
                "CONV A1".into(),
                day_cell.into(),
                time_cell.into(),
                "".into(),
                "3".into(),
                "2".into(),
                "-".into(),
            ]],
        )
    }

    #[test]
    fn everyday_expands_to_five_sessions() {
        let out = normalize_classes(&class_table("EVERYDAY", "08:00:00")).unwrap();
        assert_eq!(out.sessions.len(), 5);
        let days: Vec<Weekday> = out.sessions.iter().map(|s| s.weekday).collect();
        assert_eq!(days, Weekday::MONDAY_TO_FRIDAY.to_vec());
        assert!(out.findings.is_empty());
    }

    #[test]
    fn bullet_list_splits_days() {
        let out = normalize_classes(&class_table("2ª ● 4ª", "19:00:00")).unwrap();
        let days: Vec<Weekday> = out.sessions.iter().map(|s| s.weekday).collect();
        assert_eq!(days, vec![Weekday::Segunda, Weekday::Quarta]);
    }

    #[test]
    fn fused_ordinals_split_after_marker() {
        let out = normalize_classes(&class_table("2ª3ª", "19:00:00")).unwrap();
        let days: Vec<Weekday> = out.sessions.iter().map(|s| s.weekday).collect();
        assert_eq!(days, vec![Weekday::Segunda, Weekday::Terca]);
    }

    #[test]
    fn double_repeats_hourly_on_one_day() {
        let out = normalize_classes(&class_table("2ª DOUBLE", "08:00:00")).unwrap();
        assert_eq!(out.sessions.len(), 2);
        assert_eq!(out.sessions[0].time, ClockTime::new(8, 0));
        assert_eq!(out.sessions[1].time, ClockTime::new(9, 0));
        assert!(out.sessions.iter().all(|s| s.weekday == Weekday::Segunda));
        assert!(out.sessions.iter().all(|s| s.group == "CONV A1"));
    }

    #[test]
    fn saturday_triple_repeats_three_times() {
        let out = normalize_classes(&class_table("Saturday - Triple", "09:00:00")).unwrap();
        assert_eq!(out.sessions.len(), 3);
        assert!(out.sessions.iter().all(|s| s.weekday == Weekday::Sabado));
        assert_eq!(out.sessions[2].time, ClockTime::new(11, 0));
    }

    #[test]
    fn late_double_past_midnight_is_flagged() {
        let out = normalize_classes(&class_table("2ª DOUBLE", "23:30:00")).unwrap();
        assert_eq!(out.sessions.len(), 1);
        assert_eq!(out.findings.len(), 1);
        assert_eq!(out.findings[0].code, FindingCode::R009SlotPastMidnight);
    }

    #[test]
    fn blank_status_defaults_to_presencial_and_stage_gets_label() {
        let out = normalize_classes(&class_table("2ª", "08:00:00")).unwrap();
        assert_eq!(out.sessions[0].mode, DeliveryMode::Presencial);
        assert_eq!(out.sessions[0].stage, "ESTAGIO_3");
        assert_eq!(out.sessions[0].weekly_sessions, 2);
        assert_eq!(out.sessions[0].assigned, None);
    }

    #[test]
    fn malformed_weekday_token_is_flagged_not_fatal() {
        let out = normalize_classes(&class_table("2ª ● DOMINGO", "08:00:00")).unwrap();
        assert_eq!(out.sessions.len(), 1);
        assert_eq!(out.findings.len(), 1);
        assert_eq!(out.findings[0].code, FindingCode::R006MalformedWeekday);
    }

    #[test]
    fn unparseable_time_skips_row_with_finding() {
        let out = normalize_classes(&class_table("2ª", "sometime")).unwrap();
        assert!(out.sessions.is_empty());
        assert_eq!(out.findings[0].code, FindingCode::R010MalformedCell);
    }

    #[test]
    fn blank_group_rows_are_dropped() {
        let table = RawTable::new(
            vec![columns::GROUP.into(), columns::WEEKDAYS.into(), columns::TIME.into()],
            vec![vec!["".into(), "2ª".into(), "08:00:00".into()]],
        );
        let out = normalize_classes(&table).unwrap();
        assert!(out.sessions.is_empty());
        assert!(out.findings.is_empty());
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let table = RawTable::new(vec![columns::GROUP.into()], vec![vec!["A".into()]]);
        assert!(matches!(
            normalize_classes(&table),
            Err(TableError::MissingColumn(c)) if c == columns::WEEKDAYS
        ));
    }

    #[test]
    fn exclusion_list_and_history_parse() {
        let table = RawTable::new(
            vec![
                columns::GROUP.into(),
                columns::WEEKDAYS.into(),
                columns::TIME.into(),
                columns::LAST_TEACHER.into(),
                columns::PREVIOUS_TEACHER.into(),
                columns::EXCLUDED_TEACHERS.into(),
            ],
            vec![vec![
                "VIP B2".into(),
                "3ª".into(),
                "10:00:00".into(),
                "Bruno".into(),
                "nan".into(),
                "Carla, Davi,-".into(),
            ]],
        );
        let out = normalize_classes(&table).unwrap();
        let session = &out.sessions[0];
        assert_eq!(session.last_teacher.as_deref(), Some("Bruno"));
        assert_eq!(session.previous_teacher, None);
        assert_eq!(session.excluded, vec!["Carla".to_string(), "Davi".to_string()]);
    }
}
