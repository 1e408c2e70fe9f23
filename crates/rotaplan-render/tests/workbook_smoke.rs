//! Smoke tests for the Excel rotation export.

use rotaplan_core::{
    AssignmentRow, AssignmentTable, ClassSession, ClockTime, Finding, FindingCode, Severity,
    Weekday,
};
use rotaplan_render::RotationWorkbook;

fn fixture() -> (Vec<ClassSession>, AssignmentTable) {
    let sessions = vec![
        ClassSession::new("CONV A1", Weekday::Segunda, ClockTime::new(8, 0))
            .unit("Satélite")
            .modality("Ingles")
            .last_teacher("Bruno"),
        ClassSession::new("VIP B2", Weekday::Terca, ClockTime::new(19, 0)).unit("Jardim"),
    ];
    let assignments = AssignmentTable::new(vec![AssignmentRow {
        teacher: "Ana".into(),
        group: "CONV A1".into(),
    }]);
    (sessions, assignments)
}

#[test]
fn workbook_bytes_are_a_valid_zip_container() {
    let (sessions, assignments) = fixture();
    let bytes = RotationWorkbook::new().render_to_bytes(&sessions, &assignments).unwrap();
    // XLSX is a zip archive; the magic bytes are enough for a smoke check
    assert!(bytes.len() > 4);
    assert_eq!(&bytes[0..2], b"PK");
}

#[test]
fn findings_sheet_is_included_when_findings_exist() {
    let (sessions, assignments) = fixture();
    let findings = vec![Finding::new(
        FindingCode::R005MissingHourColumn,
        Severity::Warning,
        "hour 07:00:00 has no teacher-table column",
    )];

    let with = RotationWorkbook::new()
        .with_findings(findings)
        .render_to_bytes(&sessions, &assignments)
        .unwrap();
    let without = RotationWorkbook::new().render_to_bytes(&sessions, &assignments).unwrap();
    // The extra sheet makes the archive strictly larger
    assert!(with.len() > without.len());
}

#[test]
fn save_writes_the_file() {
    let (sessions, assignments) = fixture();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rotas_geradas.xlsx");

    RotationWorkbook::new().save(&path, &sessions, &assignments).unwrap();
    assert!(path.exists());
    assert!(std::fs::metadata(&path).unwrap().len() > 0);
}
