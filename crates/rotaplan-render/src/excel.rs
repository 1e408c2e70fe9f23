//! Excel rotation export.
//!
//! Produces the workbook the academy distributes after a planning run:
//! - **Rotas**: every session row with its (new) teacher merged in
//! - **Sem Professor**: the subset still without a teacher
//! - **Avisos** (optional): the integrity findings of the run

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use rotaplan_core::{
    AssignmentTable, ClassSession, Finding, RenderError, Renderer,
};

/// Excel rotation workbook renderer
#[derive(Clone, Debug, Default)]
pub struct RotationWorkbook {
    /// Findings to include on an extra sheet; empty means no sheet
    findings: Vec<Finding>,
}

struct SheetFormats {
    header: Format,
    text: Format,
    unfilled: Format,
}

impl RotationWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach findings; a non-empty list adds the "Avisos" sheet
    pub fn with_findings(mut self, findings: Vec<Finding>) -> Self {
        self.findings = findings;
        self
    }

    /// Generate the workbook bytes
    pub fn render_to_bytes(
        &self,
        sessions: &[ClassSession],
        assignments: &AssignmentTable,
    ) -> Result<Vec<u8>, RenderError> {
        let mut workbook = Workbook::new();
        let formats = create_formats();

        self.add_rotation_sheet(&mut workbook, sessions, assignments, &formats)?;
        self.add_unfilled_sheet(&mut workbook, sessions, assignments, &formats)?;
        if !self.findings.is_empty() {
            self.add_findings_sheet(&mut workbook, &formats)?;
        }

        workbook
            .save_to_buffer()
            .map_err(|e| RenderError::Format(format!("Failed to create Excel: {e}")))
    }

    /// Write the workbook to a file
    pub fn save(
        &self,
        path: &std::path::Path,
        sessions: &[ClassSession],
        assignments: &AssignmentTable,
    ) -> Result<(), RenderError> {
        let bytes = self.render_to_bytes(sessions, assignments)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    fn add_rotation_sheet(
        &self,
        workbook: &mut Workbook,
        sessions: &[ClassSession],
        assignments: &AssignmentTable,
        formats: &SheetFormats,
    ) -> Result<(), RenderError> {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Rotas").map_err(|e| RenderError::Format(e.to_string()))?;

        write_session_headers(sheet, formats, true)?;

        for (i, session) in sessions.iter().enumerate() {
            let row = (i + 1) as u32;
            let teacher = assignments
                .teacher_for(&session.group)
                .map(String::as_str)
                .or(session.assigned.as_deref());
            let format = if teacher.is_some() { &formats.text } else { &formats.unfilled };
            write_session_row(sheet, row, session, teacher, format)?;
        }

        sheet.set_column_width(0, 24).ok();
        sheet.set_column_width(9, 18).ok();
        Ok(())
    }

    fn add_unfilled_sheet(
        &self,
        workbook: &mut Workbook,
        sessions: &[ClassSession],
        assignments: &AssignmentTable,
        formats: &SheetFormats,
    ) -> Result<(), RenderError> {
        let sheet = workbook.add_worksheet();
        sheet
            .set_name("Sem Professor")
            .map_err(|e| RenderError::Format(e.to_string()))?;

        write_session_headers(sheet, formats, false)?;

        let mut row = 1u32;
        for session in sessions {
            let covered = assignments.teacher_for(&session.group).is_some()
                || session.assigned.is_some();
            if covered {
                continue;
            }
            write_session_row(sheet, row, session, None, &formats.unfilled)?;
            row += 1;
        }

        sheet.set_column_width(0, 24).ok();
        Ok(())
    }

    fn add_findings_sheet(
        &self,
        workbook: &mut Workbook,
        formats: &SheetFormats,
    ) -> Result<(), RenderError> {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Avisos").map_err(|e| RenderError::Format(e.to_string()))?;

        for (col, header) in ["severidade", "codigo", "mensagem", "notas"].iter().enumerate() {
            sheet
                .write_with_format(0, col as u16, *header, &formats.header)
                .map_err(|e| RenderError::Format(e.to_string()))?;
        }

        for (i, finding) in self.findings.iter().enumerate() {
            let row = (i + 1) as u32;
            let cells = [
                finding.severity.as_str().to_string(),
                finding.code.code().to_string(),
                finding.message.clone(),
                finding.notes.join("; "),
            ];
            for (col, cell) in cells.iter().enumerate() {
                sheet
                    .write_with_format(row, col as u16, cell.as_str(), &formats.text)
                    .map_err(|e| RenderError::Format(e.to_string()))?;
            }
        }

        sheet.set_column_width(2, 60).ok();
        sheet.set_column_width(3, 40).ok();
        Ok(())
    }
}

impl Renderer for RotationWorkbook {
    type Output = Vec<u8>;

    fn render(
        &self,
        sessions: &[ClassSession],
        assignments: &AssignmentTable,
    ) -> Result<Vec<u8>, RenderError> {
        self.render_to_bytes(sessions, assignments)
    }
}

fn create_formats() -> SheetFormats {
    SheetFormats {
        header: Format::new()
            .set_bold()
            .set_align(FormatAlign::Center)
            .set_background_color(0x4472C4)
            .set_font_color(0xFFFFFF)
            .set_border(FormatBorder::Thin),
        text: Format::new().set_border(FormatBorder::Thin),
        unfilled: Format::new()
            .set_border(FormatBorder::Thin)
            .set_background_color(0xFFF2CC),
    }
}

const SESSION_HEADERS: [&str; 9] = [
    "nome grupo",
    "dias da semana",
    "horario",
    "unidade",
    "status",
    "modalidade",
    "grupo",
    "stage",
    "n aulas",
];

fn write_session_headers(
    sheet: &mut Worksheet,
    formats: &SheetFormats,
    with_teacher: bool,
) -> Result<(), RenderError> {
    let mut headers: Vec<&str> = SESSION_HEADERS.to_vec();
    if with_teacher {
        headers.extend(["teacher", "ultimo_professor", "penultimo_professor"]);
    }
    for (col, header) in headers.iter().enumerate() {
        sheet
            .write_with_format(0, col as u16, *header, &formats.header)
            .map_err(|e| RenderError::Format(e.to_string()))?;
    }
    Ok(())
}

fn write_session_row(
    sheet: &mut Worksheet,
    row: u32,
    session: &ClassSession,
    teacher: Option<&str>,
    format: &Format,
) -> Result<(), RenderError> {
    let mut cells: Vec<String> = vec![
        session.group.clone(),
        session.weekday.to_string(),
        session.time.as_hhmmss(),
        session.unit.clone(),
        session.mode.to_string(),
        session.modality.clone(),
        session.category.clone(),
        session.stage.clone(),
        session.weekly_sessions.to_string(),
    ];
    if let Some(teacher) = teacher {
        cells.push(teacher.to_string());
        cells.push(session.last_teacher.clone().unwrap_or_else(|| "-".into()));
        cells.push(session.previous_teacher.clone().unwrap_or_else(|| "-".into()));
    }
    for (col, cell) in cells.iter().enumerate() {
        sheet
            .write_with_format(row, col as u16, cell.as_str(), format)
            .map_err(|e| RenderError::Format(e.to_string()))?;
    }
    Ok(())
}
