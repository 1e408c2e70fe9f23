//! Text rendering for terminal summaries.

use std::collections::BTreeMap;

use rotaplan_core::{AssignmentTable, ClassSession, RenderError, Renderer};

/// Plain-text rotation summary: per-teacher group lists plus the unfilled
/// tail, in a shape that reads well on a terminal.
#[derive(Clone, Debug, Default)]
pub struct TextSummary;

impl TextSummary {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for TextSummary {
    type Output = String;

    fn render(
        &self,
        sessions: &[ClassSession],
        assignments: &AssignmentTable,
    ) -> Result<String, RenderError> {
        let mut by_teacher: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for row in &assignments.rows {
            by_teacher.entry(&row.teacher).or_default().push(&row.group);
        }

        let mut unfilled: Vec<&str> = sessions
            .iter()
            .filter(|s| assignments.teacher_for(&s.group).is_none() && s.assigned.is_none())
            .map(|s| s.group.as_str())
            .collect();
        unfilled.sort_unstable();
        unfilled.dedup();

        let mut out = String::new();
        out.push_str(&format!(
            "{} group(s) assigned, {} unfilled\n",
            assignments.len(),
            unfilled.len()
        ));
        for (teacher, groups) in &by_teacher {
            out.push_str(&format!("  {teacher}: {}\n", groups.join(", ")));
        }
        if !unfilled.is_empty() {
            out.push_str(&format!("  sem professor: {}\n", unfilled.join(", ")));
        }
        Ok(out)
    }
}
