//! Integrity findings.
//!
//! Source-data defects are reported as human-readable findings so that a
//! planner can fix the spreadsheets; they are never thrown as errors and
//! never block a solve attempt. A solve over inconsistent data simply risks
//! coming back empty, which the fallback protocol already handles.

use serde::{Deserialize, Serialize};

/// Severity of a finding
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Hint,
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Hint => "hint",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stable codes for every condition the audit can flag
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FindingCode {
    /// Same (group, weekday, time) triple appears more than once
    R001DuplicateSession,
    /// Pre-assigned teacher missing from the teacher table
    R002UnknownAssignedTeacher,
    /// Historical (continuity) teacher missing from the teacher table
    R003UnknownHistoricalTeacher,
    /// Excluded teacher missing from the teacher table
    R004UnknownExcludedTeacher,
    /// Session time with no matching hour column in the teacher table
    R005MissingHourColumn,
    /// Weekday label that none of the known spellings match
    R006MalformedWeekday,
    /// Modality/category/stage/unit label with no capability column
    R007UnknownCapabilityLabel,
    /// Pre-assignment contradicts the named teacher's own availability
    R008PinnedAgainstAvailability,
    /// DOUBLE/Triple replication pushed a slot past midnight
    R009SlotPastMidnight,
    /// Cell that failed to parse and fell back to a default (or was skipped)
    R010MalformedCell,
}

impl FindingCode {
    /// Short stable code, e.g. `R001`
    pub fn code(&self) -> &'static str {
        match self {
            FindingCode::R001DuplicateSession => "R001",
            FindingCode::R002UnknownAssignedTeacher => "R002",
            FindingCode::R003UnknownHistoricalTeacher => "R003",
            FindingCode::R004UnknownExcludedTeacher => "R004",
            FindingCode::R005MissingHourColumn => "R005",
            FindingCode::R006MalformedWeekday => "R006",
            FindingCode::R007UnknownCapabilityLabel => "R007",
            FindingCode::R008PinnedAgainstAvailability => "R008",
            FindingCode::R009SlotPastMidnight => "R009",
            FindingCode::R010MalformedCell => "R010",
        }
    }
}

/// One reported integrity defect
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub code: FindingCode,
    pub severity: Severity,
    pub message: String,
    pub notes: Vec<String>,
}

impl Finding {
    pub fn new(code: FindingCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            notes: Vec::new(),
        }
    }

    /// Attach a supporting note
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code.code(), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finding_display_format() {
        let finding = Finding::new(
            FindingCode::R005MissingHourColumn,
            Severity::Warning,
            "hour 07:00:00 has no teacher-table column",
        )
        .note("groups: CONV A1");

        assert_eq!(
            finding.to_string(),
            "warning[R005]: hour 07:00:00 has no teacher-table column"
        );
        assert_eq!(finding.notes.len(), 1);
    }

    #[test]
    fn severity_ordering_puts_errors_last() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
        assert!(Severity::Info > Severity::Hint);
    }
}
