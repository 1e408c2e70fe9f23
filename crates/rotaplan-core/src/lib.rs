//! # rotaplan-core
//!
//! Core domain model and traits for the rotaplan rotation engine.
//!
//! This crate provides:
//! - Domain types: `ClassSession`, `Teacher`, `Roster`, `AssignmentTable`
//! - Calendar primitives: `Weekday`, `ClockTime`, `Availability`
//! - Policy configuration: `PolicyVariant`, `RuleThresholds`, `SolveOptions`
//! - Integrity reporting: `Finding`, `FindingCode`, `Severity`
//! - Error types and the `Renderer` trait
//!
//! ## Example
//!
//! ```rust
//! use rotaplan_core::{ClassSession, ClockTime, Roster, Teacher, Weekday};
//!
//! let sessions = vec![
//!     ClassSession::new("CONV A1", Weekday::Segunda, ClockTime::new(8, 0))
//!         .unit("Vicentina")
//!         .modality("Ingles"),
//! ];
//! let teachers = vec![Teacher::new("Ana").target_load(6)];
//! let roster = Roster::new(sessions, teachers);
//! assert_eq!(roster.distinct_groups(), vec!["CONV A1"]);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

pub mod findings;
pub mod policy;

pub use findings::{Finding, FindingCode, Severity};
pub use policy::{ObjectiveWeights, PolicyVariant, RuleThresholds, SolveOptions};

// ============================================================================
// Type Aliases
// ============================================================================

/// Unique identifier for a teacher (the `TEACHER` column value)
pub type TeacherId = String;

/// Name of a session group (the `nome grupo` column value)
pub type GroupName = String;

/// Name of a physical unit/site (the `unidade` column value)
pub type UnitName = String;

// ============================================================================
// Weekday
// ============================================================================

/// Day of the week a session can be scheduled on.
///
/// The canonical labels are the uppercase Portuguese names used as column
/// headers in the teacher table; `from_label` additionally understands the
/// ordinal day markers (`2ª`..`6ª`) and the literal `Saturday` that appear in
/// the raw class spreadsheets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Segunda,
    Terca,
    Quarta,
    Quinta,
    Sexta,
    Sabado,
}

impl Weekday {
    /// All weekdays in schedule order
    pub const ALL: [Weekday; 6] = [
        Weekday::Segunda,
        Weekday::Terca,
        Weekday::Quarta,
        Weekday::Quinta,
        Weekday::Sexta,
        Weekday::Sabado,
    ];

    /// The Monday-to-Friday subset (`EVERYDAY` expansion)
    pub const MONDAY_TO_FRIDAY: [Weekday; 5] = [
        Weekday::Segunda,
        Weekday::Terca,
        Weekday::Quarta,
        Weekday::Quinta,
        Weekday::Sexta,
    ];

    /// Parse a weekday from any of the spellings seen in the raw tables
    pub fn from_label(label: &str) -> Option<Weekday> {
        match label.trim() {
            "SEGUNDA" | "2ª" => Some(Weekday::Segunda),
            "TERÇA" | "TERCA" | "3ª" => Some(Weekday::Terca),
            "QUARTA" | "4ª" => Some(Weekday::Quarta),
            "QUINTA" | "5ª" => Some(Weekday::Quinta),
            "SEXTA" | "6ª" => Some(Weekday::Sexta),
            "SÁBADO" | "SABADO" | "Saturday" => Some(Weekday::Sabado),
            _ => None,
        }
    }

    /// Canonical label, matching the teacher-table column headers exactly
    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Segunda => "SEGUNDA",
            Weekday::Terca => "TERÇA",
            Weekday::Quarta => "QUARTA",
            Weekday::Quinta => "QUINTA",
            Weekday::Sexta => "SEXTA",
            Weekday::Sabado => "SÁBADO",
        }
    }
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// ClockTime
// ============================================================================

/// Time of day for a session, stored as minutes from midnight.
///
/// Parsed from the `HH:MM:SS` text of the `horario` column; `as_hhmmss`
/// reproduces that text exactly, which matters because the teacher table
/// names its availability columns after it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ClockTime {
    minutes: u16,
}

/// Error parsing a clock-time cell
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid clock time '{0}': expected HH:MM:SS")]
pub struct TimeParseError(pub String);

impl ClockTime {
    /// Create from hour and minute components
    pub fn new(hour: u16, minute: u16) -> Self {
        debug_assert!(hour < 24 && minute < 60);
        Self { minutes: hour * 60 + minute }
    }

    /// Parse `HH:MM:SS` (seconds optional) text
    pub fn from_hms(text: &str) -> Result<Self, TimeParseError> {
        let trimmed = text.trim();
        let mut parts = trimmed.split(':');
        let hour: u16 = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(|| TimeParseError(text.to_string()))?;
        let minute: u16 = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(|| TimeParseError(text.to_string()))?;
        // Seconds are carried in the column text but always zero in practice
        let second: u16 = match parts.next() {
            Some(p) => p.parse().map_err(|_| TimeParseError(text.to_string()))?,
            None => 0,
        };
        if hour >= 24 || minute >= 60 || second >= 60 || parts.next().is_some() {
            return Err(TimeParseError(text.to_string()));
        }
        Ok(Self { minutes: hour * 60 + minute })
    }

    /// Minutes elapsed since midnight
    pub fn minutes_from_midnight(&self) -> u16 {
        self.minutes
    }

    /// The exact `HH:MM:SS` text used as a teacher-table column header
    pub fn as_hhmmss(&self) -> String {
        format!("{:02}:{:02}:00", self.minutes / 60, self.minutes % 60)
    }

    /// Absolute gap to another time, in minutes
    pub fn gap_minutes(&self, other: ClockTime) -> u16 {
        self.minutes.abs_diff(other.minutes)
    }

    /// Whether this time falls in the before-noon half-day
    pub fn is_before_noon(&self) -> bool {
        self.minutes < 12 * 60
    }

    /// Shift forward by whole hours; `None` if the result crosses midnight
    pub fn plus_hours(&self, hours: u16) -> Option<ClockTime> {
        let minutes = self.minutes + hours * 60;
        (minutes < 24 * 60).then_some(ClockTime { minutes })
    }
}

impl std::fmt::Display for ClockTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_hhmmss())
    }
}

impl From<ClockTime> for String {
    fn from(t: ClockTime) -> String {
        t.as_hhmmss()
    }
}

impl TryFrom<String> for ClockTime {
    type Error = TimeParseError;

    fn try_from(s: String) -> Result<Self, TimeParseError> {
        ClockTime::from_hms(&s)
    }
}

// ============================================================================
// DeliveryMode / Availability
// ============================================================================

/// How a session is delivered (the `status` column)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryMode {
    Online,
    /// Blank status cells default to in-person
    #[default]
    Presencial,
}

impl DeliveryMode {
    /// Parse a status cell; blank means in-person
    pub fn from_status(cell: &str) -> Option<DeliveryMode> {
        match cell.trim().to_uppercase().as_str() {
            "" => Some(DeliveryMode::Presencial),
            "ONLINE" => Some(DeliveryMode::Online),
            "PRESENCIAL" => Some(DeliveryMode::Presencial),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMode::Online => "ONLINE",
            DeliveryMode::Presencial => "PRESENCIAL",
        }
    }
}

impl std::fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-weekday availability of a teacher.
///
/// The source tables encode this as a float cell (0, 0.5, 1); the half value
/// means "only if the schedule cannot be filled otherwise" and is gated by an
/// activation indicator that the objective penalizes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    #[default]
    Unavailable,
    Conditional,
    Available,
}

/// Error parsing an availability cell
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid availability cell '{0}': expected 0, 0.5 or 1")]
pub struct AvailabilityParseError(pub String);

impl Availability {
    /// Parse the 0 / 0.5 / 1 cell encoding (blank means unavailable)
    pub fn from_cell(cell: &str) -> Result<Availability, AvailabilityParseError> {
        match cell.trim() {
            "" | "0" | "0.0" => Ok(Availability::Unavailable),
            "0.5" | "0,5" | ".5" => Ok(Availability::Conditional),
            "1" | "1.0" => Ok(Availability::Available),
            other => Err(AvailabilityParseError(other.to_string())),
        }
    }
}

// ============================================================================
// ClassSession
// ============================================================================

/// An atomic, non-divisible teaching slot: one weekday occurrence of a group.
///
/// A group recurring on several weekdays yields several sessions that share
/// the same `group` name, and a group is taught by a single teacher across
/// its whole week. Invariant: `(group, weekday, time)` is unique within a
/// roster; duplicates are an upstream data defect surfaced by the audit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassSession {
    /// Group name (identity key across the week)
    pub group: GroupName,
    /// Weekday of this occurrence
    pub weekday: Weekday,
    /// Start time of this occurrence
    pub time: ClockTime,
    /// Delivery mode (`status` column, blank defaults to in-person)
    pub mode: DeliveryMode,
    /// Physical unit/site
    pub unit: UnitName,
    /// Subject modality (e.g. "Ingles", "Espanhol")
    pub modality: String,
    /// Group category (the `grupo` column, e.g. "VIP", "CONV")
    pub category: String,
    /// Stage/level label (numeric stages normalized to `ESTAGIO_{n}`)
    pub stage: String,
    /// Weekly session count (`n aulas`)
    pub weekly_sessions: u32,
    /// Already-assigned teacher; `-`/blank cells parse to `None`
    pub assigned: Option<TeacherId>,
    /// Most recent historical teacher
    pub last_teacher: Option<TeacherId>,
    /// Second-to-last historical teacher
    pub previous_teacher: Option<TeacherId>,
    /// Teachers explicitly forbidden for this group
    pub excluded: Vec<TeacherId>,
}

impl ClassSession {
    /// Create a session with in-person defaults
    pub fn new(group: impl Into<String>, weekday: Weekday, time: ClockTime) -> Self {
        Self {
            group: group.into(),
            weekday,
            time,
            mode: DeliveryMode::Presencial,
            unit: String::new(),
            modality: String::new(),
            category: String::new(),
            stage: String::new(),
            weekly_sessions: 1,
            assigned: None,
            last_teacher: None,
            previous_teacher: None,
            excluded: Vec::new(),
        }
    }

    /// Set the delivery mode
    pub fn mode(mut self, mode: DeliveryMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the physical unit
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Set the subject modality
    pub fn modality(mut self, modality: impl Into<String>) -> Self {
        self.modality = modality.into();
        self
    }

    /// Set the group category
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the stage label
    pub fn stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = stage.into();
        self
    }

    /// Set the weekly session count
    pub fn weekly_sessions(mut self, count: u32) -> Self {
        self.weekly_sessions = count;
        self
    }

    /// Pin an already-assigned teacher
    pub fn assigned(mut self, teacher: impl Into<String>) -> Self {
        self.assigned = Some(teacher.into());
        self
    }

    /// Set the most recent historical teacher
    pub fn last_teacher(mut self, teacher: impl Into<String>) -> Self {
        self.last_teacher = Some(teacher.into());
        self
    }

    /// Set the second-to-last historical teacher
    pub fn previous_teacher(mut self, teacher: impl Into<String>) -> Self {
        self.previous_teacher = Some(teacher.into());
        self
    }

    /// Forbid a teacher for this group
    pub fn exclude(mut self, teacher: impl Into<String>) -> Self {
        self.excluded.push(teacher.into());
        self
    }

    /// The (weekday, time) slot this occurrence occupies
    pub fn slot(&self) -> (Weekday, ClockTime) {
        (self.weekday, self.time)
    }

    /// Whether this session counts as high-load/intensive
    pub fn is_intensive(&self, threshold: u32) -> bool {
        self.weekly_sessions >= threshold
    }
}

// ============================================================================
// Teacher
// ============================================================================

/// Key into a teacher's capability map.
///
/// The teacher table is one flat namespace: every capability column is named
/// after a free-text value of some session field (unit, modality, category or
/// stage), except the two delivery-mode columns which are typed. An unknown
/// label is a data-integrity defect, so lookups are checked rather than
/// defaulting.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapabilityKey {
    Mode(DeliveryMode),
    /// Free-text label column (unit, modality, category or stage value)
    Label(String),
}

impl CapabilityKey {
    /// Capability key for a label-named column
    pub fn label(name: impl Into<String>) -> Self {
        CapabilityKey::Label(name.into())
    }
}

impl std::fmt::Display for CapabilityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapabilityKey::Mode(mode) => write!(f, "{mode}"),
            CapabilityKey::Label(name) => write!(f, "{name}"),
        }
    }
}

/// Checked capability lookup failed: the label has no teacher-table column
#[derive(Debug, Error, PartialEq, Eq)]
#[error("teacher table has no capability column for '{key}' (teacher {teacher})")]
pub struct UnknownCapability {
    pub teacher: TeacherId,
    pub key: CapabilityKey,
}

/// A schedulable teacher, one row of the teacher table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    /// Unique identifier (the `TEACHER` column)
    pub id: TeacherId,
    /// Target average weekly session load (the `MEDIA` column)
    pub target_load: u32,
    /// Tri-state availability per weekday; missing days are unavailable
    pub weekdays: HashMap<Weekday, Availability>,
    /// Per-time-slot availability flags, keyed by session start time
    pub hours: HashMap<ClockTime, bool>,
    /// Capability flags keyed by mode/unit/modality/category/stage label
    pub capabilities: HashMap<CapabilityKey, bool>,
    /// Whether the teacher may take high-load/intensive groups
    pub intensive_ok: bool,
}

impl Teacher {
    /// Create a teacher with no availability and no capabilities
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            target_load: 0,
            weekdays: HashMap::new(),
            hours: HashMap::new(),
            capabilities: HashMap::new(),
            intensive_ok: false,
        }
    }

    /// Set the target average load
    pub fn target_load(mut self, target: u32) -> Self {
        self.target_load = target;
        self
    }

    /// Set availability for a weekday
    pub fn weekday(mut self, day: Weekday, availability: Availability) -> Self {
        self.weekdays.insert(day, availability);
        self
    }

    /// Set a per-slot time flag
    pub fn hour(mut self, time: ClockTime, available: bool) -> Self {
        self.hours.insert(time, available);
        self
    }

    /// Set a capability flag
    pub fn capability(mut self, key: CapabilityKey, allowed: bool) -> Self {
        self.capabilities.insert(key, allowed);
        self
    }

    /// Allow high-load/intensive groups
    pub fn intensive(mut self, ok: bool) -> Self {
        self.intensive_ok = ok;
        self
    }

    /// Availability on a weekday; days absent from the table are unavailable
    pub fn availability_on(&self, day: Weekday) -> Availability {
        self.weekdays.get(&day).copied().unwrap_or_default()
    }

    /// Per-slot time flag; `None` when the hour column is missing entirely
    pub fn teaches_at(&self, time: ClockTime) -> Option<bool> {
        self.hours.get(&time).copied()
    }

    /// Checked capability lookup; fails loudly on a label with no column
    pub fn can(&self, key: &CapabilityKey) -> Result<bool, UnknownCapability> {
        self.capabilities
            .get(key)
            .copied()
            .ok_or_else(|| UnknownCapability {
                teacher: self.id.clone(),
                key: key.clone(),
            })
    }
}

// ============================================================================
// Roster
// ============================================================================

/// The immutable input of one solve: normalized sessions plus teacher table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Roster {
    pub sessions: Vec<ClassSession>,
    pub teachers: Vec<Teacher>,
}

impl Roster {
    pub fn new(sessions: Vec<ClassSession>, teachers: Vec<Teacher>) -> Self {
        Self { sessions, teachers }
    }

    /// Distinct group names in first-appearance order.
    ///
    /// The order is part of the determinism contract: it fixes the variable
    /// layout that the seeded shuffle permutes.
    pub fn distinct_groups(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.sessions
            .iter()
            .filter(|s| seen.insert(s.group.as_str()))
            .map(|s| s.group.as_str())
            .collect()
    }

    /// Find a teacher by id
    pub fn teacher(&self, id: &str) -> Option<&Teacher> {
        self.teachers.iter().find(|t| t.id == id)
    }
}

// ============================================================================
// Assignment Table (Result)
// ============================================================================

/// One solved (teacher, group) pair
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRow {
    pub teacher: TeacherId,
    pub group: GroupName,
}

/// The materialized result of a solve: every variable that solved to 1.
///
/// Zero rows is a value, not an error; it is the signal that the caller
/// should retry under a relaxed policy.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentTable {
    pub rows: Vec<AssignmentRow>,
}

impl AssignmentTable {
    pub fn new(rows: Vec<AssignmentRow>) -> Self {
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// The teacher assigned to a group, if any
    pub fn teacher_for(&self, group: &str) -> Option<&TeacherId> {
        self.rows
            .iter()
            .find(|r| r.group == group)
            .map(|r| &r.teacher)
    }

    /// Groups assigned to a teacher
    pub fn groups_for(&self, teacher: &str) -> Vec<&GroupName> {
        self.rows
            .iter()
            .filter(|r| r.teacher == teacher)
            .map(|r| &r.group)
            .collect()
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Output rendering over a solved rotation
pub trait Renderer {
    type Output;

    /// Render the session table plus its assignments to the output format
    fn render(
        &self,
        sessions: &[ClassSession],
        assignments: &AssignmentTable,
    ) -> Result<Self::Output, RenderError>;
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================
