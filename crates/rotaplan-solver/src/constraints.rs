//! Constraint compiler.
//!
//! Translates each business rule into native solver constraints over the
//! decision grid. Every rule is independent and composable; the active
//! `PolicyVariant` selects which ones compile and whether the soft rules
//! produce penalty variables instead of hard zeroes.
//!
//! Eligibility rules force variables to zero through a shared dedup set, so
//! a pair ruled out by several rules is posted once. Unknown capability
//! labels and missing hour columns never abort the compile: they are
//! reported as findings and the affected rule is left unconstrained for that
//! pair, which keeps one spreadsheet typo from silently emptying the whole
//! solution space.

use std::collections::HashSet;

use pumpkin_solver::constraints as cp;
use pumpkin_solver::variables::{DomainId, TransformableVariable};
use rotaplan_core::{
    Availability, CapabilityKey, ClockTime, DeliveryMode, Finding, FindingCode, Roster, Severity,
    SolveOptions,
};

use crate::indexes::RosterIndex;
use crate::model::AssignmentModel;

/// One soft-rule penalty variable and its objective coefficient
pub(crate) struct PenaltyTerm {
    pub(crate) var: DomainId,
    pub(crate) weight: i32,
    pub(crate) max_value: i32,
}

/// Everything the compile pass hands to the objective composer and caller
pub(crate) struct CompiledConstraints {
    pub(crate) penalties: Vec<PenaltyTerm>,
    pub(crate) findings: Vec<Finding>,
}

/// Compile the active rule set into the model.
pub(crate) fn compile(
    model: &mut AssignmentModel,
    roster: &Roster,
    index: &RosterIndex<'_>,
    options: &SolveOptions,
) -> CompiledConstraints {
    let mut compiler = Compiler {
        model,
        roster,
        index,
        options,
        penalties: Vec::new(),
        findings: Vec::new(),
        zeroed: HashSet::new(),
        flagged_keys: HashSet::new(),
        flagged_hours: HashSet::new(),
    };

    compiler.single_teacher_per_group();
    compiler.pin_preassigned();
    compiler.no_double_booking();
    compiler.minimum_gap();
    compiler.cross_unit_adjacency();
    compiler.continuity_avoidance();
    compiler.delivery_mode_eligibility();
    compiler.capability_eligibility();
    compiler.explicit_exclusions();
    compiler.day_time_availability();
    compiler.conditional_day_activation();
    compiler.intensive_eligibility();
    compiler.workload();
    compiler.minimum_load();

    tracing::debug!(
        penalties = compiler.penalties.len(),
        findings = compiler.findings.len(),
        "compiled constraint set"
    );

    CompiledConstraints { penalties: compiler.penalties, findings: compiler.findings }
}

struct Compiler<'a> {
    model: &'a mut AssignmentModel,
    roster: &'a Roster,
    index: &'a RosterIndex<'a>,
    options: &'a SolveOptions,
    penalties: Vec<PenaltyTerm>,
    findings: Vec<Finding>,
    /// Pairs already forced to zero, to avoid posting the same fact twice
    zeroed: HashSet<(usize, usize)>,
    flagged_keys: HashSet<CapabilityKey>,
    flagged_hours: HashSet<ClockTime>,
}

impl Compiler<'_> {
    // ------------------------------------------------------------------
    // Structural rules
    // ------------------------------------------------------------------

    /// Each group has at most one teacher; exactly one under fill-all
    fn single_teacher_per_group(&mut self) {
        let fill_all = self.options.policy.fill_all();
        let tag = self.model.solver.new_constraint_tag();
        for g in 0..self.model.group_count() {
            let vars = self.model.group_vars(g);
            if fill_all {
                let _ = self.model.solver.add_constraint(cp::equals(vars, 1, tag)).post();
            } else {
                let _ = self
                    .model
                    .solver
                    .add_constraint(cp::less_than_or_equals(vars, 1, tag))
                    .post();
            }
        }
    }

    /// Manual overrides and carry-over from previous passes are hard pins
    fn pin_preassigned(&mut self) {
        let tag = self.model.solver.new_constraint_tag();
        for (t, g) in self.index.pinned_pairs() {
            let var = self.model.var(t, g);
            let _ = self.model.solver.add_constraint(cp::equals(vec![var], 1, tag)).post();
        }
    }

    /// No teacher covers two groups meeting at the same (weekday, time)
    fn no_double_booking(&mut self) {
        let tag = self.model.solver.new_constraint_tag();
        for ((_, _), group_ids) in self.index.slots() {
            if group_ids.len() < 2 {
                continue;
            }
            for t in 0..self.model.teacher_count() {
                let vars: Vec<DomainId> =
                    group_ids.iter().map(|&g| self.model.var(t, g)).collect();
                let _ = self
                    .model
                    .solver
                    .add_constraint(cp::less_than_or_equals(vars, 1, tag))
                    .post();
            }
        }
    }

    /// Same-day in-person sessions too close together cannot share a teacher
    fn minimum_gap(&mut self) {
        let pairs = self.index.min_gap_pairs(&self.options.thresholds);
        self.forbid_pairs(&pairs);
    }

    /// No cross-unit in-person pair within the same half-day
    fn cross_unit_adjacency(&mut self) {
        let pairs = self.index.cross_unit_pairs();
        self.forbid_pairs(&pairs);
    }

    fn forbid_pairs(&mut self, pairs: &[(usize, usize)]) {
        let tag = self.model.solver.new_constraint_tag();
        for &(a, b) in pairs {
            for t in 0..self.model.teacher_count() {
                let vars = vec![self.model.var(t, a), self.model.var(t, b)];
                let _ = self
                    .model
                    .solver
                    .add_constraint(cp::less_than_or_equals(vars, 1, tag))
                    .post();
            }
        }
    }

    // ------------------------------------------------------------------
    // Continuity
    // ------------------------------------------------------------------

    /// The two most recent historical teachers of a now-unassigned group are
    /// either excluded outright (hard) or gated behind a penalized
    /// "used-flexibility" indicator (soft)
    fn continuity_avoidance(&mut self) {
        let index = self.index;
        let hard = self.options.policy.hard_continuity();
        let weight = self.options.weights.continuity;
        for g in 0..self.model.group_count() {
            let sessions = index.sessions_of(g);
            if sessions.iter().any(|s| s.assigned.is_some()) {
                continue;
            }
            let mut history: Vec<usize> = Vec::new();
            for session in sessions {
                for teacher in session.last_teacher.iter().chain(&session.previous_teacher) {
                    if let Some(t) = index.teacher_index(teacher) {
                        if !history.contains(&t) {
                            history.push(t);
                        }
                    }
                }
            }
            for t in history {
                if hard {
                    self.force_zero(t, g);
                } else {
                    let tag = self.model.solver.new_constraint_tag();
                    let flex = self.model.solver.new_bounded_integer(0, 1);
                    let var = self.model.var(t, g);
                    let terms = vec![var.scaled(1), flex.scaled(-1)];
                    let _ = self
                        .model
                        .solver
                        .add_constraint(cp::less_than_or_equals(terms, 0, tag))
                        .post();
                    self.penalties.push(PenaltyTerm { var: flex, weight, max_value: 1 });
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Eligibility
    // ------------------------------------------------------------------

    /// Teachers without the ONLINE (resp. PRESENCIAL) flag never take
    /// sessions of that mode
    fn delivery_mode_eligibility(&mut self) {
        let index = self.index;
        let roster = self.roster;
        for mode in [DeliveryMode::Online, DeliveryMode::Presencial] {
            let key = CapabilityKey::Mode(mode);
            for (t, teacher) in roster.teachers.iter().enumerate() {
                match teacher.can(&key) {
                    Ok(true) => {}
                    Ok(false) => {
                        for g in 0..self.model.group_count() {
                            if index.sessions_of(g).iter().any(|s| s.mode == mode) {
                                self.force_zero(t, g);
                            }
                        }
                    }
                    Err(unknown) => self.flag_unknown_capability(unknown.key),
                }
            }
        }
    }

    /// Unit/modality/category/stage labels a teacher lacks the flag for
    fn capability_eligibility(&mut self) {
        let index = self.index;
        let roster = self.roster;
        for g in 0..self.model.group_count() {
            let mut labels: Vec<&str> = Vec::new();
            for session in index.sessions_of(g) {
                // Units only constrain in-person teaching
                if session.mode == DeliveryMode::Presencial && !session.unit.is_empty() {
                    push_unique(&mut labels, &session.unit);
                }
                for label in [&session.modality, &session.category, &session.stage] {
                    if !label.is_empty() {
                        push_unique(&mut labels, label);
                    }
                }
            }
            for (t, teacher) in roster.teachers.iter().enumerate() {
                for label in &labels {
                    match teacher.can(&CapabilityKey::label(*label)) {
                        Ok(true) => {}
                        Ok(false) => self.force_zero(t, g),
                        Err(unknown) => self.flag_unknown_capability(unknown.key),
                    }
                }
            }
        }
    }

    /// Per-session free-text exclusion lists
    fn explicit_exclusions(&mut self) {
        let index = self.index;
        for g in 0..self.model.group_count() {
            let excluded: Vec<usize> = index
                .sessions_of(g)
                .iter()
                .flat_map(|s| s.excluded.iter())
                .filter_map(|teacher| index.teacher_index(teacher))
                .collect();
            for t in excluded {
                self.force_zero(t, g);
            }
        }
    }

    /// Weekday unavailability and per-slot time flags
    fn day_time_availability(&mut self) {
        let index = self.index;
        let roster = self.roster;
        for g in 0..self.model.group_count() {
            for session in index.sessions_of(g) {
                for (t, teacher) in roster.teachers.iter().enumerate() {
                    if teacher.availability_on(session.weekday) == Availability::Unavailable {
                        self.force_zero(t, g);
                    }
                    match teacher.teaches_at(session.time) {
                        Some(true) => {}
                        Some(false) => self.force_zero(t, g),
                        None => self.flag_missing_hour(session.time),
                    }
                }
            }
        }
    }

    /// One activation indicator per (teacher, conditional weekday); inactive
    /// means the day's variables are zero, and activation costs in the
    /// objective so it only switches on when the solution space forces it
    fn conditional_day_activation(&mut self) {
        let weight = self.options.weights.conditional_day;
        for t in 0..self.roster.teachers.len() {
            for (day, group_ids) in self.index.groups_by_weekday() {
                if self.roster.teachers[t].availability_on(*day) != Availability::Conditional {
                    continue;
                }
                let tag = self.model.solver.new_constraint_tag();
                let activation = self.model.solver.new_bounded_integer(0, 1);
                for &g in group_ids {
                    let terms = vec![self.model.var(t, g).scaled(1), activation.scaled(-1)];
                    let _ = self
                        .model
                        .solver
                        .add_constraint(cp::less_than_or_equals(terms, 0, tag))
                        .post();
                }
                self.penalties.push(PenaltyTerm {
                    var: activation,
                    weight,
                    max_value: 1,
                });
            }
        }
    }

    /// High-load groups need the intensive flag
    fn intensive_eligibility(&mut self) {
        let index = self.index;
        let roster = self.roster;
        let threshold = self.options.thresholds.intensive_sessions;
        for g in 0..self.model.group_count() {
            if !index.sessions_of(g).iter().any(|s| s.is_intensive(threshold)) {
                continue;
            }
            for (t, teacher) in roster.teachers.iter().enumerate() {
                if !teacher.intensive_ok {
                    self.force_zero(t, g);
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Workload
    // ------------------------------------------------------------------

    /// Weekly-session-weighted load per teacher: a hard window around the
    /// target, or a penalized shortfall variable under the soft policies
    fn workload(&mut self) {
        let policy = self.options.policy;
        if !policy.hard_workload() && !policy.soft_workload() {
            return;
        }

        let group_weight: Vec<i32> = (0..self.model.group_count())
            .map(|g| self.index.sessions_of(g)[0].weekly_sessions as i32)
            .collect();

        for t in 0..self.roster.teachers.len() {
            let target = self.roster.teachers[t].target_load as i32;
            let load_terms = |model: &AssignmentModel| {
                (0..model.group_count())
                    .map(|g| model.var(t, g).scaled(group_weight[g]))
                    .collect::<Vec<_>>()
            };

            if policy.hard_workload() {
                let below = self.options.thresholds.workload_below_target as i32;
                let above = self.options.thresholds.workload_above_target as i32;
                let tag = self.model.solver.new_constraint_tag();
                let lower = load_terms(self.model);
                let _ = self
                    .model
                    .solver
                    .add_constraint(cp::greater_than_or_equals(lower, target - below, tag))
                    .post();
                let upper = load_terms(self.model);
                let _ = self
                    .model
                    .solver
                    .add_constraint(cp::less_than_or_equals(upper, target + above, tag))
                    .post();
            } else {
                if target == 0 {
                    continue;
                }
                let tag = self.model.solver.new_constraint_tag();
                let shortfall = self.model.solver.new_bounded_integer(0, target);
                let mut terms = load_terms(self.model);
                terms.push(shortfall.scaled(1));
                let _ = self
                    .model
                    .solver
                    .add_constraint(cp::greater_than_or_equals(terms, target, tag))
                    .post();
                let weight = self
                    .options
                    .weights
                    .deviation_weight(policy, self.roster.teachers[t].target_load);
                self.penalties.push(PenaltyTerm {
                    var: shortfall,
                    weight,
                    max_value: target,
                });
            }
        }
    }

    /// Under fill-all, every teacher receives at least one group
    fn minimum_load(&mut self) {
        if !self.options.policy.fill_all() {
            return;
        }
        let tag = self.model.solver.new_constraint_tag();
        for t in 0..self.model.teacher_count() {
            let vars = self.model.teacher_vars(t).to_vec();
            let _ = self
                .model
                .solver
                .add_constraint(cp::greater_than_or_equals(vars, 1, tag))
                .post();
        }
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn force_zero(&mut self, t: usize, g: usize) {
        if !self.zeroed.insert((t, g)) {
            return;
        }
        let tag = self.model.solver.new_constraint_tag();
        let var = self.model.var(t, g);
        let _ = self.model.solver.add_constraint(cp::equals(vec![var], 0, tag)).post();
    }

    fn flag_unknown_capability(&mut self, key: CapabilityKey) {
        if self.flagged_keys.insert(key.clone()) {
            self.findings.push(Finding::new(
                FindingCode::R007UnknownCapabilityLabel,
                Severity::Warning,
                format!("capability '{key}' has no column in the teacher table; rule left unconstrained"),
            ));
        }
    }

    fn flag_missing_hour(&mut self, time: ClockTime) {
        if self.flagged_hours.insert(time) {
            self.findings.push(Finding::new(
                FindingCode::R005MissingHourColumn,
                Severity::Warning,
                format!("hour {time} has no column in the teacher table; time availability left unconstrained"),
            ));
        }
    }
}

fn push_unique<'a>(labels: &mut Vec<&'a str>, label: &'a str) {
    if !labels.contains(&label) {
        labels.push(label);
    }
}
