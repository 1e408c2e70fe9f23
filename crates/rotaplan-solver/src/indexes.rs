//! Prebuilt roster lookups.
//!
//! The rule compiler never scans the session list inside a loop: everything
//! it needs — groups by slot, in-person sessions by weekday, half-day unit
//! buckets, conflict pairs — is indexed here once per solve. All derived
//! collections are sorted vectors, not hash maps, so that constraint posting
//! order is deterministic and the seed contract holds.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use rotaplan_core::{ClassSession, ClockTime, DeliveryMode, Roster, RuleThresholds, Weekday};

/// Immutable lookup structure over one roster.
pub(crate) struct RosterIndex<'a> {
    groups: Vec<&'a str>,
    group_idx: HashMap<&'a str, usize>,
    teacher_idx: HashMap<&'a str, usize>,
    sessions_by_group: Vec<Vec<&'a ClassSession>>,
    /// (weekday, time) slots with the distinct groups meeting there
    slots: Vec<((Weekday, ClockTime), Vec<usize>)>,
    /// Distinct groups with at least one session per weekday
    groups_by_weekday: Vec<(Weekday, Vec<usize>)>,
}

impl<'a> RosterIndex<'a> {
    pub(crate) fn build(roster: &'a Roster) -> Self {
        let mut groups = Vec::new();
        let mut group_idx = HashMap::new();
        for session in &roster.sessions {
            if !group_idx.contains_key(session.group.as_str()) {
                group_idx.insert(session.group.as_str(), groups.len());
                groups.push(session.group.as_str());
            }
        }

        let teacher_idx: HashMap<&str, usize> = roster
            .teachers
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.as_str(), i))
            .collect();

        let mut sessions_by_group: Vec<Vec<&ClassSession>> = vec![Vec::new(); groups.len()];
        let mut slot_map: BTreeMap<(Weekday, ClockTime), BTreeSet<usize>> = BTreeMap::new();
        let mut weekday_map: BTreeMap<Weekday, BTreeSet<usize>> = BTreeMap::new();
        for session in &roster.sessions {
            let g = group_idx[session.group.as_str()];
            sessions_by_group[g].push(session);
            slot_map.entry(session.slot()).or_default().insert(g);
            weekday_map.entry(session.weekday).or_default().insert(g);
        }

        let slots = slot_map
            .into_iter()
            .map(|(slot, set)| (slot, set.into_iter().collect()))
            .collect();
        let groups_by_weekday = weekday_map
            .into_iter()
            .map(|(day, set)| (day, set.into_iter().collect()))
            .collect();

        Self { groups, group_idx, teacher_idx, sessions_by_group, slots, groups_by_weekday }
    }

    /// Distinct group names, first-appearance order
    pub(crate) fn groups(&self) -> &[&'a str] {
        &self.groups
    }

    pub(crate) fn group_index(&self, name: &str) -> Option<usize> {
        self.group_idx.get(name).copied()
    }

    pub(crate) fn teacher_index(&self, id: &str) -> Option<usize> {
        self.teacher_idx.get(id).copied()
    }

    /// Every session of a group, roster order
    pub(crate) fn sessions_of(&self, group: usize) -> &[&'a ClassSession] {
        &self.sessions_by_group[group]
    }

    /// (weekday, time) slots and the distinct groups meeting there
    pub(crate) fn slots(&self) -> &[((Weekday, ClockTime), Vec<usize>)] {
        &self.slots
    }

    /// Distinct groups with at least one session on each weekday
    pub(crate) fn groups_by_weekday(&self) -> &[(Weekday, Vec<usize>)] {
        &self.groups_by_weekday
    }

    /// In-person sessions per weekday, slot order
    fn in_person_by_weekday(&self) -> BTreeMap<Weekday, Vec<&'a ClassSession>> {
        let mut by_day: BTreeMap<Weekday, Vec<&ClassSession>> = BTreeMap::new();
        for (slot, group_ids) in &self.slots {
            for &g in group_ids {
                for session in &self.sessions_by_group[g] {
                    if session.slot() == *slot && session.mode == DeliveryMode::Presencial {
                        by_day.entry(slot.0).or_default().push(session);
                    }
                }
            }
        }
        by_day
    }

    /// Same-day in-person group pairs a teacher cannot cover back to back.
    ///
    /// A pair qualifies when the start-time gap is positive and either below
    /// the minimum window or in the categorically-impossible list. Zero-gap
    /// pairs are left to the double-booking rule.
    pub(crate) fn min_gap_pairs(&self, thresholds: &RuleThresholds) -> Vec<(usize, usize)> {
        let mut pairs = BTreeSet::new();
        for sessions in self.in_person_by_weekday().into_values() {
            for (i, a) in sessions.iter().enumerate() {
                for b in &sessions[i + 1..] {
                    if a.group == b.group {
                        continue;
                    }
                    let gap = a.time.gap_minutes(b.time);
                    if gap == 0 {
                        continue;
                    }
                    if gap < thresholds.min_gap_minutes
                        || thresholds.impossible_gaps.contains(&gap)
                    {
                        let ga = self.group_idx[a.group.as_str()];
                        let gb = self.group_idx[b.group.as_str()];
                        pairs.insert((ga.min(gb), ga.max(gb)));
                    }
                }
            }
        }
        pairs.into_iter().collect()
    }

    /// Different-unit in-person group pairs within the same half-day.
    ///
    /// Per weekday, in-person sessions split into before-noon and after-noon
    /// buckets; two sessions in the same bucket but different units cannot
    /// share a teacher, since cross-site travel within a half-day is
    /// infeasible.
    pub(crate) fn cross_unit_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = BTreeSet::new();
        for sessions in self.in_person_by_weekday().into_values() {
            for (i, a) in sessions.iter().enumerate() {
                for b in &sessions[i + 1..] {
                    if a.group == b.group
                        || a.unit == b.unit
                        || a.time.is_before_noon() != b.time.is_before_noon()
                    {
                        continue;
                    }
                    let ga = self.group_idx[a.group.as_str()];
                    let gb = self.group_idx[b.group.as_str()];
                    pairs.insert((ga.min(gb), ga.max(gb)));
                }
            }
        }
        pairs.into_iter().collect()
    }

    /// The pinned (teacher, group) pairs: groups whose rows already name a
    /// teacher that exists in the teacher table
    pub(crate) fn pinned_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = BTreeSet::new();
        for (g, sessions) in self.sessions_by_group.iter().enumerate() {
            for session in sessions {
                if let Some(teacher) = &session.assigned {
                    if let Some(t) = self.teacher_index(teacher) {
                        pairs.insert((t, g));
                    } else {
                        tracing::debug!(
                            teacher = %teacher,
                            group = %session.group,
                            "pre-assigned teacher not in teacher table, pin skipped"
                        );
                    }
                }
            }
        }
        pairs.into_iter().collect()
    }
}
