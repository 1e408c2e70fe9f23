//! Policy configuration for a solve.
//!
//! The rule set evolved through several configurations in production; rather
//! than hard-coding one, the active configuration is an explicit
//! `PolicyVariant` plus tunable `RuleThresholds` and `ObjectiveWeights`.
//! Everything here deserializes from a TOML config file, so deployments can
//! pin their own thresholds without a rebuild.

use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// Policy Variant
// ============================================================================

/// Which subset of rules and objective terms a solve compiles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyVariant {
    /// At most one teacher per group, hard continuity, no workload terms
    #[default]
    SingleTeacherHard,
    /// Every group covered and every teacher gets at least one session
    SingleTeacherFillAll,
    /// Soft workload deviation penalties, soft continuity
    SoftWorkload,
    /// Hard workload window around each teacher's target
    HardWorkload,
    /// Soft workload with doubled deviation weights (the fallback policy)
    DoubleWeightedWorkload,
}

impl PolicyVariant {
    /// Every group must be covered (`== 1` instead of `<= 1`)
    pub fn fill_all(&self) -> bool {
        matches!(self, PolicyVariant::SingleTeacherFillAll)
    }

    /// Workload is a hard window `[target - below, target + above]`
    pub fn hard_workload(&self) -> bool {
        matches!(self, PolicyVariant::HardWorkload)
    }

    /// Workload is a penalized deviation from target
    pub fn soft_workload(&self) -> bool {
        matches!(
            self,
            PolicyVariant::SoftWorkload | PolicyVariant::DoubleWeightedWorkload
        )
    }

    /// Multiplier applied to workload deviation weights
    pub fn workload_weight_factor(&self) -> i32 {
        match self {
            PolicyVariant::DoubleWeightedWorkload => 2,
            _ => 1,
        }
    }

    /// Continuity-avoidance is a hard zeroing rather than a penalty
    pub fn hard_continuity(&self) -> bool {
        matches!(
            self,
            PolicyVariant::SingleTeacherHard
                | PolicyVariant::SingleTeacherFillAll
                | PolicyVariant::HardWorkload
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyVariant::SingleTeacherHard => "single-teacher-hard",
            PolicyVariant::SingleTeacherFillAll => "single-teacher-fill-all",
            PolicyVariant::SoftWorkload => "soft-workload",
            PolicyVariant::HardWorkload => "hard-workload",
            PolicyVariant::DoubleWeightedWorkload => "double-weighted-workload",
        }
    }
}

impl std::fmt::Display for PolicyVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PolicyVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single-teacher-hard" => Ok(PolicyVariant::SingleTeacherHard),
            "single-teacher-fill-all" => Ok(PolicyVariant::SingleTeacherFillAll),
            "soft-workload" => Ok(PolicyVariant::SoftWorkload),
            "hard-workload" => Ok(PolicyVariant::HardWorkload),
            "double-weighted-workload" => Ok(PolicyVariant::DoubleWeightedWorkload),
            other => Err(format!(
                "unknown policy '{other}' (expected one of: single-teacher-hard, \
                 single-teacher-fill-all, soft-workload, hard-workload, \
                 double-weighted-workload)"
            )),
        }
    }
}

// ============================================================================
// Thresholds
// ============================================================================

/// Tunable rule thresholds.
///
/// The authoritative gap windows were never settled in production (60-minute
/// minimums coexisted with 70/80/90-minute variants), so they are config
/// rather than constants; the defaults are the most frequently observed
/// values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleThresholds {
    /// Same-day in-person sessions closer than this cannot share a teacher
    pub min_gap_minutes: u16,
    /// Gap sizes that are categorically impossible regardless of unit
    pub impossible_gaps: Vec<u16>,
    /// Weekly session count at which a group counts as intensive
    pub intensive_sessions: u32,
    /// Hard workload window: allowed shortfall below target
    pub workload_below_target: u32,
    /// Hard workload window: allowed excess above target
    pub workload_above_target: u32,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            min_gap_minutes: 60,
            impossible_gaps: vec![10, 20, 30, 40, 50],
            intensive_sessions: 10,
            workload_below_target: 4,
            workload_above_target: 0,
        }
    }
}

// ============================================================================
// Objective Weights
// ============================================================================

/// Coefficients of the single combined objective expression.
///
/// The objective is one weighted sum, minimized once: filling a group is a
/// reward (negative term), everything else is a penalty. Fill dominates
/// continuity, which dominates conditional-day activation; workload
/// deviation is weighted per teacher as `deviation_scale / target` so that
/// low-target teachers are protected proportionally more.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectiveWeights {
    /// Reward per filled group
    pub fill: i32,
    /// Penalty per continuity violation
    pub continuity: i32,
    /// Penalty per activated conditional weekday
    pub conditional_day: i32,
    /// Numerator of the inverse-target workload deviation weight
    pub deviation_scale: i32,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            fill: 100,
            continuity: 10,
            conditional_day: 5,
            deviation_scale: 60,
        }
    }
}

impl ObjectiveWeights {
    /// Per-unit deviation weight for one teacher under the given policy
    pub fn deviation_weight(&self, policy: PolicyVariant, target_load: u32) -> i32 {
        let base = (self.deviation_scale / target_load.max(1) as i32).max(1);
        base * policy.workload_weight_factor()
    }
}

// ============================================================================
// Solve Options
// ============================================================================

/// Everything a single solve invocation needs besides the roster itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolveOptions {
    /// Active rule configuration
    pub policy: PolicyVariant,
    /// Tunable rule thresholds
    pub thresholds: RuleThresholds,
    /// Objective coefficients
    pub weights: ObjectiveWeights,
    /// Search-entropy seed; omitted means drawn from entropy and logged
    pub seed: Option<u64>,
    /// Wall-clock budget for the solve, in seconds
    pub time_budget_secs: u64,
    /// Search worker hint, opaque to the model (the solver may ignore it)
    pub workers: usize,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            policy: PolicyVariant::default(),
            thresholds: RuleThresholds::default(),
            weights: ObjectiveWeights::default(),
            seed: None,
            time_budget_secs: 60,
            workers: 1,
        }
    }
}

impl SolveOptions {
    /// Default options under a specific policy
    pub fn for_policy(policy: PolicyVariant) -> Self {
        Self { policy, ..Self::default() }
    }

    /// The wall-clock budget as a `Duration`
    pub fn time_budget(&self) -> Duration {
        Duration::from_secs(self.time_budget_secs)
    }

    /// Same options re-targeted at another policy (the fallback transition)
    pub fn with_policy(&self, policy: PolicyVariant) -> Self {
        Self { policy, ..self.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn policy_round_trips_through_str() {
        for policy in [
            PolicyVariant::SingleTeacherHard,
            PolicyVariant::SingleTeacherFillAll,
            PolicyVariant::SoftWorkload,
            PolicyVariant::HardWorkload,
            PolicyVariant::DoubleWeightedWorkload,
        ] {
            assert_eq!(policy.as_str().parse::<PolicyVariant>(), Ok(policy));
        }
        assert!("everything-soft".parse::<PolicyVariant>().is_err());
    }

    #[test]
    fn policy_rule_selection() {
        assert!(PolicyVariant::SingleTeacherFillAll.fill_all());
        assert!(!PolicyVariant::HardWorkload.fill_all());
        assert!(PolicyVariant::HardWorkload.hard_workload());
        assert!(PolicyVariant::SoftWorkload.soft_workload());
        assert!(PolicyVariant::DoubleWeightedWorkload.soft_workload());
        assert_eq!(PolicyVariant::DoubleWeightedWorkload.workload_weight_factor(), 2);
        assert_eq!(PolicyVariant::SoftWorkload.workload_weight_factor(), 1);
        assert!(PolicyVariant::HardWorkload.hard_continuity());
        assert!(!PolicyVariant::SoftWorkload.hard_continuity());
    }

    #[test]
    fn deviation_weight_is_inverse_to_target() {
        let weights = ObjectiveWeights::default();
        let light = weights.deviation_weight(PolicyVariant::SoftWorkload, 4);
        let heavy = weights.deviation_weight(PolicyVariant::SoftWorkload, 12);
        assert!(light > heavy);
        // Never rounds down to zero, even for very large targets
        assert_eq!(weights.deviation_weight(PolicyVariant::SoftWorkload, 1000), 1);
        // The fallback policy doubles the weight
        assert_eq!(
            weights.deviation_weight(PolicyVariant::DoubleWeightedWorkload, 4),
            2 * light
        );
    }

    #[test]
    fn thresholds_default_to_observed_values() {
        let thresholds = RuleThresholds::default();
        assert_eq!(thresholds.min_gap_minutes, 60);
        assert_eq!(thresholds.impossible_gaps, vec![10, 20, 30, 40, 50]);
        assert_eq!(thresholds.intensive_sessions, 10);
    }

    #[test]
    fn options_deserialize_with_partial_overrides() {
        let json = r#"{
            "policy": "hard-workload",
            "time_budget_secs": 30,
            "thresholds": { "min_gap_minutes": 90 }
        }"#;
        let options: SolveOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options.policy, PolicyVariant::HardWorkload);
        assert_eq!(options.time_budget_secs, 30);
        assert_eq!(options.thresholds.min_gap_minutes, 90);
        // Unset fields and sections keep their defaults
        assert_eq!(options.thresholds.intensive_sessions, 10);
        assert_eq!(options.weights, ObjectiveWeights::default());
        assert_eq!(options.workers, 1);
    }
}
