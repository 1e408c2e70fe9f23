//! Tests for the workload policies and the fill-all variant.

use rotaplan_core::{
    Availability, ClassSession, ClockTime, PolicyVariant, Roster, RuleThresholds, SolveOptions,
    Teacher, Weekday,
};
use rotaplan_solver::{RotationSolver, SolveOutcome};

fn time(hour: u16, minute: u16) -> ClockTime {
    ClockTime::new(hour, minute)
}

fn available(id: &str) -> Teacher {
    let mut teacher = Teacher::new(id);
    for day in Weekday::ALL {
        teacher.weekdays.insert(day, Availability::Available);
    }
    teacher
}

fn options(policy: PolicyVariant) -> SolveOptions {
    SolveOptions { policy, seed: Some(1), time_budget_secs: 10, ..SolveOptions::default() }
}

// =============================================================================
// Hard workload window
// =============================================================================

#[test]
fn hard_bounds_keep_the_load_inside_the_window() {
    // Target 6 with window [target-4, target]: any feasible load is 2..=6.
    // Four two-session groups are on offer; filling all four would be 8.
    let sessions = vec![
        ClassSession::new("A", Weekday::Segunda, time(8, 0)).weekly_sessions(2),
        ClassSession::new("B", Weekday::Segunda, time(10, 0)).weekly_sessions(2),
        ClassSession::new("C", Weekday::Segunda, time(14, 0)).weekly_sessions(2),
        ClassSession::new("D", Weekday::Segunda, time(16, 0)).weekly_sessions(2),
    ];
    let roster = Roster::new(sessions, vec![available("Ana").target_load(6)]);

    let report = RotationSolver::new(options(PolicyVariant::HardWorkload))
        .solve(&roster)
        .unwrap();

    assert!(report.outcome.is_usable());
    let load = &report.loads[0];
    assert!(
        (2..=6).contains(&load.weighted_sessions),
        "load {} outside the hard window",
        load.weighted_sessions
    );
    // Filling is rewarded, so the solver saturates the window
    assert_eq!(load.weighted_sessions, 6);
}

#[test]
fn hard_upper_bound_blocks_excess_groups() {
    let sessions = vec![
        ClassSession::new("A", Weekday::Segunda, time(8, 0)),
        ClassSession::new("B", Weekday::Segunda, time(10, 0)),
        ClassSession::new("C", Weekday::Segunda, time(14, 0)),
    ];
    let mut opts = options(PolicyVariant::HardWorkload);
    opts.thresholds = RuleThresholds {
        workload_below_target: 2,
        workload_above_target: 0,
        ..RuleThresholds::default()
    };
    let roster = Roster::new(sessions, vec![available("Ana").target_load(2)]);

    let report = RotationSolver::new(opts).solve(&roster).unwrap();
    assert_eq!(report.assignments.len(), 2);
}

// =============================================================================
// Soft workload
// =============================================================================

#[test]
fn soft_policy_tolerates_an_unreachable_target() {
    // Only two weighted sessions exist but the target is 10: the hard window
    // would be infeasible, the soft policy just eats the shortfall penalty.
    let sessions = vec![
        ClassSession::new("A", Weekday::Segunda, time(8, 0)),
        ClassSession::new("B", Weekday::Segunda, time(10, 0)),
    ];
    let roster = Roster::new(sessions, vec![available("Ana").target_load(10)]);

    let report = RotationSolver::new(options(PolicyVariant::SoftWorkload))
        .solve(&roster)
        .unwrap();

    assert!(report.outcome.is_usable());
    assert_eq!(report.assignments.len(), 2);
    assert_eq!(report.loads[0].weighted_sessions, 2);
}

#[test]
fn soft_weights_protect_low_target_teachers_proportionally() {
    // One group; Lo has target 2, Hi has target 12. Assigning to Hi leaves a
    // shortfall of 11 at weight 60/12=5 on top of Lo's full 2 at weight 30;
    // assigning to Lo leaves Hi's full 12 at weight 5 and Lo's 1 at 30.
    // Cheapest total shortfall decides, so Lo gets the group.
    let sessions = vec![ClassSession::new("A", Weekday::Segunda, time(8, 0))];
    let roster = Roster::new(
        sessions,
        vec![available("Lo").target_load(2), available("Hi").target_load(12)],
    );

    let report = RotationSolver::new(options(PolicyVariant::SoftWorkload))
        .solve(&roster)
        .unwrap();
    assert_eq!(report.assignments.teacher_for("A"), Some(&"Lo".to_string()));
}

// =============================================================================
// Fill-all
// =============================================================================

#[test]
fn fill_all_covers_every_group_and_every_teacher() {
    let sessions = vec![
        ClassSession::new("A", Weekday::Segunda, time(8, 0)),
        ClassSession::new("B", Weekday::Segunda, time(10, 0)),
    ];
    let roster = Roster::new(sessions, vec![available("Ana"), available("Bruno")]);

    let report = RotationSolver::new(options(PolicyVariant::SingleTeacherFillAll))
        .solve(&roster)
        .unwrap();

    assert_eq!(report.assignments.len(), 2);
    assert_eq!(report.assignments.groups_for("Ana").len(), 1);
    assert_eq!(report.assignments.groups_for("Bruno").len(), 1);
}

#[test]
fn fill_all_reports_no_solution_when_a_group_is_uncoverable() {
    let sessions = vec![ClassSession::new("A", Weekday::Sabado, time(9, 0))];
    // Ana never works Saturdays
    let ana = Teacher::new("Ana").weekday(Weekday::Segunda, Availability::Available);
    let roster = Roster::new(sessions, vec![ana]);

    let report = RotationSolver::new(options(PolicyVariant::SingleTeacherFillAll))
        .solve(&roster)
        .unwrap();

    assert_eq!(report.outcome, SolveOutcome::NoSolution);
    assert!(report.assignments.is_empty());
    assert!(report.loads.is_empty());
}
