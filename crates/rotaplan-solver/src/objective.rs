//! Objective composer.
//!
//! All objective terms — the fill reward plus every penalty the soft rules
//! registered — are folded into ONE auxiliary integer variable tied by a
//! single equality, and that variable alone is minimized. Layering separate
//! minimize calls on the model would silently keep only the last one; the
//! composer exists so that can never happen.

use pumpkin_solver::constraints as cp;
use pumpkin_solver::variables::{DomainId, TransformableVariable};
use rotaplan_core::ObjectiveWeights;

use crate::constraints::PenaltyTerm;
use crate::model::AssignmentModel;

/// Tie the combined objective expression to a fresh variable and return it.
///
/// objective = -fill · Σ x  +  Σ weight · penalty
pub(crate) fn compose(
    model: &mut AssignmentModel,
    penalties: &[PenaltyTerm],
    weights: &ObjectiveWeights,
) -> DomainId {
    let fill = weights.fill;
    let var_count = (model.teacher_count() * model.group_count()) as i64;

    // Domain wide enough for any assignment the search can reach
    let lower = -(i64::from(fill) * var_count);
    let upper: i64 = penalties
        .iter()
        .map(|p| i64::from(p.weight) * i64::from(p.max_value))
        .sum();
    let objective = model.solver.new_bounded_integer(lower as i32, upper.max(0) as i32);

    let mut terms = Vec::with_capacity(var_count as usize + penalties.len() + 1);
    for t in 0..model.teacher_count() {
        for g in 0..model.group_count() {
            terms.push(model.var(t, g).scaled(-fill));
        }
    }
    for penalty in penalties {
        terms.push(penalty.var.scaled(penalty.weight));
    }
    terms.push(objective.scaled(-1));

    let tag = model.solver.new_constraint_tag();
    let _ = model.solver.add_constraint(cp::equals(terms, 0, tag)).post();

    objective
}
