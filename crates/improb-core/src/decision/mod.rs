//! Decision making with lower previsions.
//!
//! An optimality operator maps a finite set of gambles to its maximal
//! subset. Partial preorders (pointwise dominance, maximality, interval
//! dominance) go through [`filter_maximal`]; total preorders (Γ-maximin,
//! Γ-maximax, Hurwicz) keep every gamble whose score ties with the best.
//!
//! # Filtering
//!
//! Candidates form a worklist. Each popped candidate is compared against the
//! gambles already accepted and against the ones still waiting; it is
//! accepted only when none of them dominates it. Dominated candidates are
//! dropped for good, which is sound for a strict partial order.

pub mod opt;

pub use opt::{
    Criterion, GammaMaximax, GammaMaximin, Hurwicz, IntervalDominance, LowPrevMaximality, Optimality,
    PointwiseDominance,
};

use std::collections::VecDeque;

/// Maximal elements of `items` under the strict partial order `dominates`,
/// where `dominates(a, b)` means `a` is strictly preferred to `b`.
///
/// Accepted items keep their input order.
pub fn filter_maximal<T, E, F>(items: impl IntoIterator<Item = T>, mut dominates: F) -> Result<Vec<T>, E>
where
    F: FnMut(&T, &T) -> Result<bool, E>,
{
    let mut maximal: Vec<T> = Vec::new();
    let mut pending: VecDeque<T> = items.into_iter().collect();
    'candidates: while let Some(item) = pending.pop_front() {
        for other in maximal.iter().chain(pending.iter()) {
            if dominates(other, &item)? {
                continue 'candidates;
            }
        }
        maximal.push(item);
    }
    Ok(maximal)
}
