//! n-monotonicity constraints on lower probabilities.
//!
//! A lower probability is k-monotone when, for every event `A` and every
//! choice of `k` proper non-empty subsets `B_1..B_k` covering `A`,
//!
//! ```text
//! P(A) - Σ_{∅≠I⊆{1..k}} (-1)^{|I|+1} P(∩_{i∈I} B_i) >= 0
//! ```
//!
//! Level 1 is plain monotonicity, `P(A) - P(A∖{ω}) >= 0`. Rows depend only on
//! the size of the space, so they are generated over bitmasks and memoized
//! per `(size, level)` in a process-wide [`MonotoneCache`].

use improb_math::subsets;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use tracing::debug;

/// One linear inequality `Σ c_B P(B) >= 0` over event masks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonotoneConstraint {
    terms: Vec<(u64, i64)>,
}

impl MonotoneConstraint {
    /// Drops zero coefficients; `None` when nothing is left.
    fn from_coefficients(coefficients: BTreeMap<u64, i64>) -> Option<Self> {
        let terms: Vec<(u64, i64)> = coefficients.into_iter().filter(|&(_, c)| c != 0).collect();
        if terms.is_empty() {
            None
        } else {
            Some(MonotoneConstraint { terms })
        }
    }

    /// `(mask, coefficient)` pairs sorted by mask.
    pub fn terms(&self) -> &[(u64, i64)] {
        &self.terms
    }

    pub fn coefficient(&self, mask: u64) -> i64 {
        self.terms
            .binary_search_by_key(&mask, |&(m, _)| m)
            .map(|i| self.terms[i].1)
            .unwrap_or(0)
    }
}

fn level_one(size: usize) -> Vec<MonotoneConstraint> {
    let mut rows = Vec::new();
    for event in subsets::masks_by_size(size) {
        for omega in subsets::bits(event) {
            let mut coefficients = BTreeMap::new();
            coefficients.insert(event, 1);
            coefficients.insert(event & !(1u64 << omega), -1);
            rows.extend(MonotoneConstraint::from_coefficients(coefficients));
        }
    }
    rows
}

fn inclusion_exclusion(event: u64, members: &[u64]) -> Option<MonotoneConstraint> {
    let mut coefficients = BTreeMap::new();
    coefficients.insert(event, 1i64);
    for selection in 1u64..(1u64 << members.len()) {
        let intersection = subsets::bits(selection).fold(event, |acc, i| acc & members[i]);
        let sign = if subsets::popcount(selection) % 2 == 1 { 1 } else { -1 };
        *coefficients.entry(intersection).or_insert(0) -= sign;
    }
    MonotoneConstraint::from_coefficients(coefficients)
}

fn is_nested(members: &[u64]) -> bool {
    members.iter().enumerate().any(|(i, &a)| {
        members
            .iter()
            .enumerate()
            .any(|(j, &b)| i != j && a & !b == 0)
    })
}

fn level_k(size: usize, level: usize, lower: &HashSet<MonotoneConstraint>) -> Vec<MonotoneConstraint> {
    let mut seen: HashSet<MonotoneConstraint> = HashSet::new();
    let mut rows = Vec::new();
    for event in subsets::masks_by_size(size) {
        let proper: Vec<u64> = subsets::subsets_of(event)
            .into_iter()
            .filter(|&s| s != 0 && s != event)
            .collect();
        if proper.len() < level {
            continue;
        }
        for members in subsets::combinations(&proper, level) {
            if members.iter().fold(0, |acc, &m| acc | m) != event {
                continue;
            }
            // nested members reproduce a lower-level row
            if is_nested(&members) {
                continue;
            }
            let Some(row) = inclusion_exclusion(event, &members) else {
                continue;
            };
            if lower.contains(&row) || !seen.insert(row.clone()) {
                continue;
            }
            rows.push(row);
        }
    }
    rows
}

/// Process-wide memo of constraint families keyed by `(space size, level)`.
///
/// Entries are only ever added; concurrent first computations of the same
/// key produce identical rows and the last write wins.
#[derive(Debug, Default)]
pub struct MonotoneCache {
    levels: RwLock<HashMap<(usize, usize), Arc<[MonotoneConstraint]>>>,
}

static GLOBAL_CACHE: OnceLock<MonotoneCache> = OnceLock::new();

impl MonotoneCache {
    pub fn new() -> Self {
        MonotoneCache::default()
    }

    /// The shared cache, created on first use.
    pub fn global() -> &'static MonotoneCache {
        GLOBAL_CACHE.get_or_init(MonotoneCache::new)
    }

    fn lookup(&self, size: usize, level: usize) -> Option<Arc<[MonotoneConstraint]>> {
        self.levels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(size, level))
            .cloned()
    }

    /// Rows of exactly `level`, excluding rows already produced by a lower
    /// level. Level 0 has no rows.
    pub fn level(&self, size: usize, level: usize) -> Arc<[MonotoneConstraint]> {
        if level == 0 {
            return Arc::from(Vec::new());
        }
        if let Some(rows) = self.lookup(size, level) {
            return rows;
        }
        let rows: Arc<[MonotoneConstraint]> = if level == 1 {
            Arc::from(level_one(size))
        } else {
            let mut lower = HashSet::new();
            for below in 1..level {
                lower.extend(self.level(size, below).iter().cloned());
            }
            Arc::from(level_k(size, level, &lower))
        };
        debug!(size, level, rows = rows.len(), "generated monotonicity constraints");
        self.levels
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((size, level), Arc::clone(&rows));
        rows
    }

    /// Rows of every level from 1 through `level`.
    pub fn up_to(&self, size: usize, level: usize) -> Vec<MonotoneConstraint> {
        (1..=level)
            .flat_map(|k| self.level(size, k).iter().cloned().collect::<Vec<_>>())
            .collect()
    }

    pub fn contains(&self, size: usize, level: usize) -> bool {
        self.lookup(size, level).is_some()
    }

    pub fn len(&self) -> usize {
        self.levels.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every memoized family.
    pub fn clear(&self) {
        self.levels.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}
