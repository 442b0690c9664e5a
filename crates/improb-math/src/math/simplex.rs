//! Dense two-phase primal simplex.
//!
//! Problems are stated as `min c·x` subject to rows `a·x = b` or `a·x ≥ b`
//! with `x ≥ 0` on every variable. Bland's rule guards against cycling, which
//! matters because the lower-prevision polytopes are highly degenerate.
//!
//! # Layout
//!
//! Columns are `[structural | slack | artificial | rhs]`. Every row receives
//! an artificial variable in phase 1; phase 2 keeps them out of the basis.

use super::field::Field;
use thiserror::Error;
use tracing::trace;

/// Default pivot budget.
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// Constraint sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Equal,
    GreaterEq,
}

/// Result of a solve that ran to completion.
#[derive(Debug, Clone, PartialEq)]
pub enum LpOutcome<T> {
    Optimal { value: T, solution: Vec<T> },
    Infeasible,
    Unbounded,
}

impl<T> LpOutcome<T> {
    pub fn status(&self) -> &'static str {
        match self {
            LpOutcome::Optimal { .. } => "optimal",
            LpOutcome::Infeasible => "infeasible",
            LpOutcome::Unbounded => "unbounded",
        }
    }
}

/// Solver failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LpError {
    #[error("simplex exceeded {iterations} pivots")]
    IterationLimit { iterations: usize },

    #[error("expected {expected} coefficients, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Clone)]
struct Row<T> {
    coefficients: Vec<T>,
    relation: Relation,
    rhs: T,
}

/// A linear program under construction.
#[derive(Debug, Clone)]
pub struct LinearProgram<T> {
    num_vars: usize,
    rows: Vec<Row<T>>,
    max_iterations: usize,
}

impl<T: Field> LinearProgram<T> {
    pub fn new(num_vars: usize) -> Self {
        LinearProgram {
            num_vars,
            rows: Vec::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn num_constraints(&self) -> usize {
        self.rows.len()
    }

    pub fn add_constraint(
        &mut self,
        coefficients: Vec<T>,
        relation: Relation,
        rhs: T,
    ) -> Result<(), LpError> {
        self.check_dimension(coefficients.len())?;
        self.rows.push(Row {
            coefficients,
            relation,
            rhs,
        });
        Ok(())
    }

    fn check_dimension(&self, actual: usize) -> Result<(), LpError> {
        if actual != self.num_vars {
            return Err(LpError::DimensionMismatch {
                expected: self.num_vars,
                actual,
            });
        }
        Ok(())
    }

    /// Minimize `objective · x`.
    pub fn minimize(&self, objective: &[T]) -> Result<LpOutcome<T>, LpError> {
        self.check_dimension(objective.len())?;
        let outcome = Tableau::build(self)?.solve(objective, self.max_iterations)?;
        trace!(
            vars = self.num_vars,
            rows = self.rows.len(),
            status = outcome.status(),
            "simplex solved"
        );
        Ok(outcome)
    }

    /// Maximize `objective · x`.
    pub fn maximize(&self, objective: &[T]) -> Result<LpOutcome<T>, LpError> {
        let negated: Vec<T> = objective.iter().map(|c| -c.clone()).collect();
        Ok(match self.minimize(&negated)? {
            LpOutcome::Optimal { value, solution } => LpOutcome::Optimal {
                value: -value,
                solution,
            },
            other => other,
        })
    }
}

struct Tableau<T> {
    /// Constraint rows, each `width + 1` wide (last entry is the rhs).
    rows: Vec<Vec<T>>,
    basis: Vec<usize>,
    num_vars: usize,
    num_slack: usize,
    width: usize,
    iterations: usize,
}

impl<T: Field> Tableau<T> {
    fn build(lp: &LinearProgram<T>) -> Result<Self, LpError> {
        let m = lp.rows.len();
        let num_slack = lp
            .rows
            .iter()
            .filter(|r| r.relation == Relation::GreaterEq)
            .count();
        let width = lp.num_vars + num_slack + m;
        let mut rows = Vec::with_capacity(m);
        let mut basis = Vec::with_capacity(m);
        let mut slack = lp.num_vars;
        for (i, row) in lp.rows.iter().enumerate() {
            let mut line = vec![T::zero(); width + 1];
            let flip = row.rhs.is_negative();
            for (j, a) in row.coefficients.iter().enumerate() {
                line[j] = if flip { -a.clone() } else { a.clone() };
            }
            if row.relation == Relation::GreaterEq {
                // a·x - s = b, negated along with the row when b < 0
                line[slack] = if flip { T::one() } else { -T::one() };
                slack += 1;
            }
            line[lp.num_vars + num_slack + i] = T::one();
            line[width] = if flip { -row.rhs.clone() } else { row.rhs.clone() };
            rows.push(line);
            basis.push(lp.num_vars + num_slack + i);
        }
        Ok(Tableau {
            rows,
            basis,
            num_vars: lp.num_vars,
            num_slack,
            width,
            iterations: 0,
        })
    }

    fn solve(mut self, objective: &[T], max_iterations: usize) -> Result<LpOutcome<T>, LpError> {
        let artificial_start = self.num_vars + self.num_slack;

        // Phase 1: minimize the sum of artificials.
        let mut costs = vec![T::zero(); self.width];
        for c in costs.iter_mut().skip(artificial_start) {
            *c = T::one();
        }
        let mut reduced = self.reduced_costs(&costs);
        if !self.run(&mut reduced, self.width, max_iterations)? {
            // Phase 1 is bounded below by zero.
            return Ok(LpOutcome::Infeasible);
        }
        let infeasibility = -reduced[self.width].clone();
        if infeasibility.is_positive() {
            return Ok(LpOutcome::Infeasible);
        }
        self.drive_out_artificials(artificial_start);

        // Phase 2.
        let mut costs = vec![T::zero(); self.width];
        for (c, o) in costs.iter_mut().zip(objective.iter()) {
            *c = o.clone();
        }
        let mut reduced = self.reduced_costs(&costs);
        if !self.run(&mut reduced, artificial_start, max_iterations)? {
            return Ok(LpOutcome::Unbounded);
        }
        let mut solution = vec![T::zero(); self.num_vars];
        for (i, &b) in self.basis.iter().enumerate() {
            if b < self.num_vars {
                solution[b] = self.rows[i][self.width].clone();
            }
        }
        Ok(LpOutcome::Optimal {
            value: -reduced[self.width].clone(),
            solution,
        })
    }

    /// `c_j - c_B·A_j` for every column, with `-c_B·b` in the rhs slot.
    fn reduced_costs(&self, costs: &[T]) -> Vec<T> {
        let mut reduced: Vec<T> = costs.to_vec();
        reduced.push(T::zero());
        for (row, &b) in self.rows.iter().zip(self.basis.iter()) {
            let cb = &costs[b];
            if cb.is_zero() {
                continue;
            }
            for (r, a) in reduced.iter_mut().zip(row.iter()) {
                *r = r.clone() - cb.clone() * a.clone();
            }
        }
        reduced
    }

    /// Pivot until optimal (`Ok(true)`) or unbounded (`Ok(false)`), allowing
    /// only columns below `allowed` to enter.
    fn run(&mut self, reduced: &mut [T], allowed: usize, max_iterations: usize) -> Result<bool, LpError> {
        loop {
            let Some(entering) = (0..allowed).find(|&j| reduced[j].is_negative()) else {
                return Ok(true);
            };
            let mut leaving: Option<(usize, T)> = None;
            for (i, row) in self.rows.iter().enumerate() {
                if !row[entering].is_positive() {
                    continue;
                }
                let ratio = row[self.width].clone() / row[entering].clone();
                let better = match &leaving {
                    None => true,
                    Some((best_i, best)) => match ratio.compare(best) {
                        std::cmp::Ordering::Less => true,
                        std::cmp::Ordering::Equal => self.basis[i] < self.basis[*best_i],
                        std::cmp::Ordering::Greater => false,
                    },
                };
                if better {
                    leaving = Some((i, ratio));
                }
            }
            let Some((pivot_row, _)) = leaving else {
                return Ok(false);
            };
            if self.iterations >= max_iterations {
                return Err(LpError::IterationLimit {
                    iterations: self.iterations,
                });
            }
            self.pivot(pivot_row, entering, reduced);
            self.iterations += 1;
        }
    }

    fn pivot(&mut self, pivot_row: usize, entering: usize, reduced: &mut [T]) {
        let pivot = self.rows[pivot_row][entering].clone();
        for a in self.rows[pivot_row].iter_mut() {
            *a = a.clone() / pivot.clone();
        }
        let normalized = self.rows[pivot_row].clone();
        for (i, row) in self.rows.iter_mut().enumerate() {
            if i == pivot_row {
                continue;
            }
            eliminate(row, &normalized, entering);
        }
        eliminate(reduced, &normalized, entering);
        self.basis[pivot_row] = entering;
    }

    /// Pivot artificial variables out of the basis after phase 1, dropping
    /// rows that turn out to be linearly dependent.
    fn drive_out_artificials(&mut self, artificial_start: usize) {
        let mut i = 0;
        while i < self.rows.len() {
            if self.basis[i] < artificial_start {
                i += 1;
                continue;
            }
            match (0..artificial_start).find(|&j| !self.rows[i][j].is_zero()) {
                Some(j) => {
                    // The reduced-cost row is rebuilt for phase 2, so a scratch row suffices.
                    let mut scratch = vec![T::zero(); self.width + 1];
                    self.pivot(i, j, &mut scratch);
                    i += 1;
                }
                None => {
                    self.rows.remove(i);
                    self.basis.remove(i);
                }
            }
        }
    }
}

fn eliminate<T: Field>(row: &mut [T], normalized: &[T], column: usize) {
    let factor = row[column].clone();
    if factor.is_zero() {
        return;
    }
    for (a, p) in row.iter_mut().zip(normalized.iter()) {
        *a = a.clone() - factor.clone() * p.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num::rational::BigRational;
    use num::BigInt;

    fn q(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    fn optimal_value<T: Clone>(outcome: &LpOutcome<T>) -> T {
        match outcome {
            LpOutcome::Optimal { value, .. } => value.clone(),
            other => panic!("expected optimum, got {}", other.status()),
        }
    }

    #[test]
    fn test_expectation_over_simplex() {
        // min 3p0 + 2p1 + p2 with p0 >= 1/10, p1 >= 1/5, sum = 1
        let mut lp = LinearProgram::<BigRational>::new(3);
        lp.add_constraint(vec![q(1, 1), q(1, 1), q(1, 1)], Relation::Equal, q(1, 1))
            .unwrap();
        lp.add_constraint(vec![q(1, 1), q(0, 1), q(0, 1)], Relation::GreaterEq, q(1, 10))
            .unwrap();
        lp.add_constraint(vec![q(0, 1), q(1, 1), q(0, 1)], Relation::GreaterEq, q(1, 5))
            .unwrap();
        let outcome = lp.minimize(&[q(3, 1), q(2, 1), q(1, 1)]).unwrap();
        assert_eq!(optimal_value(&outcome), q(3, 10) + q(2, 5) + q(7, 10));
        let outcome = lp.maximize(&[q(3, 1), q(2, 1), q(1, 1)]).unwrap();
        assert_eq!(optimal_value(&outcome), q(3, 1) * q(4, 5) + q(2, 5) + q(0, 1));
    }

    #[test]
    fn test_infeasible() {
        let mut lp = LinearProgram::<f64>::new(2);
        lp.add_constraint(vec![1.0, 1.0], Relation::Equal, 1.0).unwrap();
        lp.add_constraint(vec![1.0, 0.0], Relation::GreaterEq, 0.7).unwrap();
        lp.add_constraint(vec![0.0, 1.0], Relation::GreaterEq, 0.7).unwrap();
        assert_eq!(lp.minimize(&[1.0, 0.0]).unwrap(), LpOutcome::Infeasible);
    }

    #[test]
    fn test_unbounded() {
        let mut lp = LinearProgram::<f64>::new(2);
        lp.add_constraint(vec![1.0, -1.0], Relation::GreaterEq, 0.0).unwrap();
        assert_eq!(lp.minimize(&[-1.0, 0.0]).unwrap(), LpOutcome::Unbounded);
    }

    #[test]
    fn test_negative_rhs_and_redundant_rows() {
        // -x0 >= -2 (x0 <= 2), duplicated equality rows.
        let mut lp = LinearProgram::<BigRational>::new(2);
        lp.add_constraint(vec![q(-1, 1), q(0, 1)], Relation::GreaterEq, q(-2, 1))
            .unwrap();
        lp.add_constraint(vec![q(1, 1), q(1, 1)], Relation::Equal, q(3, 1))
            .unwrap();
        lp.add_constraint(vec![q(2, 1), q(2, 1)], Relation::Equal, q(6, 1))
            .unwrap();
        let outcome = lp.maximize(&[q(1, 1), q(0, 1)]).unwrap();
        match outcome {
            LpOutcome::Optimal { value, solution } => {
                assert_eq!(value, q(2, 1));
                assert_eq!(solution, vec![q(2, 1), q(1, 1)]);
            }
            other => panic!("unexpected {}", other.status()),
        }
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut lp = LinearProgram::<f64>::new(2);
        assert_eq!(
            lp.add_constraint(vec![1.0], Relation::Equal, 1.0),
            Err(LpError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_iteration_limit() {
        let mut lp = LinearProgram::<f64>::new(3).with_max_iterations(0);
        lp.add_constraint(vec![1.0, 1.0, 1.0], Relation::Equal, 1.0).unwrap();
        assert!(matches!(
            lp.minimize(&[1.0, 2.0, 3.0]),
            Err(LpError::IterationLimit { .. })
        ));
    }
}
