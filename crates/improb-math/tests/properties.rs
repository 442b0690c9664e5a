//! Property-based tests for improb-math kernels.
//!
//! Uses proptest to check the LP solver against vertex enumeration and the
//! exactness of the number layer across many random inputs.

use improb_math::subsets::{masks_by_size, popcount, submasks};
use improb_math::{
    snap_rational, BigRational, HRep, LinearProgram, LpOutcome, Number, NumberKind, Relation,
};
use num::BigInt;
use proptest::prelude::*;

/// Tolerance for floating point comparisons.
const TOL: f64 = 1e-7;

fn q(n: i64, d: i64) -> BigRational {
    BigRational::new(BigInt::from(n), BigInt::from(d))
}

/// Credal-set style polytope: pmf on `n` outcomes with lower bounds on
/// some indicator expectations.
fn bounded_simplex(n: usize, lowers: &[(u8, i64)]) -> (LinearProgram<BigRational>, HRep<BigRational>) {
    let mut lp = LinearProgram::new(n);
    let mut h = HRep::new(n);
    lp.add_constraint(vec![q(1, 1); n], Relation::Equal, q(1, 1)).unwrap();
    h.add_equality(q(-1, 1), vec![q(1, 1); n]).unwrap();
    for i in 0..n {
        let mut e = vec![q(0, 1); n];
        e[i] = q(1, 1);
        h.add_inequality(q(0, 1), e).unwrap();
    }
    for &(mask, numer) in lowers {
        let coeffs: Vec<BigRational> = (0..n)
            .map(|i| if mask & (1 << i) != 0 { q(1, 1) } else { q(0, 1) })
            .collect();
        let bound = q(numer, 10 * n as i64);
        lp.add_constraint(coeffs.clone(), Relation::GreaterEq, bound.clone()).unwrap();
        h.add_inequality(-bound, coeffs).unwrap();
    }
    (lp, h)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The LP optimum equals the minimum of the objective over the vertices.
    #[test]
    fn simplex_matches_vertex_minimum(
        lowers in prop::collection::vec((1u8..15, 0i64..5), 0..4),
        objective in prop::collection::vec(-5i64..6, 4),
    ) {
        let (lp, h) = bounded_simplex(4, &lowers);
        let c: Vec<BigRational> = objective.iter().map(|&v| q(v, 1)).collect();
        let vertices: Vec<Vec<BigRational>> = h.clone().vertices().collect::<Result<_, _>>().unwrap();
        let outcome = lp.minimize(&c).unwrap();
        // Lower bounds sum to at most 4 * 4/40 < 1, so the polytope is never empty.
        prop_assert!(!vertices.is_empty());
        let best = vertices
            .iter()
            .map(|v| v.iter().zip(&c).map(|(x, y)| x * y).sum::<BigRational>())
            .min()
            .unwrap();
        match outcome {
            LpOutcome::Optimal { value, solution } => {
                prop_assert_eq!(value, best);
                prop_assert!(h.contains(&solution));
            }
            other => prop_assert!(false, "unexpected status {}", other.status()),
        }
    }

    /// Float and exact solvers agree.
    #[test]
    fn float_simplex_tracks_exact(
        lowers in prop::collection::vec((1u8..15, 0i64..5), 0..4),
        objective in prop::collection::vec(-5i64..6, 4),
    ) {
        let (lp, _) = bounded_simplex(4, &lowers);
        let mut flp = LinearProgram::<f64>::new(4);
        flp.add_constraint(vec![1.0; 4], Relation::Equal, 1.0).unwrap();
        for &(mask, numer) in &lowers {
            let coeffs: Vec<f64> = (0..4).map(|i| if mask & (1 << i) != 0 { 1.0 } else { 0.0 }).collect();
            flp.add_constraint(coeffs, Relation::GreaterEq, numer as f64 / 40.0).unwrap();
        }
        let c: Vec<BigRational> = objective.iter().map(|&v| q(v, 1)).collect();
        let fc: Vec<f64> = objective.iter().map(|&v| v as f64).collect();
        let exact = match lp.minimize(&c).unwrap() {
            LpOutcome::Optimal { value, .. } => Number::Fraction(value).to_f64(),
            _ => f64::NAN,
        };
        let float = match flp.minimize(&fc).unwrap() {
            LpOutcome::Optimal { value, .. } => value,
            _ => f64::NAN,
        };
        prop_assert!((exact - float).abs() < TOL, "exact={} float={}", exact, float);
    }

    /// Snapping a small-denominator fraction recovers it exactly.
    #[test]
    fn snap_recovers_fraction(n in -1000i64..1000, d in 1i64..500) {
        let exact = q(n, d);
        let x = Number::Fraction(exact.clone()).to_f64();
        prop_assert_eq!(snap_rational(x, 1000), Some(exact));
    }

    /// Display and parse are inverse for exact numbers.
    #[test]
    fn fraction_display_parses_back(n in -10_000i64..10_000, d in 1i64..10_000) {
        let value = Number::from_ratio(NumberKind::Fraction, n, d).unwrap();
        let parsed = Number::parse(NumberKind::Fraction, &value.to_string()).unwrap();
        prop_assert_eq!(parsed, value);
    }

    /// A mask with k bits has 2^k sub-masks, all contained in it.
    #[test]
    fn submask_count(mask in 0u64..4096) {
        let subs: Vec<u64> = submasks(mask).collect();
        prop_assert_eq!(subs.len(), 1usize << popcount(mask));
        prop_assert!(subs.iter().all(|s| s & !mask == 0));
    }
}

#[test]
fn masks_by_size_covers_power_set() {
    let masks = masks_by_size(5);
    assert_eq!(masks.len(), 32);
    assert!(masks.windows(2).all(|w| popcount(w[0]) <= popcount(w[1])));
}
