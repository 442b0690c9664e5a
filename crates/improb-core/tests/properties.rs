//! Property-based tests for lower previsions and set functions.

use improb_core::lowprev::{LowPrev, LowProb, Prob};
use improb_core::{Gamble, Number, NumberKind, PossibilitySpace, SetFunction};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cmp::Ordering;
use std::sync::Arc;

const KIND: NumberKind = NumberKind::Fraction;

fn space() -> Arc<PossibilitySpace> {
    PossibilitySpace::from_chars("abc").unwrap()
}

fn gamble(space: &Arc<PossibilitySpace>, values: &[i64]) -> Gamble {
    Gamble::from_i64s(space, KIND, values).unwrap()
}

fn random_lowprob(seed: u64) -> LowProb {
    let mut rng = StdRng::seed_from_u64(seed);
    LowProb::make_random(&space(), Some(12), true, KIND, &mut rng).unwrap()
}

fn pmf(weights: &[i64]) -> Vec<Number> {
    let total: i64 = weights.iter().sum();
    weights.iter().map(|&w| Number::from_ratio(KIND, w, total).unwrap()).collect()
}

fn geq(a: &Number, b: &Number) -> bool {
    a.compare(b, 0.0).unwrap() != Ordering::Less
}

/// Evaluates only the rows introduced at `level` on a fully assessed model.
fn level_rows_hold(lpr: &LowProb, level: usize) -> bool {
    let space = lpr.space();
    LowProb::get_constraints_n_monotone(space.len(), level).iter().all(|row| {
        let total = row.terms().iter().fold(Number::zero(KIND), |acc, &(mask, coefficient)| {
            let event = space.event_from_mask(mask).unwrap();
            let value = lpr.get(&event).unwrap();
            acc.try_add(&value.try_mul(&Number::from_i64(KIND, coefficient)).unwrap()).unwrap()
        });
        total.signum(0.0) != Ordering::Less
    })
}

fn values() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(-10i64..=10, 3)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn upper_is_conjugate_of_lower(seed in any::<u64>(), g in values()) {
        let mut lpr = random_lowprob(seed);
        let space = Arc::clone(lpr.space());
        let g = gamble(&space, &g);
        let upper = lpr.get_upper(&g, None).unwrap();
        let lower_of_negation = lpr.get_lower(&-&g, None).unwrap();
        prop_assert_eq!(upper, -lower_of_negation);
    }

    #[test]
    fn natural_extension_is_coherent(seed in any::<u64>(), f in values(), g in values(), c in -5i64..=5) {
        let mut lpr = random_lowprob(seed);
        let space = Arc::clone(lpr.space());
        let f = gamble(&space, &f);
        let g = gamble(&space, &g);

        let lower = lpr.get_lower(&f, None).unwrap();
        let upper = lpr.get_upper(&f, None).unwrap();
        prop_assert!(geq(&lower, &f.min().unwrap()));
        prop_assert!(geq(&upper, &lower));
        prop_assert!(geq(&f.max().unwrap(), &upper));

        let shift = Number::from_i64(KIND, c);
        let shifted = lpr.get_lower(&f.add_scalar(&shift).unwrap(), None).unwrap();
        prop_assert_eq!(shifted, lower.try_add(&shift).unwrap());

        let two = Number::from_i64(KIND, 2);
        let scaled = lpr.get_lower(&f.scale(&two).unwrap(), None).unwrap();
        prop_assert_eq!(scaled, lower.try_mul(&two).unwrap());

        let sum = lpr.get_lower(&f.try_add(&g).unwrap(), None).unwrap();
        let separate = lower.try_add(&lpr.get_lower(&g, None).unwrap()).unwrap();
        prop_assert!(geq(&sum, &separate));
    }

    #[test]
    fn mobius_round_trip(raw in prop::collection::vec(-6i64..=6, 8)) {
        let space = space();
        let data = space
            .subsets()
            .zip(raw)
            .map(|(event, v)| (event, Number::from_ratio(KIND, v, 6).unwrap()))
            .collect::<Vec<_>>();
        let function = SetFunction::from_values(&space, KIND, data.clone()).unwrap();
        let back = function.mobius_transform().unwrap().get_mobius_inverse().unwrap();
        for (event, value) in data {
            prop_assert_eq!(back.get_value(&event).unwrap(), value);
        }
    }

    #[test]
    fn choquet_of_probability_is_expectation(
        weights in prop::collection::vec(1i64..=20, 3),
        g in values(),
    ) {
        let space = space();
        let pmf = pmf(&weights);
        let prob = Prob::new(&space, KIND, pmf).unwrap();
        let measure = space
            .subsets()
            .map(|event| {
                let p = prob.probability(&event).unwrap();
                (event, p)
            })
            .collect::<Vec<_>>();
        let function = SetFunction::from_values(&space, KIND, measure).unwrap();
        let g = gamble(&space, &g);
        prop_assert_eq!(function.get_choquet(&g).unwrap(), prob.get_prev(&g, None).unwrap());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn monotonicity_levels(seed in any::<u64>()) {
        let mut lpr = random_lowprob(seed);
        lpr.extend().unwrap();
        let rows: Vec<bool> = (1..=3).map(|k| level_rows_hold(&lpr, k)).collect();
        prop_assert!(rows[0], "coherent lower probabilities are 1-monotone");
        for k in 1..=3 {
            prop_assert_eq!(lpr.is_n_monotone(k).unwrap(), rows[..k].iter().all(|&r| r), "level {}", k);
        }
        // on three outcomes 3-monotone means every Möbius mass is nonnegative
        prop_assert_eq!(lpr.is_n_monotone(3).unwrap(), lpr.is_completely_monotone().unwrap());
    }

    #[test]
    fn coherent_correction_is_idempotent(seed in any::<u64>()) {
        let mut lpr = random_lowprob(seed);
        prop_assert!(lpr.is_coherent().unwrap());
        let once = lpr.get_coherent().unwrap();
        let mut again = once.clone();
        let twice = again.get_coherent().unwrap();
        let a: Vec<_> = once.iter().collect();
        let b: Vec<_> = twice.iter().collect();
        prop_assert_eq!(a, b);
    }
}
