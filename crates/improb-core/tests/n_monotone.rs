//! Extreme n-monotone lower probabilities and belief assignments.

use improb_core::lowprev::{LowProb, MonotoneCache};
use improb_core::{Error, Number, NumberKind, PossibilitySpace, SetFunction};
use std::cmp::Ordering;

fn extreme_lowprobs(labels: &str, k: usize) -> Vec<LowProb> {
    let space = PossibilitySpace::from_chars(labels).unwrap();
    LowProb::make_extreme_n_monotone(&space, k, None)
        .unwrap()
        .collect::<improb_core::Result<Vec<_>>>()
        .unwrap()
}

fn check_levels(mut lprs: Vec<LowProb>, expected: usize, holds_up_to: usize, size: usize) {
    assert_eq!(lprs.len(), expected);
    for lpr in &mut lprs {
        assert!(lpr.is_coherent().unwrap());
        for k in 1..=size {
            assert_eq!(lpr.is_n_monotone(k).unwrap(), k <= holds_up_to, "level {} of {}", k, lpr);
        }
    }
}

#[test]
fn extreme_two_monotone_on_three_outcomes() {
    let lprs = extreme_lowprobs("abc", 2);
    // one of them is not 3-monotone
    let three = lprs.iter().cloned().filter_map(|mut l| l.is_n_monotone(3).ok()).filter(|&m| m).count();
    assert_eq!(three, 7);
    assert_eq!(lprs.len(), 8);
}

#[test]
fn two_monotone_vertex_breaks_only_level_three_rows() {
    let level_holds = |lpr: &LowProb, level: usize| {
        LowProb::get_constraints_n_monotone(3, level).iter().all(|row| {
            let total = row.terms().iter().fold(Number::zero(NumberKind::Fraction), |acc, &(mask, c)| {
                let value = lpr.get(&lpr.space().event_from_mask(mask).unwrap()).unwrap();
                acc.try_add(&value.try_mul(&Number::from_i64(NumberKind::Fraction, c)).unwrap())
                    .unwrap()
            });
            total.signum(0.0) != Ordering::Less
        })
    };
    let mut separating: Vec<LowProb> = extreme_lowprobs("abc", 2)
        .into_iter()
        .filter(|lpr| !level_holds(lpr, 3))
        .collect();
    assert_eq!(separating.len(), 1);
    let lpr = &mut separating[0];
    assert!(level_holds(lpr, 1));
    assert!(level_holds(lpr, 2));
    assert!(lpr.is_n_monotone(2).unwrap());
    assert!(!lpr.is_n_monotone(3).unwrap());
    assert!(!lpr.is_completely_monotone().unwrap());
    let full = lpr.space().full_event();
    let mass = lpr.mobius().unwrap().get_defined(&full).unwrap();
    assert_eq!(mass.signum(0.0), Ordering::Less);
}

#[test]
fn extreme_three_monotone_on_three_outcomes() {
    check_levels(extreme_lowprobs("abc", 3), 7, 3, 3);
}

#[test]
fn extreme_completely_monotone_are_vacuous_on_events() {
    let mut lprs = extreme_lowprobs("abc", 3);
    for lpr in &mut lprs {
        assert!(lpr.is_completely_monotone().unwrap());
        let masses = lpr.mobius().unwrap();
        let focal: Vec<_> = masses.iter().filter(|(_, m)| !m.is_exact_zero()).collect();
        assert_eq!(focal.len(), 1);
    }
}

#[test]
#[ignore = "slow in debug builds: exact vertex enumeration in 16 dimensions"]
fn extreme_two_monotone_on_four_outcomes() {
    let lprs = extreme_lowprobs("abcd", 2);
    assert_eq!(lprs.len(), 41);
    for mut lpr in lprs {
        assert!(lpr.is_coherent().unwrap());
        assert!(lpr.is_n_monotone(2).unwrap());
    }
}

#[test]
#[ignore = "slow in debug builds: exact vertex enumeration in 16 dimensions"]
fn extreme_three_monotone_on_four_outcomes() {
    let lprs = extreme_lowprobs("abcd", 3);
    assert_eq!(lprs.len(), 16);
    assert_eq!(
        lprs.into_iter().filter_map(|mut l| l.is_n_monotone(4).ok()).filter(|&m| m).count(),
        15
    );
}

#[test]
fn extreme_four_monotone_on_four_outcomes() {
    check_levels(extreme_lowprobs("abcd", 4), 15, 4, 4);
}

#[test]
fn extreme_belief_assignments_match_lower_probabilities() {
    let space = PossibilitySpace::from_chars("abc").unwrap();
    for (k, expected) in [(2, 8), (3, 7)] {
        let bbas = SetFunction::make_extreme_bba_n_monotone(&space, k, None)
            .unwrap()
            .collect::<improb_core::Result<Vec<_>>>()
            .unwrap();
        assert_eq!(bbas.len(), expected);
        for bba in &bbas {
            assert!(bba.is_bba_n_monotone(k).unwrap());
            let lpr = LowProb::from_bba(bba).unwrap();
            assert_eq!(lpr.len(), 8);
        }
    }
}

#[test]
fn zero_monotonicity_is_rejected() {
    let space = PossibilitySpace::from_chars("ab").unwrap();
    assert!(matches!(
        LowProb::make_extreme_n_monotone(&space, 0, None).map(|_| ()),
        Err(Error::InvalidMonotonicity(0))
    ));
    assert!(matches!(
        SetFunction::make_extreme_bba_n_monotone(&space, 0, None).map(|_| ()),
        Err(Error::InvalidMonotonicity(0))
    ));
}

#[test]
fn constraint_cache_is_shared() {
    let first = LowProb::get_constraints_n_monotone(3, 2);
    let second = MonotoneCache::global().level(3, 2);
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(first.len(), 9);
    assert_eq!(MonotoneCache::global().up_to(3, 2).len(), 21);
}
