//! Fuzz target for natural extension on small exact models.
//!
//! Whatever the assessments, a query either fails cleanly or returns a
//! lower prevision no greater than the upper one.

#![no_main]

use arbitrary::Arbitrary;
use improb_core::lowprev::{LowPoly, LowPrev};
use improb_core::{Gamble, Number, NumberKind, PossibilitySpace};
use libfuzzer_sys::fuzz_target;
use std::cmp::Ordering;

#[derive(Debug, Arbitrary)]
struct Input {
    size: u8,
    assessments: Vec<(u8, i8, u8)>,
    gamble: Vec<i8>,
}

fuzz_target!(|input: Input| {
    let size = 1 + (input.size % 4) as usize;
    let Ok(space) = PossibilitySpace::range(size) else {
        return;
    };
    let mut lpr = LowPoly::new(&space, NumberKind::Fraction);
    for &(mask, numer, denom) in input.assessments.iter().take(6) {
        let labels: Vec<String> = (0..size)
            .filter(|i| mask & (1 << i) != 0)
            .map(|i| i.to_string())
            .collect();
        let (Ok(event), Ok(value)) = (
            space.make_event(labels),
            Number::from_ratio(NumberKind::Fraction, numer as i64, denom.max(1) as i64),
        ) else {
            continue;
        };
        let _ = lpr.set_lower(&event, value, None);
    }
    let values: Vec<i64> = (0..size)
        .map(|i| input.gamble.get(i).copied().unwrap_or(0) as i64)
        .collect();
    let Ok(gamble) = Gamble::from_i64s(&space, NumberKind::Fraction, &values) else {
        return;
    };
    if let (Ok(lower), Ok(upper)) = (lpr.get_lower(&gamble, None), lpr.get_upper(&gamble, None)) {
        assert_ne!(lower.compare(&upper, 0.0).unwrap(), Ordering::Greater);
    }
});
