//! Fuzz target for number literal parsing.
//!
//! Parsing arbitrary text must return an error rather than panic, and a
//! parsed fraction must survive a round trip through its display form.

#![no_main]

use improb_math::{Number, NumberKind};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(number) = Number::parse(NumberKind::Fraction, text) {
        let again = Number::parse(NumberKind::Fraction, &number.to_string()).unwrap();
        assert_eq!(number, again);
    }
    let _ = Number::parse(NumberKind::Float, text);
});
