//! Fuzz target for engine configuration parsing and validation.

#![no_main]

use improb_config::{validate_engine, EngineConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = EngineConfig::from_json(text) {
        let _ = validate_engine(&config);
    }
});
