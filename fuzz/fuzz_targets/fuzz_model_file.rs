//! Fuzz target for model file parsing.
//!
//! Arbitrary JSON must be rejected with an error, never a panic, both when
//! deserializing and when building the lower prevision.

#![no_main]

use improb_config::EngineConfig;
use improb_core::model::ModelFile;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(file) = ModelFile::from_json(text) {
        // keep the space small enough that building stays cheap
        if file.space.len() <= 6 {
            let _ = file.build(&EngineConfig::default());
        }
    }
});
