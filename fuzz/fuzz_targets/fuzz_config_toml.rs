//! Fuzz target for logtab.toml parsing and validation.

#![no_main]

use libfuzzer_sys::fuzz_target;
use logtab_core::Config;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    // Should never panic, only return an error
    if let Ok(config) = Config::from_toml(text) {
        let _ = config.validate();
    }
});
