//! Fuzz target for vmstat log parsing.

#![no_main]

use libfuzzer_sys::fuzz_target;
use logtab_core::VmstatLogParser;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let _ = VmstatLogParser::new().parse_str(text);
    let _ = VmstatLogParser::new().readable(true).parse_str(text);
});
