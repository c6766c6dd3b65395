//! Fuzz target for access log parsing.
//!
//! Arbitrary text must produce a table or an error, never a panic, in both
//! strict and lenient mode.

#![no_main]

use libfuzzer_sys::fuzz_target;
use logtab_core::access::{AccessLogOptions, AccessLogParser};
use logtab_core::RouteTable;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(routes) = RouteTable::from_pairs(&[
        ("slotAd", r"GET /slots/(.+?)/ad$"),
        ("slotAdWithId", r"GET /slots/(.+?)/ads/(\d+?)$"),
    ]) else {
        return;
    };

    let strict = AccessLogParser::new(routes.clone());
    let _ = strict.parse_str(text);

    let lenient = AccessLogParser::new(routes).with_options(AccessLogOptions { lenient: true });
    let _ = lenient.parse_str(text);
});
