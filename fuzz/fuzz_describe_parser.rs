//! Fuzz target for describe output handling.
//!
//! Run with: cargo +nightly fuzz run fuzz_describe_parser
//!
//! Parsing must never panic, anything that parses must print back to the
//! same string, and the rendered flag must always keep its escaped quotes
//! on a single line.

#![no_main]

use fwstamp_core::{BuildVersionString, DescribeParts, MacroDefinition};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let version = BuildVersionString::from_raw(s);

    if let Ok(parts) = version.as_str().parse::<DescribeParts>() {
        assert_eq!(parts.to_string(), version.as_str());
    }

    let flag = MacroDefinition::new("FWVERSION", version.as_str()).to_build_flag();
    assert!(flag.starts_with("-D FWVERSION=\\\""));
    assert!(flag.ends_with("\\\""));
    assert!(!flag.chars().any(|c| c.is_ascii_control()));
});
