//! Fuzz target for component front-matter parsing.
//!
//! Run with: cargo +nightly fuzz run fuzz_front_matter
//!
//! Documentation files are operator-supplied; parsing must never panic and
//! must always produce a title.

#![no_main]

use libfuzzer_sys::fuzz_target;
use uiforge_core::catalog::parse_front_matter;

fuzz_target!(|data: &[u8]| {
    let content = String::from_utf8_lossy(data);
    let metadata = parse_front_matter("fuzzed", &content).into_inner();
    assert!(!metadata.title.is_empty() || content.contains("title:"));
});
