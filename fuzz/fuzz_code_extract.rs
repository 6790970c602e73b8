//! Fuzz target for fenced code extraction.
//!
//! Run with: cargo +nightly fuzz run fuzz_code_extract
//!
//! The final model answer is untrusted text.

#![no_main]

use libfuzzer_sys::fuzz_target;
use uiforge_core::CodeExtractor;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(extractor) = CodeExtractor::new("jsx") else {
        return;
    };
    let code = extractor.extract(text);
    assert_eq!(code, code.trim());
    assert!(code.len() <= text.len());
});
