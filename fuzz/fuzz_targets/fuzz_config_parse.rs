//! Fuzz target: `parse_config`
//!
//! Feeds arbitrary text into the config document parser and asserts that
//! it never panics and that anything it accepts passes validation.
//!
//! cargo fuzz run fuzz_config_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use seatlink::adapters::config_file::parse_config;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(cfg) = parse_config(text) {
        assert!(cfg.validate().is_ok(), "accepted config must validate");
        assert!(cfg.endpoint.starts_with("ws://"));
    }
});
