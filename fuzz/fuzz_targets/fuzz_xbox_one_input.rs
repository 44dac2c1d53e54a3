//! Fuzzes the Xbox One packet decoder.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_xbox_one_input
#![no_main]
use libfuzzer_sys::fuzz_target;
use padlink_hid_xbox_protocol::xbox_one::TAG_INPUT;
use padlink_hid_xbox_protocol::{InputEvent, XboxOneDecoder};

fuzz_target!(|data: &[u8]| {
    // Must never panic on arbitrary bytes. Repeating an input report must not
    // produce button edges (triggers are reported on every frame).
    let mut decoder = XboxOneDecoder::new();
    if decoder.decode(data).is_ok() && data.first() == Some(&TAG_INPUT) {
        let again = decoder.decode(data).unwrap_or_default();
        assert!(!again.iter().any(|e| matches!(e, InputEvent::Button { .. })));
    }
});
