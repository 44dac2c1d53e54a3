//! Fuzzes the Xbox 360 report decoder with a stream of reads.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_xbox360_input
#![no_main]
use libfuzzer_sys::fuzz_target;
use padlink_hid_xbox_protocol::{DecodeError, Xbox360Decoder};

fuzz_target!(|data: &[u8]| {
    // The first byte picks a read size so that short, exact and long reads
    // are all exercised against the same decoder state.
    let Some((&size, mut rest)) = data.split_first() else {
        return;
    };
    let size = usize::from(size % 32).max(1);
    let mut decoder = Xbox360Decoder::new();
    while !rest.is_empty() {
        let (report, tail) = rest.split_at(size.min(rest.len()));
        let before = *decoder.previous();
        match decoder.decode(report) {
            Ok(_) => assert_eq!(decoder.previous().as_slice(), report),
            Err(DecodeError::InvalidLength { .. }) => assert_eq!(*decoder.previous(), before),
            Err(_) => {}
        }
        rest = tail;
    }
});
