//! Fuzzes the model registry lookups.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_registry
#![no_main]
use libfuzzer_sys::fuzz_target;
use padlink_hid_xbox_protocol::{identify, is_supported, product_name};

fuzz_target!(|data: &[u8]| {
    let [v0, v1, p0, p1, ..] = data else {
        return;
    };
    let vid = u16::from_le_bytes([*v0, *v1]);
    let pid = u16::from_le_bytes([*p0, *p1]);
    let model = identify(vid, pid);
    assert_eq!(model.is_some(), is_supported(vid, pid));
    assert_eq!(model.is_some(), product_name(vid, pid).is_some());
});
