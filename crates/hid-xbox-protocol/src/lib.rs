//! Xbox controller USB protocol: model registry, report decoding, LED ring.
//!
//! Three wired controllers are covered by two wire formats:
//!
//! - **Xbox 360** (`045e:028e`, and the Razer Onza `1689:fd00` clone):
//!   fixed 20-byte input reports, sticks classified into 8-way compass
//!   directions with a deadzone, and a 4-quadrant LED ring used to show the
//!   player slot.
//! - **Xbox One** (`045e:02d1`): tagged packets that only start flowing
//!   after a handshake; each stick axis is thresholded into two digital
//!   pseudo-buttons.
//!
//! Decoders are stateful: each keeps the last accepted report and emits
//! [`InputEvent`]s for what changed. Malformed reads are rejected with a
//! [`DecodeError`] and leave the state untouched.
//!
//! This crate performs no I/O.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(static_mut_refs)]
#![deny(clippy::unwrap_used)]

pub mod decoder;
pub mod digital;
pub mod event;
pub mod ids;
pub mod keymap;
pub mod led;
pub mod types;
pub mod xbox360;
pub mod xbox_one;

pub use decoder::{DecodeError, Decoder, ReportDecoder};
pub use event::{
    Control, Direction, Edge, InputEvent, KeyDirective, Stick, StickPosition, Trigger,
};
pub use ids::{
    PRODUCT_ONZA_TE, PRODUCT_XBOX_360, PRODUCT_XBOX_ONE, VENDOR_MICROSOFT, VENDOR_RAZER,
    identify, is_supported, product_name,
};
pub use keymap::KeyMap;
pub use led::{LedFrame, LedStep, PlayerSlot, SpinSequence};
pub use types::{DeviceFamily, DeviceModel};
pub use xbox_one::XboxOneDecoder;
pub use xbox360::Xbox360Decoder;
