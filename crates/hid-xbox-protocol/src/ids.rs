//! USB vendor/product IDs and the model registry.
//!
//! Three wired controllers are supported. Two are Microsoft first-party
//! pads; the third is a Razer clone that speaks the Xbox 360 wire format
//! but exposes its OUT endpoint at a different address.
//!
//! | VID:PID     | Product                    | Family   | OUT ep |
//! |-------------|----------------------------|----------|--------|
//! | `045e:028e` | Xbox 360 Controller        | Xbox 360 | 1      |
//! | `045e:02d1` | Xbox One Controller        | Xbox One | 1      |
//! | `1689:fd00` | Razer Onza Tournament      | Xbox 360 | 2      |
//!
//! All three enumerate a single configuration (value 1) with the gamepad on
//! vendor-specific interface 0, alternate setting 0, interrupt IN endpoint 1.
//!
//! Sources:
//! - Linux kernel `drivers/input/joystick/xpad.c` device table
//! - Grumbel/xboxdrv `PROTOCOL` notes
//! - `lsusb -v` captures of each device

use crate::types::{DeviceFamily, DeviceModel};

/// Microsoft Corp. USB Vendor ID.
pub const VENDOR_MICROSOFT: u16 = 0x045E;

/// Razer USA Ltd. USB Vendor ID (as used by the Onza line).
pub const VENDOR_RAZER: u16 = 0x1689;

/// Wired Xbox 360 controller.
pub const PRODUCT_XBOX_360: u16 = 0x028E;

/// Xbox One controller (first revision).
pub const PRODUCT_XBOX_ONE: u16 = 0x02D1;

/// Razer Onza Tournament Edition.
pub const PRODUCT_ONZA_TE: u16 = 0xFD00;

const XBOX_360: DeviceModel = DeviceModel {
    config: 1,
    interface: 0,
    alt_setting: 0,
    in_endpoint: 1,
    out_endpoint: 1,
    family: DeviceFamily::Xbox360,
};

const XBOX_ONE: DeviceModel = DeviceModel {
    config: 1,
    interface: 0,
    alt_setting: 0,
    in_endpoint: 1,
    out_endpoint: 1,
    family: DeviceFamily::XboxOne,
};

// The Onza places its OUT interrupt endpoint at address 2 on interface 0.
const ONZA_TE: DeviceModel = DeviceModel {
    config: 1,
    interface: 0,
    alt_setting: 0,
    in_endpoint: 1,
    out_endpoint: 2,
    family: DeviceFamily::Xbox360,
};

/// Map a USB identity to its fixed wire layout.
///
/// Returns `None` for anything unknown; callers skip those candidates and
/// keep scanning.
pub fn identify(vendor_id: u16, product_id: u16) -> Option<DeviceModel> {
    match (vendor_id, product_id) {
        (VENDOR_MICROSOFT, PRODUCT_XBOX_360) => Some(XBOX_360),
        (VENDOR_MICROSOFT, PRODUCT_XBOX_ONE) => Some(XBOX_ONE),
        (VENDOR_RAZER, PRODUCT_ONZA_TE) => Some(ONZA_TE),
        _ => None,
    }
}

/// Returns `true` if the VID/PID pair is one of the supported controllers.
pub fn is_supported(vendor_id: u16, product_id: u16) -> bool {
    identify(vendor_id, product_id).is_some()
}

/// Human-readable product name for a supported identity.
pub fn product_name(vendor_id: u16, product_id: u16) -> Option<&'static str> {
    match (vendor_id, product_id) {
        (VENDOR_MICROSOFT, PRODUCT_XBOX_360) => Some("Microsoft Xbox 360 Controller"),
        (VENDOR_MICROSOFT, PRODUCT_XBOX_ONE) => Some("Microsoft Xbox One Controller"),
        (VENDOR_RAZER, PRODUCT_ONZA_TE) => Some("Razer Onza Tournament Edition"),
        _ => None,
    }
}
