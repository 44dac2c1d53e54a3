//! Device model descriptors.

use core::fmt;

/// USB direction bit for IN endpoint addresses.
pub const ENDPOINT_DIR_IN: u8 = 0x80;

/// Wire protocol family spoken by a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceFamily {
    /// Fixed 20-byte input reports, LED ring on the OUT endpoint.
    Xbox360,
    /// Tagged GIP-style reports; needs a start handshake before sending input.
    XboxOne,
}

impl DeviceFamily {
    pub fn name(self) -> &'static str {
        match self {
            DeviceFamily::Xbox360 => "Xbox 360",
            DeviceFamily::XboxOne => "Xbox One",
        }
    }

    /// Whether this family has the four-quadrant player LED ring.
    pub fn has_led_ring(self) -> bool {
        matches!(self, DeviceFamily::Xbox360)
    }
}

impl fmt::Display for DeviceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed USB layout of a supported controller.
///
/// Selected once per session from [`crate::identify`] and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceModel {
    /// `bConfigurationValue` to activate.
    pub config: u8,
    /// Interface number carrying the gamepad endpoints.
    pub interface: u8,
    /// Alternate setting of that interface.
    pub alt_setting: u8,
    /// IN endpoint number (without the direction bit).
    pub in_endpoint: u8,
    /// OUT endpoint number.
    pub out_endpoint: u8,
    pub family: DeviceFamily,
}

impl DeviceModel {
    /// IN endpoint address with the direction bit set.
    pub fn in_address(&self) -> u8 {
        self.in_endpoint | ENDPOINT_DIR_IN
    }

    /// OUT endpoint address.
    pub fn out_address(&self) -> u8 {
        self.out_endpoint & !ENDPOINT_DIR_IN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_addresses_carry_direction() {
        let model = DeviceModel {
            config: 1,
            interface: 0,
            alt_setting: 0,
            in_endpoint: 1,
            out_endpoint: 2,
            family: DeviceFamily::Xbox360,
        };
        assert_eq!(model.in_address(), 0x81);
        assert_eq!(model.out_address(), 0x02);
    }

    #[test]
    fn only_360_has_led_ring() {
        assert!(DeviceFamily::Xbox360.has_led_ring());
        assert!(!DeviceFamily::XboxOne.has_led_ring());
        assert_eq!(DeviceFamily::XboxOne.to_string(), "Xbox One");
    }
}
