//! Xbox One input decoding (tagged interrupt IN packets).
//!
//! Every packet starts with a two byte header: a message tag and a
//! secondary code. Only two tags carry gamepad state:
//!
//! | Tag    | Payload | Meaning                                   |
//! |--------|---------|-------------------------------------------|
//! | `0x07` | 4       | status; payload byte 2 bit 0 = Guide held |
//! | `0x20` | 16      | input report (layout below)               |
//!
//! Anything else (announce, heartbeat, ...) is ignored.
//!
//! # Input payload layout
//! | Offset | Size | Field         | Encoding                              |
//! |--------|------|---------------|---------------------------------------|
//! | 0      | u8   | sequence      | ignored                               |
//! | 1      | u8   | reserved      | ignored                               |
//! | 2      | u8   | buttons 1     | `yxbaVM?S` (S = sync, M = menu, V = view) |
//! | 3      | u8   | buttons 2     | `RLrlRLDU` thumbs, shoulders, D-pad   |
//! | 4–5    | u16  | left trigger  | LE, 0–1023                            |
//! | 6–7    | u16  | right trigger | LE                                    |
//! | 8–9    | i16  | left stick X  | LE                                    |
//! | 10–11  | i16  | left stick Y  | LE, +Y is up                          |
//! | 12–13  | i16  | right stick X | LE                                    |
//! | 14–15  | i16  | right stick Y | LE                                    |
//!
//! The controller stays silent until it receives [`START_COMMAND`].
//!
//! Unlike the Xbox 360 decoder, sticks are not classified into compass
//! octants. Each axis is thresholded on its own into two pseudo-buttons
//! that press and release like real buttons.

use crate::decoder::{DecodeError, ReportDecoder};
use crate::digital::{DigitalInput, diff_buttons, edge};
use crate::event::{Control, InputEvent, Trigger};
use crate::types::DeviceFamily;

/// Header bytes preceding every payload.
pub const HEADER_LEN: usize = 2;

/// Status message tag.
pub const TAG_STATUS: u8 = 0x07;

/// Input report tag.
pub const TAG_INPUT: u8 = 0x20;

pub const STATUS_PAYLOAD_LEN: usize = 4;

pub const INPUT_PAYLOAD_LEN: usize = 16;

/// Handshake that switches the controller into input-reporting mode.
pub const START_COMMAND: [u8; 2] = [0x05, 0x20];

/// Magnitude an axis must exceed to latch its pseudo-button.
pub const AXIS_THRESHOLD: i16 = 16_384;

/// Button bits, offsets relative to the input payload.
pub const BUTTONS: [DigitalInput; 16] = [
    DigitalInput::new(Control::Sync, 2, 0),
    DigitalInput::new(Control::Reserved, 2, 1),
    DigitalInput::new(Control::Menu, 2, 2),
    DigitalInput::new(Control::View, 2, 3),
    DigitalInput::new(Control::A, 2, 4),
    DigitalInput::new(Control::B, 2, 5),
    DigitalInput::new(Control::X, 2, 6),
    DigitalInput::new(Control::Y, 2, 7),
    DigitalInput::new(Control::DpadUp, 3, 0),
    DigitalInput::new(Control::DpadDown, 3, 1),
    DigitalInput::new(Control::DpadLeft, 3, 2),
    DigitalInput::new(Control::DpadRight, 3, 3),
    DigitalInput::new(Control::LeftShoulder, 3, 4),
    DigitalInput::new(Control::RightShoulder, 3, 5),
    DigitalInput::new(Control::LeftThumb, 3, 6),
    DigitalInput::new(Control::RightThumb, 3, 7),
];

/// One stick axis and the pseudo-buttons derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisThreshold {
    pub name: &'static str,
    /// Payload offset of the little-endian `i16`.
    pub offset: usize,
    /// Latched while the axis is above `+AXIS_THRESHOLD`.
    pub positive: Control,
    /// Latched while the axis is below `-AXIS_THRESHOLD`.
    pub negative: Control,
}

pub const AXES: [AxisThreshold; 4] = [
    AxisThreshold {
        name: "L_X-AXIS",
        offset: 8,
        positive: Control::LeftStickRight,
        negative: Control::LeftStickLeft,
    },
    AxisThreshold {
        name: "L_Y-AXIS",
        offset: 10,
        positive: Control::LeftStickUp,
        negative: Control::LeftStickDown,
    },
    AxisThreshold {
        name: "R_X-AXIS",
        offset: 12,
        positive: Control::RightStickRight,
        negative: Control::RightStickLeft,
    },
    AxisThreshold {
        name: "R_Y-AXIS",
        offset: 14,
        positive: Control::RightStickUp,
        negative: Control::RightStickDown,
    },
];

/// A report split into header and payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet<'a> {
    pub tag: u8,
    pub code: u8,
    pub payload: &'a [u8],
}

impl<'a> Packet<'a> {
    pub fn split(report: &'a [u8]) -> Result<Self, DecodeError> {
        match report {
            [tag, code, payload @ ..] => Ok(Self {
                tag: *tag,
                code: *code,
                payload,
            }),
            _ => Err(DecodeError::TooShort {
                actual: report.len(),
                need: HEADER_LEN,
            }),
        }
    }
}

/// Parsed `0x20` input payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XboxOneInputReport {
    pub sequence: u8,
    pub buttons: [u8; 2],
    pub left_trigger: u16,
    pub right_trigger: u16,
    /// LX, LY, RX, RY in [`AXES`] order.
    pub axes: [i16; 4],
}

impl XboxOneInputReport {
    pub fn parse(payload: &[u8]) -> Result<Self, DecodeError> {
        let raw: &[u8; INPUT_PAYLOAD_LEN] =
            payload
                .try_into()
                .map_err(|_mismatch| DecodeError::InvalidLength {
                    expected: INPUT_PAYLOAD_LEN,
                    actual: payload.len(),
                })?;
        let le16 = |lo: usize| -> [u8; 2] {
            [
                raw.get(lo).copied().unwrap_or(0),
                raw.get(lo.wrapping_add(1)).copied().unwrap_or(0),
            ]
        };
        Ok(Self {
            sequence: raw[0],
            buttons: [raw[2], raw[3]],
            left_trigger: u16::from_le_bytes(le16(4)),
            right_trigger: u16::from_le_bytes(le16(6)),
            axes: AXES.map(|axis| i16::from_le_bytes(le16(axis.offset))),
        })
    }
}

/// Latched state of one axis' two pseudo-buttons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxisLatch {
    pub positive: bool,
    pub negative: bool,
}

impl AxisLatch {
    pub fn from_value(value: i16) -> Self {
        Self {
            positive: value > AXIS_THRESHOLD,
            negative: value < -AXIS_THRESHOLD,
        }
    }
}

/// Pseudo-button state for all four axes, carried across decode calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxisLatches(pub [AxisLatch; 4]);

impl AxisLatches {
    /// Packed form: axis `i` positive at bit `2i`, negative at bit `2i + 1`.
    pub fn bits(&self) -> u8 {
        self.0.iter().enumerate().fold(0u8, |acc, (i, latch)| {
            let shift = (i as u32).wrapping_mul(2);
            acc | (u8::from(latch.positive) << shift) | (u8::from(latch.negative) << (shift + 1))
        })
    }
}

/// Stateful decoder for one Xbox One controller session.
#[derive(Debug, Clone, Default)]
pub struct XboxOneDecoder {
    last: [u8; INPUT_PAYLOAD_LEN],
    latches: AxisLatches,
}

impl XboxOneDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payload of the last accepted input report.
    pub fn last_payload(&self) -> &[u8; INPUT_PAYLOAD_LEN] {
        &self.last
    }

    pub fn latches(&self) -> AxisLatches {
        self.latches
    }

    pub fn decode(&mut self, report: &[u8]) -> Result<Vec<InputEvent>, DecodeError> {
        let packet = Packet::split(report)?;
        match packet.tag {
            TAG_STATUS => decode_status(packet.payload),
            TAG_INPUT => self.decode_input(packet.payload),
            _ => Ok(Vec::new()),
        }
    }

    fn decode_input(&mut self, payload: &[u8]) -> Result<Vec<InputEvent>, DecodeError> {
        let report = XboxOneInputReport::parse(payload)?;
        let mut events = Vec::new();

        diff_buttons(&BUTTONS, &self.last, payload, &mut events);

        if report.left_trigger > 0 || report.right_trigger > 0 {
            events.push(InputEvent::Trigger {
                trigger: Trigger::Left,
                value: report.left_trigger,
            });
            events.push(InputEvent::Trigger {
                trigger: Trigger::Right,
                value: report.right_trigger,
            });
        }

        let mut latches = AxisLatches::default();
        for ((axis, value), (last, next)) in AXES
            .iter()
            .zip(report.axes)
            .zip(self.latches.0.iter().zip(latches.0.iter_mut()))
        {
            *next = AxisLatch::from_value(value);
            if let Some(edge) = edge(last.positive, next.positive) {
                events.push(InputEvent::Button {
                    control: axis.positive,
                    edge,
                });
            }
            if let Some(edge) = edge(last.negative, next.negative) {
                events.push(InputEvent::Button {
                    control: axis.negative,
                    edge,
                });
            }
        }

        self.latches = latches;
        self.last.copy_from_slice(payload);
        Ok(events)
    }
}

impl ReportDecoder for XboxOneDecoder {
    fn decode(&mut self, report: &[u8]) -> Result<Vec<InputEvent>, DecodeError> {
        XboxOneDecoder::decode(self, report)
    }

    fn family(&self) -> DeviceFamily {
        DeviceFamily::XboxOne
    }
}

// The status message only tells us the Guide button is down. No release is
// ever reported, so none is synthesized.
fn decode_status(payload: &[u8]) -> Result<Vec<InputEvent>, DecodeError> {
    if payload.len() != STATUS_PAYLOAD_LEN {
        return Err(DecodeError::InvalidLength {
            expected: STATUS_PAYLOAD_LEN,
            actual: payload.len(),
        });
    }
    let guide = payload.get(2).is_some_and(|b| b & 0x01 != 0);
    Ok(if guide {
        vec![InputEvent::pressed(Control::Guide)]
    } else {
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(payload: [u8; INPUT_PAYLOAD_LEN]) -> Vec<u8> {
        let mut report = vec![TAG_INPUT, 0x00];
        report.extend_from_slice(&payload);
        report
    }

    fn with_axis(mut payload: [u8; INPUT_PAYLOAD_LEN], offset: usize, value: i16) -> [u8; 16] {
        let [lo, hi] = value.to_le_bytes();
        payload[offset] = lo;
        payload[offset + 1] = hi;
        payload
    }

    #[test]
    fn header_too_short() {
        let mut decoder = XboxOneDecoder::new();
        assert_eq!(
            decoder.decode(&[TAG_INPUT]),
            Err(DecodeError::TooShort { actual: 1, need: 2 })
        );
    }

    #[test]
    fn unknown_tag_ignored() -> Result<(), DecodeError> {
        let mut decoder = XboxOneDecoder::new();
        assert!(decoder.decode(&[0x03, 0x20, 0x00, 0x01])?.is_empty());
        Ok(())
    }

    #[test]
    fn a_button_press_release() -> Result<(), DecodeError> {
        let mut decoder = XboxOneDecoder::new();
        let mut payload = [0u8; INPUT_PAYLOAD_LEN];
        payload[2] = 0x10;
        assert_eq!(
            decoder.decode(&input(payload))?,
            vec![InputEvent::pressed(Control::A)]
        );
        payload[2] = 0x00;
        assert_eq!(
            decoder.decode(&input(payload))?,
            vec![InputEvent::released(Control::A)]
        );
        Ok(())
    }

    #[test]
    fn dpad_in_second_byte() -> Result<(), DecodeError> {
        let mut decoder = XboxOneDecoder::new();
        let mut payload = [0u8; INPUT_PAYLOAD_LEN];
        payload[3] = 0x09;
        assert_eq!(
            decoder.decode(&input(payload))?,
            vec![
                InputEvent::pressed(Control::DpadUp),
                InputEvent::pressed(Control::DpadRight)
            ]
        );
        Ok(())
    }

    #[test]
    fn axis_latch_holds_across_frames() -> Result<(), DecodeError> {
        let mut decoder = XboxOneDecoder::new();
        let payload = with_axis([0u8; INPUT_PAYLOAD_LEN], 8, 20_000);
        assert_eq!(
            decoder.decode(&input(payload))?,
            vec![InputEvent::pressed(Control::LeftStickRight)]
        );
        assert!(decoder.decode(&input(payload))?.is_empty());
        assert_eq!(decoder.latches().bits(), 0b0000_0001);
        Ok(())
    }

    #[test]
    fn axis_swing_releases_then_presses_opposite() -> Result<(), DecodeError> {
        let mut decoder = XboxOneDecoder::new();
        let up = with_axis([0u8; INPUT_PAYLOAD_LEN], 14, 30_000);
        decoder.decode(&input(up))?;
        let down = with_axis([0u8; INPUT_PAYLOAD_LEN], 14, -30_000);
        assert_eq!(
            decoder.decode(&input(down))?,
            vec![
                InputEvent::released(Control::RightStickUp),
                InputEvent::pressed(Control::RightStickDown)
            ]
        );
        assert_eq!(decoder.latches().bits(), 0b1000_0000);
        Ok(())
    }

    #[test]
    fn right_stick_horizontal_pseudo_buttons() -> Result<(), DecodeError> {
        let mut decoder = XboxOneDecoder::new();
        let right = with_axis([0u8; INPUT_PAYLOAD_LEN], 12, 20_000);
        assert_eq!(
            decoder.decode(&input(right))?,
            vec![InputEvent::pressed(Control::RightStickRight)]
        );
        assert_eq!(decoder.latches().bits(), 0b0001_0000);
        let left = with_axis([0u8; INPUT_PAYLOAD_LEN], 12, -20_000);
        assert_eq!(
            decoder.decode(&input(left))?,
            vec![
                InputEvent::released(Control::RightStickRight),
                InputEvent::pressed(Control::RightStickLeft)
            ]
        );
        assert_eq!(decoder.latches().bits(), 0b0010_0000);
        Ok(())
    }

    #[test]
    fn threshold_is_exclusive() -> Result<(), DecodeError> {
        let mut decoder = XboxOneDecoder::new();
        let at = with_axis([0u8; INPUT_PAYLOAD_LEN], 10, AXIS_THRESHOLD);
        assert!(decoder.decode(&input(at))?.is_empty());
        let neg = with_axis([0u8; INPUT_PAYLOAD_LEN], 10, -AXIS_THRESHOLD);
        assert!(decoder.decode(&input(neg))?.is_empty());
        Ok(())
    }

    #[test]
    fn triggers_reported_while_nonzero() -> Result<(), DecodeError> {
        let mut decoder = XboxOneDecoder::new();
        let mut payload = [0u8; INPUT_PAYLOAD_LEN];
        payload[6] = 0x00;
        payload[7] = 0x02;
        let expected = vec![
            InputEvent::Trigger {
                trigger: Trigger::Left,
                value: 0,
            },
            InputEvent::Trigger {
                trigger: Trigger::Right,
                value: 512,
            },
        ];
        assert_eq!(decoder.decode(&input(payload))?, expected);
        assert_eq!(decoder.decode(&input(payload))?, expected);
        assert!(decoder.decode(&input([0u8; INPUT_PAYLOAD_LEN]))?.is_empty());
        Ok(())
    }

    #[test]
    fn short_payload_rejected_without_state_change() -> Result<(), DecodeError> {
        let mut decoder = XboxOneDecoder::new();
        let mut payload = [0u8; INPUT_PAYLOAD_LEN];
        payload[2] = 0x20;
        decoder.decode(&input(payload))?;

        let mut truncated = vec![TAG_INPUT, 0x00];
        truncated.extend_from_slice(&[0u8; 10]);
        assert_eq!(
            decoder.decode(&truncated),
            Err(DecodeError::InvalidLength {
                expected: 16,
                actual: 10
            })
        );
        assert_eq!(decoder.last_payload()[2], 0x20);
        Ok(())
    }

    #[test]
    fn guide_status_has_no_release() -> Result<(), DecodeError> {
        let mut decoder = XboxOneDecoder::new();
        let held = [TAG_STATUS, 0x20, 0x00, 0x00, 0x01, 0x5B];
        let up = [TAG_STATUS, 0x20, 0x00, 0x00, 0x00, 0x5B];
        assert_eq!(
            decoder.decode(&held)?,
            vec![InputEvent::pressed(Control::Guide)]
        );
        assert_eq!(
            decoder.decode(&held)?,
            vec![InputEvent::pressed(Control::Guide)]
        );
        assert!(decoder.decode(&up)?.is_empty());
        Ok(())
    }

    #[test]
    fn status_with_wrong_length() {
        let mut decoder = XboxOneDecoder::new();
        assert_eq!(
            decoder.decode(&[TAG_STATUS, 0x20, 0x01]),
            Err(DecodeError::InvalidLength {
                expected: 4,
                actual: 1
            })
        );
    }

    #[test]
    fn parse_fields() -> Result<(), DecodeError> {
        let mut payload = [0u8; INPUT_PAYLOAD_LEN];
        payload[0] = 7;
        payload[4] = 0xFF;
        payload[5] = 0x03;
        let payload = with_axis(payload, 12, -1234);
        let report = XboxOneInputReport::parse(&payload)?;
        assert_eq!(report.sequence, 7);
        assert_eq!(report.left_trigger, 1023);
        assert_eq!(report.axes, [0, 0, -1234, 0]);
        Ok(())
    }
}
