//! Xbox 360 input report decoding (20-byte interrupt IN report).
//!
//! # Report layout
//! | Offset | Size | Field         | Encoding                              |
//! |--------|------|---------------|---------------------------------------|
//! | 0      | u8   | message type  | `0x00` for input                      |
//! | 1      | u8   | length        | `0x14`                                |
//! | 2      | u8   | buttons 1     | D-pad U/D/L/R, START, BACK, LS, RS    |
//! | 3      | u8   | buttons 2     | LB, RB, GUIDE, –, A, B, X, Y          |
//! | 4      | u8   | left trigger  | 0–255                                 |
//! | 5      | u8   | right trigger | 0–255                                 |
//! | 6–7    | i16  | left stick X  | low byte first                        |
//! | 8–9    | i16  | left stick Y  | low byte first, +Y is up              |
//! | 10–11  | i16  | right stick X |                                       |
//! | 12–13  | i16  | right stick Y |                                       |
//! | 14–19  |      | reserved      |                                       |
//!
//! Reads of any other length are partial or garbled transfers and are
//! rejected without touching decoder state.

use core::f64::consts::PI;

use crate::decoder::{DecodeError, ReportDecoder};
use crate::digital::{DigitalInput, diff_buttons};
use crate::event::{Control, Direction, InputEvent, Stick, StickPosition, Trigger};
use crate::types::DeviceFamily;

/// Exact length of a valid input report.
pub const REPORT_LEN: usize = 20;

/// Stick magnitudes strictly below this are treated as centered.
pub const STICK_DEADZONE: u32 = 10_240;

/// Boolean controls in bytes 2 and 3. Byte 3 bit 3 is unused.
pub const BUTTONS: [DigitalInput; 15] = [
    DigitalInput::new(Control::DpadUp, 2, 0),
    DigitalInput::new(Control::DpadDown, 2, 1),
    DigitalInput::new(Control::DpadLeft, 2, 2),
    DigitalInput::new(Control::DpadRight, 2, 3),
    DigitalInput::new(Control::Start, 2, 4),
    DigitalInput::new(Control::Back, 2, 5),
    DigitalInput::new(Control::LeftThumb, 2, 6),
    DigitalInput::new(Control::RightThumb, 2, 7),
    DigitalInput::new(Control::LeftShoulder, 3, 0),
    DigitalInput::new(Control::RightShoulder, 3, 1),
    DigitalInput::new(Control::Guide, 3, 2),
    DigitalInput::new(Control::A, 3, 4),
    DigitalInput::new(Control::B, 3, 5),
    DigitalInput::new(Control::X, 3, 6),
    DigitalInput::new(Control::Y, 3, 7),
];

/// Analog trigger byte offsets.
pub const TRIGGERS: [(Trigger, usize); 2] = [(Trigger::Left, 4), (Trigger::Right, 5)];

/// A signed 16-bit axis split across two report bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisInput {
    pub high: usize,
    pub low: usize,
}

impl AxisInput {
    pub const fn new(high: usize, low: usize) -> Self {
        Self { high, low }
    }

    /// Assemble `high:low` as a big-endian `i16`.
    pub fn read(&self, report: &[u8]) -> i16 {
        let hi = report.get(self.high).copied().unwrap_or(0);
        let lo = report.get(self.low).copied().unwrap_or(0);
        i16::from_be_bytes([hi, lo])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StickInput {
    pub stick: Stick,
    pub x: AxisInput,
    pub y: AxisInput,
}

pub const STICKS: [StickInput; 2] = [
    StickInput {
        stick: Stick::Left,
        x: AxisInput::new(7, 6),
        y: AxisInput::new(9, 8),
    },
    StickInput {
        stick: Stick::Right,
        x: AxisInput::new(11, 10),
        y: AxisInput::new(13, 12),
    },
];

//     +y
//      N
// -x W-|-E +x
//      S
//     -y
/// Polar form of a stick vector: compass octant and truncated Euclidean norm.
pub fn classify(x: i16, y: i16) -> (Direction, u32) {
    let (fx, fy) = (f64::from(x), f64::from(y));
    let card = (4.0 * fy.atan2(fx) / PI).round() as i32;
    let index = card.wrapping_add(4).rem_euclid(8) as usize;
    let direction = Direction::OCTANTS
        .get(index)
        .copied()
        .unwrap_or(Direction::W);
    let magnitude = (fx * fx + fy * fy).sqrt() as u32;
    (direction, magnitude)
}

/// Deadzone-filtered position of a stick vector.
pub fn stick_position(x: i16, y: i16) -> StickPosition {
    let (direction, magnitude) = classify(x, y);
    if magnitude < STICK_DEADZONE {
        StickPosition::Centered
    } else {
        StickPosition::Deflected {
            direction,
            magnitude,
        }
    }
}

/// Stateful decoder for one Xbox 360 controller session.
///
/// Keeps the last accepted report and diffs each new one against it.
#[derive(Debug, Clone)]
pub struct Xbox360Decoder {
    previous: [u8; REPORT_LEN],
    current: [u8; REPORT_LEN],
}

impl Default for Xbox360Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Xbox360Decoder {
    pub fn new() -> Self {
        Self {
            previous: [0; REPORT_LEN],
            current: [0; REPORT_LEN],
        }
    }

    /// The last successfully decoded report (all zeros before the first).
    pub fn previous(&self) -> &[u8; REPORT_LEN] {
        &self.previous
    }

    pub fn decode(&mut self, report: &[u8]) -> Result<Vec<InputEvent>, DecodeError> {
        if report.len() != REPORT_LEN {
            return Err(DecodeError::InvalidLength {
                expected: REPORT_LEN,
                actual: report.len(),
            });
        }
        self.current.copy_from_slice(report);

        let mut events = Vec::new();
        diff_buttons(&BUTTONS, &self.previous, &self.current, &mut events);
        diff_triggers(&self.previous, &self.current, &mut events);
        diff_sticks(&self.previous, &self.current, &mut events);

        core::mem::swap(&mut self.previous, &mut self.current);
        Ok(events)
    }
}

impl ReportDecoder for Xbox360Decoder {
    fn decode(&mut self, report: &[u8]) -> Result<Vec<InputEvent>, DecodeError> {
        Xbox360Decoder::decode(self, report)
    }

    fn family(&self) -> DeviceFamily {
        DeviceFamily::Xbox360
    }
}

fn diff_triggers(previous: &[u8], current: &[u8], events: &mut Vec<InputEvent>) {
    for (trigger, offset) in TRIGGERS {
        let (Some(&last), Some(&now)) = (previous.get(offset), current.get(offset)) else {
            continue;
        };
        if last != now {
            events.push(InputEvent::Trigger {
                trigger,
                value: u16::from(now),
            });
        }
    }
}

fn diff_sticks(previous: &[u8], current: &[u8], events: &mut Vec<InputEvent>) {
    for input in STICKS {
        let (now_dir, now_mag) = classify(input.x.read(current), input.y.read(current));
        let (last_dir, last_mag) = classify(input.x.read(previous), input.y.read(previous));

        let now_centered = now_mag < STICK_DEADZONE;
        let last_centered = last_mag < STICK_DEADZONE;
        if now_centered && last_centered {
            continue;
        }
        if now_dir == last_dir && now_mag == last_mag {
            continue;
        }

        let position = if now_centered {
            StickPosition::Centered
        } else {
            StickPosition::Deflected {
                direction: now_dir,
                magnitude: now_mag,
            }
        };
        events.push(InputEvent::Stick {
            stick: input.stick,
            position,
        });
    }
}
