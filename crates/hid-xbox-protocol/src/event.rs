//! Transition events produced by the report decoders.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Every named digital control across both families, plus the synthetic
/// pseudo-buttons the Xbox One decoder derives from stick thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
    /// Xbox 360 START.
    Start,
    /// Xbox 360 BACK.
    Back,
    LeftThumb,
    RightThumb,
    LeftShoulder,
    RightShoulder,
    Guide,
    A,
    B,
    X,
    Y,
    /// Xbox One pairing button.
    Sync,
    /// Xbox One first button byte, bit 1. Never observed set.
    Reserved,
    /// Xbox One MENU (three lines).
    Menu,
    /// Xbox One VIEW (two squares).
    View,
    LeftStickRight,
    LeftStickLeft,
    LeftStickUp,
    LeftStickDown,
    RightStickRight,
    RightStickLeft,
    RightStickUp,
    RightStickDown,
}

impl Control {
    pub const ALL: [Control; 27] = [
        Control::DpadUp,
        Control::DpadDown,
        Control::DpadLeft,
        Control::DpadRight,
        Control::Start,
        Control::Back,
        Control::LeftThumb,
        Control::RightThumb,
        Control::LeftShoulder,
        Control::RightShoulder,
        Control::Guide,
        Control::A,
        Control::B,
        Control::X,
        Control::Y,
        Control::Sync,
        Control::Reserved,
        Control::Menu,
        Control::View,
        Control::LeftStickRight,
        Control::LeftStickLeft,
        Control::LeftStickUp,
        Control::LeftStickDown,
        Control::RightStickRight,
        Control::RightStickLeft,
        Control::RightStickUp,
        Control::RightStickDown,
    ];

    /// Stable snake_case name, identical to the serde representation.
    pub fn name(self) -> &'static str {
        match self {
            Control::DpadUp => "dpad_up",
            Control::DpadDown => "dpad_down",
            Control::DpadLeft => "dpad_left",
            Control::DpadRight => "dpad_right",
            Control::Start => "start",
            Control::Back => "back",
            Control::LeftThumb => "left_thumb",
            Control::RightThumb => "right_thumb",
            Control::LeftShoulder => "left_shoulder",
            Control::RightShoulder => "right_shoulder",
            Control::Guide => "guide",
            Control::A => "a",
            Control::B => "b",
            Control::X => "x",
            Control::Y => "y",
            Control::Sync => "sync",
            Control::Reserved => "reserved",
            Control::Menu => "menu",
            Control::View => "view",
            Control::LeftStickRight => "left_stick_right",
            Control::LeftStickLeft => "left_stick_left",
            Control::LeftStickUp => "left_stick_up",
            Control::LeftStickDown => "left_stick_down",
            Control::RightStickRight => "right_stick_right",
            Control::RightStickLeft => "right_stick_left",
            Control::RightStickUp => "right_stick_up",
            Control::RightStickDown => "right_stick_down",
        }
    }

    pub fn from_name(name: &str) -> Option<Control> {
        Control::ALL.into_iter().find(|c| c.name() == name)
    }

    /// True for the stick-threshold pseudo-buttons.
    pub fn is_synthetic(self) -> bool {
        matches!(
            self,
            Control::LeftStickRight
                | Control::LeftStickLeft
                | Control::LeftStickUp
                | Control::LeftStickDown
                | Control::RightStickRight
                | Control::RightStickLeft
                | Control::RightStickUp
                | Control::RightStickDown
        )
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Direction of a digital transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Pressed,
    Released,
}

impl Edge {
    /// Directive prefix byte: `d` for down, `u` for up.
    pub fn directive_byte(self) -> u8 {
        match self {
            Edge::Pressed => b'd',
            Edge::Released => b'u',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Left,
    Right,
}

impl Trigger {
    pub fn name(self) -> &'static str {
        match self {
            Trigger::Left => "LT",
            Trigger::Right => "RT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stick {
    Left,
    Right,
}

impl Stick {
    pub fn name(self) -> &'static str {
        match self {
            Stick::Left => "LS",
            Stick::Right => "RS",
        }
    }
}

/// Eight-way compass octant, +Y pointing north.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    W,
    SW,
    S,
    SE,
    E,
    NE,
    N,
    NW,
}

impl Direction {
    /// Octants in ascending angle order starting at -π.
    pub const OCTANTS: [Direction; 8] = [
        Direction::W,
        Direction::SW,
        Direction::S,
        Direction::SE,
        Direction::E,
        Direction::NE,
        Direction::N,
        Direction::NW,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Direction::W => "W",
            Direction::SW => "SW",
            Direction::S => "S",
            Direction::SE => "SE",
            Direction::E => "E",
            Direction::NE => "NE",
            Direction::N => "N",
            Direction::NW => "NW",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StickPosition {
    /// Inside the deadzone.
    Centered,
    Deflected { direction: Direction, magnitude: u32 },
}

/// One semantic change between two consecutive reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEvent {
    Button { control: Control, edge: Edge },
    Trigger { trigger: Trigger, value: u16 },
    Stick { stick: Stick, position: StickPosition },
}

impl InputEvent {
    pub fn pressed(control: Control) -> Self {
        InputEvent::Button {
            control,
            edge: Edge::Pressed,
        }
    }

    pub fn released(control: Control) -> Self {
        InputEvent::Button {
            control,
            edge: Edge::Released,
        }
    }
}

impl fmt::Display for InputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputEvent::Button {
                control,
                edge: Edge::Pressed,
            } => write!(f, "button {control} pressed"),
            InputEvent::Button {
                control,
                edge: Edge::Released,
            } => write!(f, "button {control} released"),
            InputEvent::Trigger { trigger, value } => {
                write!(f, "trigger {} = {value}", trigger.name())
            }
            InputEvent::Stick {
                stick,
                position: StickPosition::Centered,
            } => write!(f, "stick {} centered", stick.name()),
            InputEvent::Stick {
                stick,
                position:
                    StickPosition::Deflected {
                        direction,
                        magnitude,
                    },
            } => write!(f, "stick {} = {direction} x {magnitude}", stick.name()),
        }
    }
}

/// Two-byte key command understood by the downstream key injector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyDirective {
    pub edge: Edge,
    pub key: u8,
}

impl KeyDirective {
    pub const LEN: usize = 2;

    pub fn encode(self) -> [u8; Self::LEN] {
        [self.edge.directive_byte(), self.key]
    }
}
