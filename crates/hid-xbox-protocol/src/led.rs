//! Xbox 360 LED ring patterns and the player-assignment spin animation.
//!
//! The ring is driven with a 3-byte OUT message `01 03 <pattern>`. Patterns
//! are animations run by the controller firmware; the host only picks one.
//!
//! Source: Grumbel/xboxdrv `PROTOCOL`, "LED Control".

use core::time::Duration;

/// OUT message type for LED control.
pub const LED_MESSAGE_TYPE: u8 = 0x01;

/// Length byte of the LED message.
pub const LED_MESSAGE_LEN: u8 = 0x03;

/// How long the ring is held dark before the animation starts.
pub const BLANK_HOLD: Duration = Duration::from_secs(1);

/// How long the boot pattern is shown before spinning.
pub const BOOT_HOLD: Duration = Duration::from_millis(100);

/// First spin period.
pub const RAMP_START: Duration = Duration::from_millis(100);

/// Period decrease per ramp step.
pub const RAMP_STEP: Duration = Duration::from_millis(5);

/// The ramp runs while the period is strictly above this.
pub const RAMP_FLOOR: Duration = Duration::from_millis(20);

/// Maximum steps spun at the floor period while waiting for the target.
pub const TAIL_CAP: u32 = 40;

/// Ring pattern codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LedFrame {
    /// All off.
    Empty = 0x00,
    /// All blink briefly.
    WarnAll = 0x01,
    /// Quadrant 1 flashes, then stays on.
    NewPlayer1 = 0x02,
    NewPlayer2 = 0x03,
    NewPlayer3 = 0x04,
    NewPlayer4 = 0x05,
    /// Quadrant 1 solid.
    Player1 = 0x06,
    Player2 = 0x07,
    Player3 = 0x08,
    Player4 = 0x09,
    /// Rotating, waiting for a slot.
    Waiting = 0x0A,
    /// Blink the currently active quadrant.
    WarnPlayer = 0x0B,
    /// Off; no documented meaning.
    Blank = 0x0C,
    /// Alternating pattern shown on low battery.
    Battery = 0x0D,
    /// Slow blink.
    Searching = 0x0E,
    /// Solid, then blinking.
    Booting = 0x0F,
}

impl LedFrame {
    pub const ALL: [LedFrame; 16] = [
        LedFrame::Empty,
        LedFrame::WarnAll,
        LedFrame::NewPlayer1,
        LedFrame::NewPlayer2,
        LedFrame::NewPlayer3,
        LedFrame::NewPlayer4,
        LedFrame::Player1,
        LedFrame::Player2,
        LedFrame::Player3,
        LedFrame::Player4,
        LedFrame::Waiting,
        LedFrame::WarnPlayer,
        LedFrame::Blank,
        LedFrame::Battery,
        LedFrame::Searching,
        LedFrame::Booting,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        LedFrame::ALL.into_iter().find(|f| f.code() == code)
    }

    /// OUT message selecting this pattern.
    pub fn command(self) -> [u8; 3] {
        [LED_MESSAGE_TYPE, LED_MESSAGE_LEN, self.code()]
    }
}

/// One of the four controller slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerSlot {
    One,
    Two,
    Three,
    Four,
}

impl PlayerSlot {
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(PlayerSlot::One),
            2 => Some(PlayerSlot::Two),
            3 => Some(PlayerSlot::Three),
            4 => Some(PlayerSlot::Four),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            PlayerSlot::One => 1,
            PlayerSlot::Two => 2,
            PlayerSlot::Three => 3,
            PlayerSlot::Four => 4,
        }
    }

    /// Solid pattern for this slot.
    pub fn frame(self) -> LedFrame {
        match self {
            PlayerSlot::One => LedFrame::Player1,
            PlayerSlot::Two => LedFrame::Player2,
            PlayerSlot::Three => LedFrame::Player3,
            PlayerSlot::Four => LedFrame::Player4,
        }
    }
}

/// Spin order. The quadrants are physically laid out 1 2 / 3 4, so
/// 1 → 2 → 4 → 3 walks the ring clockwise.
pub const SPIN_ORDER: [LedFrame; 4] = [
    LedFrame::Player1,
    LedFrame::Player2,
    LedFrame::Player4,
    LedFrame::Player3,
];

/// Show `frame`, then wait `hold` before the next step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedStep {
    pub frame: LedFrame,
    pub hold: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Blank,
    Boot,
    Ramp,
    Tail { taken: u32 },
    Done,
}

/// The startup animation as a finite sequence of timed frames.
///
/// Dark, boot pattern, a spin that speeds up from 100 ms to the 20 ms floor,
/// then spinning at the floor until the target quadrant has been shown.
/// The tail is capped at [`TAIL_CAP`] steps; if the target is not part of
/// [`SPIN_ORDER`] the ring is left on whichever quadrant came last.
#[derive(Debug, Clone)]
pub struct SpinSequence {
    target: LedFrame,
    phase: Phase,
    index: usize,
    period: Duration,
}

impl SpinSequence {
    pub fn new(target: LedFrame) -> Self {
        Self {
            target,
            phase: Phase::Blank,
            index: 0,
            period: RAMP_START,
        }
    }

    pub fn for_player(slot: PlayerSlot) -> Self {
        Self::new(slot.frame())
    }

    pub fn target(&self) -> LedFrame {
        self.target
    }

    fn spin_frame(&mut self) -> LedFrame {
        let frame = SPIN_ORDER
            .get(self.index)
            .copied()
            .unwrap_or(LedFrame::Player1);
        self.index = self.index.wrapping_add(1) % SPIN_ORDER.len();
        frame
    }
}

impl Iterator for SpinSequence {
    type Item = LedStep;

    fn next(&mut self) -> Option<LedStep> {
        match self.phase {
            Phase::Blank => {
                self.phase = Phase::Boot;
                Some(LedStep {
                    frame: LedFrame::Empty,
                    hold: BLANK_HOLD,
                })
            }
            Phase::Boot => {
                self.phase = Phase::Ramp;
                Some(LedStep {
                    frame: LedFrame::Booting,
                    hold: BOOT_HOLD,
                })
            }
            Phase::Ramp if self.period > RAMP_FLOOR => {
                let step = LedStep {
                    frame: self.spin_frame(),
                    hold: self.period,
                };
                self.period = self.period.saturating_sub(RAMP_STEP);
                Some(step)
            }
            Phase::Ramp => {
                self.phase = Phase::Tail { taken: 0 };
                self.next()
            }
            Phase::Tail { taken } if taken < TAIL_CAP => {
                let frame = self.spin_frame();
                self.phase = if frame == self.target {
                    Phase::Done
                } else {
                    Phase::Tail {
                        taken: taken.saturating_add(1),
                    }
                };
                Some(LedStep {
                    frame,
                    hold: self.period,
                })
            }
            Phase::Tail { .. } | Phase::Done => {
                self.phase = Phase::Done;
                None
            }
        }
    }
}
