//! Table-driven edge detection for packed button bits.

use crate::event::{Control, Edge, InputEvent};

/// Location of one boolean control inside a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigitalInput {
    pub control: Control,
    pub byte: usize,
    pub bit: u8,
}

impl DigitalInput {
    pub const fn new(control: Control, byte: usize, bit: u8) -> Self {
        Self { control, byte, bit }
    }

    /// Bit value in `report`; out-of-range offsets read as released.
    pub fn read(&self, report: &[u8]) -> bool {
        report
            .get(self.byte)
            .is_some_and(|b| b & (1u8 << (self.bit & 7)) != 0)
    }
}

/// Compare two latched booleans and return the edge, if any.
pub fn edge(previous: bool, current: bool) -> Option<Edge> {
    match (previous, current) {
        (false, true) => Some(Edge::Pressed),
        (true, false) => Some(Edge::Released),
        _ => None,
    }
}

/// Append one `Button` event per control whose bit differs between the two
/// reports, in table order.
pub fn diff_buttons(
    table: &[DigitalInput],
    previous: &[u8],
    current: &[u8],
    events: &mut Vec<InputEvent>,
) {
    for input in table {
        if let Some(edge) = edge(input.read(previous), input.read(current)) {
            events.push(InputEvent::Button {
                control: input.control,
                edge,
            });
        }
    }
}
