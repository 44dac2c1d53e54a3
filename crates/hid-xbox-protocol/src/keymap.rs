//! Control → key symbol table for the key-injection sink.

use std::collections::BTreeMap;

use crate::event::{Control, Edge, InputEvent, KeyDirective};

/// Default bindings. Right-stick pseudo-buttons deliberately reuse the
/// digits of the D-pad and thumb clicks.
pub const DEFAULT_BINDINGS: [(Control, u8); 24] = [
    (Control::Sync, b'8'),
    (Control::Reserved, b'7'),
    (Control::Menu, b'6'),
    (Control::View, b'5'),
    (Control::A, b' '),
    (Control::B, b'v'),
    (Control::X, b'z'),
    (Control::Y, b'x'),
    (Control::DpadUp, b'a'),
    (Control::DpadDown, b'q'),
    (Control::DpadLeft, b'1'),
    (Control::DpadRight, b'2'),
    (Control::LeftShoulder, b'g'),
    (Control::RightShoulder, b'c'),
    (Control::LeftThumb, b'3'),
    (Control::RightThumb, b'4'),
    (Control::LeftStickRight, b'l'),
    (Control::LeftStickLeft, b'h'),
    (Control::LeftStickUp, b'k'),
    (Control::LeftStickDown, b'j'),
    (Control::RightStickRight, b'1'),
    (Control::RightStickLeft, b'2'),
    (Control::RightStickUp, b'3'),
    (Control::RightStickDown, b'4'),
];

/// Which controls are forwarded, and as which key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    bindings: BTreeMap<Control, u8>,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            bindings: DEFAULT_BINDINGS.into_iter().collect(),
        }
    }
}

impl KeyMap {
    pub fn empty() -> Self {
        Self {
            bindings: BTreeMap::new(),
        }
    }

    pub fn bind(&mut self, control: Control, key: u8) -> &mut Self {
        self.bindings.insert(control, key);
        self
    }

    pub fn unbind(&mut self, control: Control) -> &mut Self {
        self.bindings.remove(&control);
        self
    }

    pub fn key(&self, control: Control) -> Option<u8> {
        self.bindings.get(&control).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// The directive to forward for `event`, if any. Only button edges on
    /// bound controls produce one.
    pub fn directive(&self, event: &InputEvent) -> Option<KeyDirective> {
        match *event {
            InputEvent::Button { control, edge } => self
                .key(control)
                .map(|key| KeyDirective { edge, key }),
            InputEvent::Trigger { .. } | InputEvent::Stick { .. } => None,
        }
    }
}

impl FromIterator<(Control, u8)> for KeyMap {
    fn from_iter<I: IntoIterator<Item = (Control, u8)>>(iter: I) -> Self {
        Self {
            bindings: iter.into_iter().collect(),
        }
    }
}

/// Convenience for the common pressed/released pair.
pub fn directive_for(control: Control, edge: Edge, keymap: &KeyMap) -> Option<KeyDirective> {
    keymap.directive(&InputEvent::Button { control, edge })
}
