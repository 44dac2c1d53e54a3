//! Shared decode capability and per-family dispatch.

use thiserror::Error;

use crate::event::InputEvent;
use crate::types::DeviceFamily;
use crate::xbox_one::XboxOneDecoder;
use crate::xbox360::Xbox360Decoder;

/// Reasons a report is rejected. Rejected reports never update decoder state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid report length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("report too short: got {actual} bytes, need {need}")]
    TooShort { actual: usize, need: usize },
}

/// Turns successive raw reports into transition events.
pub trait ReportDecoder {
    /// Decode one raw read, diffing against the last accepted report.
    fn decode(&mut self, report: &[u8]) -> Result<Vec<InputEvent>, DecodeError>;

    fn family(&self) -> DeviceFamily;
}

/// Decoder for whichever family the session's model speaks.
#[derive(Debug, Clone)]
pub enum Decoder {
    Xbox360(Xbox360Decoder),
    XboxOne(XboxOneDecoder),
}

impl Decoder {
    pub fn for_family(family: DeviceFamily) -> Self {
        match family {
            DeviceFamily::Xbox360 => Decoder::Xbox360(Xbox360Decoder::new()),
            DeviceFamily::XboxOne => Decoder::XboxOne(XboxOneDecoder::new()),
        }
    }
}

impl ReportDecoder for Decoder {
    fn decode(&mut self, report: &[u8]) -> Result<Vec<InputEvent>, DecodeError> {
        match self {
            Decoder::Xbox360(d) => d.decode(report),
            Decoder::XboxOne(d) => d.decode(report),
        }
    }

    fn family(&self) -> DeviceFamily {
        match self {
            Decoder::Xbox360(_) => DeviceFamily::Xbox360,
            Decoder::XboxOne(_) => DeviceFamily::XboxOne,
        }
    }
}
