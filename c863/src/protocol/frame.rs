//! C-863 ASCII command framing.
//!
//! ## Frame Format
//!
//! Every command is a single ASCII line addressed to one controller:
//!
//! ```text
//! +-------+---------+------------------+------+
//! | Start | Address |   Command text   | End  |
//! +-------+---------+------------------+------+
//! | 0x01  | 0x30    |  e.g. "MR5000"   | 0x0D |
//! +-------+---------+------------------+------+
//! ```
//!
//! Replies are ASCII text terminated by ETX (0x03) and/or CR (0x0D).

use crate::error::{Error, Result};

/// Start-of-heading byte opening every frame.
pub const START: u8 = 0x01;

/// Board address byte (`'0'`, the first controller on the line).
pub const ADDRESS: u8 = 0x30;

/// Carriage return closing every frame.
pub const END: u8 = 0x0D;

/// End-of-text marker the controller appends to replies.
pub const ETX: u8 = 0x03;

/// Framing overhead around the command text.
pub const FRAME_OVERHEAD: usize = 3;

/// A framed command ready to be written to the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Vec<u8>,
}

impl Frame {
    /// Frame `text` for the controller.
    ///
    /// The text must not contain the END byte, which would terminate the
    /// frame early on the device side.
    pub fn new(text: &str) -> Result<Self> {
        if text
            .as_bytes()
            .contains(&END)
        {
            return Err(Error::InvalidCommand(format!(
                "{text:?} contains a carriage return"
            )));
        }

        let mut bytes = Vec::with_capacity(text.len() + FRAME_OVERHEAD);
        bytes.push(START);
        bytes.push(ADDRESS);
        bytes.extend_from_slice(text.as_bytes());
        bytes.push(END);
        Ok(Self { bytes })
    }

    /// The command text inside the frame.
    pub fn text(&self) -> &str {
        // Built from a &str in `new`, so the payload is valid UTF-8.
        std::str::from_utf8(&self.bytes[2..self.bytes.len() - 1]).unwrap_or_default()
    }

    /// Raw frame bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Frame length in bytes.
    pub fn len(&self) -> usize {
        self.bytes
            .len()
    }

    /// Always false: a frame carries at least its framing bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes
            .is_empty()
    }
}

/// Strip reply terminators, keeping every other byte in order.
///
/// This is presentation filtering only; partial or garbled replies pass
/// through untouched.
pub fn filter_reply(raw: &[u8]) -> Vec<u8> {
    raw.iter()
        .copied()
        .filter(|&b| b != ETX && b != END)
        .collect()
}
