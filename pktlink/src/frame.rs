//! Wire format constants and the shared framing state.
//!
//! A packet travels as `0x7E · stuffed(PAYLOAD · CRC_LO · CRC_HI) · 0x7E`.
//! Byte stuffing replaces each in-body occurrence of the delimiter or the
//! escape byte with `0x7D` followed by the byte XOR `0x20`:
//!
//! ```text
//! 0x7E  ->  0x7D 0x5E
//! 0x7D  ->  0x7D 0x5D
//! ```
//!
//! The two CRC trailer bytes are part of the body and are stuffed like any
//! other byte.

/// Frame boundary byte.
pub const DELIMITER: u8 = 0x7E;

/// Byte-stuffing prefix; the byte after it is XORed with [`ESCAPE_XOR`] on
/// decode.
pub const ESCAPE: u8 = 0x7D;

/// XOR mask applied to an escaped byte.
pub const ESCAPE_XOR: u8 = 0x20;

/// Length of the CRC trailer appended to the payload before stuffing.
pub const CRC_LEN: usize = 2;

/// Returns `true` for body bytes that must be escaped on the wire.
pub const fn needs_escape(byte: u8) -> bool {
    byte == DELIMITER || byte == ESCAPE
}

/// Position of a framing state machine within a frame.
///
/// Both directions share the same three states; completion is a transition
/// back to [`FrameState::Delimiter`], never a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameState {
    /// Between frames; the next interesting byte is a delimiter.
    #[default]
    Delimiter,
    /// Inside the body, on a plain byte.
    Byte,
    /// Inside the body, one half through an escape sequence.
    EncodedByte,
}
