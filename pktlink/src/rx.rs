//! Receive-side framing: unstuffing, CRC validation, delivery.

use crate::crc::crc16;
use crate::frame::{CRC_LEN, DELIMITER, ESCAPE, ESCAPE_XOR, FrameState};

#[cfg(feature = "defmt")]
use defmt::debug;

#[cfg(not(feature = "defmt"))]
macro_rules! debug {
    ($($t:tt)*) => {};
}

/// Receive state machine over a caller-provided reassembly buffer.
///
/// Wire bytes go in one at a time through [`RxMachine::consume`]; whenever a
/// closing delimiter completes a frame whose CRC checks out, the payload is
/// handed to the delivery callback synchronously, borrowed from the
/// reassembly buffer. Malformed input (bad escape sequence, body larger than
/// the buffer, CRC mismatch) drops the frame in progress without any
/// upstream signal; the machine resynchronizes on the next delimiter.
pub struct RxMachine<'a> {
    buf: &'a mut [u8],
    state: FrameState,
    /// Body bytes accumulated for the frame in progress.
    size: usize,
    sof_count: u32,
    packets: u32,
}

impl<'a> RxMachine<'a> {
    /// Wrap a reassembly buffer. Capacity bounds the body (payload + CRC),
    /// so the longest deliverable payload is `buf.len() - 2`.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self {
            buf,
            state: FrameState::Delimiter,
            size: 0,
            sof_count: 0,
            packets: 0,
        }
    }

    /// Body bytes buffered for the frame in progress.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Start-of-frame delimiters observed since construction or
    /// [`RxMachine::reset`].
    pub fn sof_count(&self) -> u32 {
        self.sof_count
    }

    /// Frames delivered to the application.
    pub fn packets(&self) -> u32 {
        self.packets
    }

    /// Consume one wire byte, invoking `deliver` if it completes a valid
    /// frame.
    pub fn consume(&mut self, byte: u8, deliver: &mut dyn FnMut(&[u8])) {
        match self.state {
            FrameState::Delimiter => {
                if byte == DELIMITER {
                    self.sof_count = self.sof_count.saturating_add(1);
                    self.state = FrameState::Byte;
                }
                // Anything else is inter-frame noise.
            }
            FrameState::Byte => {
                if byte == ESCAPE {
                    self.state = FrameState::EncodedByte;
                } else if byte == DELIMITER {
                    self.close(deliver);
                } else if self.size == self.buf.len() {
                    debug!("rx frame dropped: body exceeds buffer");
                    self.drop_frame();
                } else {
                    self.buf[self.size] = byte;
                    self.size += 1;
                }
            }
            FrameState::EncodedByte => {
                let unescaped = byte ^ ESCAPE_XOR;
                if unescaped == DELIMITER || unescaped == ESCAPE {
                    self.push_unescaped(unescaped);
                } else {
                    debug!("rx frame dropped: invalid escape sequence");
                    self.drop_frame();
                }
            }
        }
    }

    /// Discard the frame in progress and return to the just-built state,
    /// keeping the counters.
    pub fn reset(&mut self) {
        self.drop_frame();
        self.sof_count = 0;
        self.packets = 0;
    }

    fn push_unescaped(&mut self, byte: u8) {
        if self.size == self.buf.len() {
            debug!("rx frame dropped: body exceeds buffer");
            self.drop_frame();
        } else {
            self.buf[self.size] = byte;
            self.size += 1;
            self.state = FrameState::Byte;
        }
    }

    fn drop_frame(&mut self) {
        self.size = 0;
        self.state = FrameState::Delimiter;
    }

    /// Closing delimiter seen: validate and deliver the buffered body.
    fn close(&mut self, deliver: &mut dyn FnMut(&[u8])) {
        let n = self.size;
        self.size = 0;
        self.state = FrameState::Delimiter;

        // Empty or CRC-only frames carry no payload.
        if n <= CRC_LEN {
            return;
        }
        let payload_len = n - CRC_LEN;
        let received = u16::from_le_bytes([self.buf[n - 2], self.buf[n - 1]]);
        if crc16(&self.buf[..payload_len]) == received {
            deliver(&self.buf[..payload_len]);
            self.packets = self.packets.saturating_add(1);
        } else {
            debug!("rx frame dropped: crc mismatch");
        }
    }
}
