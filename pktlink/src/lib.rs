//! `pktlink`: variable-length packet transfer over serial links with
//! HDLC-style framing.
//!
//! A node accepts an outbound payload, frames it (delimiter, byte-stuffed
//! body, CRC-16/X-25 trailer, delimiter) and feeds it to the hardware; and
//! consumes inbound wire bytes, unstuffs them, validates the CRC and hands
//! each reconstructed payload to a delivery callback. Two link granularities
//! are supported, and both can coexist in one build:
//! - [`UartLink`] moves one byte per hardware call
//!   ([`TxByteIo`] / [`RxByteIo`]).
//! - [`CanLink`] moves one CAN frame of up to 8 bytes per hardware call
//!   ([`TxCanIo`] / [`RxCanIo`]), with a 29-bit identifier per direction.
//!
//! The crate is built for bare-metal polling loops and cooperative tasks:
//! - **No heap, no statics.** Every node is a self-contained value over two
//!   caller-provided scratch buffers; its size is a compile-time constant,
//!   so it can live in static storage. Independent nodes can be driven from
//!   parallel threads without locks.
//! - **No time base.** There are no timeouts and no suspension points; every
//!   call runs to completion. A stalled partial frame simply waits for the
//!   next delimiter or for buffer exhaustion.
//! - **Non-blocking pump.** [`UartLink::task`] / [`CanLink::task`] perform
//!   at most one transmit step and one receive step, gated on the driver's
//!   availability predicates, and return immediately when neither holds.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use pktlink::{LinkConfig, UartLink};
//!
//! let cfg = LinkConfig { payload_max: 512 };
//! let mut buf_tx = [0u8; 514];
//! let mut buf_rx = [0u8; 514];
//! let mut link = UartLink::new(uart_tx, uart_rx, cfg, &mut buf_tx, &mut buf_rx)?;
//!
//! link.submit(b"hello")?;
//! loop {
//!     link.task(&mut |payload| handle(payload))?;
//! }
//! ```
//!
//! # Failure model
//!
//! [`UartLink::submit`]/[`CanLink::submit`] fail fast with
//! [`LinkError::TxOverflow`] on an oversized payload or while a prior frame
//! is in flight (submissions are FIFO of cardinality one). Wire-side
//! corruption is dropped silently by the decoder, observable only as a gap
//! between `sof_count` and `rx_packets` in [`LinkState`]. Hardware faults
//! reported by the driver traits are wrapped as
//! [`LinkError::TxHardware`] / [`LinkError::RxHardware`].

#![cfg_attr(not(feature = "std"), no_std)]

pub mod config;
pub mod crc;
pub mod errors;
pub mod frame;
pub mod rx;
pub mod tx;

pub use config::{LinkConfig, frame_buf_len};
pub use crc::crc16;
pub use errors::{ConfigError, LinkError, WIRE_CODE_OK};
pub use frame::FrameState;
pub use rx::RxMachine;
pub use tx::TxMachine;

pub use embedded_can::{ExtendedId, Id};
pub use pktlink_interface::{RxByteIo, RxCanIo, TxByteIo, TxCanIo};

use embedded_can::Frame;

/// Data bytes carried by one classic CAN frame.
const CAN_CHUNK_LEN: usize = 8;

/// Snapshot of a node's runtime state.
///
/// Counters are saturating and informational; `sof_count - rx_packets` is
/// the only trace wire-side corruption leaves behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkState {
    /// Body bytes (payload + CRC) loaded for transmission; `0` when idle.
    pub tx_size: usize,
    /// Body bytes already emitted for the in-flight frame.
    pub tx_sent: usize,
    /// Body bytes buffered for the frame being received.
    pub rx_size: usize,
    /// Start-of-frame delimiters observed.
    pub sof_count: u32,
    /// Frames delivered to the application.
    pub rx_packets: u32,
    /// Frames fully emitted to the hardware.
    pub tx_packets: u32,
}

/// Packet-transfer node over a byte-oriented (UART) link.
///
/// Generic over split transmit/receive driver halves sharing one error
/// type. All methods take `&mut self`; calls on one node must be externally
/// serialized, while distinct nodes share nothing.
pub struct UartLink<'a, Tx, Rx>
where
    Tx: TxByteIo,
    Rx: RxByteIo<Error = Tx::Error>,
{
    tx_io: Tx,
    rx_io: Rx,
    cfg: LinkConfig,
    tx: TxMachine<'a>,
    rx: RxMachine<'a>,
}

impl<'a, Tx, Rx> UartLink<'a, Tx, Rx>
where
    Tx: TxByteIo,
    Rx: RxByteIo<Error = Tx::Error>,
{
    /// Build a node over the driver halves and two caller-owned scratch
    /// buffers of at least [`LinkConfig::buf_len`] bytes each.
    pub fn new(
        tx_io: Tx,
        rx_io: Rx,
        cfg: LinkConfig,
        buf_tx: &'a mut [u8],
        buf_rx: &'a mut [u8],
    ) -> Result<Self, ConfigError> {
        let (buf_tx, buf_rx) = check_buffers(&cfg, buf_tx, buf_rx)?;
        Ok(Self {
            tx_io,
            rx_io,
            cfg,
            tx: TxMachine::new(buf_tx),
            rx: RxMachine::new(buf_rx),
        })
    }

    /// Stage `payload` for transmission.
    ///
    /// Fails with [`LinkError::TxOverflow`] when the payload exceeds
    /// `payload_max` or a prior submission has not fully left for the
    /// hardware yet; nothing is mutated in that case. The frame drains one
    /// byte per [`UartLink::task`] tick that finds the transmitter
    /// available.
    pub fn submit(&mut self, payload: &[u8]) -> Result<(), LinkError<Tx::Error>> {
        if payload.len() > self.cfg.payload_max || !self.tx.is_idle() {
            return Err(LinkError::TxOverflow);
        }
        self.tx.load(payload);
        Ok(())
    }

    /// Advance the link: at most one transmit step, then at most one
    /// receive step.
    ///
    /// `deliver` is invoked synchronously, on this call stack, for each
    /// frame whose closing delimiter arrives with a valid CRC; the slice it
    /// borrows is only valid for the duration of the call. The method
    /// returns immediately when the hardware is neither available nor
    /// ready.
    pub fn task(&mut self, deliver: &mut dyn FnMut(&[u8])) -> Result<(), LinkError<Tx::Error>> {
        if !self.tx.is_idle() && self.tx_io.tx_is_available() {
            if let Some(byte) = self.tx.next_byte() {
                self.tx_io.try_send(byte).map_err(LinkError::TxHardware)?;
            }
        }
        if self.rx_io.rx_is_ready() {
            let byte = self.rx_io.try_recv().map_err(LinkError::RxHardware)?;
            self.rx.consume(byte, deliver);
        }
        Ok(())
    }

    /// `true` when no submission is pending or in flight.
    pub fn is_tx_idle(&self) -> bool {
        self.tx.is_idle()
    }

    /// Copy out the runtime state.
    pub fn state(&self) -> LinkState {
        link_state(&self.tx, &self.rx)
    }

    /// The configuration this node was built with.
    pub fn config(&self) -> LinkConfig {
        self.cfg
    }

    /// Discard all runtime state: any frame in flight in either direction
    /// and all counters. Idempotent.
    pub fn reset(&mut self) {
        self.tx.reset();
        self.rx.reset();
    }
}

/// Packet-transfer node over a CAN link.
///
/// The framed byte stream is sliced into classic CAN frames of up to 8 data
/// bytes. Every frame belonging to one framed packet carries the 29-bit
/// identifier recorded at [`CanLink::submit`]; inbound frames are accepted
/// only under the identifier installed with [`CanLink::set_id_rx`].
pub struct CanLink<'a, Tx, Rx>
where
    Tx: TxCanIo,
    Rx: RxCanIo<Frame = Tx::Frame, Error = Tx::Error>,
{
    tx_io: Tx,
    rx_io: Rx,
    cfg: LinkConfig,
    tx: TxMachine<'a>,
    rx: RxMachine<'a>,
    id_tx: ExtendedId,
    id_rx: ExtendedId,
}

impl<'a, Tx, Rx> CanLink<'a, Tx, Rx>
where
    Tx: TxCanIo,
    Rx: RxCanIo<Frame = Tx::Frame, Error = Tx::Error>,
{
    /// Build a node over the driver halves and two caller-owned scratch
    /// buffers of at least [`LinkConfig::buf_len`] bytes each.
    ///
    /// Both identifiers start at zero; install the receive filter with
    /// [`CanLink::set_id_rx`], the transmit identifier travels with each
    /// [`CanLink::submit`].
    pub fn new(
        tx_io: Tx,
        rx_io: Rx,
        cfg: LinkConfig,
        buf_tx: &'a mut [u8],
        buf_rx: &'a mut [u8],
    ) -> Result<Self, ConfigError> {
        let (buf_tx, buf_rx) = check_buffers(&cfg, buf_tx, buf_rx)?;
        Ok(Self {
            tx_io,
            rx_io,
            cfg,
            tx: TxMachine::new(buf_tx),
            rx: RxMachine::new(buf_rx),
            id_tx: ExtendedId::ZERO,
            id_rx: ExtendedId::ZERO,
        })
    }

    /// Stage `payload` for transmission under `id`.
    ///
    /// Same admission rules as [`UartLink::submit`]. The identifier is
    /// recorded with the submission and stamped on every CAN frame the
    /// packet is sliced into.
    pub fn submit(&mut self, payload: &[u8], id: ExtendedId) -> Result<(), LinkError<Tx::Error>> {
        if payload.len() > self.cfg.payload_max || !self.tx.is_idle() {
            return Err(LinkError::TxOverflow);
        }
        self.tx.load(payload);
        self.id_tx = id;
        Ok(())
    }

    /// Install the identifier inbound frames must carry to be decoded.
    pub fn set_id_rx(&mut self, id: ExtendedId) {
        self.id_rx = id;
    }

    /// Identifier recorded by the most recent [`CanLink::submit`].
    pub fn id_tx(&self) -> ExtendedId {
        self.id_tx
    }

    /// Identifier inbound frames are accepted under.
    pub fn id_rx(&self) -> ExtendedId {
        self.id_rx
    }

    /// Advance the link: at most one transmit step (one outbound CAN
    /// frame), then at most one receive step (one inbound CAN frame).
    ///
    /// The transmit step drains the encoder into an 8-byte stage, stopping
    /// early when the packet is complete, and emits a single CAN frame of
    /// the accumulated length. The receive step reads one frame; if its
    /// identifier matches the installed filter, each data byte is fed to
    /// the decoder in order, so `deliver` fires within the tick that reads
    /// the closing delimiter.
    pub fn task(&mut self, deliver: &mut dyn FnMut(&[u8])) -> Result<(), LinkError<Tx::Error>> {
        if !self.tx.is_idle() && self.tx_io.tx_is_available() {
            let mut stage = [0u8; CAN_CHUNK_LEN];
            let mut staged = 0;
            while staged < stage.len() {
                match self.tx.next_byte() {
                    Some(byte) => {
                        stage[staged] = byte;
                        staged += 1;
                    }
                    None => break,
                }
            }
            let frame =
                Tx::Frame::new(self.id_tx, &stage[..staged]).ok_or(LinkError::Frame)?;
            self.tx_io.try_send(&frame).map_err(LinkError::TxHardware)?;
        }
        if self.rx_io.rx_is_ready() {
            let frame = self.rx_io.try_recv().map_err(LinkError::RxHardware)?;
            if frame.id() == Id::Extended(self.id_rx) {
                for &byte in frame.data() {
                    self.rx.consume(byte, deliver);
                }
            }
        }
        Ok(())
    }

    /// `true` when no submission is pending or in flight.
    pub fn is_tx_idle(&self) -> bool {
        self.tx.is_idle()
    }

    /// Copy out the runtime state.
    pub fn state(&self) -> LinkState {
        link_state(&self.tx, &self.rx)
    }

    /// The configuration this node was built with.
    pub fn config(&self) -> LinkConfig {
        self.cfg
    }

    /// Discard all runtime state: any frame in flight in either direction
    /// and all counters. Identifiers are kept. Idempotent.
    pub fn reset(&mut self) {
        self.tx.reset();
        self.rx.reset();
    }
}

fn check_buffers<'a>(
    cfg: &LinkConfig,
    buf_tx: &'a mut [u8],
    buf_rx: &'a mut [u8],
) -> Result<(&'a mut [u8], &'a mut [u8]), ConfigError> {
    cfg.validate()?;
    let needed = cfg.buf_len();
    if buf_tx.len() < needed {
        return Err(ConfigError::BufferTooSmall {
            needed,
            got: buf_tx.len(),
        });
    }
    if buf_rx.len() < needed {
        return Err(ConfigError::BufferTooSmall {
            needed,
            got: buf_rx.len(),
        });
    }
    // Slice down so machine capacity equals the configured bound exactly.
    Ok((&mut buf_tx[..needed], &mut buf_rx[..needed]))
}

fn link_state(tx: &TxMachine<'_>, rx: &RxMachine<'_>) -> LinkState {
    LinkState {
        tx_size: tx.size(),
        tx_sent: tx.sent(),
        rx_size: rx.size(),
        sof_count: rx.sof_count(),
        rx_packets: rx.packets(),
        tx_packets: tx.packets(),
    }
}
