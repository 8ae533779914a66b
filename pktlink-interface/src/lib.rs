//! `pktlink-interface`: HAL-style I/O traits for the serial links `pktlink` runs over.
//!
//! This crate describes the *shape* of the hardware a packet-transfer node is
//! pumped against, without committing to a particular driver model. It sits
//! between:
//! - a concrete driver (a UART peripheral, SocketCAN, bxCAN, a simulator, …), and
//! - the framing layer in `pktlink`, which needs to push and pull wire bytes.
//!
//! Two granularities are covered:
//! - **Byte-oriented links** ([`TxByteIo`] / [`RxByteIo`]): the driver moves one
//!   byte per call. This is the natural fit for a UART data register or a
//!   single-byte FIFO.
//! - **Frame-oriented links** ([`TxCanIo`] / [`RxCanIo`]): the driver moves one
//!   CAN frame (up to 8 data bytes plus an identifier) per call.
//!
//! Transmit and receive are separate traits with independent borrowing, so a
//! split driver design (distinct TX and RX halves) integrates without locks.
//!
//! # Availability predicates
//!
//! Each direction carries a predicate (`tx_is_available` / `rx_is_ready`) next
//! to its data-moving operation. The framing layer is a non-blocking pump: per
//! tick it first asks the predicate, and only then calls `try_send`/`try_recv`.
//! A driver should therefore answer the predicate cheaply and honestly;
//! returning `true` and then failing the transfer is reported upstream as a
//! hardware error, not retried.
//!
//! # What this crate does not do
//! - ❌ Define an error model; `Error` stays driver-specific.
//! - ❌ Define a CAN frame type; implementations pick any
//!   [`embedded_can::Frame`].
//! - ❌ Provide timeouts or blocking operations; the consumer has no time base.

#![no_std]

pub use embedded_can::{ExtendedId, Frame, Id};

/// Transmit half of a byte-oriented link.
///
/// Implement this for a UART driver (or the TX half of one). The framing layer
/// hands over exactly one wire byte per successful call.
pub trait TxByteIo {
    /// Error returned by the driver implementation.
    type Error;

    /// Returns `true` when the driver can accept at least one byte right now.
    fn tx_is_available(&mut self) -> bool;

    /// Push one byte to the hardware without blocking.
    fn try_send(&mut self, byte: u8) -> Result<(), Self::Error>;
}

/// Receive half of a byte-oriented link.
pub trait RxByteIo {
    /// Error returned by the driver implementation.
    type Error;

    /// Returns `true` when at least one received byte is waiting to be read.
    fn rx_is_ready(&mut self) -> bool;

    /// Pull one received byte from the hardware without blocking.
    fn try_recv(&mut self) -> Result<u8, Self::Error>;
}

/// Transmit half of a frame-oriented (CAN) link.
///
/// The frame type is anything implementing [`embedded_can::Frame`]; the framing
/// layer builds frames through [`embedded_can::Frame::new`] and never inspects
/// them afterwards.
pub trait TxCanIo {
    /// The CAN frame type moved over this link.
    type Frame: Frame;
    /// Error returned by the driver implementation.
    type Error;

    /// Returns `true` when the driver can accept one full frame right now
    /// (e.g. a free TX mailbox).
    fn tx_is_available(&mut self) -> bool;

    /// Push one frame to the hardware without blocking.
    fn try_send(&mut self, frame: &Self::Frame) -> Result<(), Self::Error>;
}

/// Receive half of a frame-oriented (CAN) link.
///
/// Acceptance filtering may happen in hardware, in the driver, or not at all;
/// the framing layer filters by identifier itself, so an unfiltered driver is
/// fine.
pub trait RxCanIo {
    /// The CAN frame type moved over this link.
    type Frame: Frame;
    /// Error returned by the driver implementation.
    type Error;

    /// Returns `true` when at least one received frame is waiting to be read.
    fn rx_is_ready(&mut self) -> bool;

    /// Pull one received frame from the hardware without blocking.
    fn try_recv(&mut self) -> Result<Self::Frame, Self::Error>;
}

/// Split a byte-oriented driver into transmit and receive halves.
///
/// Usually implemented for a concrete driver type that internally owns shared
/// state, returning lightweight wrappers that can be moved independently.
pub trait SplitByteIo {
    /// Transmit half type; typically implements [`TxByteIo`].
    type Tx;
    /// Receive half type; typically implements [`RxByteIo`].
    type Rx;

    /// Split into `(Tx, Rx)` halves.
    fn split(self) -> (Self::Tx, Self::Rx);
}

/// Split a frame-oriented driver into transmit and receive halves.
pub trait SplitCanIo {
    /// Transmit half type; typically implements [`TxCanIo`].
    type Tx;
    /// Receive half type; typically implements [`RxCanIo`].
    type Rx;

    /// Split into `(Tx, Rx)` halves.
    fn split(self) -> (Self::Tx, Self::Rx);
}
