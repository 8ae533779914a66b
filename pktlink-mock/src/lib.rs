//! In-memory drivers implementing the `pktlink-interface` traits.
//!
//! Nothing here touches real hardware: a [`MockUart`] pair is two
//! cross-connected byte pipes, and [`MockCan`] endpoints broadcast frames
//! over a shared [`BusHandle`]. Tests typically move one endpoint's halves
//! into a link node and keep the peer endpoint to observe or inject raw
//! wire traffic.
//!
//! Both transports expose a controller ([`MockUart::controller`] /
//! [`MockCan::controller`]) that stays usable after the halves have been
//! moved into a node, to toggle transmit availability and exercise the
//! pump's gating.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};

use embedded_can::{Frame, Id};
use pktlink_interface::{RxByteIo, RxCanIo, SplitByteIo, SplitCanIo, TxByteIo, TxCanIo};

/// Errors produced by the mock drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockError {
    /// `try_recv` found nothing buffered.
    Empty,
    /// `try_send` was called while availability was switched off.
    Unavailable,
}

impl fmt::Display for MockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MockError::Empty => write!(f, "nothing to receive"),
            MockError::Unavailable => write!(f, "transmitter not available"),
        }
    }
}

impl std::error::Error for MockError {}

// ---------------------------------------------------------------------------
// UART
// ---------------------------------------------------------------------------

struct Pipe {
    queue: VecDeque<u8>,
    tx_available: bool,
}

impl Pipe {
    fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            tx_available: true,
        }
    }
}

type SharedPipe = Arc<Mutex<Pipe>>;

/// One endpoint of a cross-connected in-memory UART.
pub struct MockUart {
    outbound: SharedPipe,
    inbound: SharedPipe,
}

impl MockUart {
    /// Create two endpoints wired to each other: bytes sent on one side
    /// arrive on the other.
    pub fn pair() -> (MockUart, MockUart) {
        let ab = Arc::new(Mutex::new(Pipe::new()));
        let ba = Arc::new(Mutex::new(Pipe::new()));
        (
            MockUart {
                outbound: ab.clone(),
                inbound: ba.clone(),
            },
            MockUart {
                outbound: ba,
                inbound: ab,
            },
        )
    }

    /// Controller for this endpoint's transmit side; survives `split`.
    pub fn controller(&self) -> MockUartController {
        MockUartController {
            outbound: self.outbound.clone(),
        }
    }
}

impl SplitByteIo for MockUart {
    type Tx = MockUartTx;
    type Rx = MockUartRx;

    fn split(self) -> (MockUartTx, MockUartRx) {
        (
            MockUartTx {
                pipe: self.outbound,
            },
            MockUartRx { pipe: self.inbound },
        )
    }
}

/// Transmit half of a [`MockUart`] endpoint.
pub struct MockUartTx {
    pipe: SharedPipe,
}

impl TxByteIo for MockUartTx {
    type Error = MockError;

    fn tx_is_available(&mut self) -> bool {
        self.pipe.lock().unwrap().tx_available
    }

    fn try_send(&mut self, byte: u8) -> Result<(), MockError> {
        let mut pipe = self.pipe.lock().unwrap();
        if !pipe.tx_available {
            return Err(MockError::Unavailable);
        }
        pipe.queue.push_back(byte);
        Ok(())
    }
}

/// Receive half of a [`MockUart`] endpoint.
pub struct MockUartRx {
    pipe: SharedPipe,
}

impl RxByteIo for MockUartRx {
    type Error = MockError;

    fn rx_is_ready(&mut self) -> bool {
        !self.pipe.lock().unwrap().queue.is_empty()
    }

    fn try_recv(&mut self) -> Result<u8, MockError> {
        self.pipe
            .lock()
            .unwrap()
            .queue
            .pop_front()
            .ok_or(MockError::Empty)
    }
}

/// Out-of-band control over a [`MockUart`] endpoint's transmit side.
pub struct MockUartController {
    outbound: SharedPipe,
}

impl MockUartController {
    /// Toggle whether the endpoint's transmitter reports availability.
    pub fn set_tx_available(&self, available: bool) {
        self.outbound.lock().unwrap().tx_available = available;
    }

    /// Bytes currently sitting on the wire towards the peer.
    pub fn wire_len(&self) -> usize {
        self.outbound.lock().unwrap().queue.len()
    }
}

// ---------------------------------------------------------------------------
// CAN
// ---------------------------------------------------------------------------

/// A CAN frame held by the mock bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockFrame {
    id: Id,
    data: [u8; 8],
    dlc: usize,
    remote: bool,
}

impl Frame for MockFrame {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        if data.len() > 8 {
            return None;
        }
        let mut buf = [0u8; 8];
        buf[..data.len()].copy_from_slice(data);
        Some(Self {
            id: id.into(),
            data: buf,
            dlc: data.len(),
            remote: false,
        })
    }

    fn new_remote(id: impl Into<Id>, dlc: usize) -> Option<Self> {
        if dlc > 8 {
            return None;
        }
        Some(Self {
            id: id.into(),
            data: [0u8; 8],
            dlc,
            remote: true,
        })
    }

    fn is_extended(&self) -> bool {
        matches!(self.id, Id::Extended(_))
    }

    fn is_remote_frame(&self) -> bool {
        self.remote
    }

    fn id(&self) -> Id {
        self.id
    }

    fn dlc(&self) -> usize {
        self.dlc
    }

    fn data(&self) -> &[u8] {
        if self.remote {
            &[]
        } else {
            &self.data[..self.dlc]
        }
    }
}

struct BusNode {
    queue: VecDeque<MockFrame>,
    tx_available: bool,
}

struct BusInner {
    nodes: Vec<BusNode>,
}

/// Shared handle to an in-memory broadcast CAN bus.
#[derive(Clone)]
pub struct BusHandle {
    inner: Arc<Mutex<BusInner>>,
}

impl BusHandle {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(BusInner { nodes: Vec::new() })),
        }
    }
}

impl Default for BusHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// One endpoint attached to a [`BusHandle`].
///
/// A frame sent by one endpoint lands in every other endpoint's receive
/// queue; identifier filtering is left to the consumer.
pub struct MockCan {
    bus: Arc<Mutex<BusInner>>,
    index: usize,
}

impl MockCan {
    /// Attach a new endpoint to the bus.
    pub fn new_with_bus(bus: &BusHandle) -> MockCan {
        let mut inner = bus.inner.lock().unwrap();
        inner.nodes.push(BusNode {
            queue: VecDeque::new(),
            tx_available: true,
        });
        MockCan {
            bus: bus.inner.clone(),
            index: inner.nodes.len() - 1,
        }
    }

    /// Controller for this endpoint's transmit side; survives `split`.
    pub fn controller(&self) -> MockCanController {
        MockCanController {
            bus: self.bus.clone(),
            index: self.index,
        }
    }
}

impl SplitCanIo for MockCan {
    type Tx = MockCanTx;
    type Rx = MockCanRx;

    fn split(self) -> (MockCanTx, MockCanRx) {
        (
            MockCanTx {
                bus: self.bus.clone(),
                index: self.index,
            },
            MockCanRx {
                bus: self.bus,
                index: self.index,
            },
        )
    }
}

/// Transmit half of a [`MockCan`] endpoint.
pub struct MockCanTx {
    bus: Arc<Mutex<BusInner>>,
    index: usize,
}

impl TxCanIo for MockCanTx {
    type Frame = MockFrame;
    type Error = MockError;

    fn tx_is_available(&mut self) -> bool {
        self.bus.lock().unwrap().nodes[self.index].tx_available
    }

    fn try_send(&mut self, frame: &MockFrame) -> Result<(), MockError> {
        let mut inner = self.bus.lock().unwrap();
        if !inner.nodes[self.index].tx_available {
            return Err(MockError::Unavailable);
        }
        for (i, node) in inner.nodes.iter_mut().enumerate() {
            if i != self.index {
                node.queue.push_back(*frame);
            }
        }
        Ok(())
    }
}

/// Receive half of a [`MockCan`] endpoint.
pub struct MockCanRx {
    bus: Arc<Mutex<BusInner>>,
    index: usize,
}

impl RxCanIo for MockCanRx {
    type Frame = MockFrame;
    type Error = MockError;

    fn rx_is_ready(&mut self) -> bool {
        !self.bus.lock().unwrap().nodes[self.index].queue.is_empty()
    }

    fn try_recv(&mut self) -> Result<MockFrame, MockError> {
        self.bus.lock().unwrap().nodes[self.index]
            .queue
            .pop_front()
            .ok_or(MockError::Empty)
    }
}

/// Out-of-band control over a [`MockCan`] endpoint's transmit side.
pub struct MockCanController {
    bus: Arc<Mutex<BusInner>>,
    index: usize,
}

impl MockCanController {
    /// Toggle whether the endpoint's transmitter reports availability.
    pub fn set_tx_available(&self, available: bool) {
        self.bus.lock().unwrap().nodes[self.index].tx_available = available;
    }
}
