//! Link-layer error types and their stable wire codes.

/// Numeric code reported for success in the shared return-code namespace.
///
/// The codes are stable across adapters and languages: success sits at the
/// base value and the [`LinkError`] variants follow sequentially (see
/// [`LinkError::wire_code`]).
pub const WIRE_CODE_OK: u16 = 1024;

/// Errors surfaced by a packet-transfer node.
///
/// Only `TxOverflow` and the hardware/frame wrappers are produced by this
/// crate; `RxOverflow`, `NoConnection` and `Crc` are reserved for external
/// hardware adapters that choose to surface such conditions, and exist so
/// the numeric namespace stays closed. Wire-side corruption never raises an
/// error here: the decoder drops the frame silently and resynchronizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError<E> {
    /// `submit` rejected the payload: longer than `payload_max`, or a prior
    /// submission is still in flight. No state was mutated.
    TxOverflow,
    /// Reserved for adapters: receive-side storage exhausted.
    RxOverflow,
    /// The transmit driver failed after advertising availability.
    TxHardware(E),
    /// The receive driver failed after advertising readiness.
    RxHardware(E),
    /// Reserved for adapters: the peer or bus is absent.
    NoConnection,
    /// Reserved for adapters: checksum failure observed outside the framing
    /// layer.
    Crc,
    /// A wire frame could not be constructed for the staged bytes.
    Frame,
}

impl<E> LinkError<E> {
    /// Stable numeric form of this error, sequential from [`WIRE_CODE_OK`].
    pub fn wire_code(&self) -> u16 {
        match self {
            LinkError::TxOverflow => WIRE_CODE_OK + 1,
            LinkError::RxOverflow => WIRE_CODE_OK + 2,
            LinkError::TxHardware(_) => WIRE_CODE_OK + 3,
            LinkError::RxHardware(_) => WIRE_CODE_OK + 4,
            LinkError::NoConnection => WIRE_CODE_OK + 5,
            LinkError::Crc => WIRE_CODE_OK + 6,
            LinkError::Frame => WIRE_CODE_OK + 7,
        }
    }
}

#[cfg(feature = "std")]
impl<E: std::fmt::Debug> std::fmt::Display for LinkError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkError::TxOverflow => write!(f, "payload rejected: too long or tx busy"),
            LinkError::RxOverflow => write!(f, "receive storage exhausted"),
            LinkError::TxHardware(err) => write!(f, "transmit driver error: {err:?}"),
            LinkError::RxHardware(err) => write!(f, "receive driver error: {err:?}"),
            LinkError::NoConnection => write!(f, "no connection"),
            LinkError::Crc => write!(f, "checksum failure"),
            LinkError::Frame => write!(f, "frame construction failed"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: std::fmt::Debug> std::error::Error for LinkError<E> {}

/// Construction-time misuse, rejected before a node exists.
///
/// These replace fatal precondition asserts: a zero payload bound or
/// undersized scratch storage is a programming error in the caller, caught
/// when the node is built rather than when a frame is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// `payload_max` was zero.
    ZeroPayloadMax,
    /// A caller-provided scratch buffer cannot hold a maximum-size body.
    BufferTooSmall {
        /// Required length in bytes.
        needed: usize,
        /// Provided length in bytes.
        got: usize,
    },
}

#[cfg(feature = "std")]
impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ZeroPayloadMax => write!(f, "payload_max must be non-zero"),
            ConfigError::BufferTooSmall { needed, got } => {
                write!(f, "scratch buffer too small: needed {needed}, got {got}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}
