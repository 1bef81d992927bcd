//! Error types for spiflash-core
//!
//! This module provides a no_std compatible error type that is shared by the
//! transport backends, the identifier and the chunked reader.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // SPI errors
    /// A full-duplex SPI transfer failed
    ///
    /// `os_error` carries the raw OS error code when the backend has one, so
    /// that std callers can render the system error text.
    SpiTransferFailed {
        /// Raw OS error code reported by the bus driver, if any
        os_error: Option<i32>,
    },
    /// Transmit and receive buffers of a transfer differ in length
    LengthMismatch,
    /// Transfer is longer than the transport accepts in one exchange
    TransferTooLong {
        /// Requested transfer length in bytes
        len: usize,
        /// Largest transfer the transport accepts
        max: usize,
    },
    /// Opcode is not understood by the transport
    OpcodeNotSupported,

    // Read errors
    /// Requested read length is zero
    InvalidLength,
    /// Configured maximum chunk size is zero or leaves no room for data
    InvalidChunkSize,
    /// Read would run past the 24-bit address space
    AddressOutOfBounds,
    /// The accumulation buffer could not be reserved
    AllocationFailed {
        /// Number of bytes that were requested
        len: usize,
    },
    /// The read loop already fetched every requested byte
    ReadComplete,

    // Configuration errors
    /// SPI clock speed is outside the supported range
    InvalidSpeed {
        /// Rejected speed in MHz
        mhz: u32,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpiTransferFailed { os_error: Some(code) } => {
                write!(f, "SPI transfer failed (os error {})", code)
            }
            Self::SpiTransferFailed { os_error: None } => write!(f, "SPI transfer failed"),
            Self::LengthMismatch => write!(f, "tx and rx buffers differ in length"),
            Self::TransferTooLong { len, max } => {
                write!(f, "transfer of {} bytes exceeds limit of {} bytes", len, max)
            }
            Self::OpcodeNotSupported => write!(f, "SPI opcode not supported by transport"),
            Self::InvalidLength => write!(f, "read length must be greater than zero"),
            Self::InvalidChunkSize => write!(f, "invalid maximum chunk size"),
            Self::AddressOutOfBounds => write!(f, "read exceeds 24-bit address space"),
            Self::AllocationFailed { len } => {
                write!(f, "cannot allocate {} bytes for read buffer", len)
            }
            Self::ReadComplete => write!(f, "read already complete"),
            Self::InvalidSpeed { mhz } => write!(
                f,
                "invalid SPI speed {} MHz (must be {}-{} MHz)",
                mhz,
                crate::config::MIN_SPEED_MHZ,
                crate::config::MAX_SPEED_MHZ
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
