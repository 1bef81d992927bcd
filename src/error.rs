//! Tool-level error type

use spiflash_linux_spi::LinuxSpiError;
use std::fmt;
use std::io;
use thiserror::Error;

/// A failed SPI exchange, rendered with the system error text when known
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferFault(pub spiflash_core::Error);

impl fmt::Display for TransferFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            spiflash_core::Error::SpiTransferFailed {
                os_error: Some(code),
            } => write!(f, "{}", io::Error::from_raw_os_error(code)),
            other => write!(f, "{}", other),
        }
    }
}

/// Errors reported by `spidetect` and `spiread`
///
/// Every variant is fatal; the binaries print it and exit with status 1.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The SPI device node could not be opened
    #[error("Failed to open SPI device {path}: {source}")]
    DeviceOpen {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The bus rejected mode, word size or speed
    #[error(transparent)]
    Configuration(LinuxSpiError),

    /// A single exchange failed
    #[error("Failed to send SPI message: {0}")]
    Transfer(TransferFault),

    /// The accumulation buffer could not be reserved
    #[error("Failed to allocate memory: {len} bytes")]
    Allocation { len: usize },

    /// The output file could not be written
    #[error("Failed to write '{path}': {source}")]
    FileWrite {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Standard output could not be written
    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),

    /// A request the reader refuses before touching the bus
    #[error("{0}")]
    InvalidArgument(spiflash_core::Error),
}

impl From<LinuxSpiError> for ToolError {
    fn from(err: LinuxSpiError) -> Self {
        match err {
            LinuxSpiError::OpenFailed { path, source } => Self::DeviceOpen { path, source },
            err @ (LinuxSpiError::TransferFailed(_) | LinuxSpiError::TransferTooLong { .. }) => {
                Self::Transfer(TransferFault(err.into()))
            }
            other => Self::Configuration(other),
        }
    }
}

impl From<spiflash_core::Error> for ToolError {
    fn from(err: spiflash_core::Error) -> Self {
        use spiflash_core::Error as E;

        match err {
            E::SpiTransferFailed { .. }
            | E::TransferTooLong { .. }
            | E::OpcodeNotSupported
            | E::LengthMismatch => Self::Transfer(TransferFault(err)),
            E::AllocationFailed { len } => Self::Allocation { len },
            E::InvalidLength
            | E::InvalidChunkSize
            | E::AddressOutOfBounds
            | E::ReadComplete
            | E::InvalidSpeed { .. } => Self::InvalidArgument(err),
        }
    }
}
