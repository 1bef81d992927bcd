//! Error types for Linux SPI operations

use thiserror::Error;

/// Linux SPI specific errors
#[derive(Debug, Error)]
pub enum LinuxSpiError {
    /// Failed to open device
    #[error("Failed to open SPI device {path}: {source}")]
    OpenFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to set SPI mode
    #[error("Failed to set SPI mode to 0x{mode:02x}: {source}")]
    SetModeFailed {
        mode: u8,
        #[source]
        source: std::io::Error,
    },

    /// Failed to set bits per word
    #[error("Failed to set bits per word to {bits}: {source}")]
    SetBitsPerWordFailed {
        bits: u8,
        #[source]
        source: std::io::Error,
    },

    /// Failed to set clock speed
    #[error("Failed to set SPI speed to {speed} Hz: {source}")]
    SetSpeedFailed {
        speed: u32,
        #[source]
        source: std::io::Error,
    },

    /// SPI transfer failed
    #[error("Failed to send SPI message: {0}")]
    TransferFailed(#[source] std::io::Error),

    /// Transfer does not fit in the kernel buffer
    #[error("Transfer of {len} bytes exceeds spidev buffer of {max} bytes")]
    TransferTooLong { len: usize, max: usize },

    /// Receive buffer does not match the transmit buffer
    #[error("SPI buffers differ in length: tx {tx} bytes, rx {rx} bytes")]
    LengthMismatch { tx: usize, rx: usize },

    /// Device not specified
    #[error("No device specified. Use /dev/spidevX.Y")]
    NoDevice,
}

impl From<LinuxSpiError> for spiflash_core::Error {
    fn from(err: LinuxSpiError) -> Self {
        match err {
            LinuxSpiError::TransferFailed(e) => Self::SpiTransferFailed {
                os_error: e.raw_os_error(),
            },
            LinuxSpiError::TransferTooLong { len, max } => Self::TransferTooLong { len, max },
            LinuxSpiError::LengthMismatch { .. } => Self::LengthMismatch,
            _ => Self::SpiTransferFailed { os_error: None },
        }
    }
}

/// Result type for Linux SPI operations
pub type Result<T> = std::result::Result<T, LinuxSpiError>;
