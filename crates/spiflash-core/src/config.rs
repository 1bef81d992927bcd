//! Read configuration
//!
//! Values that used to be process-wide constants (chunk size, clock speed)
//! are carried in [`ReadConfig`] and handed to the reader at construction.

use crate::error::{Error, Result};

/// Lowest accepted SPI clock in MHz
pub const MIN_SPEED_MHZ: u32 = 1;
/// Highest accepted SPI clock in MHz
pub const MAX_SPEED_MHZ: u32 = 133;
/// Default SPI clock for bulk reads in MHz
pub const DEFAULT_SPEED_MHZ: u32 = 5;

/// Default maximum data bytes per read transfer
///
/// The spidev default `bufsiz` is 4096 bytes and every read frame carries a
/// 4-byte opcode + address header.
pub const DEFAULT_MAX_CHUNK: usize = 4092;

/// SPI clock speed in MHz, validated to `MIN_SPEED_MHZ..=MAX_SPEED_MHZ`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SpeedMhz(u32);

impl SpeedMhz {
    /// Validate a speed given in MHz
    pub fn new(mhz: u32) -> Result<Self> {
        if (MIN_SPEED_MHZ..=MAX_SPEED_MHZ).contains(&mhz) {
            Ok(Self(mhz))
        } else {
            Err(Error::InvalidSpeed { mhz })
        }
    }

    /// Speed in MHz
    pub const fn mhz(self) -> u32 {
        self.0
    }

    /// Speed in Hz
    pub const fn to_hz(self) -> u32 {
        self.0 * 1_000_000
    }
}

impl Default for SpeedMhz {
    fn default() -> Self {
        Self(DEFAULT_SPEED_MHZ)
    }
}

/// Configuration for a chunked read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadConfig {
    /// Maximum number of data bytes fetched per transfer
    pub max_chunk: usize,
    /// Clock speed placed on every read transfer, in Hz
    pub speed_hz: u32,
}

impl Default for ReadConfig {
    fn default() -> Self {
        Self {
            max_chunk: DEFAULT_MAX_CHUNK,
            speed_hz: SpeedMhz::default().to_hz(),
        }
    }
}

impl ReadConfig {
    /// Set the maximum chunk size in bytes
    pub fn with_max_chunk(mut self, max_chunk: usize) -> Self {
        self.max_chunk = max_chunk;
        self
    }

    /// Set the per-transfer clock speed in Hz
    pub fn with_speed_hz(mut self, speed_hz: u32) -> Self {
        self.speed_hz = speed_hz;
        self
    }

    /// Set the per-transfer clock speed from a validated MHz value
    pub fn with_speed(self, speed: SpeedMhz) -> Self {
        self.with_speed_hz(speed.to_hz())
    }
}
