//! spiflash-linux-spi - Linux spidev transport
//!
//! This crate implements [`SpiTransport`](spiflash_core::transport::SpiTransport)
//! on top of the `/dev/spidevX.Y` character device interface.
//!
//! # Example
//!
//! ```no_run
//! use spiflash_core::jedec::{read_jedec_id, IDENTIFY_SPEED_HZ};
//! use spiflash_linux_spi::{LinuxSpi, LinuxSpiConfig, SpiModeFlags};
//!
//! let config = LinuxSpiConfig::new("/dev/spidev0.0")
//!     .with_speed(IDENTIFY_SPEED_HZ)
//!     .with_mode(SpiModeFlags::MODE_0);
//! let mut spi = LinuxSpi::open(&config)?;
//!
//! let id = read_jedec_id(&mut spi, IDENTIFY_SPEED_HZ)?;
//! println!("{}", id);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel with spidev support enabled (`CONFIG_SPI_SPIDEV`)
//! - Read/write access to `/dev/spidevX.Y` device
//! - May require adding user to `spi` group or using udev rules

pub mod device;
pub mod error;

// Re-exports
pub use device::{LinuxSpi, LinuxSpiConfig, SpiModeFlags, DEFAULT_DEVICE};
pub use error::{LinuxSpiError, Result};
