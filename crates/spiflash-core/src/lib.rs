//! spiflash-core - Core library for SPI NOR flash access
//!
//! This crate holds everything that does not touch real hardware: the
//! full-duplex transfer descriptor, the [`SpiTransport`](transport::SpiTransport)
//! trait that bus backends implement, JEDEC identification and the chunked
//! read state machine. It is `no_std` and only needs an allocator.
//!
//! # Features
//!
//! - `std` - Implement `std::error::Error` for the core error type
//!
//! # Example
//!
//! ```ignore
//! use spiflash_core::config::ReadConfig;
//! use spiflash_core::reader::{read_flash, NoProgress};
//! use spiflash_core::transport::SpiTransport;
//!
//! fn dump<T: SpiTransport>(spi: &mut T) -> spiflash_core::Result<Vec<u8>> {
//!     let id = spiflash_core::jedec::read_jedec_id(spi, 50_000)?;
//!     let len = id.capacity_bytes().unwrap_or(1024 * 1024);
//!     read_flash(spi, len, ReadConfig::default(), &mut NoProgress)
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod config;
pub mod error;
pub mod jedec;
pub mod reader;
pub mod spi;
pub mod transport;

pub use error::{Error, Result};
