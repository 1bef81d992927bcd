//! SPI protocol types
//!
//! This module contains the JEDEC opcodes used by the tools, the 24-bit
//! address codec and the full-duplex [`Transfer`] descriptor.

mod address;
pub mod opcodes;
mod transfer;

pub use address::{encode_address_3b, ADDRESS_SPACE_3B, READ_HEADER_LEN};
pub use transfer::{Transfer, DEFAULT_BITS_PER_WORD};
