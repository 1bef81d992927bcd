//! CLI command implementations
//!
//! Each command takes an already opened transport so that it can be run
//! against the Linux spidev backend or the in-memory emulator alike. The
//! `open_*` helpers apply the bus configuration each tool needs.

pub mod detect;
pub mod read;
