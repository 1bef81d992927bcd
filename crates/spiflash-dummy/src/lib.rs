//! spiflash-dummy - In-memory flash emulator for testing
//!
//! This crate provides a dummy transport that answers RDID and READ frames
//! from an in-memory image. Every exchange is recorded and a failure can be
//! injected on any transfer, which makes it suitable for exercising the
//! reader without real hardware.

#![no_std]

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;

use spiflash_core::error::{Error, Result};
use spiflash_core::spi::{opcodes, Transfer, READ_HEADER_LEN};
use spiflash_core::transport::SpiTransport;

/// errno reported for injected failures (EIO)
pub const INJECTED_ERRNO: i32 = 5;

/// Configuration for the dummy flash
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Byte clocked in while the opcode goes out
    pub idle_byte: u8,
    /// JEDEC manufacturer ID
    pub manufacturer_id: u8,
    /// JEDEC memory type
    pub memory_type: u8,
    /// JEDEC capacity code
    pub capacity: u8,
    /// Flash size in bytes
    pub size: usize,
    /// Largest transfer accepted, header included
    pub max_transfer_len: usize,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            idle_byte: 0x00,
            manufacturer_id: 0xEF, // Winbond
            memory_type: 0x40,     // W25Q80
            capacity: 0x14,
            size: 1024 * 1024,
            max_transfer_len: 4096,
        }
    }
}

/// One exchange seen by the emulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRecord {
    /// First transmitted byte
    pub opcode: u8,
    /// Decoded 24-bit address for READ frames
    pub address: Option<u32>,
    /// Total frame length
    pub len: usize,
    /// Clock requested for the exchange
    pub speed_hz: u32,
}

/// Dummy flash transport
///
/// Emulates a NOR flash chip in memory. Reads past the end wrap to address
/// 0, as real parts do.
pub struct DummyFlash {
    config: DummyConfig,
    data: Vec<u8>,
    transfers: Vec<TransferRecord>,
    fail_on: Option<usize>,
}

impl DummyFlash {
    /// Create a new dummy flash erased to 0xFF
    pub fn new(config: DummyConfig) -> Self {
        let data = vec![0xFF; config.size];
        Self {
            config,
            data,
            transfers: Vec::new(),
            fail_on: None,
        }
    }

    /// Create a new dummy flash with default configuration (1 MiB Winbond)
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Create a dummy flash with pre-filled data
    pub fn with_data(config: DummyConfig, initial_data: &[u8]) -> Self {
        let mut flash = Self::new(config);
        let len = core::cmp::min(initial_data.len(), flash.data.len());
        flash.data[..len].copy_from_slice(&initial_data[..len]);
        flash
    }

    /// Fail the `n`th transfer (1-based) and every one after it
    pub fn fail_on_transfer(mut self, n: usize) -> Self {
        self.fail_on = Some(n);
        self
    }

    /// Get a reference to the flash data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Every transfer attempted so far, including a failed one
    pub fn transfers(&self) -> &[TransferRecord] {
        &self.transfers
    }

    fn handle_rdid(&self, rx: &mut [u8]) {
        let id = [
            self.config.manufacturer_id,
            self.config.memory_type,
            self.config.capacity,
        ];
        for (slot, byte) in rx.iter_mut().skip(1).zip(id.iter()) {
            *slot = *byte;
        }
    }

    fn handle_read(&self, address: u32, rx: &mut [u8]) {
        let Some(payload) = rx.get_mut(READ_HEADER_LEN..) else {
            return;
        };
        if self.data.is_empty() {
            payload.fill(0xFF);
            return;
        }
        let mut offset = address as usize % self.data.len();
        for slot in payload {
            *slot = self.data[offset];
            offset = (offset + 1) % self.data.len();
        }
    }
}

fn decode_address(tx: &[u8]) -> Option<u32> {
    if tx.len() < READ_HEADER_LEN {
        return None;
    }
    Some((tx[1] as u32) << 16 | (tx[2] as u32) << 8 | tx[3] as u32)
}

impl SpiTransport for DummyFlash {
    fn transfer(&mut self, xfer: &mut Transfer<'_>) -> Result<()> {
        let opcode = xfer.tx().first().copied().ok_or(Error::LengthMismatch)?;
        let address = match opcode {
            opcodes::READ => decode_address(xfer.tx()),
            _ => None,
        };
        self.transfers.push(TransferRecord {
            opcode,
            address,
            len: xfer.len(),
            speed_hz: xfer.speed_hz(),
        });

        if self.fail_on.is_some_and(|n| self.transfers.len() >= n) {
            log::debug!("dummy: injected failure on transfer {}", self.transfers.len());
            return Err(Error::SpiTransferFailed {
                os_error: Some(INJECTED_ERRNO),
            });
        }
        if xfer.len() > self.config.max_transfer_len {
            return Err(Error::TransferTooLong {
                len: xfer.len(),
                max: self.config.max_transfer_len,
            });
        }

        let (tx, rx) = xfer.buffers();
        if rx.len() != tx.len() {
            return Err(Error::LengthMismatch);
        }
        rx.fill(self.config.idle_byte);
        match (opcode, address) {
            (opcodes::RDID, _) => self.handle_rdid(rx),
            (opcodes::READ, Some(addr)) => self.handle_read(addr, rx),
            _ => return Err(Error::OpcodeNotSupported),
        }
        Ok(())
    }

    fn max_transfer_len(&self) -> usize {
        self.config.max_transfer_len
    }
}
