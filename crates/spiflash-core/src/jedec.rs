//! JEDEC Read-ID identification
//!
//! The RDID response is three bytes: manufacturer, memory type and a
//! capacity code whose value is log2 of the size in bytes on most parts.

use crate::error::Result;
use crate::spi::{opcodes, Transfer};
use crate::transport::SpiTransport;
use core::fmt;

/// Clock used for identification, slow enough for any wiring
pub const IDENTIFY_SPEED_HZ: u32 = 50_000;

/// Description reported for codes missing from [`CAPACITY_TABLE`]
pub const UNKNOWN_CAPACITY: &str = "Unknown capacity";

/// Capacity codes understood by the identifier
pub const CAPACITY_TABLE: &[(u8, &str)] = &[
    (0x14, "8 Mbit (1 MByte)"),
    (0x15, "16 Mbit (2 MBytes)"),
    (0x16, "32 Mbit (4 MBytes)"),
    (0x17, "64 Mbit (8 MBytes)"),
    (0x18, "128 Mbit (16 MBytes)"),
];

/// Decode a capacity code into a human-readable string
pub fn capacity_description(code: u8) -> &'static str {
    CAPACITY_TABLE
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, desc)| *desc)
        .unwrap_or(UNKNOWN_CAPACITY)
}

/// Identification bytes returned by RDID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JedecId {
    /// JEDEC manufacturer ID
    pub manufacturer: u8,
    /// Memory type
    pub memory_type: u8,
    /// Capacity code
    pub capacity: u8,
}

impl JedecId {
    /// Decode a raw 4-byte RDID response
    ///
    /// The first byte was clocked in while the opcode went out and carries
    /// no information.
    pub fn from_response(rx: &[u8; opcodes::RDID_FRAME_LEN]) -> Self {
        Self {
            manufacturer: rx[1],
            memory_type: rx[2],
            capacity: rx[3],
        }
    }

    /// Human-readable capacity
    pub fn capacity_description(&self) -> &'static str {
        capacity_description(self.capacity)
    }

    /// Capacity in bytes, for codes in the table
    pub fn capacity_bytes(&self) -> Option<usize> {
        CAPACITY_TABLE
            .iter()
            .any(|(c, _)| *c == self.capacity)
            .then(|| 1usize << self.capacity)
    }
}

impl fmt::Display for JedecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Manufacturer ID: 0x{:02x}", self.manufacturer)?;
        writeln!(f, "Memory Type: 0x{:02x}", self.memory_type)?;
        write!(
            f,
            "Memory Capacity: 0x{:02x} ({})",
            self.capacity,
            self.capacity_description()
        )
    }
}

/// Read the JEDEC ID from a flash chip
///
/// Issues one 4-byte transfer: the RDID opcode followed by three dummy
/// bytes.
pub fn read_jedec_id<T: SpiTransport + ?Sized>(transport: &mut T, speed_hz: u32) -> Result<JedecId> {
    let tx = [opcodes::RDID, 0x00, 0x00, 0x00];
    let mut rx = [0u8; opcodes::RDID_FRAME_LEN];

    let mut xfer = Transfer::new(&tx, &mut rx)?.with_speed(speed_hz);
    transport.transfer(&mut xfer)?;

    let id = JedecId::from_response(&rx);
    log::debug!(
        "RDID: manufacturer=0x{:02X} type=0x{:02X} capacity=0x{:02X}",
        id.manufacturer,
        id.memory_type,
        id.capacity
    );
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use alloc::string::ToString;

    struct FixedResponse {
        rx: [u8; 4],
        fail: bool,
        seen_tx: [u8; 4],
        seen_speed: u32,
    }

    impl SpiTransport for FixedResponse {
        fn transfer(&mut self, xfer: &mut Transfer<'_>) -> Result<()> {
            if self.fail {
                return Err(Error::SpiTransferFailed { os_error: Some(5) });
            }
            self.seen_tx.copy_from_slice(xfer.tx());
            self.seen_speed = xfer.speed_hz();
            xfer.rx_mut().copy_from_slice(&self.rx);
            Ok(())
        }

        fn max_transfer_len(&self) -> usize {
            4096
        }
    }

    fn responder(rx: [u8; 4]) -> FixedResponse {
        FixedResponse {
            rx,
            fail: false,
            seen_tx: [0; 4],
            seen_speed: 0,
        }
    }

    #[test]
    fn test_capacity_table() {
        assert_eq!(capacity_description(0x14), "8 Mbit (1 MByte)");
        assert_eq!(capacity_description(0x18), "128 Mbit (16 MBytes)");
        assert_eq!(capacity_description(0xFF), "Unknown capacity");
        assert_eq!(capacity_description(0x13), "Unknown capacity");
    }

    #[test]
    fn test_read_jedec_id() {
        let mut spi = responder([0x00, 0xAB, 0xCD, 0x14]);
        let id = read_jedec_id(&mut spi, IDENTIFY_SPEED_HZ).unwrap();

        assert_eq!(spi.seen_tx, [0x9F, 0x00, 0x00, 0x00]);
        assert_eq!(spi.seen_speed, 50_000);
        assert_eq!(id.manufacturer, 0xAB);
        assert_eq!(id.memory_type, 0xCD);
        assert_eq!(id.capacity_description(), "8 Mbit (1 MByte)");
        assert_eq!(id.capacity_bytes(), Some(1024 * 1024));
    }

    #[test]
    fn test_first_byte_ignored() {
        let mut spi = responder([0xFF, 0xEF, 0x40, 0x99]);
        let id = read_jedec_id(&mut spi, IDENTIFY_SPEED_HZ).unwrap();
        assert_eq!(id.manufacturer, 0xEF);
        assert_eq!(id.capacity_bytes(), None);
        assert_eq!(id.capacity_description(), UNKNOWN_CAPACITY);
    }

    #[test]
    fn test_transfer_failure() {
        let mut spi = responder([0; 4]);
        spi.fail = true;
        assert_eq!(
            read_jedec_id(&mut spi, IDENTIFY_SPEED_HZ),
            Err(Error::SpiTransferFailed { os_error: Some(5) })
        );
    }

    #[test]
    fn test_display() {
        let id = JedecId::from_response(&[0x00, 0xAB, 0xCD, 0x14]);
        assert_eq!(
            id.to_string(),
            "Manufacturer ID: 0xab\nMemory Type: 0xcd\nMemory Capacity: 0x14 (8 Mbit (1 MByte))"
        );
    }
}
