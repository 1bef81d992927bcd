//! Identify command implementation

use crate::error::ToolError;
use spiflash_core::jedec::{read_jedec_id, JedecId, IDENTIFY_SPEED_HZ};
use spiflash_core::transport::SpiTransport;
use spiflash_linux_spi::{LinuxSpi, LinuxSpiConfig, SpiModeFlags};
use std::io::Write;

/// Open and configure the device for identification (mode 0, 50 kHz)
pub fn open_device(device: &str) -> Result<LinuxSpi, ToolError> {
    let config = LinuxSpiConfig::new(device)
        .with_mode(SpiModeFlags::MODE_0)
        .with_speed(IDENTIFY_SPEED_HZ);
    Ok(LinuxSpi::open(&config)?)
}

/// Read the JEDEC ID and print it to `out`
///
/// Nothing is printed when the transfer fails.
pub fn run_detect<T, W>(transport: &mut T, out: &mut W) -> Result<JedecId, ToolError>
where
    T: SpiTransport + ?Sized,
    W: Write,
{
    let id = read_jedec_id(transport, IDENTIFY_SPEED_HZ)?;
    writeln!(out, "{}", id)?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spiflash_dummy::{DummyConfig, DummyFlash};

    #[test]
    fn test_detect_output() {
        let mut flash = DummyFlash::new(DummyConfig {
            idle_byte: 0x00,
            manufacturer_id: 0xAB,
            memory_type: 0xCD,
            capacity: 0x14,
            ..Default::default()
        });
        let mut out = Vec::new();
        let id = run_detect(&mut flash, &mut out).unwrap();

        assert_eq!(id.manufacturer, 0xAB);
        assert_eq!(id.memory_type, 0xCD);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Manufacturer ID: 0xab\nMemory Type: 0xcd\nMemory Capacity: 0x14 (8 Mbit (1 MByte))\n"
        );

        let record = flash.transfers()[0];
        assert_eq!(record.opcode, 0x9F);
        assert_eq!(record.len, 4);
        assert_eq!(record.speed_hz, 50_000);
    }

    #[test]
    fn test_detect_unknown_capacity() {
        let mut flash = DummyFlash::new(DummyConfig {
            capacity: 0xFF,
            ..Default::default()
        });
        let mut out = Vec::new();
        run_detect(&mut flash, &mut out).unwrap();
        assert!(String::from_utf8(out)
            .unwrap()
            .ends_with("Memory Capacity: 0xff (Unknown capacity)\n"));
    }

    #[test]
    fn test_detect_failure_prints_nothing() {
        let mut flash = DummyFlash::new_default().fail_on_transfer(1);
        let mut out = Vec::new();
        let err = run_detect(&mut flash, &mut out).unwrap_err();

        assert!(matches!(err, ToolError::Transfer(_)));
        assert!(out.is_empty());
    }

    #[test]
    fn test_open_missing_device() {
        let err = open_device("/nonexistent/spidev0.0").unwrap_err();
        assert!(matches!(err, ToolError::DeviceOpen { .. }));
    }
}
