//! Linux SPI device implementation
//!
//! This module provides the `LinuxSpi` struct that implements the
//! `SpiTransport` trait using Linux's spidev interface.

use crate::error::{LinuxSpiError, Result};

use bitflags::bitflags;
use spiflash_core::error::Result as CoreResult;
use spiflash_core::spi::{Transfer, DEFAULT_BITS_PER_WORD};
use spiflash_core::transport::SpiTransport;

use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;

/// Device node used when none is given
pub const DEFAULT_DEVICE: &str = "/dev/spidev0.0";

/// Path to kernel spidev buffer size parameter
const BUF_SIZE_SYSFS: &str = "/sys/module/spidev/parameters/bufsiz";

/// Default SPI clock speed in Hz (2 MHz)
const DEFAULT_SPEED_HZ: u32 = 2_000_000;

bitflags! {
    /// spidev mode byte (`SPI_IOC_WR_MODE`)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SpiModeFlags: u8 {
        /// Clock phase
        const CPHA = 0x01;
        /// Clock polarity
        const CPOL = 0x02;
        /// Chip select active high
        const CS_HIGH = 0x04;
        /// Least significant bit first
        const LSB_FIRST = 0x08;
        /// Shared SI/SO signal
        const THREE_WIRE = 0x10;
        /// Loopback mode
        const LOOP = 0x20;
        /// No chip select
        const NO_CS = 0x40;
        /// Slave pulls low to pause
        const READY = 0x80;

        /// SPI mode 0: CPOL=0, CPHA=0
        const MODE_0 = 0;
        /// SPI mode 1: CPOL=0, CPHA=1
        const MODE_1 = Self::CPHA.bits();
        /// SPI mode 2: CPOL=1, CPHA=0
        const MODE_2 = Self::CPOL.bits();
        /// SPI mode 3: CPOL=1, CPHA=1
        const MODE_3 = Self::CPOL.bits() | Self::CPHA.bits();
    }
}

impl Default for SpiModeFlags {
    fn default() -> Self {
        SpiModeFlags::MODE_0
    }
}

/// Linux spidev ioctl constants
mod ioctl {
    use nix::ioctl_write_ptr;

    // SPI ioctl magic number
    const SPI_IOC_MAGIC: u8 = b'k';

    // SPI ioctl type numbers
    const SPI_IOC_TYPE_MODE: u8 = 1;
    const SPI_IOC_TYPE_BITS_PER_WORD: u8 = 3;
    const SPI_IOC_TYPE_MAX_SPEED_HZ: u8 = 4;

    // Generate ioctl functions
    ioctl_write_ptr!(spi_ioc_wr_mode, SPI_IOC_MAGIC, SPI_IOC_TYPE_MODE, u8);
    ioctl_write_ptr!(
        spi_ioc_wr_bits_per_word,
        SPI_IOC_MAGIC,
        SPI_IOC_TYPE_BITS_PER_WORD,
        u8
    );
    ioctl_write_ptr!(
        spi_ioc_wr_max_speed_hz,
        SPI_IOC_MAGIC,
        SPI_IOC_TYPE_MAX_SPEED_HZ,
        u32
    );

    /// Calculate ioctl number for SPI_IOC_MESSAGE(n)
    ///
    /// SPI_IOC_MESSAGE(n) = _IOW(SPI_IOC_MAGIC, 0, char[n * sizeof(struct spi_ioc_transfer)])
    pub fn spi_ioc_message(n: u8) -> libc::c_ulong {
        let size = (n as usize) * std::mem::size_of::<super::SpiIocTransfer>();
        // _IOC(dir, type, nr, size) = ((dir)<<30)|((size)<<16)|((type)<<8)|(nr), _IOC_WRITE = 1
        ((1u32 << 30) | ((size as u32) << 16) | ((SPI_IOC_MAGIC as u32) << 8)) as libc::c_ulong
    }
}

/// SPI transfer structure for ioctl
/// This must match the kernel's struct spi_ioc_transfer layout
#[repr(C)]
#[derive(Debug, Default, Clone)]
struct SpiIocTransfer {
    tx_buf: u64,          // __u64 tx_buf
    rx_buf: u64,          // __u64 rx_buf
    len: u32,             // __u32 len
    speed_hz: u32,        // __u32 speed_hz
    delay_usecs: u16,     // __u16 delay_usecs
    bits_per_word: u8,    // __u8 bits_per_word
    cs_change: u8,        // __u8 cs_change
    tx_nbits: u8,         // __u8 tx_nbits
    rx_nbits: u8,         // __u8 rx_nbits
    word_delay_usecs: u8, // __u8 word_delay_usecs
    _pad: u8,             // padding
}

/// Configuration for opening a Linux SPI device
#[derive(Debug, Clone)]
pub struct LinuxSpiConfig {
    /// Device path (e.g., "/dev/spidev0.0")
    pub device: String,
    /// Handle-level maximum SPI clock speed in Hz (default: 2 MHz)
    pub speed_hz: u32,
    /// SPI mode flags (default: mode 0)
    pub mode: SpiModeFlags,
}

impl Default for LinuxSpiConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            speed_hz: DEFAULT_SPEED_HZ,
            mode: SpiModeFlags::MODE_0,
        }
    }
}

impl LinuxSpiConfig {
    /// Create a new configuration with the given device path
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Default::default()
        }
    }

    /// Set the SPI clock speed in Hz
    pub fn with_speed(mut self, speed_hz: u32) -> Self {
        self.speed_hz = speed_hz;
        self
    }

    /// Set the SPI mode flags
    pub fn with_mode(mut self, mode: SpiModeFlags) -> Self {
        self.mode = mode;
        self
    }
}

/// Linux SPI transport using spidev interface
///
/// The device node is closed when the value is dropped.
#[derive(Debug)]
pub struct LinuxSpi {
    /// File handle for spidev device
    file: File,
    /// Maximum kernel buffer size
    max_kernel_buf_size: usize,
}

impl LinuxSpi {
    /// Open a Linux SPI device with the given configuration
    ///
    /// Sets mode, bits per word and maximum speed before returning.
    pub fn open(config: &LinuxSpiConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(LinuxSpiError::NoDevice);
        }

        log::debug!("linux_spi: Opening device {}", config.device);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&config.device)
            .map_err(|e| LinuxSpiError::OpenFailed {
                path: config.device.clone(),
                source: e,
            })?;

        let fd = file.as_raw_fd();

        let mode = config.mode.bits();
        unsafe {
            ioctl::spi_ioc_wr_mode(fd, &mode).map_err(|e| LinuxSpiError::SetModeFailed {
                mode,
                source: std::io::Error::from_raw_os_error(e as i32),
            })?;
        }

        let bits: u8 = DEFAULT_BITS_PER_WORD;
        unsafe {
            ioctl::spi_ioc_wr_bits_per_word(fd, &bits).map_err(|e| {
                LinuxSpiError::SetBitsPerWordFailed {
                    bits,
                    source: std::io::Error::from_raw_os_error(e as i32),
                }
            })?;
        }

        let speed = config.speed_hz;
        unsafe {
            ioctl::spi_ioc_wr_max_speed_hz(fd, &speed).map_err(|e| {
                LinuxSpiError::SetSpeedFailed {
                    speed,
                    source: std::io::Error::from_raw_os_error(e as i32),
                }
            })?;
        }

        log::info!(
            "linux_spi: Opened {} (mode={:?}, speed={} kHz)",
            config.device,
            config.mode,
            speed / 1000
        );

        let max_kernel_buf_size = get_max_kernel_buf_size();
        log::debug!(
            "linux_spi: Max kernel buffer size: {} bytes",
            max_kernel_buf_size
        );

        Ok(Self {
            file,
            max_kernel_buf_size,
        })
    }

    /// Perform one full-duplex SPI_IOC_MESSAGE(1) exchange
    ///
    /// `speed_hz` of 0 lets the kernel use the handle speed. The kernel
    /// writes `tx.len()` bytes through `rx_buf`, so both buffers must match.
    fn spi_transfer(&mut self, tx: &[u8], rx: &mut [u8], speed_hz: u32, bits: u8) -> Result<()> {
        check_buffers(tx.len(), rx.len(), self.max_kernel_buf_size)?;

        let transfer = SpiIocTransfer {
            tx_buf: tx.as_ptr() as u64,
            rx_buf: rx.as_mut_ptr() as u64,
            len: tx.len() as u32,
            speed_hz,
            bits_per_word: bits,
            ..Default::default()
        };

        let fd = self.file.as_raw_fd();
        let ret = unsafe { libc::ioctl(fd, ioctl::spi_ioc_message(1), &transfer as *const SpiIocTransfer) };

        if ret < 0 {
            return Err(LinuxSpiError::TransferFailed(
                std::io::Error::last_os_error(),
            ));
        }

        Ok(())
    }
}

impl SpiTransport for LinuxSpi {
    fn transfer(&mut self, xfer: &mut Transfer<'_>) -> CoreResult<()> {
        let speed_hz = xfer.speed_hz();
        let bits = xfer.bits_per_word();
        let (tx, rx) = xfer.buffers();
        self.spi_transfer(tx, rx, speed_hz, bits)
            .map_err(|e| {
                log::error!("linux_spi: {}", e);
                e.into()
            })
    }

    fn max_transfer_len(&self) -> usize {
        self.max_kernel_buf_size
    }
}

fn check_buffers(tx_len: usize, rx_len: usize, max: usize) -> Result<()> {
    if rx_len != tx_len {
        return Err(LinuxSpiError::LengthMismatch {
            tx: tx_len,
            rx: rx_len,
        });
    }
    if tx_len > max {
        return Err(LinuxSpiError::TransferTooLong { len: tx_len, max });
    }
    Ok(())
}

/// Read the maximum kernel buffer size from sysfs, or use page size as fallback
fn get_max_kernel_buf_size() -> usize {
    if let Ok(content) = std::fs::read_to_string(BUF_SIZE_SYSFS) {
        if let Ok(size) = content.trim().parse::<usize>() {
            if size > 0 {
                log::debug!("linux_spi: Using buffer size {} from sysfs", size);
                return size;
            }
        }
        log::warn!("linux_spi: Invalid buffer size in {}", BUF_SIZE_SYSFS);
    } else {
        log::debug!("linux_spi: Cannot read {}, using page size", BUF_SIZE_SYSFS);
    }

    let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as usize;
    log::debug!("linux_spi: Using page size {} as buffer size", page_size);
    page_size
}
