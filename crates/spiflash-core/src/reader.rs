//! Chunked flash reader
//!
//! A bulk read is split into READ (0x03) transactions of at most
//! `max_chunk` data bytes each. Every frame is
//!
//! ```text
//! tx: [0x03, A23..A16, A15..A8, A7..A0, 0x00 * chunk]
//! rx: [ ?? ,    ??   ,   ??   ,   ??  , data  * chunk]
//! ```
//!
//! and the data phase of `rx` is appended to an accumulation buffer sized to
//! the whole request. The address starts at 0 and advances by the chunk
//! length, so the chunks are sequential, gapless and never overlap.

use crate::config::ReadConfig;
use crate::error::{Error, Result};
use crate::spi::{encode_address_3b, opcodes, Transfer, ADDRESS_SPACE_3B, READ_HEADER_LEN};
use crate::transport::SpiTransport;
use alloc::vec;
use alloc::vec::Vec;

/// Callback for progress reporting during a chunked read
pub trait ReadProgress {
    /// Called once before the first chunk
    fn reading(&mut self, total_bytes: usize);

    /// Called after each chunk with the running byte count
    fn read_progress(&mut self, bytes_read: usize);
}

/// A no-op progress reporter
pub struct NoProgress;

impl ReadProgress for NoProgress {
    fn reading(&mut self, _total_bytes: usize) {}
    fn read_progress(&mut self, _bytes_read: usize) {}
}

/// Reader state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadState {
    /// No chunk issued yet
    Idle,
    /// Advancing through the address space
    Reading,
    /// Every requested byte has been fetched
    Done,
}

/// Read session over the first `total_len` bytes of a flash chip
///
/// The session owns the accumulation buffer and a pair of scratch frames
/// reused for every transfer. The buffer is only handed out once the
/// session reaches [`ReadState::Done`].
#[derive(Debug)]
pub struct ChunkedReader {
    config: ReadConfig,
    total_len: usize,
    address: u32,
    remaining: usize,
    bytes_read: usize,
    data: Vec<u8>,
    tx: Vec<u8>,
    rx: Vec<u8>,
    state: ReadState,
}

impl ChunkedReader {
    /// Start address of every read session
    pub const START_ADDRESS: u32 = 0;

    /// Prepare a session reading `total_len` bytes from address 0
    pub fn new(total_len: usize, config: ReadConfig) -> Result<Self> {
        if total_len == 0 {
            return Err(Error::InvalidLength);
        }
        if total_len > ADDRESS_SPACE_3B {
            return Err(Error::AddressOutOfBounds);
        }
        if config.max_chunk == 0 {
            return Err(Error::InvalidChunkSize);
        }

        let mut data = Vec::new();
        data.try_reserve_exact(total_len)
            .map_err(|_| Error::AllocationFailed { len: total_len })?;
        data.resize(total_len, 0);

        let frame_len = config.max_chunk.min(total_len) + READ_HEADER_LEN;

        Ok(Self {
            config,
            total_len,
            address: Self::START_ADDRESS,
            remaining: total_len,
            bytes_read: 0,
            data,
            tx: vec![0u8; frame_len],
            rx: vec![0u8; frame_len],
            state: ReadState::Idle,
        })
    }

    /// Current state
    pub fn state(&self) -> ReadState {
        self.state
    }

    /// Total number of bytes requested
    pub fn total_len(&self) -> usize {
        self.total_len
    }

    /// Flash address of the next chunk
    pub fn address(&self) -> u32 {
        self.address
    }

    /// Bytes still to be fetched
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Bytes fetched so far
    pub fn bytes_read(&self) -> usize {
        self.bytes_read
    }

    /// Data bytes allowed per transfer on this transport
    fn effective_max_chunk<T: SpiTransport + ?Sized>(&self, transport: &T) -> Result<usize> {
        let transport_max = transport
            .max_transfer_len()
            .saturating_sub(READ_HEADER_LEN);
        if transport_max == 0 {
            return Err(Error::InvalidChunkSize);
        }
        Ok(self.config.max_chunk.min(transport_max))
    }

    /// Fetch the next chunk
    ///
    /// Returns the number of data bytes read. A transfer error leaves the
    /// session untouched at the failed chunk.
    pub fn step<T: SpiTransport + ?Sized>(&mut self, transport: &mut T) -> Result<usize> {
        if self.state == ReadState::Done {
            return Err(Error::ReadComplete);
        }

        let chunk = self.remaining.min(self.effective_max_chunk(transport)?);
        let frame_len = chunk + READ_HEADER_LEN;

        let tx = &mut self.tx[..frame_len];
        tx[0] = opcodes::READ;
        encode_address_3b(self.address, &mut tx[1..READ_HEADER_LEN]);

        let rx = &mut self.rx[..frame_len];
        let mut xfer = Transfer::new(&self.tx[..frame_len], rx)?.with_speed(self.config.speed_hz);
        transport.transfer(&mut xfer)?;

        log::trace!("read chunk at 0x{:06X}, {} bytes", self.address, chunk);

        self.data[self.bytes_read..self.bytes_read + chunk]
            .copy_from_slice(&self.rx[READ_HEADER_LEN..frame_len]);

        self.address += chunk as u32;
        self.remaining -= chunk;
        self.bytes_read += chunk;

        self.state = if self.remaining == 0 {
            ReadState::Done
        } else {
            ReadState::Reading
        };

        Ok(chunk)
    }

    /// Step until every byte is fetched and return the buffer
    pub fn run<T, P>(mut self, transport: &mut T, progress: &mut P) -> Result<Vec<u8>>
    where
        T: SpiTransport + ?Sized,
        P: ReadProgress + ?Sized,
    {
        log::debug!(
            "reading {} bytes (max chunk {}, {} Hz)",
            self.total_len,
            self.config.max_chunk,
            self.config.speed_hz
        );
        progress.reading(self.total_len);

        while self.state != ReadState::Done {
            self.step(transport)?;
            progress.read_progress(self.bytes_read);
        }

        log::debug!("read complete, {} bytes", self.bytes_read);
        Ok(self.data)
    }

    /// Take the accumulated buffer, only once the session is done
    pub fn into_data(self) -> Option<Vec<u8>> {
        match self.state {
            ReadState::Done => Some(self.data),
            _ => None,
        }
    }
}

/// Read the first `total_len` bytes of a flash chip
pub fn read_flash<T, P>(
    transport: &mut T,
    total_len: usize,
    config: ReadConfig,
    progress: &mut P,
) -> Result<Vec<u8>>
where
    T: SpiTransport + ?Sized,
    P: ReadProgress + ?Sized,
{
    ChunkedReader::new(total_len, config)?.run(transport, progress)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A mock transport that serves a memory image and records each frame
    struct MockFlash {
        memory: Vec<u8>,
        max_len: usize,
        /// Record of all reads: (address, data length, speed)
        reads: Vec<(u32, usize, u32)>,
        /// Fail the transfer with this 1-based index
        fail_on: Option<usize>,
    }

    impl MockFlash {
        fn new(size: usize) -> Self {
            Self {
                memory: (0..size).map(|i| (i * 7 + i / 251) as u8).collect(),
                max_len: 4096,
                reads: Vec::new(),
                fail_on: None,
            }
        }
    }

    impl SpiTransport for MockFlash {
        fn transfer(&mut self, xfer: &mut Transfer<'_>) -> Result<()> {
            if self.fail_on == Some(self.reads.len() + 1) {
                return Err(Error::SpiTransferFailed { os_error: Some(5) });
            }
            assert!(xfer.len() <= self.max_len);
            let tx = xfer.tx();
            assert_eq!(tx[0], opcodes::READ);
            assert!(tx[READ_HEADER_LEN..].iter().all(|&b| b == 0));

            let addr = (tx[1] as u32) << 16 | (tx[2] as u32) << 8 | tx[3] as u32;
            let len = xfer.len() - READ_HEADER_LEN;
            self.reads.push((addr, len, xfer.speed_hz()));

            let rx = xfer.rx_mut();
            rx[..READ_HEADER_LEN].fill(0xFF);
            let start = addr as usize;
            rx[READ_HEADER_LEN..].copy_from_slice(&self.memory[start..start + len]);
            Ok(())
        }

        fn max_transfer_len(&self) -> usize {
            self.max_len
        }
    }

    struct Recorder {
        total: usize,
        updates: Vec<usize>,
    }

    impl ReadProgress for Recorder {
        fn reading(&mut self, total_bytes: usize) {
            self.total = total_bytes;
        }

        fn read_progress(&mut self, bytes_read: usize) {
            self.updates.push(bytes_read);
        }
    }

    #[test]
    fn test_chunk_lengths_sum_to_total() {
        for &len in &[1usize, 4091, 4092, 4093, 8184, 10_000, 65_536] {
            let mut flash = MockFlash::new(65_536);
            let data = read_flash(&mut flash, len, ReadConfig::default(), &mut NoProgress).unwrap();

            assert_eq!(data.len(), len);
            assert_eq!(data[..], flash.memory[..len]);
            assert_eq!(flash.reads.len(), len.div_ceil(4092));
            assert_eq!(flash.reads.iter().map(|r| r.1).sum::<usize>(), len);
            assert!(flash.reads.iter().all(|r| r.1 <= 4092));
        }
    }

    #[test]
    fn test_addresses_are_gapless() {
        let mut flash = MockFlash::new(4096);
        let config = ReadConfig::default().with_max_chunk(300);
        read_flash(&mut flash, 1000, config, &mut NoProgress).unwrap();

        let mut expected = 0u32;
        for &(addr, len, _) in &flash.reads {
            assert_eq!(addr, expected);
            expected += len as u32;
        }
        assert_eq!(expected, 1000);
        assert_eq!(
            flash.reads.iter().map(|r| r.1).collect::<Vec<_>>(),
            [300, 300, 300, 100]
        );
    }

    #[test]
    fn test_speed_on_every_transfer() {
        let mut flash = MockFlash::new(4096);
        let config = ReadConfig::default()
            .with_max_chunk(512)
            .with_speed_hz(20_000_000);
        read_flash(&mut flash, 2048, config, &mut NoProgress).unwrap();
        assert!(flash.reads.iter().all(|r| r.2 == 20_000_000));
    }

    #[test]
    fn test_chunk_clamped_to_transport() {
        let mut flash = MockFlash::new(4096);
        flash.max_len = 68;
        read_flash(&mut flash, 200, ReadConfig::default(), &mut NoProgress).unwrap();
        assert_eq!(
            flash.reads.iter().map(|r| r.1).collect::<Vec<_>>(),
            [64, 64, 64, 8]
        );
    }

    #[test]
    fn test_progress_updates() {
        let mut flash = MockFlash::new(4096);
        let mut progress = Recorder {
            total: 0,
            updates: Vec::new(),
        };
        let config = ReadConfig::default().with_max_chunk(1024);
        read_flash(&mut flash, 2500, config, &mut progress).unwrap();
        assert_eq!(progress.total, 2500);
        assert_eq!(progress.updates, [1024, 2048, 2500]);
    }

    #[test]
    fn test_state_machine() {
        let mut flash = MockFlash::new(4096);
        let config = ReadConfig::default().with_max_chunk(100);
        let mut reader = ChunkedReader::new(150, config).unwrap();
        assert_eq!(reader.state(), ReadState::Idle);

        assert_eq!(reader.step(&mut flash), Ok(100));
        assert_eq!(reader.state(), ReadState::Reading);
        assert_eq!(reader.address(), 100);
        assert_eq!(reader.remaining(), 50);

        assert_eq!(reader.step(&mut flash), Ok(50));
        assert_eq!(reader.state(), ReadState::Done);
        assert_eq!(reader.bytes_read(), 150);
        assert_eq!(reader.step(&mut flash), Err(Error::ReadComplete));

        let data = reader.into_data().unwrap();
        assert_eq!(data[..], flash.memory[..150]);
    }

    #[test]
    fn test_into_data_before_done() {
        let reader = ChunkedReader::new(10, ReadConfig::default()).unwrap();
        assert!(reader.into_data().is_none());
    }

    #[test]
    fn test_failure_aborts_loop() {
        let mut flash = MockFlash::new(8192);
        flash.fail_on = Some(3);
        let config = ReadConfig::default().with_max_chunk(1000);
        let result = read_flash(&mut flash, 5000, config, &mut NoProgress);

        assert_eq!(result, Err(Error::SpiTransferFailed { os_error: Some(5) }));
        assert_eq!(flash.reads.len(), 2);
    }

    #[test]
    fn test_invalid_requests() {
        let config = ReadConfig::default();
        assert_eq!(ChunkedReader::new(0, config).unwrap_err(), Error::InvalidLength);
        assert_eq!(
            ChunkedReader::new(ADDRESS_SPACE_3B + 1, config).unwrap_err(),
            Error::AddressOutOfBounds
        );
        assert_eq!(
            ChunkedReader::new(16, config.with_max_chunk(0)).unwrap_err(),
            Error::InvalidChunkSize
        );
    }

    #[test]
    fn test_transport_without_room_for_data() {
        let mut flash = MockFlash::new(16);
        flash.max_len = READ_HEADER_LEN;
        let result = read_flash(&mut flash, 16, ReadConfig::default(), &mut NoProgress);
        assert_eq!(result, Err(Error::InvalidChunkSize));
        assert!(flash.reads.is_empty());
    }
}
