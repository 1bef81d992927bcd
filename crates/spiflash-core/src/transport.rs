//! Transport trait definitions
//!
//! A transport is anything that can perform one full-duplex SPI exchange:
//! the Linux spidev backend, an in-memory emulator, or a test double.

use crate::error::Result;
use crate::spi::Transfer;

/// Full-duplex SPI transport
///
/// Implementations block until the exchange finishes or fails. On success
/// `xfer.rx_mut()` holds the bytes sampled while `xfer.tx()` was clocked out.
pub trait SpiTransport {
    /// Perform a single full-duplex transfer
    ///
    /// The descriptor's `speed_hz()`, when non-zero, overrides the handle's
    /// default clock for this exchange only.
    fn transfer(&mut self, xfer: &mut Transfer<'_>) -> Result<()>;

    /// Largest transfer (header included) accepted in one exchange
    fn max_transfer_len(&self) -> usize;
}

impl<T: SpiTransport + ?Sized> SpiTransport for &mut T {
    fn transfer(&mut self, xfer: &mut Transfer<'_>) -> Result<()> {
        (**self).transfer(xfer)
    }

    fn max_transfer_len(&self) -> usize {
        (**self).max_transfer_len()
    }
}

// Blanket impl for boxed transports to allow trait objects
impl SpiTransport for alloc::boxed::Box<dyn SpiTransport + Send> {
    fn transfer(&mut self, xfer: &mut Transfer<'_>) -> Result<()> {
        (**self).transfer(xfer)
    }

    fn max_transfer_len(&self) -> usize {
        (**self).max_transfer_len()
    }
}
