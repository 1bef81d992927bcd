//! Full-duplex transfer descriptor

use crate::error::{Error, Result};

/// Word size used by every transfer the tools issue
pub const DEFAULT_BITS_PER_WORD: u8 = 8;

/// One atomic full-duplex SPI exchange
///
/// The transmit and receive slices always have the same length; the bus
/// clocks out `tx` while sampling into `rx`. A `speed_hz` of 0 means "use
/// the device handle's configured speed".
///
/// Fields are private so the only way to build one is [`Transfer::new`].
#[derive(Debug)]
pub struct Transfer<'a> {
    tx: &'a [u8],
    rx: &'a mut [u8],
    speed_hz: u32,
    bits_per_word: u8,
}

impl<'a> Transfer<'a> {
    /// Create a transfer over equally sized buffers
    pub fn new(tx: &'a [u8], rx: &'a mut [u8]) -> Result<Self> {
        if tx.len() != rx.len() {
            return Err(Error::LengthMismatch);
        }
        Ok(Self {
            tx,
            rx,
            speed_hz: 0,
            bits_per_word: DEFAULT_BITS_PER_WORD,
        })
    }

    /// Override the clock speed for this exchange
    pub fn with_speed(mut self, speed_hz: u32) -> Self {
        self.speed_hz = speed_hz;
        self
    }

    /// Bytes shifted out
    pub fn tx(&self) -> &[u8] {
        self.tx
    }

    /// Bytes shifted in, same length as [`tx`](Self::tx)
    pub fn rx_mut(&mut self) -> &mut [u8] {
        &mut *self.rx
    }

    /// Both buffers at once, for backends that hand them to the bus together
    pub fn buffers(&mut self) -> (&[u8], &mut [u8]) {
        (self.tx, &mut *self.rx)
    }

    /// Clock speed for this exchange in Hz (0 = handle default)
    pub fn speed_hz(&self) -> u32 {
        self.speed_hz
    }

    /// Bits per SPI word
    pub fn bits_per_word(&self) -> u8 {
        self.bits_per_word
    }

    /// Transfer length in bytes
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    /// Whether the transfer carries no bytes
    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_mismatch() {
        let tx = [0u8; 4];
        let mut rx = [0u8; 3];
        assert_eq!(Transfer::new(&tx, &mut rx).unwrap_err(), Error::LengthMismatch);

        let mut rx = [0u8; 5];
        assert_eq!(Transfer::new(&tx, &mut rx).unwrap_err(), Error::LengthMismatch);
    }

    #[test]
    fn test_buffers_share_length() {
        let tx = [0x03, 0x00, 0x10, 0x00, 0x00];
        let mut rx = [0u8; 5];
        let mut xfer = Transfer::new(&tx, &mut rx).unwrap();
        let (out, inp) = xfer.buffers();
        assert_eq!(out.len(), inp.len());
        inp[4] = 0x5A;
        assert_eq!(xfer.tx()[2], 0x10);
        assert_eq!(xfer.rx_mut()[4], 0x5A);
    }

    #[test]
    fn test_defaults() {
        let tx = [0x9F, 0, 0, 0];
        let mut rx = [0u8; 4];
        let xfer = Transfer::new(&tx, &mut rx).unwrap().with_speed(50_000);
        assert_eq!(xfer.len(), 4);
        assert!(!xfer.is_empty());
        assert_eq!(xfer.speed_hz(), 50_000);
        assert_eq!(xfer.bits_per_word(), 8);
    }
}
