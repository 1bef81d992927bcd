//! 24-bit address encoding

/// Size of the 3-byte (24-bit) address space - 16 MiB
pub const ADDRESS_SPACE_3B: usize = 16 * 1024 * 1024;

/// Opcode + 3 address bytes preceding the data phase of a READ frame
pub const READ_HEADER_LEN: usize = 4;

/// Encode a 24-bit address big-endian into `buf[..3]`
///
/// Bits above 23 are dropped.
pub fn encode_address_3b(address: u32, buf: &mut [u8]) {
    buf[0] = (address >> 16) as u8;
    buf[1] = (address >> 8) as u8;
    buf[2] = address as u8;
}
