//! Standard JEDEC SPI flash opcodes
//!
//! Only the read-side commands are defined; nothing here writes or erases.

// ============================================================================
// Identification
// ============================================================================

/// Read JEDEC ID (manufacturer + memory type + capacity)
pub const RDID: u8 = 0x9F;

/// Number of bytes in an RDID frame: opcode + 3 ID bytes
pub const RDID_FRAME_LEN: usize = 4;

// ============================================================================
// Read commands - 3-byte address
// ============================================================================

/// Read Data (up to ~33 MHz on most parts, no dummy cycles)
pub const READ: u8 = 0x03;
