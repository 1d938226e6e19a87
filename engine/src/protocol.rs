// Copyright 2019 Adam Greig
// Dual licensed under the Apache 2.0 and MIT licenses.

//! Host-facing wire protocol: command lines sent by the host and the
//! status lines sent back by the programmer.

/// Begin loading a new image into the staging buffer.
pub const CMD_TRANSFER_SRAM: &[u8] = b"transfersram\n";

/// Bootload the image already in the staging buffer.
pub const CMD_BOOT_3WB: &[u8] = b"boot3wb\n";

pub const MSG_SRAM_LOAD_READY: &[u8] = b"SRAM load ready\r\n";
pub const MSG_SRAM_LOAD_COMPLETE: &[u8] = b"SRAM load complete\r\n";
pub const MSG_3WB_COMPLETE: &[u8] = b"3WB bootload complete\r\n";

/// Returns true if `byte` ends a command line.
///
/// `\n` is what scripts send, `\r` is what a terminal sends on Enter.
pub fn is_terminator(byte: u8) -> bool {
    byte == b'\n' || byte == b'\r'
}
