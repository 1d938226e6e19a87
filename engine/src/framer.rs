// Copyright 2019 Adam Greig
// Dual licensed under the Apache 2.0 and MIT licenses.

use crate::protocol::{self, CMD_BOOT_3WB, CMD_TRANSFER_SRAM};

/// Maximum length of a command line, including its terminator.
pub const COMMAND_CAPACITY: usize = 64;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    TransferSram,
    Boot3wb,
}

/// Result of pushing one byte into the command buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Line {
    /// No terminator yet.
    Incomplete,
    /// A complete line matched a command.
    Command(Command),
    /// A complete line matched nothing.
    Unrecognised,
    /// The buffer filled up without a terminator.
    Overflow,
}

/// Accumulates host bytes into a command line.
pub struct CommandBuffer {
    buf: [u8; COMMAND_CAPACITY],
    len: usize,
}

impl CommandBuffer {
    pub const fn new() -> Self {
        CommandBuffer { buf: [0u8; COMMAND_CAPACITY], len: 0 }
    }

    /// Append `byte` and report whether it completed a line.
    ///
    /// The caller clears the buffer once a line is complete; an overflowing
    /// buffer is cleared here so the cursor never passes the capacity.
    pub fn push(&mut self, byte: u8) -> Line {
        self.buf[self.len] = byte;
        self.len += 1;

        if protocol::is_terminator(byte) {
            match Self::parse(&self.buf[..self.len]) {
                Some(cmd) => Line::Command(cmd),
                None => Line::Unrecognised,
            }
        } else if self.len == COMMAND_CAPACITY {
            self.clear();
            Line::Overflow
        } else {
            Line::Incomplete
        }
    }

    /// Zero the buffer and reset the cursor.
    pub fn clear(&mut self) {
        self.buf = [0u8; COMMAND_CAPACITY];
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Match a terminated line against the known commands.
    ///
    /// The whole line must match, terminator included. A line ended by `\r`
    /// matches the same command as one ended by `\n`.
    fn parse(line: &[u8]) -> Option<Command> {
        let (body, _) = line.split_at(line.len() - 1);
        if Self::matches(body, CMD_TRANSFER_SRAM) {
            Some(Command::TransferSram)
        } else if Self::matches(body, CMD_BOOT_3WB) {
            Some(Command::Boot3wb)
        } else {
            None
        }
    }

    fn matches(body: &[u8], command: &[u8]) -> bool {
        body == &command[..command.len() - 1]
    }
}

impl Default for CommandBuffer {
    fn default() -> Self {
        Self::new()
    }
}
