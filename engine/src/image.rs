// Copyright 2019 Adam Greig
// Dual licensed under the Apache 2.0 and MIT licenses.

use crate::{Error, Result};

/// Size of the target's instruction memory, and so of every image.
pub const IMAGE_SIZE: usize = 65536;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Fill {
    Partial,
    /// The byte just pushed filled the final slot.
    Complete,
}

/// Staging buffer for the image to be bootloaded.
///
/// The contents survive a bootload, so the same image can be loaded again
/// without the host resending it. Only the fill cursor is rewound.
pub struct FirmwareImage {
    bytes: [u8; IMAGE_SIZE],
    fill: usize,
}

impl FirmwareImage {
    pub const fn new() -> Self {
        FirmwareImage { bytes: [0u8; IMAGE_SIZE], fill: 0 }
    }

    /// Store `byte` at the fill cursor and advance it.
    pub fn push(&mut self, byte: u8) -> Result<Fill> {
        if self.fill == IMAGE_SIZE {
            return Err(Error::ImageOverrun);
        }
        self.bytes[self.fill] = byte;
        self.fill += 1;
        if self.fill == IMAGE_SIZE {
            Ok(Fill::Complete)
        } else {
            Ok(Fill::Partial)
        }
    }

    /// Start the next load from address zero.
    pub fn rewind(&mut self) {
        self.fill = 0;
    }

    /// Number of bytes received since the last rewind.
    pub fn fill(&self) -> usize {
        self.fill
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..]
    }
}

impl Default for FirmwareImage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_on_last_byte_only() {
        let mut image = Box::new(FirmwareImage::new());
        for i in 0..IMAGE_SIZE - 1 {
            assert_eq!(image.push(i as u8), Ok(Fill::Partial));
        }
        assert_eq!(image.fill(), IMAGE_SIZE - 1);
        assert_eq!(image.push(0xA5), Ok(Fill::Complete));
        assert_eq!(image.as_bytes()[IMAGE_SIZE - 1], 0xA5);
        assert_eq!(image.as_bytes()[257], 1);
    }

    #[test]
    fn refuses_overrun() {
        let mut image = Box::new(FirmwareImage::new());
        for _ in 0..IMAGE_SIZE {
            image.push(0).unwrap();
        }
        assert_eq!(image.push(0), Err(Error::ImageOverrun));
    }

    #[test]
    fn rewind_keeps_contents() {
        let mut image = Box::new(FirmwareImage::new());
        image.push(0x12).unwrap();
        image.push(0x34).unwrap();
        image.rewind();
        assert_eq!(image.fill(), 0);
        assert_eq!(&image.as_bytes()[..2], &[0x12, 0x34]);
        image.push(0x56).unwrap();
        assert_eq!(&image.as_bytes()[..2], &[0x56, 0x34]);
    }
}
