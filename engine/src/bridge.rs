// Copyright 2019 Adam Greig
// Dual licensed under the Apache 2.0 and MIT licenses.

use crate::board::HostPort;

/// Forwards bytes from the target serial port to the host.
///
/// Only live between the end of a bootload and the next host event.
pub struct Bridge {
    live: bool,
}

impl Bridge {
    pub const fn new() -> Self {
        Bridge { live: false }
    }

    pub fn enable(&mut self) {
        self.live = true;
    }

    pub fn disable(&mut self) {
        self.live = false;
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Echo one target byte to the host. Returns false if it was dropped.
    pub fn forward<H: HostPort>(&self, host: &mut H, byte: u8) -> bool {
        if self.live {
            host.send(byte);
        }
        self.live
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}
