// Copyright 2019 Adam Greig
// Dual licensed under the Apache 2.0 and MIT licenses.

use stm32ral::{write_reg, flash};

pub struct Flash {
    flash: flash::Instance,
}

impl Flash {
    pub fn new(flash: flash::Instance) -> Self {
        Flash { flash }
    }

    /// Three wait states with prefetch and caches, enough for 96MHz at 3.3V.
    pub fn setup(&self) {
        write_reg!(flash, self.flash, ACR, PRFTEN: 1, ICEN: 1, DCEN: 1, LATENCY: 3);
    }
}
