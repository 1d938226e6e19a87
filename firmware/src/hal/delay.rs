// Copyright 2019 Adam Greig
// Dual licensed under the Apache 2.0 and MIT licenses.

use embedded_hal::delay::DelayNs;

/// Busy-wait delay counted in core clock cycles.
///
/// Never shorter than requested; may be a few cycles longer.
pub struct Delay {
    cycles_per_us: u32,
}

impl Delay {
    pub fn new(sysclk_hz: u32) -> Self {
        Delay { cycles_per_us: sysclk_hz / 1_000_000 }
    }
}

impl DelayNs for Delay {
    fn delay_ns(&mut self, ns: u32) {
        let cycles = (ns as u64 * self.cycles_per_us as u64 + 999) / 1000;
        cortex_m::asm::delay(cycles as u32);
    }

    fn delay_us(&mut self, us: u32) {
        cortex_m::asm::delay(us.saturating_mul(self.cycles_per_us));
    }

    fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            self.delay_us(1000);
        }
    }
}
