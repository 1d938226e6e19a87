// Copyright 2019 Adam Greig
// Dual licensed under the Apache 2.0 and MIT licenses.

use stm32ral::tim2;
use stm32ral::{read_reg, write_reg, modify_reg};

use crate::hal::gpio::Pin;

/// TIM2 channel 1 generating a pulse train on its output pin.
///
/// The pin is only connected to the timer while it runs. The rest of the
/// time it is an ordinary output.
pub struct PulseTimer<'a> {
    tim: tim2::Instance,
    pin: Pin<'a>,
    clk_hz: u32,
}

impl<'a> PulseTimer<'a> {
    pub fn new(tim: tim2::Instance, pin: Pin<'a>, clk_hz: u32) -> Self {
        PulseTimer { tim, pin, clk_hz }
    }

    /// Start the counter at 1MHz, with the output low for the first
    /// `low_us` of each `period_us` period and high for the rest.
    /// The update interrupt pends at the end of every period.
    pub fn start(&self, period_us: u32, low_us: u32) {
        write_reg!(tim2, self.tim, CR1, 0);
        write_reg!(tim2, self.tim, PSC, self.clk_hz / 1_000_000 - 1);
        write_reg!(tim2, self.tim, ARR, period_us - 1);
        write_reg!(tim2, self.tim, CCR1, low_us);
        // PWM mode 2: inactive (low) while CNT < CCR1.
        write_reg!(tim2, self.tim, CCMR1_Output, OC1M: 0b111, OC1PE: 1);
        write_reg!(tim2, self.tim, CCER, CC1E: 1, CC1P: 0);
        // Load PSC and CCR1 now, without raising an update interrupt.
        write_reg!(tim2, self.tim, CR1, URS: 1, ARPE: 1);
        write_reg!(tim2, self.tim, EGR, UG: 1);
        write_reg!(tim2, self.tim, SR, 0);
        write_reg!(tim2, self.tim, DIER, UIE: 1);

        self.pin.set_mode_alternate();
        modify_reg!(tim2, self.tim, CR1, CEN: 1);
    }

    /// Stop the counter and hand the pin back as a low output.
    pub fn stop(&self) {
        modify_reg!(tim2, self.tim, CR1, CEN: 0);
        write_reg!(tim2, self.tim, DIER, 0);
        write_reg!(tim2, self.tim, CCER, 0);
        self.pin.set_low().set_mode_output();
    }

    /// Acknowledge an update event. Returns false if there was none.
    pub fn clear_update(&self) -> bool {
        if read_reg!(tim2, self.tim, SR, UIF == 1) {
            modify_reg!(tim2, self.tim, SR, UIF: 0);
            true
        } else {
            false
        }
    }
}
