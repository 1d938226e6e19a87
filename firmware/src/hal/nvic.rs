// Copyright 2019 Adam Greig
// Dual licensed under the Apache 2.0 and MIT licenses.

use stm32ral::{nvic, scb, interrupt};
use stm32ral::{read_reg, write_reg, modify_reg};

/// Interrupt controller, used only for its pending flags.
///
/// No interrupt is ever enabled in the NVIC. Peripherals still set their
/// pending bits, SEVONPEND turns each new pending bit into a WFE wakeup, and
/// the main loop polls and clears them. Whether a peripheral can pend at all
/// is controlled at the peripheral.
pub struct NVIC {
    nvic: nvic::Instance,
    scb: scb::Instance,
}

impl NVIC {
    pub fn new(nvic: nvic::Instance, scb: scb::Instance) -> Self {
        NVIC { nvic, scb }
    }

    pub fn setup(&self) {
        // SEVONPEND
        modify_reg!(scb, self.scb, SCR, |r| r | (1 << 4));
        self.unpend(interrupt::USART1 as u32);
        self.unpend(interrupt::USART2 as u32);
        self.unpend(interrupt::TIM2 as u32);
    }

    pub fn usart1_pending(&self) -> bool {
        self.pending(interrupt::USART1 as u32)
    }

    pub fn unpend_usart1(&self) {
        self.unpend(interrupt::USART1 as u32);
    }

    pub fn usart2_pending(&self) -> bool {
        self.pending(interrupt::USART2 as u32)
    }

    pub fn unpend_usart2(&self) {
        self.unpend(interrupt::USART2 as u32);
    }

    pub fn tim2_pending(&self) -> bool {
        self.pending(interrupt::TIM2 as u32)
    }

    pub fn unpend_tim2(&self) {
        self.unpend(interrupt::TIM2 as u32);
    }

    fn pending(&self, irq: u32) -> bool {
        let bit = 1 << (irq % 32);
        let ispr = match irq / 32 {
            0 => read_reg!(nvic, self.nvic, ISPR0),
            1 => read_reg!(nvic, self.nvic, ISPR1),
            _ => read_reg!(nvic, self.nvic, ISPR2),
        };
        ispr & bit != 0
    }

    fn unpend(&self, irq: u32) {
        let bit = 1 << (irq % 32);
        match irq / 32 {
            0 => write_reg!(nvic, self.nvic, ICPR0, bit),
            1 => write_reg!(nvic, self.nvic, ICPR1, bit),
            _ => write_reg!(nvic, self.nvic, ICPR2, bit),
        }
    }
}
