// Copyright 2019 Adam Greig
// Dual licensed under the Apache 2.0 and MIT licenses.

use stm32ral::rcc;
use stm32ral::{read_reg, modify_reg};

/// System clock, from a 25MHz crystal through the PLL.
pub const SYSCLK_HZ: u32 = 96_000_000;
/// APB1 peripheral clock (USART2).
pub const PCLK1_HZ: u32 = SYSCLK_HZ / 2;
/// APB2 peripheral clock (USART1).
pub const PCLK2_HZ: u32 = SYSCLK_HZ;
/// Clock into TIM2. Twice PCLK1 since the APB1 prescaler is not 1.
pub const TIM2_CLK_HZ: u32 = PCLK1_HZ * 2;

pub struct RCC {
    rcc: rcc::Instance,
}

impl RCC {
    pub fn new(rcc: rcc::Instance) -> Self {
        RCC { rcc }
    }

    /// Set up the device, enabling all required clocks
    ///
    /// Flash wait states must already be configured for SYSCLK_HZ.
    pub fn setup(&self) {
        // Turn on HSE and wait for it to be ready
        modify_reg!(rcc, self.rcc, CR, HSEON: 1);
        while read_reg!(rcc, self.rcc, CR, HSERDY == 0) {}

        // 25MHz / 25 * 192 = 192MHz VCO, /2 = 96MHz SYSCLK, /4 = 48MHz
        modify_reg!(rcc, self.rcc, PLLCFGR,
                    PLLSRC: 1, PLLM: 25, PLLN: 192, PLLP: 0b00, PLLQ: 4);
        modify_reg!(rcc, self.rcc, CR, PLLON: 1);
        while read_reg!(rcc, self.rcc, CR, PLLRDY == 0) {}

        // APB1 must stay at or below 50MHz
        modify_reg!(rcc, self.rcc, CFGR, HPRE: 0b0000, PPRE1: 0b100, PPRE2: 0b000);

        // Swap system clock to PLL
        modify_reg!(rcc, self.rcc, CFGR, SW: 0b10);
        while read_reg!(rcc, self.rcc, CFGR, SWS != 0b10) {}

        // Enable peripheral clocks
        modify_reg!(rcc, self.rcc, AHB1ENR, GPIOAEN: 1, GPIOBEN: 1, GPIOCEN: 1);
        modify_reg!(rcc, self.rcc, APB1ENR, TIM2EN: 1, USART2EN: 1);
        modify_reg!(rcc, self.rcc, APB2ENR, USART1EN: 1);
    }
}
