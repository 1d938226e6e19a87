// Copyright 2019 Adam Greig
// Dual licensed under the Apache 2.0 and MIT licenses.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};
use stm32ral::gpio;
use stm32ral::{write_reg, modify_reg};

pub struct GPIO {
    p: gpio::Instance,
}

/// Handle to one pin of a port. Several handles may refer to the same pin.
#[derive(Copy, Clone)]
pub struct Pin<'a> {
    n: u8,
    port: &'a GPIO,
}

impl<'a> GPIO {
    pub fn new(p: gpio::Instance) -> Self {
        GPIO { p }
    }

    pub fn pin(&'a self, n: u8) -> Pin<'a> {
        assert!(n < 16);
        Pin { n, port: self }
    }

    pub fn set(&'a self, n: u8) -> &Self {
        assert!(n < 16);
        write_reg!(gpio, self.p, BSRR, 1 << n);
        self
    }

    pub fn clear(&'a self, n: u8) -> &Self {
        assert!(n < 16);
        write_reg!(gpio, self.p, BSRR, 1 << (n + 16));
        self
    }

    pub fn set_mode(&'a self, n: u8, mode: u32) -> &Self {
        assert!(n < 16);
        let offset = n * 2;
        let mask = 0b11 << offset;
        let val = (mode << offset) & mask;
        modify_reg!(gpio, self.p, MODER, |r| (r & !mask) | val);
        self
    }

    pub fn set_mode_input(&'a self, n: u8) -> &Self {
        self.set_mode(n, gpio::MODER::MODER0::RW::Input)
    }

    pub fn set_mode_output(&'a self, n: u8) -> &Self {
        self.set_mode(n, gpio::MODER::MODER0::RW::Output)
    }

    pub fn set_mode_alternate(&'a self, n: u8) -> &Self {
        self.set_mode(n, gpio::MODER::MODER0::RW::Alternate)
    }

    pub fn set_otype(&'a self, n: u8, otype: u32) -> &Self {
        assert!(n < 16);
        let offset = n;
        let mask = 0b1 << offset;
        let val = (otype << offset) & mask;
        modify_reg!(gpio, self.p, OTYPER, |r| (r & !mask) | val);
        self
    }

    pub fn set_otype_pushpull(&'a self, n: u8) -> &Self {
        self.set_otype(n, gpio::OTYPER::OT0::RW::PushPull)
    }

    pub fn set_ospeed(&'a self, n: u8, ospeed: u32) -> &Self {
        assert!(n < 16);
        let offset = n * 2;
        let mask = 0b11 << offset;
        let val = (ospeed << offset) & mask;
        modify_reg!(gpio, self.p, OSPEEDR, |r| (r & !mask) | val);
        self
    }

    pub fn set_ospeed_low(&'a self, n: u8) -> &Self {
        self.set_ospeed(n, gpio::OSPEEDR::OSPEEDR0::RW::LowSpeed)
    }

    pub fn set_ospeed_high(&'a self, n: u8) -> &Self {
        self.set_ospeed(n, gpio::OSPEEDR::OSPEEDR0::RW::HighSpeed)
    }

    pub fn set_af(&'a self, n: u8, af: u32) -> &Self {
        assert!(n < 16);
        if n < 8 {
            let offset = n * 4;
            let mask = 0b1111 << offset;
            let val = (af << offset) & mask;
            modify_reg!(gpio, self.p, AFRL, |r| (r & !mask) | val);
        } else {
            let offset = (n - 8) * 4;
            let mask = 0b1111 << offset;
            let val = (af << offset) & mask;
            modify_reg!(gpio, self.p, AFRH, |r| (r & !mask) | val);
        }
        self
    }

    pub fn set_pull(&'a self, n: u8, pull: u32) -> &Self {
        let offset = n * 2;
        let mask = 0b11 << offset;
        let val = (pull << offset) & mask;
        modify_reg!(gpio, self.p, PUPDR, |r| (r & !mask) | val);
        self
    }

    pub fn set_pull_floating(&'a self, n: u8) -> &Self {
        self.set_pull(n, gpio::PUPDR::PUPDR0::RW::Floating)
    }

    pub fn set_pull_up(&'a self, n: u8) -> &Self {
        self.set_pull(n, gpio::PUPDR::PUPDR0::RW::PullUp)
    }
}

impl<'a> Pin<'a> {
    pub fn set_high(&self) -> &Self {
        self.port.set(self.n);
        self
    }

    pub fn set_low(&self) -> &Self {
        self.port.clear(self.n);
        self
    }

    pub fn set_bool(&self, state: bool) -> &Self {
        if state {
            self.set_high()
        } else {
            self.set_low()
        }
    }

    pub fn set_mode_input(&self) -> &Self {
        self.port.set_mode_input(self.n);
        self
    }

    pub fn set_mode_output(&self) -> &Self {
        self.port.set_mode_output(self.n);
        self
    }

    pub fn set_mode_alternate(&self) -> &Self {
        self.port.set_mode_alternate(self.n);
        self
    }

    pub fn set_otype_pushpull(&self) -> &Self {
        self.port.set_otype_pushpull(self.n);
        self
    }

    pub fn set_ospeed_low(&self) -> &Self {
        self.port.set_ospeed_low(self.n);
        self
    }

    pub fn set_ospeed_high(&self) -> &Self {
        self.port.set_ospeed_high(self.n);
        self
    }

    pub fn set_af(&self, af: u32) -> &Self {
        self.port.set_af(self.n, af);
        self
    }

    pub fn set_pull_floating(&self) -> &Self {
        self.port.set_pull_floating(self.n);
        self
    }

    pub fn set_pull_up(&self) -> &Self {
        self.port.set_pull_up(self.n);
        self
    }
}

impl<'a> ErrorType for Pin<'a> {
    type Error = Infallible;
}

impl<'a> OutputPin for Pin<'a> {
    fn set_low(&mut self) -> Result<(), Infallible> {
        Pin::set_low(self);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        Pin::set_high(self);
        Ok(())
    }
}

/// Programmer pinout.
pub struct Pins<'a> {
    pub led: Pin<'a>,
    pub tpwr_en: Pin<'a>,

    // Three-wire bootload lines. `clock` doubles as the calibration clock
    // output when TIM2 drives it.
    pub clock: Pin<'a>,
    pub data: Pin<'a>,
    pub enable: Pin<'a>,
    pub reset: Pin<'a>,
    pub tap: Pin<'a>,

    pub host_tx: Pin<'a>,
    pub host_rx: Pin<'a>,
    pub target_tx: Pin<'a>,
    pub target_rx: Pin<'a>,
}

impl<'a> Pins<'a> {
    /// Configure I/O pins
    pub fn setup(&self) {
        // Status LED, active low
        self.led.set_high().set_otype_pushpull().set_ospeed_low().set_mode_output();

        // Target power switch, off until the programmer is ready
        self.tpwr_en.set_low().set_otype_pushpull().set_ospeed_low().set_mode_output();

        // Bootload lines start driven low
        self.clock.set_low().set_otype_pushpull().set_ospeed_high().set_af(1).set_mode_output();
        self.data.set_low().set_otype_pushpull().set_ospeed_high().set_mode_output();
        self.enable.set_low().set_otype_pushpull().set_ospeed_high().set_mode_output();

        // Reset and tap float until they are needed
        self.reset.set_otype_pushpull().set_pull_floating().set_mode_input();
        self.tap.set_otype_pushpull().set_pull_floating().set_mode_input();

        // USART1 to the host, USART2 to the target, both AF7
        self.host_tx.set_af(7).set_otype_pushpull().set_ospeed_high().set_mode_alternate();
        self.host_rx.set_af(7).set_pull_up().set_mode_alternate();
        self.target_tx.set_af(7).set_otype_pushpull().set_ospeed_high().set_mode_alternate();
        self.target_rx.set_af(7).set_pull_up().set_mode_alternate();
    }
}
