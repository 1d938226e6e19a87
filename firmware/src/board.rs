// Copyright 2019 Adam Greig
// Dual licensed under the Apache 2.0 and MIT licenses.

use twb_engine::board::{self, CalibrationTimer, HostPort, Indicator, IrqMask, Parts, ResetLine, TapPin};

use crate::hal;
use crate::hal::gpio::Pin;

/// Open-drain style reset: driven low or left floating.
pub struct Reset<'a>(pub Pin<'a>);

impl<'a> ResetLine for Reset<'a> {
    fn assert_low(&mut self) {
        self.0.set_low().set_mode_output();
    }

    fn release(&mut self) {
        self.0.set_mode_input();
    }
}

/// Tap line. The output register is only ever written high.
pub struct Tap<'a>(pub Pin<'a>);

impl<'a> TapPin for Tap<'a> {
    fn latch_high(&mut self) {
        self.0.set_high();
    }

    fn enable_output(&mut self) {
        self.0.set_mode_output();
    }

    fn disable_output(&mut self) {
        self.0.set_mode_input();
    }
}

/// Active-low status LED.
pub struct Led<'a>(pub Pin<'a>);

impl<'a> Indicator for Led<'a> {
    fn set(&mut self, on: bool) {
        self.0.set_bool(!on);
    }
}

pub struct HostUart(pub hal::uart::UART);

impl HostPort for HostUart {
    fn send(&mut self, byte: u8) {
        self.0.write(byte);
    }

    fn recover_rx(&mut self) {
        self.0.flush_rx();
    }
}

pub struct TargetUart(pub hal::uart::UART);

impl IrqMask for TargetUart {
    fn mask(&mut self) {
        self.0.unlisten();
    }

    fn unmask(&mut self) {
        self.0.listen();
    }
}

pub struct CalTimer<'a>(pub hal::timer::PulseTimer<'a>);

impl<'a> CalibrationTimer for CalTimer<'a> {
    fn start(&mut self, period_us: u32, pulse_us: u32) {
        self.0.start(period_us, pulse_us);
    }

    fn stop(&mut self) {
        self.0.stop();
    }
}

/// Everything the programmer drives, owned in one place.
pub struct Board<'a> {
    pub clock: Pin<'a>,
    pub data: Pin<'a>,
    pub enable: Pin<'a>,
    pub reset: Reset<'a>,
    pub tap: Tap<'a>,
    pub delay: hal::delay::Delay,
    pub host: HostUart,
    pub target: TargetUart,
    pub timer: CalTimer<'a>,
    pub led: Led<'a>,
}

impl<'a> board::Board for Board<'a> {
    type Line = Pin<'a>;
    type Reset = Reset<'a>;
    type Tap = Tap<'a>;
    type Delay = hal::delay::Delay;
    type Host = HostUart;
    type TargetRx = TargetUart;
    type Timer = CalTimer<'a>;
    type Indicator = Led<'a>;

    fn parts(&mut self) -> Parts<'_, Self> {
        Parts {
            clock: &mut self.clock,
            data: &mut self.data,
            enable: &mut self.enable,
            reset: &mut self.reset,
            tap: &mut self.tap,
            delay: &mut self.delay,
            host: &mut self.host,
            target_rx: &mut self.target,
            timer: &mut self.timer,
            indicator: &mut self.led,
        }
    }
}
