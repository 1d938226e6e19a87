// Copyright 2019 Adam Greig
// Dual licensed under the Apache 2.0 and MIT licenses.

use twb_engine::board::IrqMask;
use twb_engine::Session;

use crate::board::Board;
use crate::hal;
use crate::hal::uart::Rx;

/// USART1 to the host.
pub const HOST_BAUD: u32 = 250_000;
/// USART2 from the target.
pub const TARGET_BAUD: u32 = 19_200;

pub struct App<'a> {
    flash: &'a hal::flash::Flash,
    rcc: &'a hal::rcc::RCC,
    nvic: &'a hal::nvic::NVIC,
    pins: &'a hal::gpio::Pins<'a>,
    board: Board<'a>,
    session: &'a mut Session,
}

impl<'a> App<'a> {
    pub fn new(flash: &'a hal::flash::Flash, rcc: &'a hal::rcc::RCC, nvic: &'a hal::nvic::NVIC,
               pins: &'a hal::gpio::Pins<'a>, board: Board<'a>, session: &'a mut Session)
        -> Self
    {
        App { flash, rcc, nvic, pins, board, session }
    }

    pub fn setup(&mut self) {
        // Configure flash latency for 96MHz
        self.flash.setup();
        // Configure system clock to PLL from HSE and enable peripheral clocks
        self.rcc.setup();
        // Enable SEVONPEND
        self.nvic.setup();
        // Configure GPIOs
        self.pins.setup();
        // Configure serial ports. Only the host port may raise events until
        // the first bootload opens the target bridge.
        self.board.host.0.setup(hal::rcc::PCLK2_HZ, HOST_BAUD);
        self.board.target.0.setup(hal::rcc::PCLK1_HZ, TARGET_BAUD);
        self.board.host.0.listen();
        self.board.target.mask();

        // Power the target
        self.pins.tpwr_en.set_high();
    }

    /// Handle at most one pending event, or sleep until one arrives.
    ///
    /// The host port is always checked first, and the target port is only
    /// able to pend while the bridge is open, so the host handler always
    /// runs to completion before any target byte is considered.
    pub fn poll(&mut self) {
        if self.nvic.usart1_pending() {
            match self.board.host.0.receive() {
                Rx::Byte(byte) => {
                    if let Err(e) = self.session.on_host_byte(&mut self.board, byte) {
                        log::warn!("host byte {:02x} not handled: {:?}", byte, e);
                    }
                },
                Rx::Error => self.session.on_host_error(&mut self.board),
                Rx::Empty => (),
            }
            self.nvic.unpend_usart1();
        } else if self.nvic.usart2_pending() {
            match self.board.target.0.receive() {
                Rx::Byte(byte) => self.session.on_target_byte(&mut self.board, byte),
                Rx::Error => log::debug!("target receive error"),
                Rx::Empty => (),
            }
            self.nvic.unpend_usart2();
        } else if self.nvic.tim2_pending() {
            if self.board.timer.0.clear_update() {
                self.session.on_calibration_period(&mut self.board);
            }
            self.nvic.unpend_tim2();
        } else {
            self.session.on_idle();
            // Sleep until an interrupt occurs
            cortex_m::asm::wfe();
        }
    }
}
