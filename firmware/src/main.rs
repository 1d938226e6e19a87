// Copyright 2019 Adam Greig
// Dual licensed under the Apache 2.0 and MIT licenses.

#![no_std]
#![no_main]

extern crate panic_halt;
use cortex_m_rt::entry;
use git_version::git_version;

use twb_engine::{Config, Session};

pub mod hal;
pub mod board;
pub mod app;
pub mod rttlog;

const GIT_VERSION: &str = git_version!(fallback = "unknown");

// Too large for the stack, so it lives in .bss from reset.
static mut SESSION: Session = Session::new(Config::DEFAULT);

#[entry]
fn main() -> ! {
    rttlog::init(log::LevelFilter::Info);
    log::info!("twb_firmware {}", GIT_VERSION);

    let flash = hal::flash::Flash::new(stm32ral::flash::FLASH::take().unwrap());
    let rcc = hal::rcc::RCC::new(stm32ral::rcc::RCC::take().unwrap());
    let nvic = hal::nvic::NVIC::new(stm32ral::nvic::NVIC::take().unwrap(),
                                    stm32ral::scb::SCB::take().unwrap());
    let gpioa = hal::gpio::GPIO::new(stm32ral::gpio::GPIOA::take().unwrap());
    let gpiob = hal::gpio::GPIO::new(stm32ral::gpio::GPIOB::take().unwrap());
    let gpioc = hal::gpio::GPIO::new(stm32ral::gpio::GPIOC::take().unwrap());
    let usart1 = hal::uart::UART::new(stm32ral::usart::USART1::take().unwrap());
    let usart2 = hal::uart::UART::new(stm32ral::usart::USART2::take().unwrap());
    let tim2 = stm32ral::tim2::TIM2::take().unwrap();

    // Define pinout
    let pins = hal::gpio::Pins {
        led: gpioc.pin(13),
        tpwr_en: gpiob.pin(7),

        clock: gpioa.pin(5),
        data: gpioa.pin(7),
        enable: gpioa.pin(6),
        reset: gpioa.pin(4),
        tap: gpiob.pin(4),

        host_tx: gpioa.pin(9),
        host_rx: gpioa.pin(10),
        target_tx: gpioa.pin(2),
        target_rx: gpioa.pin(3),
    };

    let board = board::Board {
        clock: pins.clock,
        data: pins.data,
        enable: pins.enable,
        reset: board::Reset(pins.reset),
        tap: board::Tap(pins.tap),
        delay: hal::delay::Delay::new(hal::rcc::SYSCLK_HZ),
        host: board::HostUart(usart1),
        target: board::TargetUart(usart2),
        timer: board::CalTimer(hal::timer::PulseTimer::new(
            tim2, pins.clock, hal::rcc::TIM2_CLK_HZ)),
        led: board::Led(pins.led),
    };

    // Safe: `main` runs once and nothing else refers to SESSION.
    let session = unsafe { &mut *core::ptr::addr_of_mut!(SESSION) };

    let mut app = app::App::new(&flash, &rcc, &nvic, &pins, board, session);
    app.setup();
    log::info!("ready, host at {} baud", app::HOST_BAUD);

    loop {
        app.poll();
    }
}
