// Copyright 2019 Adam Greig
// Dual licensed under the Apache 2.0 and MIT licenses.

//! Hardware the programmer needs, as seen by the engine.
//!
//! The three bootload lines are plain `embedded_hal` output pins and the
//! timing primitive is an `embedded_hal` delay. Lines with stricter rules
//! (reset, tap) and the peripherals with no `embedded_hal` counterpart get
//! their own small traits here.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

/// Target hard-reset line.
pub trait ResetLine {
    /// Drive the line low.
    fn assert_low(&mut self);
    /// Stop driving the line and leave it floating.
    fn release(&mut self);
}

/// One-shot tap line.
///
/// There is no way to drive this line low: the target treats any falling
/// edge on it as invalid.
pub trait TapPin {
    /// Set the output latch high without enabling the driver.
    fn latch_high(&mut self);
    /// Enable the output driver.
    fn enable_output(&mut self);
    /// Disable the output driver, leaving the line floating.
    fn disable_output(&mut self);
}

/// Serial link to the host.
pub trait HostPort {
    /// Load `byte` into the transmitter and return once transmission has started.
    fn send(&mut self, byte: u8);
    /// Discard whatever is in the receive path and restart reception.
    fn recover_rx(&mut self);
}

/// Enable control for the target serial receive event source.
pub trait IrqMask {
    fn mask(&mut self);
    fn unmask(&mut self);
}

/// Hardware timer producing the calibration clock on its output pin.
pub trait CalibrationTimer {
    /// Start a free-running counter whose compare events drive the output
    /// pin directly: low for `pulse_us` at the start of each period, high
    /// for the rest, restarting every `period_us`.
    fn start(&mut self, period_us: u32, pulse_us: u32);
    /// Stop the counter, disconnect it from the pin, and hand the pin back
    /// as an ordinary output.
    fn stop(&mut self);
}

/// Status indicator, lit while a bootload transfer runs.
pub trait Indicator {
    fn set(&mut self, on: bool);
}

/// Borrowed view of every peripheral a [`Board`] provides.
pub struct Parts<'a, B: Board + ?Sized> {
    pub clock: &'a mut B::Line,
    pub data: &'a mut B::Line,
    pub enable: &'a mut B::Line,
    pub reset: &'a mut B::Reset,
    pub tap: &'a mut B::Tap,
    pub delay: &'a mut B::Delay,
    pub host: &'a mut B::Host,
    pub target_rx: &'a mut B::TargetRx,
    pub timer: &'a mut B::Timer,
    pub indicator: &'a mut B::Indicator,
}

pub trait Board {
    type Line: OutputPin;
    type Reset: ResetLine;
    type Tap: TapPin;
    type Delay: DelayNs;
    type Host: HostPort;
    type TargetRx: IrqMask;
    type Timer: CalibrationTimer;
    type Indicator: Indicator;

    fn parts(&mut self) -> Parts<'_, Self>;
}
