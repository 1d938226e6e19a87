// Copyright 2019 Adam Greig
// Dual licensed under the Apache 2.0 and MIT licenses.

//! Simulated board for exercising the engine on a host.
//!
//! All simulated peripherals share one [`Wire`], which records what the
//! target would have seen: the data and enable levels at every rising clock
//! edge, reset and tap activity, and bytes sent to the host. Time only
//! advances through the simulated delay.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, ErrorKind, ErrorType, OutputPin};

use crate::board::{Board, CalibrationTimer, HostPort, Indicator, IrqMask, Parts, ResetLine, TapPin};
use crate::{Config, Result, Session};

/// Data and enable levels latched by the target on a rising clock edge.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Sample {
    pub data: bool,
    pub enable: bool,
}

#[derive(Clone, Debug)]
pub struct Wire {
    pub clock: bool,
    pub data: bool,
    pub enable: bool,
    pub samples: Vec<Sample>,
    /// Set if the target receive source was ever unmasked at a clock edge.
    pub unmasked_during_transfer: bool,
    pub fail_lines: bool,

    pub elapsed_ns: u64,
    clock_rose_at: u64,
    /// Shortest time the clock was seen high.
    pub min_high_ns: u64,

    /// (time, released) for every reset line change.
    pub reset_log: Vec<(u64, bool)>,

    pub tap_latch: bool,
    pub tap_driven: bool,
    pub tap_driven_low: bool,
    pub tap_releases: u32,

    pub host_tx: Vec<u8>,
    pub host_recoveries: u32,
    pub target_masked: bool,

    pub timer_running: bool,
    pub timer_config: Option<(u32, u32)>,
    pub timer_starts: u32,
    pub timer_stops: u32,

    pub indicator: bool,
    pub indicator_log: Vec<bool>,
}

impl Wire {
    pub fn new() -> Self {
        Wire {
            clock: false,
            data: false,
            enable: false,
            samples: Vec::new(),
            unmasked_during_transfer: false,
            fail_lines: false,
            elapsed_ns: 0,
            clock_rose_at: 0,
            min_high_ns: u64::MAX,
            reset_log: Vec::new(),
            tap_latch: false,
            tap_driven: false,
            tap_driven_low: false,
            tap_releases: 0,
            host_tx: Vec::new(),
            host_recoveries: 0,
            target_masked: false,
            timer_running: false,
            timer_config: None,
            timer_starts: 0,
            timer_stops: 0,
            indicator: false,
            indicator_log: Vec::new(),
        }
    }

    pub fn shared() -> Rc<RefCell<Wire>> {
        Rc::new(RefCell::new(Wire::new()))
    }

    /// Reassemble the bytes the target latched, least significant bit first.
    pub fn decoded(&self) -> Vec<u8> {
        self.samples.chunks(8).map(|bits| {
            bits.iter().enumerate().fold(0u8, |acc, (i, s)| acc | ((s.data as u8) << i))
        }).collect()
    }

    /// Indices of the samples taken with enable high.
    pub fn strobes(&self) -> Vec<usize> {
        self.samples.iter().enumerate().filter(|(_, s)| s.enable).map(|(i, _)| i).collect()
    }

    /// True while the tap line is being driven high.
    pub fn tap_high(&self) -> bool {
        self.tap_driven && self.tap_latch
    }
}

impl Default for Wire {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LineId {
    Clock,
    Data,
    Enable,
}

#[derive(Debug)]
pub struct LineError;

impl digital::Error for LineError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

pub struct SimLine {
    wire: Rc<RefCell<Wire>>,
    id: LineId,
}

impl ErrorType for SimLine {
    type Error = LineError;
}

impl SimLine {
    fn set(&mut self, level: bool) -> core::result::Result<(), LineError> {
        let mut w = self.wire.borrow_mut();
        if w.fail_lines {
            return Err(LineError);
        }
        match self.id {
            LineId::Data => w.data = level,
            LineId::Enable => w.enable = level,
            LineId::Clock => {
                if level && !w.clock {
                    let sample = Sample { data: w.data, enable: w.enable };
                    w.samples.push(sample);
                    w.clock_rose_at = w.elapsed_ns;
                    if !w.target_masked {
                        w.unmasked_during_transfer = true;
                    }
                } else if !level && w.clock {
                    let high = w.elapsed_ns - w.clock_rose_at;
                    if high < w.min_high_ns {
                        w.min_high_ns = high;
                    }
                }
                w.clock = level;
            },
        }
        Ok(())
    }
}

impl OutputPin for SimLine {
    fn set_low(&mut self) -> core::result::Result<(), LineError> {
        self.set(false)
    }

    fn set_high(&mut self) -> core::result::Result<(), LineError> {
        self.set(true)
    }
}

pub struct SimDelay(Rc<RefCell<Wire>>);

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.borrow_mut().elapsed_ns += ns as u64;
    }
}

pub struct SimReset(Rc<RefCell<Wire>>);

impl ResetLine for SimReset {
    fn assert_low(&mut self) {
        let mut w = self.0.borrow_mut();
        let t = w.elapsed_ns;
        w.reset_log.push((t, false));
    }

    fn release(&mut self) {
        let mut w = self.0.borrow_mut();
        let t = w.elapsed_ns;
        w.reset_log.push((t, true));
    }
}

pub struct SimTap(Rc<RefCell<Wire>>);

impl TapPin for SimTap {
    fn latch_high(&mut self) {
        self.0.borrow_mut().tap_latch = true;
    }

    fn enable_output(&mut self) {
        let mut w = self.0.borrow_mut();
        if !w.tap_latch {
            w.tap_driven_low = true;
        }
        w.tap_driven = true;
    }

    fn disable_output(&mut self) {
        let mut w = self.0.borrow_mut();
        w.tap_driven = false;
        w.tap_releases += 1;
    }
}

pub struct SimHost(Rc<RefCell<Wire>>);

impl HostPort for SimHost {
    fn send(&mut self, byte: u8) {
        self.0.borrow_mut().host_tx.push(byte);
    }

    fn recover_rx(&mut self) {
        self.0.borrow_mut().host_recoveries += 1;
    }
}

pub struct SimIrq(Rc<RefCell<Wire>>);

impl IrqMask for SimIrq {
    fn mask(&mut self) {
        self.0.borrow_mut().target_masked = true;
    }

    fn unmask(&mut self) {
        self.0.borrow_mut().target_masked = false;
    }
}

pub struct SimTimer(Rc<RefCell<Wire>>);

impl CalibrationTimer for SimTimer {
    fn start(&mut self, period_us: u32, pulse_us: u32) {
        let mut w = self.0.borrow_mut();
        w.timer_running = true;
        w.timer_config = Some((period_us, pulse_us));
        w.timer_starts += 1;
    }

    fn stop(&mut self) {
        let mut w = self.0.borrow_mut();
        w.timer_running = false;
        w.timer_stops += 1;
    }
}

pub struct SimIndicator(Rc<RefCell<Wire>>);

impl Indicator for SimIndicator {
    fn set(&mut self, on: bool) {
        let mut w = self.0.borrow_mut();
        w.indicator = on;
        w.indicator_log.push(on);
    }
}

pub struct SimBoard {
    pub clock: SimLine,
    pub data: SimLine,
    pub enable: SimLine,
    pub reset: SimReset,
    pub tap: SimTap,
    pub delay: SimDelay,
    pub host: SimHost,
    pub target_rx: SimIrq,
    pub timer: SimTimer,
    pub indicator: SimIndicator,
}

impl SimBoard {
    pub fn new(wire: &Rc<RefCell<Wire>>) -> Self {
        let line = |id| SimLine { wire: wire.clone(), id };
        SimBoard {
            clock: line(LineId::Clock),
            data: line(LineId::Data),
            enable: line(LineId::Enable),
            reset: SimReset(wire.clone()),
            tap: SimTap(wire.clone()),
            delay: SimDelay(wire.clone()),
            host: SimHost(wire.clone()),
            target_rx: SimIrq(wire.clone()),
            timer: SimTimer(wire.clone()),
            indicator: SimIndicator(wire.clone()),
        }
    }
}

impl Board for SimBoard {
    type Line = SimLine;
    type Reset = SimReset;
    type Tap = SimTap;
    type Delay = SimDelay;
    type Host = SimHost;
    type TargetRx = SimIrq;
    type Timer = SimTimer;
    type Indicator = SimIndicator;

    fn parts(&mut self) -> Parts<'_, Self> {
        Parts {
            clock: &mut self.clock,
            data: &mut self.data,
            enable: &mut self.enable,
            reset: &mut self.reset,
            tap: &mut self.tap,
            delay: &mut self.delay,
            host: &mut self.host,
            target_rx: &mut self.target_rx,
            timer: &mut self.timer,
            indicator: &mut self.indicator,
        }
    }
}

/// A session on a simulated board, with event delivery that follows the
/// firmware's dispatch rules: target bytes stay pending while the target
/// source is masked.
pub struct SimProgrammer {
    pub session: Box<Session>,
    pub board: SimBoard,
    pub wire: Rc<RefCell<Wire>>,
    pending_target: VecDeque<u8>,
}

impl SimProgrammer {
    pub fn new(config: Config) -> Self {
        let wire = Wire::shared();
        let board = SimBoard::new(&wire);
        // The firmware starts with the target source masked.
        wire.borrow_mut().target_masked = true;
        SimProgrammer {
            session: Box::new(Session::new(config)),
            board,
            wire,
            pending_target: VecDeque::new(),
        }
    }

    /// Deliver bytes from the host, one event per byte.
    pub fn host_write(&mut self, data: &[u8]) -> Result<()> {
        for &byte in data {
            self.session.on_host_byte(&mut self.board, byte)?;
            self.service_target();
        }
        Ok(())
    }

    pub fn host_error(&mut self) {
        self.session.on_host_error(&mut self.board);
        self.service_target();
    }

    /// Bytes arriving from the target. They are delivered at once if the
    /// target source is unmasked, otherwise they wait.
    pub fn target_write(&mut self, data: &[u8]) {
        self.pending_target.extend(data.iter().copied());
        self.service_target();
    }

    pub fn pending_target(&self) -> usize {
        self.pending_target.len()
    }

    /// Run `n` calibration periods, stopping early if the timer stops.
    pub fn calibration_periods(&mut self, n: u32) {
        for _ in 0..n {
            if !self.wire.borrow().timer_running {
                break;
            }
            self.session.on_calibration_period(&mut self.board);
        }
    }

    /// Take everything sent to the host so far.
    pub fn take_host_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.wire.borrow_mut().host_tx)
    }

    fn service_target(&mut self) {
        while !self.wire.borrow().target_masked {
            match self.pending_target.pop_front() {
                Some(byte) => self.session.on_target_byte(&mut self.board, byte),
                None => break,
            }
        }
    }
}
