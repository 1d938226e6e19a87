// Copyright 2019 Adam Greig
// Dual licensed under the Apache 2.0 and MIT licenses.

use crate::board::{Board, HostPort, Indicator, Parts};
use crate::bridge::Bridge;
use crate::calibration::{CalibrationClock, Period};
use crate::config::Config;
use crate::counters::{bump, Counters};
use crate::framer::{Command, CommandBuffer, Line};
use crate::guard::HostRxSection;
use crate::image::{Fill, FirmwareImage};
use crate::protocol::{MSG_3WB_COMPLETE, MSG_SRAM_LOAD_COMPLETE, MSG_SRAM_LOAD_READY};
use crate::state::ProgrammerState;
use crate::tap::{Tap, TapState};
use crate::transport::ThreeWire;
use crate::Result;

/// Programmer session.
///
/// Owns all mutable programmer state. Each hardware event is delivered by
/// calling the matching `on_*` method with exclusive access to the board,
/// so only one handler can touch the session at a time.
pub struct Session {
    config: Config,
    state: ProgrammerState,
    command: CommandBuffer,
    image: FirmwareImage,
    calibration: CalibrationClock,
    bridge: Bridge,
    tap: Tap,
    counters: Counters,
    host_seen: bool,
}

impl Session {
    pub const fn new(config: Config) -> Self {
        Session {
            config,
            state: ProgrammerState::WaitingForCommand,
            command: CommandBuffer::new(),
            image: FirmwareImage::new(),
            calibration: CalibrationClock::new(config.calibration),
            bridge: Bridge::new(),
            tap: Tap::new(),
            counters: Counters::new(),
            host_seen: false,
        }
    }

    /// Handle one byte received from the host.
    ///
    /// When the byte completes an image, or is the end of a `boot3wb`
    /// command, the whole bootload runs before this returns.
    pub fn on_host_byte<B: Board + ?Sized>(&mut self, board: &mut B, byte: u8) -> Result<()> {
        let mut io = HostRxSection::enter(board.parts());
        self.host_event();
        bump(&mut self.counters.host_bytes);
        let result = self.process_host_byte(&mut *io, byte);
        io.leave(self.bridge.is_live());
        result
    }

    /// Handle a framing, parity or overrun error on the host receive path.
    pub fn on_host_error<B: Board + ?Sized>(&mut self, board: &mut B) {
        let mut io = HostRxSection::enter(board.parts());
        self.host_event();
        bump(&mut self.counters.host_rx_errors);
        log::warn!("host receive error, restarting reception");
        io.host.recover_rx();
        io.leave(self.bridge.is_live());
    }

    /// Handle one byte received from the target.
    pub fn on_target_byte<B: Board + ?Sized>(&mut self, board: &mut B, byte: u8) {
        bump(&mut self.counters.target_events);
        let io = board.parts();
        if self.bridge.forward(io.host, byte) {
            bump(&mut self.counters.target_bytes);
        } else {
            log::trace!("dropped target byte {:02x}", byte);
        }
    }

    /// Handle the end of one calibration clock period.
    pub fn on_calibration_period<B: Board + ?Sized>(&mut self, board: &mut B) {
        bump(&mut self.counters.timer_events);
        let io = board.parts();
        match self.calibration.on_period(io.timer) {
            Period::Idle => (),
            Period::Running => bump(&mut self.counters.calibration_periods),
            Period::ReleaseTap => {
                bump(&mut self.counters.calibration_periods);
                self.tap.release(io.tap);
            },
            Period::Stopped => {
                bump(&mut self.counters.calibration_periods);
                self.tap.release(io.tap);
                // Start the next cycle from an empty buffer, dropping any
                // stray host bytes taken in since the bootload.
                self.command.clear();
                if self.state == ProgrammerState::LoadingImage && self.image.fill() != 0 {
                    log::debug!("discarding {} stray image bytes", self.image.fill());
                    self.image.rewind();
                }
            },
        }
    }

    /// Account for one pass of the main loop.
    pub fn on_idle(&mut self) {
        bump(&mut self.counters.task_loops);
    }

    pub fn state(&self) -> ProgrammerState {
        self.state
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn image(&self) -> &FirmwareImage {
        &self.image
    }

    pub fn command_len(&self) -> usize {
        self.command.len()
    }

    pub fn calibration(&self) -> &CalibrationClock {
        &self.calibration
    }

    pub fn bridge_live(&self) -> bool {
        self.bridge.is_live()
    }

    pub fn tap_state(&self) -> TapState {
        self.tap.state()
    }

    /// Bookkeeping common to every host event.
    fn host_event(&mut self) {
        bump(&mut self.counters.host_events);

        // Anything from the host closes the bridge until the next bootload.
        if self.bridge.is_live() {
            log::debug!("host active, closing target bridge");
            self.bridge.disable();
        }

        if !self.host_seen {
            self.host_seen = true;
            if self.config.load_on_first_byte &&
               self.state == ProgrammerState::WaitingForCommand
            {
                self.image.rewind();
                self.set_state(ProgrammerState::LoadingImage);
            }
        }
    }

    fn process_host_byte<B: Board + ?Sized>(&mut self, io: &mut Parts<'_, B>, byte: u8)
        -> Result<()>
    {
        match self.state {
            ProgrammerState::WaitingForCommand => self.frame(io, byte),
            ProgrammerState::LoadingImage => self.load(io, byte)?,
            state => {
                debug_assert!(!state.is_reserved(), "in reserved state {:?}", state);
                log::trace!("host byte ignored in {:?}", state);
            },
        }

        if self.state == ProgrammerState::ThreeWireBooting {
            self.start_bootload(io)?;
        }
        Ok(())
    }

    fn frame<B: Board + ?Sized>(&mut self, io: &mut Parts<'_, B>, byte: u8) {
        match self.command.push(byte) {
            Line::Incomplete => (),
            Line::Command(Command::TransferSram) => {
                self.command.clear();
                self.image.rewind();
                self.set_state(ProgrammerState::LoadingImage);
                send(&mut *io.host, MSG_SRAM_LOAD_READY);
            },
            Line::Command(Command::Boot3wb) => {
                self.command.clear();
                self.set_state(ProgrammerState::ThreeWireBooting);
            },
            line @ Line::Unrecognised | line @ Line::Overflow => {
                log::debug!("discarding command line: {:?}", line);
                self.command.clear();
                self.set_state(ProgrammerState::WaitingForCommand);
            },
        }
    }

    fn load<B: Board + ?Sized>(&mut self, io: &mut Parts<'_, B>, byte: u8) -> Result<()> {
        if self.image.push(byte)? == Fill::Complete {
            self.set_state(ProgrammerState::ImageLoadComplete);
            send(&mut *io.host, MSG_SRAM_LOAD_COMPLETE);
            self.command.clear();
            self.set_state(ProgrammerState::ThreeWireBooting);
        }
        Ok(())
    }

    /// Bootload the staged image, then start the calibration clock and
    /// open the target bridge.
    fn start_bootload<B: Board + ?Sized>(&mut self, io: &mut Parts<'_, B>) -> Result<()> {
        log::info!("starting three-wire bootload");

        // The calibration clock shares the bootload clock line.
        self.calibration.stop(&mut *io.timer);

        io.indicator.set(true);
        let result = self.transfer(io);
        io.indicator.set(false);

        if let Err(e) = result {
            log::error!("bootload failed: {:?}", e);
            self.command.clear();
            self.set_state(ProgrammerState::WaitingForCommand);
            return Err(e);
        }

        self.set_state(ProgrammerState::ThreeWireBootComplete);
        bump(&mut self.counters.bootloads);
        send(&mut *io.host, MSG_3WB_COMPLETE);

        self.image.rewind();
        self.command.clear();
        self.set_state(ProgrammerState::LoadingImage);

        self.tap.assert(&mut *io.tap);
        self.calibration.start(&mut *io.timer);
        self.bridge.enable();
        log::info!("bootload complete, target bridge open");
        Ok(())
    }

    fn transfer<B: Board + ?Sized>(&mut self, io: &mut Parts<'_, B>) -> Result<()> {
        let mut wire = ThreeWire::new(&mut *io.clock, &mut *io.data, &mut *io.enable,
                                      &mut *io.delay, self.config.bit_hold_ns);
        wire.idle()?;
        wire.hard_reset(&mut *io.reset, self.config.reset_pulse_ms);
        wire.load(self.image.as_bytes())
    }

    fn set_state(&mut self, state: ProgrammerState) {
        if state != self.state {
            log::debug!("{:?} -> {:?} (code {})", self.state, state, u8::from(state));
            self.state = state;
        }
    }
}

fn send<H: HostPort + ?Sized>(host: &mut H, msg: &[u8]) {
    for &byte in msg {
        host.send(byte);
    }
}
