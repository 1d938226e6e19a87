// Copyright 2019 Adam Greig
// Dual licensed under the Apache 2.0 and MIT licenses.

use crate::board::CalibrationTimer;
use crate::config::CalibrationConfig;

/// What the session has to do after a calibration period.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Period {
    /// The clock was not running; a stale timer event.
    Idle,
    Running,
    /// Past the tap threshold: the tap line should be released.
    ReleaseTap,
    /// Past the stop threshold: the clock has stopped.
    Stopped,
}

/// Calibration clock generator.
///
/// Edges are produced by the timer hardware; this only counts periods and
/// decides when to release the tap and when to stop.
pub struct CalibrationClock {
    config: CalibrationConfig,
    periods: u32,
    running: bool,
}

impl CalibrationClock {
    pub const fn new(config: CalibrationConfig) -> Self {
        CalibrationClock { config, periods: 0, running: false }
    }

    /// (Re)start the clock from a zero period count.
    pub fn start<T: CalibrationTimer>(&mut self, timer: &mut T) {
        self.periods = 0;
        self.running = true;
        timer.start(self.config.period_us, self.config.pulse_us);
        log::debug!("calibration clock started, {}us period", self.config.period_us);
    }

    /// Stop the clock. Safe to call when already stopped.
    pub fn stop<T: CalibrationTimer>(&mut self, timer: &mut T) {
        if self.running {
            timer.stop();
            self.running = false;
        }
        self.periods = 0;
    }

    /// Account for one full period of the clock.
    pub fn on_period<T: CalibrationTimer>(&mut self, timer: &mut T) -> Period {
        if !self.running {
            return Period::Idle;
        }

        self.periods += 1;
        if self.periods > self.config.stop_after {
            log::info!("calibration clock stopped after {} periods", self.periods - 1);
            self.stop(timer);
            Period::Stopped
        } else if self.periods > self.config.tap_release_after {
            Period::ReleaseTap
        } else {
            Period::Running
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Periods elapsed since the last start.
    pub fn periods(&self) -> u32 {
        self.periods
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimBoard, Wire};

    #[test]
    fn thresholds() {
        let wire = Wire::shared();
        let mut sim = SimBoard::new(&wire);
        let mut clk = CalibrationClock::new(CalibrationConfig::DEFAULT);
        clk.start(&mut sim.timer);
        assert_eq!(wire.borrow().timer_config, Some((100_000, 20)));

        for _ in 0..10 {
            assert_eq!(clk.on_period(&mut sim.timer), Period::Running);
        }
        assert_eq!(clk.on_period(&mut sim.timer), Period::ReleaseTap);
        assert_eq!(clk.periods(), 11);

        for _ in 11..120 {
            assert_eq!(clk.on_period(&mut sim.timer), Period::ReleaseTap);
        }
        assert!(clk.is_running());
        assert_eq!(clk.on_period(&mut sim.timer), Period::Stopped);
        assert!(!clk.is_running());
        assert_eq!(clk.periods(), 0);
        assert!(!wire.borrow().timer_running);
        assert_eq!(clk.on_period(&mut sim.timer), Period::Idle);
    }

    #[test]
    fn stop_is_idempotent() {
        let wire = Wire::shared();
        let mut sim = SimBoard::new(&wire);
        let mut clk = CalibrationClock::new(CalibrationConfig::DEFAULT);
        clk.stop(&mut sim.timer);
        assert_eq!(wire.borrow().timer_stops, 0);
        clk.start(&mut sim.timer);
        clk.stop(&mut sim.timer);
        clk.stop(&mut sim.timer);
        assert_eq!(wire.borrow().timer_stops, 1);
    }

    #[test]
    fn restart_resets_count() {
        let wire = Wire::shared();
        let mut sim = SimBoard::new(&wire);
        let mut clk = CalibrationClock::new(CalibrationConfig::DEFAULT);
        clk.start(&mut sim.timer);
        for _ in 0..50 {
            clk.on_period(&mut sim.timer);
        }
        clk.start(&mut sim.timer);
        assert_eq!(clk.periods(), 0);
        assert_eq!(clk.on_period(&mut sim.timer), Period::Running);
    }
}
