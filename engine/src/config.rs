// Copyright 2019 Adam Greig
// Dual licensed under the Apache 2.0 and MIT licenses.

/// Calibration clock settings.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CalibrationConfig {
    /// Full period of the calibration clock, in microseconds.
    pub period_us: u32,
    /// Width of the low pulse at the start of each period, in microseconds.
    pub pulse_us: u32,
    /// The tap line is released once more than this many periods have elapsed.
    pub tap_release_after: u32,
    /// The clock stops once more than this many periods have elapsed.
    pub stop_after: u32,
}

impl CalibrationConfig {
    pub const DEFAULT: CalibrationConfig = CalibrationConfig {
        period_us: 100_000,
        pulse_us: 20,
        tap_release_after: 10,
        stop_after: 120,
    };
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Programmer configuration.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Duration the reset line is held low, and then left floating, before a transfer.
    pub reset_pulse_ms: u32,
    /// Minimum hold time between bootload line transitions, in nanoseconds.
    pub bit_hold_ns: u32,
    pub calibration: CalibrationConfig,
    /// Treat the very first host event as the start of an image load, so a host
    /// can stream a raw image without sending `transfersram` first.
    pub load_on_first_byte: bool,
}

impl Config {
    pub const DEFAULT: Config = Config {
        reset_pulse_ms: 14,
        bit_hold_ns: 1_000,
        calibration: CalibrationConfig::DEFAULT,
        load_on_first_byte: false,
    };

    pub const fn new() -> Self {
        Self::DEFAULT
    }

    pub const fn load_on_first_byte(mut self, enabled: bool) -> Self {
        self.load_on_first_byte = enabled;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}
