// Copyright 2019 Adam Greig
// Dual licensed under the Apache 2.0 and MIT licenses.

/// Diagnostic event counts. Nothing depends on these for correctness.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Counters {
    pub task_loops: u32,
    pub host_events: u32,
    pub host_rx_errors: u32,
    pub host_bytes: u32,
    pub target_events: u32,
    pub target_bytes: u32,
    pub timer_events: u32,
    pub calibration_periods: u32,
    pub bootloads: u32,
}

impl Counters {
    pub const fn new() -> Self {
        Counters {
            task_loops: 0,
            host_events: 0,
            host_rx_errors: 0,
            host_bytes: 0,
            target_events: 0,
            target_bytes: 0,
            timer_events: 0,
            calibration_periods: 0,
            bootloads: 0,
        }
    }
}

/// Increment a counter, wrapping on overflow.
pub(crate) fn bump(counter: &mut u32) {
    *counter = counter.wrapping_add(1);
}
