// Copyright 2019 Adam Greig
// Dual licensed under the Apache 2.0 and MIT licenses.

//! `log` backend writing to an RTT up channel.

use log::{LevelFilter, Log, Metadata, Record};
use rtt_target::{rprintln, rtt_init_print};

static LOGGER: RttLog = RttLog;

struct RttLog;

/// Set up the RTT channel and install the logger.
///
/// Must only be called once.
pub fn init(level: LevelFilter) {
    // Non-blocking: messages are dropped if no debugger is reading.
    rtt_init_print!();
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

impl Log for RttLog {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        rprintln!("{:<5} {}: {}", record.level(), record.target(), record.args());
    }

    fn flush(&self) {}
}
