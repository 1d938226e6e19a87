// Copyright 2019 Adam Greig
// Dual licensed under the Apache 2.0 and MIT licenses.

//! Protocol engine for a three-wire bootload programmer.
//!
//! The programmer receives a 64kB image from a host over a serial link,
//! bit-bangs it into a target over clock, data and enable lines, then runs
//! a calibration clock for the target and echoes the target's serial output
//! back to the host.
//!
//! Everything here is hardware-agnostic: a [`board::Board`] implementation
//! supplies the GPIO lines, delays, serial ports and timer, and a
//! [`session::Session`] is driven by calling its event handlers as the
//! corresponding hardware events occur.

#![cfg_attr(not(any(test, feature = "sim")), no_std)]

pub mod board;
pub mod bridge;
pub mod calibration;
pub mod config;
pub mod counters;
pub mod framer;
pub mod guard;
pub mod image;
pub mod protocol;
pub mod session;
pub mod state;
pub mod tap;
pub mod transport;

#[cfg(any(test, feature = "sim"))]
pub mod sim;

#[cfg(test)]
mod tests;

pub use board::{Board, Parts};
pub use config::{CalibrationConfig, Config};
pub use image::IMAGE_SIZE;
pub use session::Session;
pub use state::ProgrammerState;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// A bootload GPIO line refused to change level.
    Line,
    /// An image byte arrived with the staging buffer already full.
    ImageOverrun,
}

pub type Result<T> = core::result::Result<T, Error>;
