// Copyright 2019 Adam Greig
// Dual licensed under the Apache 2.0 and MIT licenses.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};

use crate::board::ResetLine;
use crate::{Error, Result};

/// Bytes per bootload word. The enable line strobes once per word.
pub const WORD_BYTES: usize = 4;

/// Bit-banged three-wire bootload transport.
pub struct ThreeWire<'a, L, D> {
    clock: &'a mut L,
    data: &'a mut L,
    enable: &'a mut L,
    delay: &'a mut D,
    hold_ns: u32,
}

impl<'a, L: OutputPin, D: DelayNs> ThreeWire<'a, L, D> {
    pub fn new(clock: &'a mut L, data: &'a mut L, enable: &'a mut L, delay: &'a mut D,
               hold_ns: u32) -> Self
    {
        ThreeWire { clock, data, enable, delay, hold_ns }
    }

    /// Drive all three lines low.
    pub fn idle(&mut self) -> Result<()> {
        drive(self.clock, false)?;
        drive(self.data, false)?;
        drive(self.enable, false)
    }

    /// Hold the target in reset for `pulse_ms`, then release it and wait
    /// another `pulse_ms` before any data is clocked.
    pub fn hard_reset<R: ResetLine>(&mut self, reset: &mut R, pulse_ms: u32) {
        reset.assert_low();
        self.delay.delay_ms(pulse_ms);
        reset.release();
        self.delay.delay_ms(pulse_ms);
    }

    /// Clock out `image` in address order, each byte least significant bit
    /// first, strobing enable on the last bit of every 32-bit word.
    pub fn load(&mut self, image: &[u8]) -> Result<()> {
        for (idx, byte) in image.iter().enumerate() {
            let word_end = (idx + 1) % WORD_BYTES == 0;
            for bit in 0..8 {
                let level = (byte >> bit) & 1 == 1;
                self.clock_bit(level, word_end && bit == 7)?;
            }
        }
        Ok(())
    }

    fn clock_bit(&mut self, level: bool, strobe: bool) -> Result<()> {
        drive(self.data, level)?;
        self.delay.delay_ns(self.hold_ns);
        drive(self.enable, strobe)?;
        self.delay.delay_ns(self.hold_ns);
        drive(self.clock, true)?;
        self.delay.delay_ns(self.hold_ns);
        drive(self.clock, false)?;
        self.delay.delay_ns(self.hold_ns);
        Ok(())
    }
}

fn drive<L: OutputPin>(line: &mut L, high: bool) -> Result<()> {
    line.set_state(PinState::from(high)).map_err(|_| Error::Line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Sample, Wire};

    fn run(image: &[u8]) -> Wire {
        let wire = Wire::shared();
        let mut sim = crate::sim::SimBoard::new(&wire);
        {
            let mut tw = ThreeWire::new(&mut sim.clock, &mut sim.data, &mut sim.enable,
                                        &mut sim.delay, 1_000);
            tw.idle().unwrap();
            tw.load(image).unwrap();
        }
        let w = wire.borrow().clone();
        w
    }

    #[test]
    fn bits_lsb_first() {
        let w = run(&[0b1011_0001]);
        let data: Vec<bool> = w.samples.iter().map(|s| s.data).collect();
        assert_eq!(data, vec![true, false, false, false, true, true, false, true]);
    }

    #[test]
    fn strobe_once_per_word() {
        let image: Vec<u8> = (0..12u8).collect();
        let w = run(&image);
        assert_eq!(w.samples.len(), 12 * 8);
        let strobes: Vec<usize> = w.samples.iter().enumerate()
            .filter(|(_, s)| s.enable).map(|(i, _)| i).collect();
        assert_eq!(strobes, vec![31, 63, 95]);
    }

    #[test]
    fn partial_word_not_strobed() {
        let w = run(&[0xFF; 6]);
        assert_eq!(w.samples.iter().filter(|s| s.enable).count(), 1);
        assert_eq!(w.samples[31], Sample { data: true, enable: true });
    }

    #[test]
    fn hold_times() {
        let w = run(&[0x00]);
        // Four holds of 1us per bit.
        assert_eq!(w.elapsed_ns, 8 * 4 * 1_000);
        assert!(w.min_high_ns >= 1_000);
    }

    #[test]
    fn hard_reset_pulse() {
        let wire = Wire::shared();
        let mut sim = crate::sim::SimBoard::new(&wire);
        {
            let mut tw = ThreeWire::new(&mut sim.clock, &mut sim.data, &mut sim.enable,
                                        &mut sim.delay, 1_000);
            tw.hard_reset(&mut sim.reset, 14);
        }
        let w = wire.borrow();
        assert_eq!(w.reset_log, vec![(0, false), (14_000_000, true)]);
        assert_eq!(w.elapsed_ns, 28_000_000);
    }

    #[test]
    fn line_error_propagates() {
        let wire = Wire::shared();
        let mut sim = crate::sim::SimBoard::new(&wire);
        wire.borrow_mut().fail_lines = true;
        let mut tw = ThreeWire::new(&mut sim.clock, &mut sim.data, &mut sim.enable,
                                    &mut sim.delay, 1_000);
        assert_eq!(tw.load(&[1]), Err(Error::Line));
    }
}
