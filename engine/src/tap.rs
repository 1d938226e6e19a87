// Copyright 2019 Adam Greig
// Dual licensed under the Apache 2.0 and MIT licenses.

use crate::board::TapPin;

/// Tap line state. Transitions only go forwards, except that a released
/// line may be driven high again by a later bootload.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TapState {
    /// Never driven since power-on.
    Floating,
    /// Output enabled with the latch high.
    DrivenHigh,
    /// Output disabled again; the latch is still high.
    Released,
}

pub struct Tap {
    state: TapState,
}

impl Tap {
    pub const fn new() -> Self {
        Tap { state: TapState::Floating }
    }

    pub fn state(&self) -> TapState {
        self.state
    }

    /// Drive the tap line high.
    ///
    /// The latch is set before the driver is enabled so the line goes
    /// straight from floating to high.
    pub fn assert<P: TapPin>(&mut self, pin: &mut P) {
        pin.latch_high();
        pin.enable_output();
        self.state = TapState::DrivenHigh;
    }

    /// Stop driving the tap line. Does nothing unless it is driven.
    pub fn release<P: TapPin>(&mut self, pin: &mut P) {
        if self.state == TapState::DrivenHigh {
            pin.disable_output();
            self.state = TapState::Released;
        }
    }
}

impl Default for Tap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimBoard, Wire};

    #[test]
    fn latch_before_drive() {
        let wire = Wire::shared();
        let mut sim = SimBoard::new(&wire);
        let mut tap = Tap::new();
        assert_eq!(tap.state(), TapState::Floating);
        tap.assert(&mut sim.tap);
        assert_eq!(tap.state(), TapState::DrivenHigh);
        let w = wire.borrow();
        assert!(w.tap_latch && w.tap_driven);
        assert!(!w.tap_driven_low);
    }

    #[test]
    fn release_only_when_driven() {
        let wire = Wire::shared();
        let mut sim = SimBoard::new(&wire);
        let mut tap = Tap::new();
        tap.release(&mut sim.tap);
        assert_eq!(tap.state(), TapState::Floating);
        assert_eq!(wire.borrow().tap_releases, 0);

        tap.assert(&mut sim.tap);
        tap.release(&mut sim.tap);
        tap.release(&mut sim.tap);
        assert_eq!(tap.state(), TapState::Released);
        assert_eq!(wire.borrow().tap_releases, 1);
        assert!(wire.borrow().tap_latch);

        tap.assert(&mut sim.tap);
        assert_eq!(tap.state(), TapState::DrivenHigh);
        assert!(!wire.borrow().tap_driven_low);
    }
}
