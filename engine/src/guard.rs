// Copyright 2019 Adam Greig
// Dual licensed under the Apache 2.0 and MIT licenses.

use core::ops::{Deref, DerefMut};

use crate::board::{Board, IrqMask, Parts};

/// Host receive handler section.
///
/// The target receive source is masked when the section is entered, so
/// nothing from the target can reach the host transmitter while a host
/// event (or the bootload it triggers) is being handled. On exit it is
/// unmasked only if the bridge was left live; dropping the section without
/// calling [`HostRxSection::leave`] keeps it masked.
pub struct HostRxSection<'a, B: Board + ?Sized> {
    io: Parts<'a, B>,
    unmask: bool,
}

impl<'a, B: Board + ?Sized> HostRxSection<'a, B> {
    pub fn enter(io: Parts<'a, B>) -> Self {
        io.target_rx.mask();
        HostRxSection { io, unmask: false }
    }

    /// End the section, unmasking the target source if `bridge_live`.
    pub fn leave(mut self, bridge_live: bool) {
        self.unmask = bridge_live;
    }
}

impl<'a, B: Board + ?Sized> Deref for HostRxSection<'a, B> {
    type Target = Parts<'a, B>;

    fn deref(&self) -> &Parts<'a, B> {
        &self.io
    }
}

impl<'a, B: Board + ?Sized> DerefMut for HostRxSection<'a, B> {
    fn deref_mut(&mut self) -> &mut Parts<'a, B> {
        &mut self.io
    }
}

impl<'a, B: Board + ?Sized> Drop for HostRxSection<'a, B> {
    fn drop(&mut self) {
        if self.unmask {
            self.io.target_rx.unmask();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimBoard, Wire};

    #[test]
    fn masks_for_duration() {
        let wire = Wire::shared();
        let mut sim = SimBoard::new(&wire);
        let section = HostRxSection::enter(sim.parts());
        assert!(wire.borrow().target_masked);
        section.leave(true);
        assert!(!wire.borrow().target_masked);
    }

    #[test]
    fn stays_masked_without_bridge() {
        let wire = Wire::shared();
        let mut sim = SimBoard::new(&wire);
        HostRxSection::enter(sim.parts()).leave(false);
        assert!(wire.borrow().target_masked);
    }

    #[test]
    fn stays_masked_on_early_drop() {
        let wire = Wire::shared();
        let mut sim = SimBoard::new(&wire);
        wire.borrow_mut().target_masked = false;
        {
            let _section = HostRxSection::enter(sim.parts());
        }
        assert!(wire.borrow().target_masked);
    }
}
