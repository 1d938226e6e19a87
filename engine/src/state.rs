// Copyright 2019 Adam Greig
// Dual licensed under the Apache 2.0 and MIT licenses.

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Programmer state.
///
/// The discriminants are the status codes reported in diagnostics.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
pub enum ProgrammerState {
    WaitingForCommand = 0,
    LoadingImage = 1,
    ImageLoadComplete = 2,
    ThreeWireBooting = 3,
    /// Reserved, never entered.
    OpticalBooting = 4,
    ThreeWireBootComplete = 5,
    /// Reserved, never entered.
    OpticalBootComplete = 6,
    /// Reserved, never entered.
    Debug = 38,
    /// Reserved, never entered.
    Error = 0xFF,
}

impl ProgrammerState {
    /// True for the states no transition ever leads to.
    pub fn is_reserved(self) -> bool {
        matches!(self,
                 ProgrammerState::OpticalBooting | ProgrammerState::OpticalBootComplete |
                 ProgrammerState::Debug | ProgrammerState::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::ProgrammerState;
    use core::convert::TryFrom;

    #[test]
    fn status_codes() {
        assert_eq!(u8::from(ProgrammerState::WaitingForCommand), 0);
        assert_eq!(u8::from(ProgrammerState::ThreeWireBootComplete), 5);
        assert_eq!(u8::from(ProgrammerState::Debug), 38);
        assert_eq!(ProgrammerState::try_from(3), Ok(ProgrammerState::ThreeWireBooting));
        assert_eq!(ProgrammerState::try_from(0xFF), Ok(ProgrammerState::Error));
        assert!(ProgrammerState::try_from(7).is_err());
    }

    #[test]
    fn reserved_states() {
        assert!(ProgrammerState::OpticalBooting.is_reserved());
        assert!(ProgrammerState::Error.is_reserved());
        assert!(!ProgrammerState::LoadingImage.is_reserved());
    }
}
