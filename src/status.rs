// Author: Lukas Bower
// Purpose: Map command line outcomes onto the UEFI status codes the stub returns.

//! UEFI status codes surfaced by the stub after a merge.

use core::fmt;

const ERROR_BIT: usize = 1 << (usize::BITS - 1);

/// Subset of `EFI_STATUS` values the command line gate can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// `EFI_SUCCESS`.
    Success,
    /// `EFI_INVALID_PARAMETER`.
    InvalidParameter,
    /// `EFI_OUT_OF_RESOURCES`.
    OutOfResources,
    /// `EFI_SECURITY_VIOLATION`.
    SecurityViolation,
}

impl Status {
    /// Raw `EFI_STATUS` value for the native word size.
    #[must_use]
    pub const fn raw(self) -> usize {
        match self {
            Self::Success => 0,
            Self::InvalidParameter => ERROR_BIT | 2,
            Self::OutOfResources => ERROR_BIT | 9,
            Self::SecurityViolation => ERROR_BIT | 26,
        }
    }

    /// Return `true` for any status with the error bit set.
    #[must_use]
    pub const fn is_error(self) -> bool {
        self.raw() & ERROR_BIT != 0
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "Success",
            Self::InvalidParameter => "Invalid Parameter",
            Self::OutOfResources => "Out of Resources",
            Self::SecurityViolation => "Security Violation",
        })
    }
}
