// Author: Lukas Bower
// Purpose: Classify command line merge failures and carry their diagnostics.

//! Error taxonomy for the command line gate.
//!
//! Failures fall into three classes. [`CmdlineError::OutOfMemory`] and
//! [`CmdlineError::InvalidParameter`] are fatal whatever the boot mode;
//! [`CmdlineError::SecurityViolation`] is fatal only under secure boot (see
//! [`crate::merge::apply_policy`]). The `Display` output of every variant is
//! the diagnostic shown on the firmware console.

use alloc::string::String;
use core::fmt;

use crate::status::Status;
use crate::tokenizer::is_printable;

/// Top-level failure returned by the merge pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CmdlineError {
    /// A command line buffer could not be allocated from the boot pool.
    #[error("unable to allocate {requested} bytes for the kernel command line")]
    OutOfMemory {
        /// Number of bytes the failed reservation asked for.
        requested: usize,
    },
    /// The builtin/runtime pair breaks the marker protocol.
    #[error(transparent)]
    InvalidParameter(#[from] InvalidParameter),
    /// The runtime line carries content the allowlist does not permit.
    #[error(transparent)]
    SecurityViolation(#[from] Violation),
}

impl CmdlineError {
    /// Firmware status reported for this failure.
    #[must_use]
    pub fn status(&self) -> Status {
        match self {
            Self::OutOfMemory { .. } => Status::OutOfResources,
            Self::InvalidParameter(_) => Status::InvalidParameter,
            Self::SecurityViolation(_) => Status::SecurityViolation,
        }
    }

    /// Return `true` when the failure is a runtime token-level violation.
    #[must_use]
    pub fn is_security_violation(&self) -> bool {
        matches!(self, Self::SecurityViolation(_))
    }
}

/// Structural violations of the marker protocol. Never downgraded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidParameter {
    /// Runtime arguments were supplied but the builtin line has no slot.
    #[error("runtime arguments cannot be given to non-empty builtin without marker")]
    RuntimeWithoutMarker,
    /// The marker occurs twice or more in the builtin line.
    #[error("{marker} appears more than once in builtin cmdline")]
    DuplicateMarker {
        /// Marker text.
        marker: &'static str,
    },
    /// The marker is glued to neighbouring bytes instead of standing alone.
    #[error("{marker} is not a full token")]
    MarkerNotToken {
        /// Marker text.
        marker: &'static str,
        /// Byte offset of the marker inside the builtin line.
        offset: usize,
    },
    /// The reserved namespace leaked into one of the merged segments.
    #[error("{namespace} appears in {segment}")]
    NamespaceLeak {
        /// Reserved namespace text.
        namespace: &'static str,
        /// Segment the namespace was found in.
        segment: Segment,
    },
}

/// Segments of the merged command line checked for namespace leaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Builtin bytes placed before the runtime arguments.
    BuiltinPrefix,
    /// Builtin bytes placed after the runtime arguments.
    BuiltinSuffix,
    /// The runtime line as handed over by the loader.
    Runtime,
}

impl Segment {
    /// Human readable segment name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BuiltinPrefix => "builtin cmdline (before marker)",
            Self::BuiltinSuffix => "builtin cmdline (after marker)",
            Self::Runtime => "runtime cmdline",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token-level policy violations found in the runtime line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    /// A byte outside printable ASCII was found.
    #[error("Bad character 0x{byte:02x} in position {position}: {line}.")]
    InvalidCharacter {
        /// Offending byte.
        byte: u8,
        /// Zero-based offset of the byte in the runtime line.
        position: usize,
        /// The runtime line with non-printable bytes escaped.
        line: String,
    },
    /// The runtime line holds more tokens than [`crate::MAX_TOKENS`].
    #[error("Too many tokens in cmdline.")]
    TooManyTokens {
        /// Token ceiling that was exceeded.
        limit: usize,
    },
    /// A token matched no allowlist entry.
    #[error("token not allowed: {token}")]
    TokenNotAllowed {
        /// The rejected token.
        token: String,
    },
}

/// Render `line` for a diagnostic, escaping anything outside printable ASCII.
pub(crate) fn escape_line(line: &[u8]) -> String {
    let mut out = String::with_capacity(line.len());
    for &byte in line {
        if is_printable(byte) {
            out.push(char::from(byte));
        } else {
            out.extend(core::ascii::escape_default(byte).map(char::from));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn diagnostics_match_console_text() {
        let err = CmdlineError::from(InvalidParameter::DuplicateMarker {
            marker: "STUBBY_RT_CLI1",
        });
        assert_eq!(
            err.to_string(),
            "STUBBY_RT_CLI1 appears more than once in builtin cmdline"
        );
        assert_eq!(err.status(), Status::InvalidParameter);

        let err = CmdlineError::from(Violation::InvalidCharacter {
            byte: 0x01,
            position: 3,
            line: escape_line(b"abc\x01"),
        });
        assert_eq!(
            err.to_string(),
            "Bad character 0x01 in position 3: abc\\x01."
        );
        assert!(err.is_security_violation());
    }

    #[test]
    fn escaping_leaves_printable_bytes_alone() {
        assert_eq!(escape_line(b"a=\"x\" 'y' \\ \x01"), "a=\"x\" 'y' \\ \\x01");
        assert_eq!(escape_line(b"ro\tquiet\xff"), "ro\\tquiet\\xff");
        assert_eq!(escape_line(b""), "");
    }

    #[test]
    fn namespace_leak_names_segment() {
        let err = InvalidParameter::NamespaceLeak {
            namespace: "STUBBY_RT",
            segment: Segment::Runtime,
        };
        assert_eq!(err.to_string(), "STUBBY_RT appears in runtime cmdline");
    }

    #[test]
    fn out_of_memory_maps_to_out_of_resources() {
        let err = CmdlineError::OutOfMemory { requested: 64 };
        assert_eq!(err.status(), Status::OutOfResources);
        assert!(!err.is_security_violation());
    }
}
