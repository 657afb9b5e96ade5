// Author: Lukas Bower
// Purpose: Hold the compiled-in command line policy and the boot security mode.

//! Compile-time configuration for the command line gate.
//!
//! Nothing here is read at runtime: the marker, namespace, allowlist and
//! token ceiling are baked into the signed stub image.

use core::fmt;

use crate::allowlist::Allowlist;

/// Sentinel token marking where runtime arguments are spliced into the
/// builtin line.
pub const MARKER: &str = "STUBBY_RT_CLI1";

/// Reserved prefix that may only appear as part of [`MARKER`].
pub const NAMESPACE: &str = "STUBBY_RT";

/// Ceiling on the number of tokens in a validated runtime line.
pub const MAX_TOKENS: usize = 128;

/// Patterns accepted on the runtime command line. A leading `^` marks a
/// prefix match.
pub const ALLOWED: &[&str] = &[
    "^console=",
    "^root=soci:",
    "root=atomix",
    "ro",
    "quiet",
    "verbose",
    "crashkernel=256M",
];

/// Boot policy threaded through every merge decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecurityMode {
    /// Secure boot enforced: any policy violation is fatal.
    Secure,
    /// Secure boot disabled: token violations are reported but tolerated.
    Insecure,
}

impl SecurityMode {
    /// Return `true` under secure boot.
    #[must_use]
    pub const fn is_secure(self) -> bool {
        matches!(self, Self::Secure)
    }
}

impl From<bool> for SecurityMode {
    /// Convert the firmware's secure-boot flag.
    fn from(secure: bool) -> Self {
        if secure {
            Self::Secure
        } else {
            Self::Insecure
        }
    }
}

impl fmt::Display for SecurityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Secure => "secure",
            Self::Insecure => "insecure",
        })
    }
}

/// Marker protocol and allowlist applied by a merge.
#[derive(Debug, Clone, Copy)]
pub struct CmdlinePolicy {
    /// Injection point token in the builtin line.
    pub marker: &'static str,
    /// Reserved namespace; must be a prefix of `marker`.
    pub namespace: &'static str,
    /// Tokens accepted on the runtime line.
    pub allowlist: Allowlist,
}

impl CmdlinePolicy {
    /// Policy compiled into the stubby EFI stub.
    pub const STUBBY: CmdlinePolicy =
        CmdlinePolicy::new(MARKER, NAMESPACE, Allowlist::new(ALLOWED));

    /// Build a policy. `namespace` must be a non-empty prefix of `marker`.
    ///
    /// # Panics
    ///
    /// Panics (at compile time when used in a `const`) if `namespace` is
    /// empty or does not prefix `marker`.
    #[must_use]
    pub const fn new(
        marker: &'static str,
        namespace: &'static str,
        allowlist: Allowlist,
    ) -> Self {
        let m = marker.as_bytes();
        let n = namespace.as_bytes();
        assert!(
            !n.is_empty() && n.len() <= m.len(),
            "namespace must prefix marker"
        );
        let mut i = 0;
        while i < n.len() {
            assert!(m[i] == n[i], "namespace must prefix marker");
            i += 1;
        }
        Self {
            marker,
            namespace,
            allowlist,
        }
    }
}

impl Default for CmdlinePolicy {
    fn default() -> Self {
        Self::STUBBY
    }
}
