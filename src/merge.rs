// Author: Lukas Bower
// Purpose: Sequence splice, leak checks, validation and policy into the final kernel command line.

//! Merge orchestration.
//!
//! ```text
//! splice ─► leak check (prefix, suffix) ─► leak check (runtime)
//!        ─► validate (runtime) ─► apply_policy (mode) ─► concatenate
//! ```
//!
//! Every stage short-circuits with `?`; intermediate buffers are owned by the
//! call and dropped on every exit path.

use alloc::vec::Vec;
use core::str::Utf8Error;
use log::debug;

use crate::config::{CmdlinePolicy, SecurityMode};
use crate::error::{CmdlineError, Segment, Violation};
use crate::namespace::check_segment;
use crate::splice::splice;
use crate::validator::validate;

/// Final kernel command line handed back to the stub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedCmdline {
    bytes: Vec<u8>,
    warning: Option<Violation>,
}

impl MergedCmdline {
    /// Merged command line bytes (`prefix ++ runtime ++ suffix`).
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length of the merged command line in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Return `true` if the kernel gets an empty command line.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// View the merged line as text.
    ///
    /// # Errors
    ///
    /// Fails only if the builtin line itself was not UTF-8.
    pub fn as_str(&self) -> Result<&str, Utf8Error> {
        core::str::from_utf8(&self.bytes)
    }

    /// Violation tolerated because secure boot is off, if any.
    #[must_use]
    pub fn warning(&self) -> Option<&Violation> {
        self.warning.as_ref()
    }

    /// Take ownership of the merged bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Split into the merged bytes and the tolerated violation.
    #[must_use]
    pub fn into_parts(self) -> (Vec<u8>, Option<Violation>) {
        (self.bytes, self.warning)
    }
}

/// Apply the boot mode to a validation verdict.
///
/// Secure boot keeps a violation fatal; insecure boot turns it into a
/// warning carried by the merge result.
///
/// # Errors
///
/// [`CmdlineError::SecurityViolation`] in secure mode when `verdict` failed.
pub fn apply_policy(
    mode: SecurityMode,
    verdict: Result<(), Violation>,
) -> Result<Option<Violation>, CmdlineError> {
    match (mode, verdict) {
        (_, Ok(())) => Ok(None),
        (SecurityMode::Secure, Err(violation)) => Err(violation.into()),
        (SecurityMode::Insecure, Err(violation)) => Ok(Some(violation)),
    }
}

/// Merge `builtin` and `runtime` under the compiled-in policy.
///
/// ```
/// use stubby_cmdline::{merge, SecurityMode};
///
/// let line = merge(SecurityMode::Secure, b"root=atomix STUBBY_RT_CLI1 ro", b"quiet").unwrap();
/// assert_eq!(line.as_bytes(), b"root=atomix quiet ro");
/// assert!(line.warning().is_none());
/// ```
///
/// # Errors
///
/// See [`merge_with`].
pub fn merge(
    mode: SecurityMode,
    builtin: &[u8],
    runtime: &[u8],
) -> Result<MergedCmdline, CmdlineError> {
    merge_with(&CmdlinePolicy::STUBBY, mode, builtin, runtime)
}

/// Merge `builtin` and `runtime` under `policy`.
///
/// # Errors
///
/// [`CmdlineError::InvalidParameter`] for marker or namespace problems in
/// either mode, [`CmdlineError::SecurityViolation`] for disallowed runtime
/// content in secure mode, [`CmdlineError::OutOfMemory`] if a buffer cannot
/// be reserved.
pub fn merge_with(
    policy: &CmdlinePolicy,
    mode: SecurityMode,
    builtin: &[u8],
    runtime: &[u8],
) -> Result<MergedCmdline, CmdlineError> {
    debug!(
        "merging cmdline ({mode}): builtin {} bytes, runtime {} bytes",
        builtin.len(),
        runtime.len()
    );

    let spliced = splice(policy, mode, builtin, runtime)?;
    check_segment(policy.namespace, Segment::BuiltinPrefix, spliced.prefix())?;
    check_segment(policy.namespace, Segment::BuiltinSuffix, spliced.suffix())?;
    check_segment(policy.namespace, Segment::Runtime, runtime)?;

    let warning = apply_policy(mode, validate(&policy.allowlist, runtime))?;

    let mut bytes = try_buffer(spliced.merged_len(runtime.len()))?;
    bytes.extend_from_slice(spliced.prefix());
    bytes.extend_from_slice(runtime);
    bytes.extend_from_slice(spliced.suffix());

    Ok(MergedCmdline { bytes, warning })
}

/// Reserve an empty buffer of `capacity` bytes without aborting on failure.
pub(crate) fn try_buffer(capacity: usize) -> Result<Vec<u8>, CmdlineError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(capacity)
        .map_err(|_| CmdlineError::OutOfMemory {
            requested: capacity,
        })?;
    Ok(buf)
}
