// Author: Lukas Bower
// Purpose: Cut the builtin command line around the runtime injection marker.

//! Marker splicing of the builtin command line.
//!
//! The builtin line may hold one marker token (`STUBBY_RT_CLI1`). Runtime
//! arguments replace that token; everything before it becomes the prefix and
//! everything after it the suffix. The marker must stand alone as a token
//! and appear at most once.
//!
//! ```
//! use stubby_cmdline::splice::splice;
//! use stubby_cmdline::{CmdlinePolicy, SecurityMode};
//!
//! let parts = splice(
//!     &CmdlinePolicy::STUBBY,
//!     SecurityMode::Secure,
//!     b"root=atomix STUBBY_RT_CLI1 ro",
//!     b"quiet",
//! )
//! .unwrap();
//! assert_eq!(parts.prefix(), b"root=atomix ");
//! assert_eq!(parts.suffix(), b" ro");
//! ```

use alloc::borrow::Cow;
use log::debug;
use memchr::memmem;

use crate::config::{CmdlinePolicy, SecurityMode};
use crate::error::{CmdlineError, InvalidParameter};
use crate::merge::try_buffer;
use crate::tokenizer::SEPARATOR;

/// Builtin bytes placed around the runtime arguments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SplicedBuiltin<'a> {
    prefix: Cow<'a, [u8]>,
    suffix: &'a [u8],
}

impl<'a> SplicedBuiltin<'a> {
    /// Bytes emitted before the runtime line.
    #[must_use]
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    /// Bytes emitted after the runtime line.
    #[must_use]
    pub fn suffix(&self) -> &'a [u8] {
        self.suffix
    }

    /// Length of the line produced once `runtime_len` bytes are injected.
    #[must_use]
    pub fn merged_len(&self, runtime_len: usize) -> usize {
        self.prefix.len() + runtime_len + self.suffix.len()
    }
}

/// Split `builtin` around the policy marker.
///
/// `runtime` is only inspected for emptiness: a non-empty runtime line
/// cannot be injected into an unmarked builtin line under secure boot.
///
/// # Errors
///
/// [`InvalidParameter`] for a duplicated or malformed marker, or for runtime
/// arguments given to an unmarked builtin line in secure mode.
/// [`CmdlineError::OutOfMemory`] if the insecure fallback prefix cannot be
/// allocated.
pub fn splice<'a>(
    policy: &CmdlinePolicy,
    mode: SecurityMode,
    builtin: &'a [u8],
    runtime: &[u8],
) -> Result<SplicedBuiltin<'a>, CmdlineError> {
    if builtin.is_empty() {
        return Ok(SplicedBuiltin::default());
    }

    let marker = policy.marker.as_bytes();
    let Some(start) = memmem::find(builtin, marker) else {
        return splice_unmarked(mode, builtin, runtime);
    };
    let end = start + marker.len();

    if memmem::find(&builtin[end..], marker).is_some() {
        return Err(InvalidParameter::DuplicateMarker {
            marker: policy.marker,
        }
        .into());
    }

    let starts_token = start == 0 || builtin[start - 1] == SEPARATOR;
    let ends_token = end == builtin.len() || builtin[end] == SEPARATOR;
    if !(starts_token && ends_token) {
        return Err(InvalidParameter::MarkerNotToken {
            marker: policy.marker,
            offset: start,
        }
        .into());
    }

    debug!("builtin cmdline marker at offset {start}");
    Ok(SplicedBuiltin {
        prefix: Cow::Borrowed(&builtin[..start]),
        suffix: &builtin[end..],
    })
}

fn splice_unmarked<'a>(
    mode: SecurityMode,
    builtin: &'a [u8],
    runtime: &[u8],
) -> Result<SplicedBuiltin<'a>, CmdlineError> {
    match mode {
        SecurityMode::Secure if !runtime.is_empty() => {
            Err(InvalidParameter::RuntimeWithoutMarker.into())
        }
        SecurityMode::Secure => {
            debug!("builtin cmdline has no marker; no runtime arguments given, dropping builtin");
            Ok(SplicedBuiltin::default())
        }
        SecurityMode::Insecure => {
            debug!("builtin cmdline has no marker; appending runtime arguments");
            let mut prefix = try_buffer(builtin.len() + 1)?;
            prefix.extend_from_slice(builtin);
            prefix.push(SEPARATOR);
            Ok(SplicedBuiltin {
                prefix: Cow::Owned(prefix),
                suffix: &[],
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::String;

    const POLICY: CmdlinePolicy = CmdlinePolicy::STUBBY;

    fn parts(mode: SecurityMode, builtin: &str, runtime: &str) -> Result<(String, String), CmdlineError> {
        let spliced = splice(&POLICY, mode, builtin.as_bytes(), runtime.as_bytes())?;
        Ok((
            String::from_utf8(spliced.prefix().to_vec()).unwrap(),
            String::from_utf8(spliced.suffix().to_vec()).unwrap(),
        ))
    }

    #[test]
    fn empty_builtin_has_empty_parts() {
        for mode in [SecurityMode::Secure, SecurityMode::Insecure] {
            assert_eq!(parts(mode, "", "quiet").unwrap(), (String::new(), String::new()));
        }
    }

    #[test]
    fn marker_in_the_middle() {
        let (prefix, suffix) = parts(SecurityMode::Secure, "root=atomix STUBBY_RT_CLI1 ro", "").unwrap();
        assert_eq!(prefix, "root=atomix ");
        assert_eq!(suffix, " ro");
    }

    #[test]
    fn marker_at_edges() {
        assert_eq!(
            parts(SecurityMode::Secure, "STUBBY_RT_CLI1", "x").unwrap(),
            (String::new(), String::new())
        );
        assert_eq!(
            parts(SecurityMode::Secure, "STUBBY_RT_CLI1 ro", "x").unwrap(),
            (String::new(), String::from(" ro"))
        );
        assert_eq!(
            parts(SecurityMode::Secure, "ro STUBBY_RT_CLI1", "x").unwrap(),
            (String::from("ro "), String::new())
        );
    }

    #[test]
    fn duplicate_marker_is_rejected_in_both_modes() {
        for mode in [SecurityMode::Secure, SecurityMode::Insecure] {
            assert_eq!(
                parts(mode, "A STUBBY_RT_CLI1 B STUBBY_RT_CLI1 C", "x"),
                Err(CmdlineError::InvalidParameter(InvalidParameter::DuplicateMarker {
                    marker: "STUBBY_RT_CLI1"
                }))
            );
        }
    }

    #[test]
    fn glued_marker_is_rejected() {
        for builtin in ["xSTUBBY_RT_CLI1", "STUBBY_RT_CLI1x", "ro STUBBY_RT_CLI12 quiet", "a=STUBBY_RT_CLI1"] {
            assert!(
                matches!(
                    parts(SecurityMode::Insecure, builtin, ""),
                    Err(CmdlineError::InvalidParameter(InvalidParameter::MarkerNotToken { .. }))
                ),
                "{builtin} accepted"
            );
        }
    }

    #[test]
    fn unmarked_builtin_in_secure_mode() {
        assert_eq!(
            parts(SecurityMode::Secure, "console=ttyS0", "anything"),
            Err(CmdlineError::InvalidParameter(InvalidParameter::RuntimeWithoutMarker))
        );
        assert_eq!(
            parts(SecurityMode::Secure, "console=ttyS0", "").unwrap(),
            (String::new(), String::new())
        );
    }

    #[test]
    fn unmarked_builtin_in_insecure_mode_gets_trailing_space() {
        assert_eq!(
            parts(SecurityMode::Insecure, "console=ttyS0", "evilparam").unwrap(),
            (String::from("console=ttyS0 "), String::new())
        );
        assert_eq!(
            parts(SecurityMode::Insecure, "console=ttyS0", "").unwrap(),
            (String::from("console=ttyS0 "), String::new())
        );
    }

    #[test]
    fn merged_len_counts_all_parts() {
        let spliced = splice(&POLICY, SecurityMode::Secure, b"a STUBBY_RT_CLI1 b", b"xyz").unwrap();
        assert_eq!(spliced.merged_len(3), "a xyz b".len());
    }
}
