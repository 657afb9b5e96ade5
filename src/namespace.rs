// Author: Lukas Bower
// Purpose: Keep the reserved STUBBY_RT namespace out of every merged segment.

//! Reserved namespace leak detection.
//!
//! Once the marker has been cut out of the builtin line, no segment of the
//! merged command line may still mention the reserved namespace. A leak means
//! either a second, malformed marker in the builtin line or a runtime loader
//! trying to forge one. The check is independent of the security mode.

use memchr::memmem;

use crate::error::{InvalidParameter, Segment};

/// Fail if `namespace` occurs anywhere in `bytes`.
///
/// # Errors
///
/// [`InvalidParameter::NamespaceLeak`] naming `segment`.
pub fn check_segment(
    namespace: &'static str,
    segment: Segment,
    bytes: &[u8],
) -> Result<(), InvalidParameter> {
    match memmem::find(bytes, namespace.as_bytes()) {
        Some(_) => Err(InvalidParameter::NamespaceLeak { namespace, segment }),
        None => Ok(()),
    }
}
