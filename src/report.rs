// Author: Lukas Bower
// Purpose: Surface merge diagnostics on the firmware console for the EFI stub.

//! Console reporting around [`crate::merge`].
//!
//! The stub calls this instead of [`crate::merge::merge`] directly. Every
//! diagnostic goes to the `log` facade, which the stub routes to the firmware
//! console. Under secure boot a token violation stays fatal; with secure boot
//! off it is printed and the boot carries on with the merged line.

use log::{error, warn};

use crate::config::{CmdlinePolicy, SecurityMode};
use crate::error::CmdlineError;
use crate::merge::{merge_with, MergedCmdline};
use crate::status::Status;

/// Console line printed when secure boot rejects a runtime command line.
pub const REJECTED: &str = "Custom kernel command line rejected";

/// Console line printed when an insecure boot tolerates a violation.
pub const WOULD_REJECT: &str = "Custom kernel would be rejected in secure mode";

/// Merge under the compiled-in policy and report the outcome.
///
/// # Errors
///
/// Whatever [`merge_and_report_with`] returns.
pub fn merge_and_report(
    mode: SecurityMode,
    builtin: &[u8],
    runtime: &[u8],
) -> Result<MergedCmdline, CmdlineError> {
    merge_and_report_with(&CmdlinePolicy::STUBBY, mode, builtin, runtime)
}

/// Merge under `policy`, logging every failure and tolerated violation.
///
/// # Errors
///
/// Every [`CmdlineError`] from the merge, already reported.
pub fn merge_and_report_with(
    policy: &CmdlinePolicy,
    mode: SecurityMode,
    builtin: &[u8],
    runtime: &[u8],
) -> Result<MergedCmdline, CmdlineError> {
    match merge_with(policy, mode, builtin, runtime) {
        Ok(merged) => {
            if let Some(violation) = merged.warning() {
                warn!("{}: {violation}", Status::SecurityViolation);
                warn!("{WOULD_REJECT}");
            }
            Ok(merged)
        }
        Err(err) => {
            error!("{}: {err}", err.status());
            if err.is_security_violation() {
                error!("{REJECTED}");
            }
            Err(err)
        }
    }
}
