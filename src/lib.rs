// Author: Lukas Bower
// Purpose: Root of the stubby kernel command line gate linked into the EFI stub.
#![no_std]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Kernel command line gate for the stubby secure-boot EFI stub.
//!
//! The stub carries a builtin command line signed together with the kernel.
//! An external loader may hand over a second, runtime command line. This
//! crate decides what the kernel finally sees:
//!
//! 1. [`splice`] cuts the builtin line around the `STUBBY_RT_CLI1` marker.
//! 2. [`namespace`] refuses any stray use of the reserved `STUBBY_RT` prefix.
//! 3. [`validator`] checks every runtime token against the [`allowlist`].
//! 4. [`merge`](mod@merge) applies the secure-boot policy and joins the pieces.
//!
//! [`report`] wraps the whole pipeline for the firmware console.

extern crate alloc;

// Hosted builds (tests, host tools, the staticlib on a hosted target) link
// std for its panic handler and global allocator; firmware targets do not.
#[cfg(any(test, not(any(target_os = "uefi", target_os = "none"))))]
extern crate std;

pub mod allowlist;
pub mod config;
pub mod error;
pub mod merge;
pub mod namespace;
pub mod report;
pub mod splice;
pub mod status;
pub mod tokenizer;
pub mod validator;

pub use allowlist::{Allowlist, AllowlistEntry};
pub use config::{CmdlinePolicy, SecurityMode, MARKER, MAX_TOKENS, NAMESPACE};
pub use error::{CmdlineError, InvalidParameter, Segment, Violation};
pub use merge::{apply_policy, merge, merge_with, MergedCmdline};
pub use report::{merge_and_report, merge_and_report_with};
pub use status::Status;
pub use tokenizer::{tokenize, Tokens};
pub use validator::validate;
