// Author: Lukas Bower
// Purpose: Judge a whole runtime command line against the allowlist.

//! Runtime command line validation.

use alloc::string::String;
use log::trace;

use crate::allowlist::Allowlist;
use crate::error::Violation;
use crate::tokenizer::tokenize;

/// Check every token of the runtime `line` against `allowlist`.
///
/// The scan does not stop at the first rejected token: all tokens are
/// visited and the diagnostic names the last one rejected.
///
/// # Errors
///
/// Any tokenizer [`Violation`], or [`Violation::TokenNotAllowed`].
pub fn validate(allowlist: &Allowlist, line: &[u8]) -> Result<(), Violation> {
    let tokens = tokenize(line)?;

    let mut rejected = None;
    for token in tokens.iter().copied() {
        if !allowlist.is_allowed(token) {
            trace!("runtime token rejected: {token}");
            rejected = Some(token);
        }
    }

    match rejected {
        Some(token) => Err(Violation::TokenNotAllowed {
            token: String::from(token),
        }),
        None => Ok(()),
    }
}
