// Author: Lukas Bower
// Purpose: Split a runtime command line into bounded, printable tokens.

//! Whitespace tokenizer for runtime command lines.
//!
//! Only the ASCII space separates tokens and runs of spaces collapse. Bytes
//! outside printable ASCII are rejected before any token is produced, and the
//! token vector is fixed at [`MAX_TOKENS`] entries so an oversized line fails
//! instead of being truncated.

use crate::config::MAX_TOKENS;
use crate::error::{escape_line, Violation};

/// Token views borrowing the tokenized line, in left-to-right order.
pub type Tokens<'a> = heapless::Vec<&'a str, MAX_TOKENS>;

/// Token separator.
pub const SEPARATOR: u8 = b' ';

/// Return `true` for bytes permitted on a runtime line (`0x20..=0x7e`).
#[must_use]
pub const fn is_printable(byte: u8) -> bool {
    matches!(byte, 0x20..=0x7e)
}

/// Split `line` into tokens.
///
/// # Errors
///
/// [`Violation::InvalidCharacter`] for the first byte outside printable
/// ASCII, [`Violation::TooManyTokens`] when token `MAX_TOKENS + 1` is found.
pub fn tokenize(line: &[u8]) -> Result<Tokens<'_>, Violation> {
    if let Some(position) = line.iter().position(|&b| !is_printable(b)) {
        return Err(invalid_character(line, position));
    }
    // Printable ASCII is always valid UTF-8.
    let text = core::str::from_utf8(line).map_err(|e| invalid_character(line, e.valid_up_to()))?;

    let mut tokens = Tokens::new();
    for token in text.split(char::from(SEPARATOR)).filter(|t| !t.is_empty()) {
        tokens
            .push(token)
            .map_err(|_| Violation::TooManyTokens { limit: MAX_TOKENS })?;
    }
    Ok(tokens)
}

fn invalid_character(line: &[u8], position: usize) -> Violation {
    Violation::InvalidCharacter {
        byte: line[position],
        position,
        line: escape_line(line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::String;
    use std::vec::Vec;

    #[test]
    fn repeated_spaces_collapse() {
        let tokens = tokenize(b"a b  c").unwrap();
        assert_eq!(tokens.as_slice(), ["a", "b", "c"]);
    }

    #[test]
    fn leading_and_trailing_spaces_are_ignored() {
        let tokens = tokenize(b"   ro  quiet   ").unwrap();
        assert_eq!(tokens.as_slice(), ["ro", "quiet"]);
    }

    #[test]
    fn empty_and_blank_lines_have_no_tokens() {
        assert!(tokenize(b"").unwrap().is_empty());
        assert!(tokenize(b"     ").unwrap().is_empty());
    }

    #[test]
    fn tabs_are_not_separators() {
        let err = tokenize(b"ro\tquiet").unwrap_err();
        assert_eq!(
            err,
            Violation::InvalidCharacter {
                byte: b'\t',
                position: 2,
                line: String::from("ro\\tquiet"),
            }
        );
    }

    #[test]
    fn control_byte_reports_position() {
        match tokenize(b"quiet \x01") {
            Err(Violation::InvalidCharacter { byte, position, .. }) => {
                assert_eq!(byte, 0x01);
                assert_eq!(position, 6);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn high_bytes_are_rejected() {
        assert!(matches!(
            tokenize(b"ro \x7f"),
            Err(Violation::InvalidCharacter { byte: 0x7f, position: 3, .. })
        ));
        assert!(matches!(
            tokenize("quiet é".as_bytes()),
            Err(Violation::InvalidCharacter { byte: 0xc3, position: 6, .. })
        ));
    }

    #[test]
    fn token_ceiling_is_inclusive() {
        let words: Vec<&str> = core::iter::repeat("ro").take(MAX_TOKENS).collect();
        let line = words.join("  ");
        assert_eq!(tokenize(line.as_bytes()).unwrap().len(), MAX_TOKENS);

        let line = std::format!("{line} quiet");
        assert_eq!(
            tokenize(line.as_bytes()),
            Err(Violation::TooManyTokens { limit: MAX_TOKENS })
        );
    }

    #[test]
    fn long_single_token_is_fine() {
        let line = "x".repeat(4096);
        assert_eq!(tokenize(line.as_bytes()).unwrap().len(), 1);
    }
}
