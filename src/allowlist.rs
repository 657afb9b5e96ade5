// Author: Lukas Bower
// Purpose: Decide whether a single runtime token is permitted by the compiled-in allowlist.

//! Allowlist matching for runtime command line tokens.
//!
//! Patterns are plain strings. A pattern starting with [`PREFIX_FLAG`] matches
//! any token that begins with the rest of the pattern, with no boundary check:
//! `^console=` accepts `console=ttyS0,115200` and equally `console=`. Every
//! other pattern must equal the token byte for byte. Anything unmatched is
//! denied.

use core::fmt;

/// Leading character that turns a pattern into a prefix match.
pub const PREFIX_FLAG: char = '^';

/// One parsed allowlist pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowlistEntry {
    /// Token must equal the pattern.
    Exact(&'static str),
    /// Token must start with the pattern.
    Prefix(&'static str),
}

impl AllowlistEntry {
    /// Parse a raw table pattern, stripping the prefix flag.
    #[must_use]
    pub fn parse(pattern: &'static str) -> Self {
        match pattern.strip_prefix(PREFIX_FLAG) {
            Some(prefix) => Self::Prefix(prefix),
            None => Self::Exact(pattern),
        }
    }

    /// Pattern text with the prefix flag removed.
    #[must_use]
    pub fn pattern(&self) -> &'static str {
        match self {
            Self::Exact(p) | Self::Prefix(p) => *p,
        }
    }

    /// Check `token` against this entry.
    #[must_use]
    pub fn matches(&self, token: &str) -> bool {
        match self {
            Self::Exact(p) => token.as_bytes() == p.as_bytes(),
            Self::Prefix(p) => token.as_bytes().starts_with(p.as_bytes()),
        }
    }
}

impl fmt::Display for AllowlistEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(p) => f.write_str(p),
            Self::Prefix(p) => write!(f, "{PREFIX_FLAG}{p}"),
        }
    }
}

/// Read-only table of allowlist patterns.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Allowlist {
    patterns: &'static [&'static str],
}

impl Allowlist {
    /// Wrap a static pattern table.
    #[must_use]
    pub const fn new(patterns: &'static [&'static str]) -> Self {
        Self { patterns }
    }

    /// Number of patterns in the table.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Return `true` if the table denies everything.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Iterate the parsed entries in table order.
    pub fn entries(&self) -> impl Iterator<Item = AllowlistEntry> + '_ {
        self.patterns.iter().copied().map(AllowlistEntry::parse)
    }

    /// Return the first entry accepting `token`, if any.
    #[must_use]
    pub fn find(&self, token: &str) -> Option<AllowlistEntry> {
        self.entries().find(|entry| entry.matches(token))
    }

    /// Return `true` if some entry accepts `token`.
    #[must_use]
    pub fn is_allowed(&self, token: &str) -> bool {
        self.find(token).is_some()
    }
}

impl fmt::Debug for Allowlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries()).finish()
    }
}
