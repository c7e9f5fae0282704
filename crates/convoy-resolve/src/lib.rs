//! convoy-resolve: Bulk input resolution for the convoy conversion client.
//!
//! Turns user-supplied input patterns into a concrete, deduplicated,
//! ordered list of filesystem paths:
//!
//! - **expand_braces**: textual `{a,b,c}` / `{1..5}` / `{01..10..2}` expansion
//! - **expand_brackets**: textual `[abc]` / `[0-9]` character-class expansion
//! - **GlobPattern**: path-aware glob matching with `**` (globstar) support
//! - **FileWalker**: recursive directory walker, generic over `WalkerFs`
//! - **FilterPipeline**: ordered glob / directory / regex exclusion rules
//!   plus an optional modification-date threshold
//! - **resolve**: the entry point wiring the stages together
//!
//! The walker is generic over `WalkerFs`, a minimal read-only filesystem
//! trait. `LocalFs` adapts `std::fs`; tests supply an in-memory filesystem.
//!
//! The engine performs no network calls and owns no global state; every
//! knob is passed in through [`ResolveOptions`].

pub mod brace;
pub mod bracket;
pub mod filter;
pub mod glob;
pub mod pattern;
pub mod resolve;
pub mod walker;

pub use brace::expand_braces;
pub use bracket::expand_brackets;
pub use filter::{DateFilter, ExcludeRule, FilterPipeline};
pub use glob::{contains_wildcard, unescape, wildcard_match};
pub use pattern::{GlobPattern, PathSegment};
pub use resolve::{
    resolve, resolve_with, ResolveOptions, ResolvedInputSet, DEFAULT_MAX_EXPANSIONS,
};
pub use walker::{Candidate, FileMeta, FileWalker, LocalFs, WalkerDirEntry, WalkerFs};

use thiserror::Error;

/// Stdin marker. Bypasses the whole engine and is carried through to the
/// caller untouched.
pub const STDIN_MARKER: &str = "-";

/// Errors produced while resolving input patterns.
///
/// Expansion, compilation, and filter-construction failures are surfaced
/// immediately; per-entry I/O failures during a walk are logged and
/// skipped instead (best-effort discovery).
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// Malformed brace range, bracket range, or regex exclude rule.
    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// An explicit literal argument does not exist on disk.
    #[error("no such file or directory: {0}")]
    PathNotFound(String),

    /// The brace/bracket cross-product exceeds the configured cap.
    #[error("pattern `{pattern}` expands to {size} patterns (limit {max})")]
    ExpansionLimit {
        pattern: String,
        size: usize,
        max: usize,
    },

    /// I/O failure affecting an explicit argument (permission denied, etc).
    #[error("cannot access `{path}`: {reason}")]
    Access { path: String, reason: String },
}

impl ResolveError {
    pub(crate) fn invalid(pattern: &str, reason: impl Into<String>) -> Self {
        ResolveError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}

/// Cap on the brace/bracket cross-product for a single input token.
///
/// Each expansion stage checks its would-be output size before
/// materializing anything, so a combinatorial bomb like
/// `{1..1000}{1..1000}` is rejected without allocating a million strings.
#[derive(Debug, Clone, Copy)]
pub struct ExpansionBudget {
    max: usize,
}

impl ExpansionBudget {
    pub fn new(max: usize) -> Self {
        Self { max }
    }

    /// Fail if `size` expanded patterns would exceed the cap.
    pub fn check(&self, pattern: &str, size: usize) -> Result<(), ResolveError> {
        if size > self.max {
            Err(ResolveError::ExpansionLimit {
                pattern: pattern.to_string(),
                size,
                max: self.max,
            })
        } else {
            Ok(())
        }
    }

    pub fn max(&self) -> usize {
        self.max
    }
}
