//! Path-aware glob matching with globstar (`**`) support.
//!
//! Extends the single-segment matching in [`crate::glob`] to patterns
//! that span directory boundaries:
//!
//! - `**/*.pdf` matches `a.pdf`, `docs/a.pdf`, `a/b/c.pdf`
//! - `docs/**` matches everything under docs/
//! - `a/**/z` matches `a/z`, `a/b/z`, `a/b/c/z`
//!
//! `**` is only meaningful as a whole segment; inside a larger segment
//! it degrades to a single-segment `*`.

use std::path::{Path, PathBuf};

use crate::glob::{contains_wildcard, unescape, wildcard_match};
use crate::ResolveError;

/// A segment of a compiled path pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    /// Literal directory or file name: "docs", "report.pdf"
    Literal(String),
    /// Single-segment pattern with wildcards: "*.pdf", "page?"
    Wildcard(String),
    /// Globstar: matches zero or more whole path segments
    Globstar,
}

/// An immutable matcher compiled from one concrete (post-expansion)
/// pattern string.
///
/// Matching is anchored to the full path, segment by segment; `*` and
/// `?` never cross a separator.
///
/// # Examples
/// ```
/// use convoy_resolve::GlobPattern;
/// use std::path::Path;
///
/// let pattern = GlobPattern::compile("**/*.pdf").unwrap();
/// assert!(pattern.matches(Path::new("report.pdf")));
/// assert!(pattern.matches(Path::new("a/b/c.pdf")));
/// assert!(!pattern.matches(Path::new("report.txt")));
/// ```
#[derive(Debug, Clone)]
pub struct GlobPattern {
    segments: Vec<PathSegment>,
    anchored: bool,
}

impl GlobPattern {
    /// Compile a pattern into a `GlobPattern`.
    ///
    /// Patterns starting with `/` are anchored to the filesystem root.
    /// Consecutive globstars collapse to one.
    pub fn compile(pattern: &str) -> Result<Self, ResolveError> {
        if pattern.is_empty() {
            return Err(ResolveError::invalid(pattern, "empty pattern"));
        }

        let (rest, anchored) = match pattern.strip_prefix('/') {
            Some(stripped) => (stripped, true),
            None => (pattern, false),
        };

        let mut segments = Vec::new();
        for part in rest.split('/') {
            if part.is_empty() {
                continue;
            }

            if part == "**" {
                if !matches!(segments.last(), Some(PathSegment::Globstar)) {
                    segments.push(PathSegment::Globstar);
                }
            } else if contains_wildcard(part) {
                // `**` inside a larger segment degrades to `*`.
                segments.push(PathSegment::Wildcard(collapse_star_runs(part)));
            } else {
                segments.push(PathSegment::Literal(unescape(part)));
            }
        }

        Ok(GlobPattern { segments, anchored })
    }

    /// Check if a path matches this pattern.
    pub fn matches(&self, path: &Path) -> bool {
        let components: Vec<&str> = path
            .components()
            .filter_map(|c| match c {
                std::path::Component::Normal(s) => s.to_str(),
                _ => None,
            })
            .collect();

        self.match_segments(&components, 0, 0)
    }

    /// The deepest fixed (non-wildcard) path prefix of the pattern.
    ///
    /// The walk can start here instead of the current directory.
    ///
    /// # Examples
    /// ```
    /// use convoy_resolve::GlobPattern;
    /// use std::path::PathBuf;
    ///
    /// let pattern = GlobPattern::compile("docs/archive/**/*.pdf").unwrap();
    /// assert_eq!(pattern.static_prefix(), Some(PathBuf::from("docs/archive")));
    ///
    /// let pattern = GlobPattern::compile("**/*.pdf").unwrap();
    /// assert_eq!(pattern.static_prefix(), None);
    /// ```
    pub fn static_prefix(&self) -> Option<PathBuf> {
        let mut prefix = PathBuf::new();
        if self.anchored {
            prefix.push("/");
        }

        for segment in &self.segments {
            match segment {
                PathSegment::Literal(s) => prefix.push(s),
                _ => break,
            }
        }

        if prefix.as_os_str().is_empty() || (self.anchored && prefix == Path::new("/")) {
            None
        } else {
            Some(prefix)
        }
    }

    /// Number of path segments when the pattern has no globstar.
    ///
    /// A pattern like `a/*/b.txt` can only match at exactly this depth,
    /// so the walker need not descend further.
    pub fn fixed_depth(&self) -> Option<usize> {
        if self.has_globstar() {
            None
        } else {
            Some(self.segments.len())
        }
    }

    /// Whether the pattern is anchored to the filesystem root.
    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    /// Check if any segment is a globstar.
    pub fn has_globstar(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, PathSegment::Globstar))
    }

    /// Recursive segment matching with backtracking for globstar.
    fn match_segments(&self, components: &[&str], seg_idx: usize, comp_idx: usize) -> bool {
        // Both exhausted - match!
        if seg_idx >= self.segments.len() && comp_idx >= components.len() {
            return true;
        }

        // Segments exhausted but components remain - no match
        if seg_idx >= self.segments.len() {
            return false;
        }

        match &self.segments[seg_idx] {
            PathSegment::Globstar => {
                // Globstar matches zero or more components.
                for skip in 0..=(components.len() - comp_idx) {
                    if self.match_segments(components, seg_idx + 1, comp_idx + skip) {
                        return true;
                    }
                }
                false
            }

            PathSegment::Literal(lit) => {
                if comp_idx >= components.len() {
                    return false;
                }
                if components[comp_idx] == lit {
                    self.match_segments(components, seg_idx + 1, comp_idx + 1)
                } else {
                    false
                }
            }

            PathSegment::Wildcard(pat) => {
                if comp_idx >= components.len() {
                    return false;
                }
                if wildcard_match(pat, components[comp_idx]) {
                    self.match_segments(components, seg_idx + 1, comp_idx + 1)
                } else {
                    false
                }
            }
        }
    }
}

/// Collapse runs of consecutive unescaped `*` into one. An escaped
/// star is an ordinary character and never merges with a neighboring
/// wildcard, so `file\**.txt` keeps both the literal star and the
/// wildcard.
fn collapse_star_runs(part: &str) -> String {
    let chars: Vec<char> = part.chars().collect();
    let mut out = String::with_capacity(part.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => {
                out.push('\\');
                out.push(chars[i + 1]);
                i += 2;
            }
            '*' => {
                out.push('*');
                while i < chars.len() && chars[i] == '*' {
                    i += 1;
                }
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}
