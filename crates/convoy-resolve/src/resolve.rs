//! Input resolution: the entry point wiring the expansion, walking,
//! and filtering stages together.
//!
//! Each raw input token goes through the same pipeline:
//!
//! 1. brace expansion (`{a,b}`, `{1..5}`) under a shared budget
//! 2. bracket expansion (`[abc]`, `[0-9]`) under the same budget
//! 3. dispatch per expanded pattern:
//!    - the stdin marker `-` is passed through untouched
//!    - a literal path resolves to itself (or to its children when it
//!      names a directory)
//!    - a wildcard pattern is compiled and matched against a walk
//!      rooted at its static prefix
//! 4. exclusion and date filtering
//! 5. order-preserving dedup by canonical path
//!
//! An explicit literal argument (no expansion or wildcard syntax) that
//! matches nothing is an error; an expanded alternative or a glob that
//! matches nothing is silently empty.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::brace::expand_braces;
use crate::bracket::expand_brackets;
use crate::filter::FilterPipeline;
use crate::glob::{contains_wildcard, unescape};
use crate::pattern::GlobPattern;
use crate::walker::{Candidate, FileWalker, LocalFs, WalkerFs};
use crate::{ExpansionBudget, ResolveError, STDIN_MARKER};

/// Default cap on the number of patterns a single input token may
/// expand to through braces and brackets combined.
pub const DEFAULT_MAX_EXPANSIONS: usize = 100_000;

/// Knobs for a resolution run. Construct with struct-update syntax:
///
/// ```
/// use convoy_resolve::ResolveOptions;
///
/// let options = ResolveOptions {
///     recursive: true,
///     exclude: vec!["*.bak".to_string()],
///     ..ResolveOptions::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Descend into subdirectories for directory arguments, and remove
    /// the depth limit on wildcard walks.
    pub recursive: bool,
    /// Exclusion rules: glob, `dir/`, or `^regex` syntax.
    pub exclude: Vec<String>,
    /// Only admit files modified at or after this ISO 8601 instant.
    pub modified_since: Option<String>,
    /// Cap on brace/bracket expansion per input token.
    pub max_expansions: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            recursive: false,
            exclude: Vec::new(),
            modified_since: None,
            max_expansions: DEFAULT_MAX_EXPANSIONS,
        }
    }
}

/// The ordered, deduplicated output of a resolution run.
#[derive(Debug, Clone, Default)]
pub struct ResolvedInputSet {
    entries: Vec<Candidate>,
}

impl ResolvedInputSet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.entries.iter()
    }

    /// The resolved paths, in resolution order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(|c| c.path.as_path())
    }

    pub fn into_vec(self) -> Vec<Candidate> {
        self.entries
    }
}

impl IntoIterator for ResolvedInputSet {
    type Item = Candidate;
    type IntoIter = std::vec::IntoIter<Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResolvedInputSet {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Resolve raw input tokens against the local filesystem.
///
/// # Examples
/// ```no_run
/// use convoy_resolve::{resolve, ResolveOptions};
///
/// let inputs = vec!["docs/*.pdf".to_string(), "notes.txt".to_string()];
/// let set = resolve(&inputs, &ResolveOptions::default())?;
/// for candidate in &set {
///     println!("{}", candidate.path.display());
/// }
/// # Ok::<(), convoy_resolve::ResolveError>(())
/// ```
pub fn resolve(inputs: &[String], options: &ResolveOptions) -> Result<ResolvedInputSet, ResolveError> {
    resolve_with(&LocalFs, inputs, options)
}

/// Resolve raw input tokens against an arbitrary [`WalkerFs`].
pub fn resolve_with<F: WalkerFs>(
    fs: &F,
    inputs: &[String],
    options: &ResolveOptions,
) -> Result<ResolvedInputSet, ResolveError> {
    let pipeline = FilterPipeline::new(&options.exclude, options.modified_since.as_deref())?;
    let budget = ExpansionBudget::new(options.max_expansions);
    let mut collected: Vec<Candidate> = Vec::new();

    for raw in inputs {
        if raw == STDIN_MARKER {
            collected.push(Candidate::new(STDIN_MARKER, None));
            continue;
        }

        let explicit = !has_expansion_meta(raw);
        let expanded = expand_input(raw, &budget)?;
        let mut matched_any = false;

        for pattern in &expanded {
            if contains_wildcard(pattern) {
                let found =
                    resolve_wildcard(fs, pattern, options, &pipeline, &mut collected)?;
                matched_any |= found;
            } else {
                let found =
                    resolve_literal(fs, pattern, explicit, options, &pipeline, &mut collected)?;
                matched_any |= found;
            }
        }

        if explicit && !matched_any {
            return Err(ResolveError::PathNotFound(raw.clone()));
        }
        if !matched_any {
            tracing::debug!(input = %raw, "input matched no files");
        }
    }

    Ok(dedup_by_canonical(fs, collected))
}

/// Brace-then-bracket expansion of a single token, under one budget.
///
/// The budget is enforced against the running total across all brace
/// alternatives, so `{a,b}[0-9]` counts as 20 patterns, not 10.
fn expand_input(raw: &str, budget: &ExpansionBudget) -> Result<Vec<String>, ResolveError> {
    let braced = expand_braces(raw, budget)?;

    let mut patterns = Vec::with_capacity(braced.len());
    for alternative in &braced {
        let bracketed = expand_brackets(alternative, budget)?;
        budget.check(raw, patterns.len() + bracketed.len())?;
        patterns.extend(bracketed);
    }

    Ok(patterns)
}

/// Resolve one expanded pattern that carries no wildcard.
///
/// Returns whether the path exists. A missing path is only an error
/// when the original token was an explicit literal with an I/O failure
/// other than not-found; plain absence is left for the caller to judge.
fn resolve_literal<F: WalkerFs>(
    fs: &F,
    pattern: &str,
    explicit: bool,
    options: &ResolveOptions,
    pipeline: &FilterPipeline,
    collected: &mut Vec<Candidate>,
) -> Result<bool, ResolveError> {
    let path = PathBuf::from(unescape(pattern));

    let meta = match fs.metadata(&path) {
        Ok(meta) => meta,
        Err(ResolveError::PathNotFound(_)) => return Ok(false),
        Err(err) if explicit => return Err(err),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "skipping inaccessible path");
            return Ok(false);
        }
    };

    if meta.is_dir {
        let depth = if options.recursive { None } else { Some(1) };
        let walked = FileWalker::new(fs, &path).with_max_depth(depth).collect();
        collected.extend(pipeline.apply(walked));
    } else {
        let candidate = Candidate::new(path, meta.modified);
        if pipeline.admits(&candidate) {
            collected.push(candidate);
        }
    }

    Ok(true)
}

/// Resolve one expanded pattern that carries a wildcard: compile it,
/// walk from its static prefix, and keep the matches.
///
/// Returns whether the walk produced any match before filtering.
fn resolve_wildcard<F: WalkerFs>(
    fs: &F,
    pattern: &str,
    options: &ResolveOptions,
    pipeline: &FilterPipeline,
    collected: &mut Vec<Candidate>,
) -> Result<bool, ResolveError> {
    let compiled = GlobPattern::compile(pattern)?;

    let (root, prefix_len) = match compiled.static_prefix() {
        Some(prefix) => {
            if !fs.exists(&prefix) {
                tracing::debug!(prefix = %prefix.display(), "glob prefix does not exist");
                return Ok(false);
            }
            let len = normal_components(&prefix);
            (prefix, len)
        }
        None if compiled.is_anchored() => (PathBuf::from("/"), 0),
        None => (PathBuf::from("."), 0),
    };

    // A pattern with a known depth bounds the walk; `-r` or a globstar
    // removes the bound.
    let max_depth = if options.recursive {
        None
    } else {
        compiled
            .fixed_depth()
            .map(|depth| depth.saturating_sub(prefix_len))
    };

    let walked = FileWalker::new(fs, &root)
        .with_pattern(compiled)
        .with_max_depth(max_depth)
        .collect();

    let found = !walked.is_empty();
    collected.extend(pipeline.apply(walked));
    Ok(found)
}

/// Drop duplicate candidates, keeping the first occurrence of each
/// canonical path. Two spellings of the same file (directly and via a
/// symlinked directory, say) collapse to the first one seen.
fn dedup_by_canonical<F: WalkerFs>(fs: &F, candidates: Vec<Candidate>) -> ResolvedInputSet {
    let mut seen: HashSet<PathBuf> = HashSet::with_capacity(candidates.len());
    let mut entries = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let key = fs.canonicalize(&candidate.path);
        if seen.insert(key) {
            entries.push(candidate);
        }
    }

    ResolvedInputSet { entries }
}

/// Number of named path components in a prefix, so the walker's depth
/// limit can be expressed relative to the walk root.
fn normal_components(path: &Path) -> usize {
    path.components()
        .filter(|c| matches!(c, std::path::Component::Normal(_)))
        .count()
}

/// Whether a token contains unescaped expansion or wildcard syntax.
/// Tokens without any are explicit literals and fail loudly when the
/// path does not exist.
fn has_expansion_meta(token: &str) -> bool {
    let mut chars = token.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '{' | '[' | '*' | '?' => return true,
            _ => {}
        }
    }
    false
}
