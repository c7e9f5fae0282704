//! Exclusion rules and the modification-date filter.
//!
//! Exclude strings are classified once, purely syntactically:
//!
//! - starts with `^` → regular expression, matched anywhere in the path
//! - ends with a path separator → directory prefix, segment-aligned
//! - anything else → glob, with the wildcard semantics of [`crate::pattern`]
//!
//! Rules are a logical OR of independent predicates: a candidate is
//! dropped as soon as any rule matches, so rule order affects only
//! performance, never the outcome.

use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;

use crate::glob::wildcard_match;
use crate::pattern::GlobPattern;
use crate::walker::Candidate;
use crate::ResolveError;

/// One exclusion rule. The rule set is closed and small; each variant
/// carries its matcher, dispatched once at classification time.
#[derive(Debug, Clone)]
pub enum ExcludeRule {
    /// Glob rule: `*.tmp`, `build/*.log`. A single-segment pattern is
    /// also tested against the bare file name, so `*.tmp` excludes
    /// `docs/draft.tmp`.
    Glob { pattern: GlobPattern, raw: String },
    /// Directory rule: `temp/`. Matches when the rule's segments are a
    /// prefix of the candidate's segments. Segment-aligned, so `temp/`
    /// does not match `template.txt`.
    Dir { segments: Vec<String> },
    /// Regex rule: `^.*_backup`. Matches anywhere in the path string.
    Regex(Regex),
}

impl ExcludeRule {
    /// Classify a raw exclude string into a rule.
    ///
    /// A malformed regex is reported here, once, not per-candidate.
    pub fn classify(raw: &str) -> Result<Self, ResolveError> {
        if raw.starts_with('^') {
            let re = Regex::new(raw).map_err(|e| {
                ResolveError::invalid(raw, format!("invalid exclude regex: {e}"))
            })?;
            return Ok(ExcludeRule::Regex(re));
        }

        if raw.ends_with('/') || raw.ends_with('\\') {
            // Empty segments are dropped so absolute rules (`/data/temp/`)
            // line up with the Normal-only components of candidate paths.
            let segments: Vec<String> = raw
                .trim_end_matches(['/', '\\'])
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if segments.is_empty() {
                return Err(ResolveError::invalid(raw, "empty directory exclude"));
            }
            return Ok(ExcludeRule::Dir { segments });
        }

        let pattern = GlobPattern::compile(raw)?;
        Ok(ExcludeRule::Glob {
            pattern,
            raw: raw.to_string(),
        })
    }

    /// Check whether a candidate path matches this rule.
    pub fn matches(&self, path: &Path) -> bool {
        match self {
            ExcludeRule::Glob { pattern, raw } => {
                if pattern.matches(path) {
                    return true;
                }
                // Single-segment globs also apply to the file name.
                if !raw.contains('/') {
                    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                        return wildcard_match(raw, name);
                    }
                }
                false
            }
            ExcludeRule::Dir { segments } => {
                let components: Vec<&str> = path
                    .components()
                    .filter_map(|c| match c {
                        std::path::Component::Normal(s) => s.to_str(),
                        _ => None,
                    })
                    .collect();
                components.len() > segments.len()
                    && segments
                        .iter()
                        .zip(components.iter())
                        .all(|(seg, comp)| seg == comp)
            }
            ExcludeRule::Regex(re) => re.is_match(&path.to_string_lossy()),
        }
    }
}

/// Inclusive lower bound on modification time, parsed from an ISO-8601
/// date or datetime string.
#[derive(Debug, Clone, Copy)]
pub struct DateFilter {
    threshold: SystemTime,
}

impl DateFilter {
    /// Parse `2024-06-01`, `2024-06-01T12:30:00`, or an RFC 3339
    /// datetime with an offset.
    pub fn parse(input: &str) -> Result<Self, ResolveError> {
        let utc: DateTime<Utc> = if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            dt.with_timezone(&Utc)
        } else if let Ok(dt) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S") {
            Utc.from_utc_datetime(&dt)
        } else if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
            let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| {
                ResolveError::invalid(input, "invalid date")
            })?;
            Utc.from_utc_datetime(&midnight)
        } else {
            return Err(ResolveError::invalid(
                input,
                "invalid date, expected ISO-8601 (e.g. 2024-06-01)",
            ));
        };

        Ok(Self {
            threshold: SystemTime::from(utc),
        })
    }

    pub fn from_system_time(threshold: SystemTime) -> Self {
        Self { threshold }
    }

    /// Candidates at or after the threshold are kept (inclusive lower
    /// bound). A candidate with no known mtime is kept.
    pub fn admits(&self, modified: Option<SystemTime>) -> bool {
        match modified {
            Some(mtime) => mtime >= self.threshold,
            None => true,
        }
    }
}

/// The ordered exclusion rules plus the optional date threshold,
/// compiled once per resolve call.
#[derive(Debug, Clone, Default)]
pub struct FilterPipeline {
    rules: Vec<ExcludeRule>,
    date: Option<DateFilter>,
}

impl FilterPipeline {
    /// Classify every exclude string and parse the date threshold.
    /// Fails fast: a malformed rule aborts the whole resolve.
    pub fn new(excludes: &[String], modified_since: Option<&str>) -> Result<Self, ResolveError> {
        let rules = excludes
            .iter()
            .map(|raw| ExcludeRule::classify(raw))
            .collect::<Result<Vec<_>, _>>()?;
        let date = modified_since.map(DateFilter::parse).transpose()?;
        Ok(Self { rules, date })
    }

    /// Check whether a candidate survives all rules and the date bound.
    pub fn admits(&self, candidate: &Candidate) -> bool {
        // Short-circuit on the first matching exclusion.
        if self.rules.iter().any(|rule| rule.matches(&candidate.path)) {
            return false;
        }
        match &self.date {
            Some(filter) => filter.admits(candidate.modified),
            None => true,
        }
    }

    /// Drop excluded candidates, preserving order.
    pub fn apply(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        if self.rules.is_empty() && self.date.is_none() {
            return candidates;
        }
        candidates.into_iter().filter(|c| self.admits(c)).collect()
    }
}
