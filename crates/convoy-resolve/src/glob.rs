//! Single-segment wildcard matching.
//!
//! Matches one path component at a time, after brace and bracket
//! expansion have already reduced the pattern to literals plus `*` and
//! `?`:
//!
//! - `*` matches zero or more characters, never a separator
//! - `?` matches exactly one character
//! - `\x` matches the literal character `x`
//!
//! Path-level matching, including `**`, lives in [`crate::pattern`].

/// Maximum number of recursive calls for wildcard matching. Protects
/// against adversarial patterns like `*a*a*a*...*a` that cause O(n^k)
/// backtracking. Counted as total work, not stack depth.
const MAX_MATCH_CALLS: usize = 100_000;

/// Match a single path component against a wildcard pattern.
///
/// Returns true if the pattern matches the entire input string.
/// Matcher construction is pure: the same pattern always yields the
/// same decision for the same input.
///
/// # Examples
/// ```
/// use convoy_resolve::wildcard_match;
///
/// assert!(wildcard_match("*.pdf", "report.pdf"));
/// assert!(wildcard_match("file?", "file1"));
/// assert!(!wildcard_match("*.pdf", "report.txt"));
/// ```
pub fn wildcard_match(pattern: &str, input: &str) -> bool {
    use std::cell::Cell;

    let pattern: Vec<char> = pattern.chars().collect();
    let input: Vec<char> = input.chars().collect();
    let calls = Cell::new(0usize);
    match_bounded(&pattern, 0, &input, 0, &calls)
}

/// Check whether a string contains unescaped wildcard metacharacters
/// (`*` or `?`).
pub fn contains_wildcard(s: &str) -> bool {
    let chars: Vec<char> = s.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => i += 2,
            '*' | '?' => return true,
            _ => i += 1,
        }
    }
    false
}

/// Strip escape backslashes, turning a fully-expanded pattern into the
/// literal path text it denotes.
pub fn unescape(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '\\' && i + 1 < chars.len() {
            out.push(chars[i + 1]);
            i += 2;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}

/// Work-bounded recursive matching with backtracking for `*`.
///
/// Returns `false` (non-match) once total recursive calls exceed
/// `MAX_MATCH_CALLS`.
fn match_bounded(
    pattern: &[char],
    pi: usize,
    input: &[char],
    ii: usize,
    calls: &std::cell::Cell<usize>,
) -> bool {
    let count = calls.get() + 1;
    calls.set(count);
    if count > MAX_MATCH_CALLS {
        return false;
    }

    // Both exhausted - match!
    if pi >= pattern.len() && ii >= input.len() {
        return true;
    }

    // Pattern exhausted but input remains - no match
    if pi >= pattern.len() {
        return false;
    }

    match pattern[pi] {
        '*' => {
            // Skip consecutive stars
            let mut next_pi = pi;
            while next_pi < pattern.len() && pattern[next_pi] == '*' {
                next_pi += 1;
            }

            // Star at end matches everything remaining
            if next_pi >= pattern.len() {
                return true;
            }

            // Try matching star with 0, 1, 2, ... characters
            for skip in 0..=(input.len() - ii) {
                if match_bounded(pattern, next_pi, input, ii + skip, calls) {
                    return true;
                }
            }
            false
        }

        '?' => {
            if ii >= input.len() {
                return false;
            }
            match_bounded(pattern, pi + 1, input, ii + 1, calls)
        }

        // Escape next character
        '\\' if pi + 1 < pattern.len() => {
            if ii >= input.len() {
                return false;
            }
            if pattern[pi + 1] == input[ii] {
                match_bounded(pattern, pi + 2, input, ii + 1, calls)
            } else {
                false
            }
        }

        c => {
            if ii >= input.len() {
                return false;
            }
            if c == input[ii] {
                match_bounded(pattern, pi + 1, input, ii + 1, calls)
            } else {
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_matches() {
        assert!(wildcard_match("hello", "hello"));
        assert!(wildcard_match("", ""));
        assert!(!wildcard_match("hello", "world"));
        assert!(!wildcard_match("hello", "hell"));
        assert!(!wildcard_match("hello", "helloo"));
    }

    #[test]
    fn star_wildcard() {
        assert!(wildcard_match("*", ""));
        assert!(wildcard_match("*", "anything"));
        assert!(wildcard_match("*.pdf", "report.pdf"));
        assert!(wildcard_match("*.pdf", ".pdf"));
        assert!(wildcard_match("doc*", "doc"));
        assert!(wildcard_match("doc*", "document"));
        assert!(wildcard_match("a*b*c", "abc"));
        assert!(wildcard_match("a*b*c", "aXXXbYYYc"));
        assert!(!wildcard_match("*.pdf", "report.txt"));
        assert!(!wildcard_match("doc*", "mydoc"));
    }

    #[test]
    fn question_wildcard() {
        assert!(wildcard_match("?", "a"));
        assert!(wildcard_match("???", "abc"));
        assert!(wildcard_match("file?", "file1"));
        assert!(!wildcard_match("?", ""));
        assert!(!wildcard_match("?", "ab"));
        assert!(!wildcard_match("file?", "file"));
        assert!(!wildcard_match("file?", "file12"));
    }

    #[test]
    fn escape_sequence() {
        assert!(wildcard_match(r"\*", "*"));
        assert!(wildcard_match(r"\?", "?"));
        assert!(wildcard_match(r"report\*", "report*"));
        assert!(!wildcard_match(r"\*", "a"));
    }

    #[test]
    fn consecutive_stars_collapse() {
        assert!(wildcard_match("**", "anything"));
        assert!(wildcard_match("a**b", "ab"));
        assert!(wildcard_match("a**b", "aXXXb"));
    }

    #[test]
    fn unicode_input() {
        assert!(wildcard_match("héllo", "héllo"));
        assert!(wildcard_match("*ñ*", "español"));
        assert!(wildcard_match("?", "ü"));
    }

    #[test]
    fn backtracking_stress() {
        assert!(wildcard_match("a*a*a*a*a*a*a*a", "aaaaaaaaaaaaaaaa"));
        assert!(!wildcard_match("a*a*a*a*a*a*a*ab", "aaaaaaaaaaaaaaaa"));
        assert!(wildcard_match("*a*b*c", "XXXaYYYbZZZc"));
        assert!(!wildcard_match("*a*b*c", "XXXaYYYcZZZb"));

        // Adversarial pattern must complete in bounded time; a forced
        // non-match is acceptable.
        let pattern = format!("{}b", "*a".repeat(50));
        let input = "a".repeat(100);
        let _ = wildcard_match(&pattern, &input);
    }

    #[test]
    fn wildcard_detection_ignores_escapes() {
        assert!(contains_wildcard("*.pdf"));
        assert!(contains_wildcard("file?.txt"));
        assert!(!contains_wildcard("plain.txt"));
        assert!(!contains_wildcard(r"literal\*.txt"));
        assert!(contains_wildcard(r"literal\**.txt"));
    }

    #[test]
    fn unescape_strips_backslashes() {
        assert_eq!(unescape(r"a\{b\}"), "a{b}");
        assert_eq!(unescape(r"plain"), "plain");
        assert_eq!(unescape(r"trailing\"), r"trailing\");
    }
}
