//! Bracket expansion: `[abc]` sets and `[a-z]` / `[0-9]` ranges.
//!
//! Runs strictly after brace expansion and strictly before glob
//! compilation: each `[...]` group becomes one more cross-product
//! dimension of literal single-character alternatives. `file[1-3]*.txt`
//! first yields `file1*.txt`, `file2*.txt`, `file3*.txt`, each of which
//! is then compiled with wildcard semantics.
//!
//! An unmatched `[` fails open (stays literal). A reversed range like
//! `[z-a]` is an error.

use crate::{ExpansionBudget, ResolveError};

enum Piece {
    Literal(String),
    Set(Vec<char>),
}

/// Expand all bracket groups in `pattern` into the cross-product of
/// literal pattern strings.
///
/// # Examples
/// ```
/// use convoy_resolve::{expand_brackets, ExpansionBudget};
///
/// let budget = ExpansionBudget::new(1000);
/// assert_eq!(
///     expand_brackets("file[1-3].txt", &budget).unwrap(),
///     vec!["file1.txt", "file2.txt", "file3.txt"]
/// );
/// ```
pub fn expand_brackets(
    pattern: &str,
    budget: &ExpansionBudget,
) -> Result<Vec<String>, ResolveError> {
    let pieces = scan(pattern)?;

    let mut results = vec![String::new()];
    for piece in pieces {
        match piece {
            Piece::Literal(text) => {
                for r in &mut results {
                    r.push_str(&text);
                }
            }
            Piece::Set(chars) => {
                let total = results.len().checked_mul(chars.len()).unwrap_or(usize::MAX);
                budget.check(pattern, total)?;

                let mut next = Vec::with_capacity(total);
                for prefix in &results {
                    for &c in &chars {
                        let mut s = String::with_capacity(prefix.len() + 1);
                        s.push_str(prefix);
                        s.push(c);
                        next.push(s);
                    }
                }
                results = next;
            }
        }
    }

    Ok(results)
}

fn scan(pattern: &str) -> Result<Vec<Piece>, ResolveError> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut pieces = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => {
                literal.push('\\');
                literal.push(chars[i + 1]);
                i += 2;
            }
            '[' => match chars[i + 1..].iter().position(|&c| c == ']') {
                Some(off) if off > 0 => {
                    let close = i + 1 + off;
                    let content = &chars[i + 1..close];
                    if !literal.is_empty() {
                        pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                    }
                    pieces.push(Piece::Set(expand_set(pattern, content)?));
                    i = close + 1;
                }
                _ => {
                    // Unmatched `[` or empty `[]` stays literal.
                    literal.push('[');
                    i += 1;
                }
            },
            c => {
                literal.push(c);
                i += 1;
            }
        }
    }

    if !literal.is_empty() {
        pieces.push(Piece::Literal(literal));
    }

    Ok(pieces)
}

/// Expand the content of one bracket group into its characters, in
/// written order. `x-y` is an inclusive ascending range when both ends
/// are digits or both are letters; otherwise the dash is literal.
fn expand_set(pattern: &str, content: &[char]) -> Result<Vec<char>, ResolveError> {
    let mut out = Vec::new();
    let mut i = 0;

    while i < content.len() {
        if i + 2 < content.len() && content[i + 1] == '-' && rangeable(content[i], content[i + 2]) {
            let (start, end) = (content[i], content[i + 2]);
            if start > end {
                return Err(ResolveError::invalid(
                    pattern,
                    format!("reversed character range `{start}-{end}`"),
                ));
            }
            for c in start..=end {
                out.push(c);
            }
            i += 3;
        } else {
            out.push(content[i]);
            i += 1;
        }
    }

    Ok(out)
}

/// Ranges are meaningful for digit-digit and letter-letter pairs only
/// (case-sensitive, so `a-Z` is not a range).
fn rangeable(a: char, b: char) -> bool {
    (a.is_ascii_digit() && b.is_ascii_digit())
        || (a.is_ascii_lowercase() && b.is_ascii_lowercase())
        || (a.is_ascii_uppercase() && b.is_ascii_uppercase())
}
