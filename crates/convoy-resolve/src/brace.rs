//! Brace expansion: `{a,b,c}` lists and `{m..n}` / `{m..n..s}` ranges.
//!
//! Expansion is purely textual and happens before any filesystem
//! matching. A pattern is scanned left-to-right into literal runs and
//! balanced brace groups; the groups then form an ordered cross-product
//! in which the rightmost group's alternatives cycle fastest.
//!
//! Unmatched or empty braces fail open (they stay literal text). A
//! malformed range is an error, so the caller can report it instead of
//! silently converting the wrong files.

use crate::{ExpansionBudget, ResolveError};

/// A scanned slice of a pattern: literal text or one expanded group.
enum Piece {
    Literal(String),
    Group(Vec<String>),
}

/// Expand all brace groups in `pattern` into the cross-product of
/// literal pattern strings.
///
/// A pattern with no groups expands to exactly itself. `\{`, `\}` and
/// `\,` are literal (the backslash is preserved for later stages).
///
/// # Examples
/// ```
/// use convoy_resolve::{expand_braces, ExpansionBudget};
///
/// let budget = ExpansionBudget::new(1000);
/// assert_eq!(expand_braces("a{1..3}b", &budget).unwrap(), vec!["a1b", "a2b", "a3b"]);
/// assert_eq!(expand_braces("plain.txt", &budget).unwrap(), vec!["plain.txt"]);
/// ```
pub fn expand_braces(
    pattern: &str,
    budget: &ExpansionBudget,
) -> Result<Vec<String>, ResolveError> {
    let pieces = scan(pattern, budget)?;

    let mut results = vec![String::new()];
    for piece in pieces {
        match piece {
            Piece::Literal(text) => {
                for r in &mut results {
                    r.push_str(&text);
                }
            }
            Piece::Group(alternatives) => {
                let total = results
                    .len()
                    .checked_mul(alternatives.len())
                    .unwrap_or(usize::MAX);
                budget.check(pattern, total)?;

                let mut next = Vec::with_capacity(total);
                for prefix in &results {
                    for alt in &alternatives {
                        let mut s = String::with_capacity(prefix.len() + alt.len());
                        s.push_str(prefix);
                        s.push_str(alt);
                        next.push(s);
                    }
                }
                results = next;
            }
        }
    }

    Ok(results)
}

/// Scan the pattern into literal runs and fully expanded groups.
fn scan(pattern: &str, budget: &ExpansionBudget) -> Result<Vec<Piece>, ResolveError> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut pieces = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => {
                // Keep the escape intact for the bracket and glob stages.
                literal.push('\\');
                literal.push(chars[i + 1]);
                i += 2;
            }
            '{' => match find_closing(&chars, i) {
                Some(close) => {
                    let content: String = chars[i + 1..close].iter().collect();
                    if content.is_empty() {
                        // Empty braces stay literal.
                        literal.push_str("{}");
                    } else {
                        if !literal.is_empty() {
                            pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                        }
                        pieces.push(Piece::Group(expand_group(pattern, &content, budget)?));
                    }
                    i = close + 1;
                }
                None => {
                    // Unmatched brace stays literal.
                    literal.push('{');
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

/// Find the index of the `}` matching the `{` at `open`, honoring
/// nesting and escapes. Returns `None` for an unmatched brace.
fn find_closing(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0;
    let mut i = open;
    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => i += 1,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Expand the content of one brace group into its alternatives, each
/// recursively brace-expanded.
fn expand_group(
    pattern: &str,
    content: &str,
    budget: &ExpansionBudget,
) -> Result<Vec<String>, ResolveError> {
    let parts = split_alternatives(content);

    if parts.len() == 1 && !content.contains('{') && content.contains("..") {
        return expand_range(pattern, content, budget);
    }

    // List form: alternatives in written order. An empty alternative
    // (`{a,,b}`) contributes an empty string.
    let mut alternatives = Vec::new();
    for part in parts {
        alternatives.extend(expand_braces(&part, budget)?);
    }
    budget.check(pattern, alternatives.len())?;
    Ok(alternatives)
}

/// Split group content on top-level commas, respecting nested braces
/// and escapes.
fn split_alternatives(content: &str) -> Vec<String> {
    let chars: Vec<char> = content.chars().collect();
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0;
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => {
                current.push('\\');
                current.push(chars[i + 1]);
                i += 2;
                continue;
            }
            '{' => {
                depth += 1;
                current.push('{');
            }
            '}' => {
                depth -= 1;
                current.push('}');
            }
            ',' if depth == 0 => {
                parts.push(std::mem::take(&mut current));
            }
            c => current.push(c),
        }
        i += 1;
    }
    parts.push(current);

    parts
}

/// Expand a `{m..n}` or `{m..n..s}` range.
///
/// Direction is inferred from the bounds; the step walks toward the far
/// bound and the last value before crossing it is included. Zero
/// padding is preserved, using the wider of the two operand widths.
fn expand_range(
    pattern: &str,
    content: &str,
    budget: &ExpansionBudget,
) -> Result<Vec<String>, ResolveError> {
    let parts: Vec<&str> = content.split("..").collect();
    if parts.len() > 3 {
        return Err(ResolveError::invalid(
            pattern,
            format!("malformed range `{{{content}}}`"),
        ));
    }

    let start: i64 = parts[0].parse().map_err(|_| {
        ResolveError::invalid(
            pattern,
            format!("non-numeric range bound `{}` in `{{{content}}}`", parts[0]),
        )
    })?;
    let end: i64 = parts[1].parse().map_err(|_| {
        ResolveError::invalid(
            pattern,
            format!("non-numeric range bound `{}` in `{{{content}}}`", parts[1]),
        )
    })?;
    let step: i64 = if parts.len() == 3 {
        parts[2].parse().map_err(|_| {
            ResolveError::invalid(
                pattern,
                format!("non-numeric range step `{}` in `{{{content}}}`", parts[2]),
            )
        })?
    } else {
        1
    };
    if step <= 0 {
        return Err(ResolveError::invalid(
            pattern,
            format!("range step must be a positive integer in `{{{content}}}`"),
        ));
    }

    let span = start.abs_diff(end);
    let count = (span / step as u64) as usize + 1;
    budget.check(pattern, count)?;

    let width = pad_width(parts[0], parts[1]);
    let mut values = Vec::with_capacity(count);
    let mut v = start;
    if start <= end {
        while v <= end {
            values.push(format_value(v, width));
            v = match v.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }
    } else {
        while v >= end {
            values.push(format_value(v, width));
            v = match v.checked_sub(step) {
                Some(next) => next,
                None => break,
            };
        }
    }

    Ok(values)
}

/// Zero-pad width for range output: the longer of the two operand
/// widths, but only when either operand is written with a leading zero.
fn pad_width(a: &str, b: &str) -> Option<usize> {
    fn digits(s: &str) -> &str {
        s.trim_start_matches(['-', '+'])
    }
    let padded = |s: &str| {
        let d = digits(s);
        d.len() > 1 && d.starts_with('0')
    };
    if padded(a) || padded(b) {
        Some(digits(a).len().max(digits(b).len()))
    } else {
        None
    }
}

fn format_value(v: i64, width: Option<usize>) -> String {
    match width {
        Some(w) => {
            if v < 0 {
                format!("-{:0w$}", v.unsigned_abs(), w = w)
            } else {
                format!("{v:0w$}")
            }
        }
        None => v.to_string(),
    }
}
