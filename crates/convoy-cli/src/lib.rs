//! Command implementations for the `convoy` binary.
//!
//! Each subcommand is a plain function taking its arguments and an
//! output writer, so tests can drive them without spawning a process.
//! Diagnostics (the file count, skip warnings) go to stderr; resolved
//! paths go to the writer.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use convoy_resolve::{
    expand_braces, expand_brackets, resolve, ExpansionBudget, GlobPattern, ResolveOptions,
    DEFAULT_MAX_EXPANSIONS,
};

/// Bulk input resolution for file conversion pipelines.
#[derive(Parser)]
#[command(name = "convoy")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve input patterns to a deduplicated list of files
    Resolve(ResolveArgs),

    /// Expand braces and brackets textually, without touching the filesystem
    Expand(ExpandArgs),

    /// Test whether a path matches a glob pattern (exit 0 on match)
    Match(MatchArgs),
}

#[derive(Parser)]
pub struct ResolveArgs {
    /// Input paths, globs, or brace/bracket patterns (`-` for stdin)
    pub inputs: Vec<String>,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Exclude rule: glob, `dir/`, or `^regex` (repeatable)
    #[arg(long, value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Only include files modified at or after this ISO 8601 date
    #[arg(long, value_name = "DATE")]
    pub modified_since: Option<String>,

    /// Cap on brace/bracket expansion per input token
    #[arg(long, default_value_t = DEFAULT_MAX_EXPANSIONS)]
    pub max_expansions: usize,

    /// Read additional input patterns from a file, one per line
    #[arg(long, value_name = "FILE")]
    pub file_list: Option<PathBuf>,

    /// Separate output paths with NUL instead of newline
    #[arg(short = '0', long)]
    pub print0: bool,
}

#[derive(Parser)]
pub struct ExpandArgs {
    /// The pattern to expand
    pub pattern: String,

    /// Cap on the number of expanded patterns
    #[arg(long, default_value_t = DEFAULT_MAX_EXPANSIONS)]
    pub max_expansions: usize,
}

#[derive(Parser)]
pub struct MatchArgs {
    /// The glob pattern
    pub pattern: String,

    /// The path to test
    pub path: String,
}

/// Dispatch a parsed command line, mapping outcomes to exit codes.
pub fn run(cli: Cli, out: &mut impl Write) -> Result<ExitCode> {
    match cli.command {
        Commands::Resolve(args) => {
            run_resolve(args, out)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Expand(args) => {
            run_expand(args, out)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Match(args) => {
            if run_match(args, out)? {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

/// `convoy resolve`: the full pipeline against the local filesystem.
/// Returns the number of resolved files.
pub fn run_resolve(args: ResolveArgs, out: &mut impl Write) -> Result<usize> {
    let mut inputs = args.inputs;
    if let Some(path) = &args.file_list {
        let listed = read_file_list(path)?;
        tracing::debug!(
            path = %path.display(),
            count = listed.len(),
            "loaded inputs from file list"
        );
        inputs.extend(listed);
    }
    if inputs.is_empty() {
        anyhow::bail!("no inputs given (positional arguments or --file-list)");
    }

    let options = ResolveOptions {
        recursive: args.recursive,
        exclude: args.exclude,
        modified_since: args.modified_since,
        max_expansions: args.max_expansions,
    };

    tracing::debug!(inputs = inputs.len(), recursive = options.recursive, "resolving");
    let set = resolve(&inputs, &options).context("failed to resolve inputs")?;

    let separator = if args.print0 { "\0" } else { "\n" };
    for path in set.paths() {
        write!(out, "{}{}", path.display(), separator)?;
    }

    let count = set.len();
    eprintln!("{} file{} resolved", count, if count == 1 { "" } else { "s" });
    Ok(count)
}

/// `convoy expand`: textual expansion only, one result per line.
pub fn run_expand(args: ExpandArgs, out: &mut impl Write) -> Result<()> {
    let budget = ExpansionBudget::new(args.max_expansions);

    let braced = expand_braces(&args.pattern, &budget)
        .with_context(|| format!("failed to expand `{}`", args.pattern))?;

    let mut total = 0usize;
    for alternative in &braced {
        let bracketed = expand_brackets(alternative, &budget)
            .with_context(|| format!("failed to expand `{}`", args.pattern))?;
        total += bracketed.len();
        budget
            .check(&args.pattern, total)
            .context("expansion limit exceeded")?;
        for pattern in bracketed {
            writeln!(out, "{pattern}")?;
        }
    }

    Ok(())
}

/// `convoy match`: compile and test. Returns whether the path matched.
pub fn run_match(args: MatchArgs, out: &mut impl Write) -> Result<bool> {
    let pattern = GlobPattern::compile(&args.pattern)
        .with_context(|| format!("invalid glob pattern `{}`", args.pattern))?;

    if pattern.matches(std::path::Path::new(&args.path)) {
        writeln!(out, "match")?;
        Ok(true)
    } else {
        writeln!(out, "no match")?;
        Ok(false)
    }
}

/// Read input patterns from a file, one per line. Blank lines and
/// `#` comment lines are skipped.
fn read_file_list(path: &PathBuf) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("cannot read file list `{}`", path.display()))?;

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_writes_one_pattern_per_line() {
        let args = ExpandArgs {
            pattern: "file{1..3}.txt".to_string(),
            max_expansions: DEFAULT_MAX_EXPANSIONS,
        };
        let mut out = Vec::new();
        run_expand(args, &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "file1.txt\nfile2.txt\nfile3.txt\n"
        );
    }

    #[test]
    fn expand_rejects_oversized_patterns() {
        let args = ExpandArgs {
            pattern: "{1..100}".to_string(),
            max_expansions: 10,
        };
        let mut out = Vec::new();
        assert!(run_expand(args, &mut out).is_err());
    }

    #[test]
    fn match_reports_a_match() {
        let args = MatchArgs {
            pattern: "**/*.pdf".to_string(),
            path: "a/b/c.pdf".to_string(),
        };
        let mut out = Vec::new();
        assert!(run_match(args, &mut out).unwrap());
        assert_eq!(String::from_utf8(out).unwrap(), "match\n");
    }

    #[test]
    fn match_reports_a_miss() {
        let args = MatchArgs {
            pattern: "*.pdf".to_string(),
            path: "c.txt".to_string(),
        };
        let mut out = Vec::new();
        assert!(!run_match(args, &mut out).unwrap());
    }

    #[test]
    fn match_rejects_invalid_pattern() {
        let args = MatchArgs {
            pattern: "".to_string(),
            path: "a.txt".to_string(),
        };
        let mut out = Vec::new();
        assert!(run_match(args, &mut out).is_err());
    }

    #[test]
    fn cli_parses_resolve_flags() {
        let cli = Cli::try_parse_from([
            "convoy",
            "resolve",
            "-r",
            "--exclude",
            "*.bak",
            "--exclude",
            "temp/",
            "--modified-since",
            "2024-01-01",
            "-0",
            "docs/*.pdf",
        ])
        .unwrap();

        match cli.command {
            Commands::Resolve(args) => {
                assert!(args.recursive);
                assert!(args.print0);
                assert_eq!(args.exclude, vec!["*.bak", "temp/"]);
                assert_eq!(args.modified_since.as_deref(), Some("2024-01-01"));
                assert_eq!(args.inputs, vec!["docs/*.pdf"]);
                assert_eq!(args.max_expansions, DEFAULT_MAX_EXPANSIONS);
            }
            _ => panic!("expected resolve subcommand"),
        }
    }
}
