//! Filesystem traversal, generic over `WalkerFs`.
//!
//! The walker enumerates candidate files under a root, optionally
//! testing each full path against a [`GlobPattern`]. Traversal is
//! deterministic (entries sorted by name, explicit LIFO stack),
//! single-pass and finite: symlinks are followed for classification,
//! with a seen-set of resolved real paths breaking cycles.
//!
//! Per-entry I/O failures are logged and skipped. Discovery is best
//! effort; a broad glob should not abort on one bad subdirectory.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::pattern::GlobPattern;
use crate::ResolveError;

/// A resolved path plus its modification time, produced by the walker
/// and consumed by the filter pipeline. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
}

impl Candidate {
    pub fn new(path: impl Into<PathBuf>, modified: Option<SystemTime>) -> Self {
        Self {
            path: path.into(),
            modified,
        }
    }
}

/// Metadata for a single path, as reported by `WalkerFs::metadata`.
#[derive(Debug, Clone, Copy)]
pub struct FileMeta {
    pub is_dir: bool,
    pub modified: Option<SystemTime>,
}

/// Minimal read-only filesystem abstraction for the walker.
///
/// `LocalFs` adapts `std::fs`; tests implement this over an in-memory
/// tree so traversal semantics can be exercised without touching disk.
pub trait WalkerFs {
    /// The directory entry type returned by `list_dir`.
    type DirEntry: WalkerDirEntry;

    /// List the entries in a directory.
    fn list_dir(&self, path: &Path) -> Result<Vec<Self::DirEntry>, ResolveError>;

    /// Classify a path, following symlinks.
    fn metadata(&self, path: &Path) -> Result<FileMeta, ResolveError>;

    /// Check if a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Return the canonical (resolved) path, following symlinks.
    ///
    /// Used for symlink cycle detection and duplicate elimination. The
    /// default returns the path unchanged.
    fn canonicalize(&self, path: &Path) -> PathBuf {
        path.to_path_buf()
    }
}

/// A single entry returned by `WalkerFs::list_dir`.
pub trait WalkerDirEntry {
    /// The entry name (file or directory name, not full path).
    fn name(&self) -> &str;

    /// True if this entry is a directory, after following symlinks.
    fn is_dir(&self) -> bool;

    /// True if this entry is a symbolic link.
    fn is_symlink(&self) -> bool;

    /// Modification time, if the filesystem reports one.
    fn modified(&self) -> Option<SystemTime>;
}

/// Deterministic recursive file walker.
///
/// # Examples
/// ```no_run
/// use convoy_resolve::{FileWalker, GlobPattern, LocalFs};
///
/// let pattern = GlobPattern::compile("docs/**/*.pdf").unwrap();
/// let files = FileWalker::new(&LocalFs, "docs")
///     .with_pattern(pattern)
///     .collect();
/// ```
pub struct FileWalker<'a, F: WalkerFs> {
    fs: &'a F,
    root: PathBuf,
    pattern: Option<GlobPattern>,
    max_depth: Option<usize>,
}

impl<'a, F: WalkerFs> FileWalker<'a, F> {
    /// Create a new file walker starting at the given root.
    pub fn new(fs: &'a F, root: impl AsRef<Path>) -> Self {
        Self {
            fs,
            root: root.as_ref().to_path_buf(),
            pattern: None,
            max_depth: None,
        }
    }

    /// Only yield files whose full path matches `pattern`.
    pub fn with_pattern(mut self, pattern: GlobPattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Limit traversal to `depth` path segments below the root.
    /// `Some(1)` yields only the root's direct children.
    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Collect all matching file candidates.
    ///
    /// A root that does not exist produces an empty result; the caller
    /// decides whether that is an error (explicit literal argument) or
    /// not (glob that happened to match nothing).
    pub fn collect(&self) -> Vec<Candidate> {
        let mut results = Vec::new();

        // Seen-set of resolved real paths, for symlink cycle detection.
        let mut visited: HashSet<PathBuf> = HashSet::new();
        visited.insert(self.fs.canonicalize(&self.root));

        let mut stack = vec![(self.root.clone(), 0usize)];

        while let Some((dir, depth)) = stack.pop() {
            let entries = match self.fs.list_dir(&dir) {
                Ok(entries) => entries,
                Err(err) => {
                    tracing::warn!(path = %dir.display(), error = %err, "skipping unreadable directory");
                    continue;
                }
            };

            // Sort entries by name for deterministic traversal order.
            let mut entries: Vec<_> = entries
                .into_iter()
                .map(|e| {
                    (
                        e.name().to_string(),
                        e.is_dir(),
                        e.is_symlink(),
                        e.modified(),
                    )
                })
                .collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));

            let mut dirs_to_push = Vec::new();

            for (name, is_dir, is_symlink, modified) in entries {
                let full = join_child(&dir, &name);
                let child_depth = depth + 1;

                if is_dir {
                    // Track every directory by its resolved real path, so
                    // a symlink cycle (or an alias of an already-walked
                    // directory) is descended into at most once.
                    let canonical = self.fs.canonicalize(&full);
                    if !visited.insert(canonical) {
                        if is_symlink {
                            tracing::debug!(path = %full.display(), "skipping symlink cycle");
                        }
                        continue;
                    }
                    if self.max_depth.map_or(true, |max| child_depth < max) {
                        dirs_to_push.push((full, child_depth));
                    }
                } else if self.matches(&full) {
                    results.push(Candidate::new(full, modified));
                }
            }

            // Reversed so alphabetically-first directories are popped
            // first from the LIFO stack.
            dirs_to_push.reverse();
            stack.extend(dirs_to_push);
        }

        results
    }

    fn matches(&self, path: &Path) -> bool {
        match &self.pattern {
            Some(pattern) => pattern.matches(path),
            None => true,
        }
    }
}

/// Join a child name onto a directory, keeping paths rooted at `.`
/// free of a `./` prefix so they compare equal to pattern segments.
fn join_child(dir: &Path, name: &str) -> PathBuf {
    if dir == Path::new(".") {
        PathBuf::from(name)
    } else {
        dir.join(name)
    }
}

/// `WalkerFs` over the real filesystem.
pub struct LocalFs;

/// Directory entry backed by `std::fs`.
pub struct LocalDirEntry {
    name: String,
    is_dir: bool,
    is_symlink: bool,
    modified: Option<SystemTime>,
}

impl WalkerDirEntry for LocalDirEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_dir(&self) -> bool {
        self.is_dir
    }

    fn is_symlink(&self) -> bool {
        self.is_symlink
    }

    fn modified(&self) -> Option<SystemTime> {
        self.modified
    }
}

impl WalkerFs for LocalFs {
    type DirEntry = LocalDirEntry;

    fn list_dir(&self, path: &Path) -> Result<Vec<LocalDirEntry>, ResolveError> {
        let read = std::fs::read_dir(path).map_err(|e| access_error(path, &e))?;

        let mut entries = Vec::new();
        for entry in read {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "skipping unreadable entry");
                    continue;
                }
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            let is_symlink = entry
                .file_type()
                .map(|ft| ft.is_symlink())
                .unwrap_or(false);

            // Classification follows symlinks; a broken link is treated
            // as a plain file with no metadata.
            let (is_dir, modified) = match std::fs::metadata(entry.path()) {
                Ok(meta) => (meta.is_dir(), meta.modified().ok()),
                Err(_) => (false, None),
            };

            entries.push(LocalDirEntry {
                name,
                is_dir,
                is_symlink,
                modified,
            });
        }

        Ok(entries)
    }

    fn metadata(&self, path: &Path) -> Result<FileMeta, ResolveError> {
        let meta = std::fs::metadata(path).map_err(|e| access_error(path, &e))?;
        Ok(FileMeta {
            is_dir: meta.is_dir(),
            modified: meta.modified().ok(),
        })
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn canonicalize(&self, path: &Path) -> PathBuf {
        std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
    }
}

fn access_error(path: &Path, err: &std::io::Error) -> ResolveError {
    if err.kind() == std::io::ErrorKind::NotFound {
        ResolveError::PathNotFound(path.display().to_string())
    } else {
        ResolveError::Access {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }
}
