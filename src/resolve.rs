//! Input file discovery and resolution.
//!
//! Runs once, when the pipeline is set up. The source glob is expanded
//! against the build context root and every match is turned into an absolute
//! path through a [`PathResolver`]. The resulting [`InputFileSet`] is fixed
//! for the lifetime of the pipeline: files added later are not picked up
//! until the process restarts.
//!
//! ## Expansion Rules
//!
//! - Patterns with wildcard syntax (`*`, `?`, `[`) are matched against every
//!   file below the literal part of the pattern. Directories never match.
//!   Hidden files (leading `.`) only match a literal dot.
//! - Patterns without wildcards are taken as a single literal path; the
//!   filesystem is not walked.
//!
//! Files are yielded in traversal order, with siblings visited by file name
//! so the order is identical from one run to the next.
//!
//! ## Failure
//!
//! Resolution is all-or-nothing. If any single match cannot be resolved the
//! whole step fails and no input set is produced.

use glob::{MatchOptions, Pattern};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: glob::PatternError,
    },
    #[error("Error walking {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Cannot resolve input file {path}: {source}")]
    Unresolvable {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Input is not a file: {0}")]
    NotAFile(PathBuf),
}

/// Turns a context-relative path into an absolute one.
///
/// Implemented by hosts; fails per file when nothing matches.
pub trait PathResolver {
    fn resolve(&self, context: &Path, relative: &Path) -> Result<PathBuf, ResolveError>;
}

/// Resolves against the local filesystem, following symlinks.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsPathResolver;

impl PathResolver for FsPathResolver {
    fn resolve(&self, context: &Path, relative: &Path) -> Result<PathBuf, ResolveError> {
        let absolute =
            context
                .join(relative)
                .canonicalize()
                .map_err(|source| ResolveError::Unresolvable {
                    path: relative.to_path_buf(),
                    source,
                })?;
        if !absolute.is_file() {
            return Err(ResolveError::NotAFile(relative.to_path_buf()));
        }
        Ok(absolute)
    }
}

/// Ordered absolute paths of every file the pipeline bundles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputFileSet {
    files: Vec<PathBuf>,
}

impl InputFileSet {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self { files }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.iter().any(|f| f == path)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn as_slice(&self) -> &[PathBuf] {
        &self.files
    }
}

impl<'a> IntoIterator for &'a InputFileSet {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

/// Whether a pattern contains glob syntax.
pub fn has_magic(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Leading components of `pattern` that contain no glob syntax.
///
/// `icons/ui/**/*.svg` → `icons/ui`. Walking starts there instead of at the
/// context root.
fn literal_prefix(pattern: &str) -> PathBuf {
    Path::new(pattern)
        .components()
        .take_while(|c| match c {
            Component::Normal(part) => !has_magic(&part.to_string_lossy()),
            _ => true,
        })
        .collect()
}

/// Drop leading `./` segments, which walked paths never carry.
fn normalize_pattern(pattern: &str) -> &str {
    let mut rest = pattern;
    while let Some(stripped) = rest.strip_prefix("./") {
        rest = stripped.trim_start_matches('/');
    }
    rest
}

/// Expand a glob pattern below `base`.
///
/// Matches are relative to `base`, except for absolute patterns, whose
/// matches are absolute.
pub fn expand_glob(pattern: &str, base: &Path) -> Result<Vec<PathBuf>, ResolveError> {
    let pattern = normalize_pattern(pattern);
    let absolute = Path::new(pattern).is_absolute();
    let matcher = Pattern::new(pattern).map_err(|source| ResolveError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let walk_root = base.join(literal_prefix(pattern));
    if !walk_root.is_dir() {
        debug!(root = %walk_root.display(), "glob root does not exist");
        return Ok(Vec::new());
    }

    let mut matches = Vec::new();
    for entry in WalkDir::new(&walk_root).sort_by_file_name() {
        let entry = entry?;
        if !entry.path().is_file() {
            continue;
        }
        let candidate = if absolute {
            entry.path()
        } else {
            let Ok(relative) = entry.path().strip_prefix(base) else {
                continue;
            };
            relative
        };
        if matcher.matches_path_with(candidate, MATCH_OPTIONS) {
            matches.push(candidate.to_path_buf());
        }
    }
    Ok(matches)
}

/// Resolve the pipeline's input set against the build context root.
pub fn resolve_inputs(
    pattern: &str,
    context: &Path,
    resolver: &impl PathResolver,
) -> Result<InputFileSet, ResolveError> {
    let relative = if has_magic(pattern) {
        expand_glob(pattern, context)?
    } else {
        vec![PathBuf::from(pattern)]
    };

    let files = relative
        .iter()
        .map(|rel| resolver.resolve(context, rel))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(pattern, count = files.len(), "resolved input files");
    Ok(InputFileSet::new(files))
}
