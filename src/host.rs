//! The host side of a build cycle.
//!
//! A host schedules cycles and owns the data the pipeline works against:
//!
//! - the build context root every relative path is resolved from
//! - the timestamps of the files it watches
//! - the set of file dependencies that drive its own rebuild triggers
//! - the asset registry generated outputs are handed to
//!
//! The last three travel in a per-cycle [`Compilation`]. [`FsHost`] is the
//! local-filesystem host used by the CLI: it snapshots modification times,
//! resolves paths on disk and writes registered assets under its root.

use crate::detect::TimestampSnapshot;
use crate::resolve::{FsPathResolver, PathResolver, ResolveError};
use crate::sprite::OutputArtifact;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Oldest host API the pipeline can run against.
pub const MIN_HOST_API: u32 = 2;

/// API version implemented by [`FsHost`].
pub const FS_HOST_API: u32 = 2;

/// File written next to the generated assets, listing what was produced.
pub const ASSET_MANIFEST_FILENAME: &str = "sprite-manifest.json";

#[derive(Error, Debug)]
pub enum HostError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Asset path escapes the context root: {0}")]
    UnsafeAssetPath(String),
}

/// Scheduler-facing surface the pipeline needs at set-up time.
pub trait Host: PathResolver {
    fn api_version(&self) -> u32;
    fn context(&self) -> &Path;
}

/// Per-cycle state shared between the host and the pipeline.
#[derive(Debug, Clone, Default)]
pub struct Compilation {
    pub context: PathBuf,
    pub file_timestamps: TimestampSnapshot,
    pub file_dependencies: BTreeSet<PathBuf>,
    pub assets: BTreeMap<String, OutputArtifact>,
}

impl Compilation {
    pub fn new(context: impl Into<PathBuf>, file_timestamps: TimestampSnapshot) -> Self {
        Self {
            context: context.into(),
            file_timestamps,
            ..Self::default()
        }
    }

    pub fn add_dependency(&mut self, path: impl Into<PathBuf>) {
        self.file_dependencies.insert(path.into());
    }

    /// Register an artifact, replacing any earlier one at the same path.
    pub fn emit_asset(&mut self, artifact: OutputArtifact) {
        self.assets.insert(artifact.logical_path.clone(), artifact);
    }
}

/// Summary of one rebuild, written as JSON for downstream consumers
/// (e.g. HTML templates injecting `<link>` tags).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetManifest {
    pub stylesheets: Vec<String>,
    pub assets: Vec<String>,
}

/// Host backed by the local filesystem.
#[derive(Debug, Clone)]
pub struct FsHost {
    context: PathBuf,
}

impl FsHost {
    /// Create a host rooted at `context` (canonicalized).
    pub fn new(context: &Path) -> Result<Self, HostError> {
        Ok(Self {
            context: context.canonicalize()?,
        })
    }

    /// A compilation whose snapshot covers `watched`, read from disk now.
    pub fn compilation<I, P>(&self, watched: I) -> Compilation
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Compilation::new(&self.context, TimestampSnapshot::from_files(watched))
    }

    /// Write every registered asset under the context root.
    ///
    /// Returns the absolute paths written, in registry order.
    pub fn write_assets(&self, compilation: &Compilation) -> Result<Vec<PathBuf>, HostError> {
        let mut written = Vec::with_capacity(compilation.assets.len());
        for (logical_path, artifact) in &compilation.assets {
            let target = self.asset_path(logical_path)?;
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, &artifact.content)?;
            debug!(path = %target.display(), bytes = artifact.content_length(), "wrote asset");
            written.push(target);
        }
        Ok(written)
    }

    /// Write [`ASSET_MANIFEST_FILENAME`] into `dest_dir`.
    pub fn write_manifest(
        &self,
        dest_dir: &str,
        manifest: &AssetManifest,
    ) -> Result<PathBuf, HostError> {
        let dir = self.context.join(dest_dir);
        fs::create_dir_all(&dir)?;
        let path = dir.join(ASSET_MANIFEST_FILENAME);
        fs::write(&path, serde_json::to_string_pretty(manifest)?)?;
        Ok(path)
    }

    fn asset_path(&self, logical_path: &str) -> Result<PathBuf, HostError> {
        let relative = Path::new(logical_path);
        let escapes = relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir));
        if escapes {
            return Err(HostError::UnsafeAssetPath(logical_path.to_string()));
        }
        Ok(self.context.join(relative))
    }
}

impl PathResolver for FsHost {
    fn resolve(&self, context: &Path, relative: &Path) -> Result<PathBuf, ResolveError> {
        FsPathResolver.resolve(context, relative)
    }
}

impl Host for FsHost {
    fn api_version(&self) -> u32 {
        FS_HOST_API
    }

    fn context(&self) -> &Path {
        &self.context
    }
}
