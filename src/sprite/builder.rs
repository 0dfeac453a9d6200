//! Runs the transform over the input set and names its outputs.
//!
//! Every leaf of the transform result becomes one [`OutputArtifact`] under
//! the destination directory. Only the transform's file name is kept; any
//! directory it reported is dropped. Stylesheets (`.css`) are additionally
//! passed through the [`OutputNamer`], so their final name can carry a
//! content hash, and are listed in [`BuildOutput::stylesheets`] in the order
//! they were produced.
//!
//! A build either yields every artifact or fails as a whole.

use super::transform::{SourceFile, SpriteTransform, TransformError};
use crate::naming::OutputNamer;
use crate::resolve::InputFileSet;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// Extension that marks an artifact as a stylesheet.
const STYLESHEET_EXTENSION: &str = ".css";

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Cannot read input {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Sprite transform failed: {0}")]
    Transform(#[from] TransformError),
    #[error("Transform output {mode}/{kind} has no file name")]
    UnnamedArtifact { mode: String, kind: String },
}

/// A named, immutable output blob ready for the host's asset registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    /// Destination-relative path, e.g. `dist/sprite.5eb63bbb.css`.
    pub logical_path: String,
    pub content: Vec<u8>,
}

impl OutputArtifact {
    pub fn content_length(&self) -> usize {
        self.content.len()
    }
}

/// Everything one successful build produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOutput {
    pub artifacts: Vec<OutputArtifact>,
    /// Final stylesheet paths, in production order.
    pub stylesheets: Vec<String>,
}

/// Feeds inputs to a [`SpriteTransform`] and names what comes out.
pub struct SpriteBuilder<T> {
    transform: T,
    namer: OutputNamer,
    dest_dir: String,
}

impl<T: SpriteTransform> SpriteBuilder<T> {
    pub fn new(transform: T, namer: OutputNamer, dest_dir: impl Into<String>) -> Self {
        Self {
            transform,
            namer,
            dest_dir: dest_dir.into(),
        }
    }

    pub fn transform(&self) -> &T {
        &self.transform
    }

    /// Read every input, run the transform, and collect named artifacts.
    pub fn build(&self, inputs: &InputFileSet) -> Result<BuildOutput, BuildError> {
        let sources = inputs
            .iter()
            .map(|path| {
                fs::read_to_string(path)
                    .map(|content| SourceFile {
                        path: path.clone(),
                        content,
                    })
                    .map_err(|source| BuildError::Read {
                        path: path.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let compiled = self.transform.compile(&sources)?;

        let mut output = BuildOutput::default();
        for (mode, kind, artifact) in compiled.into_leaves() {
            let Some(file_name) = artifact.path.file_name() else {
                return Err(BuildError::UnnamedArtifact { mode, kind });
            };
            let mut logical_path = format!("{}{}", self.dest_dir, file_name.to_string_lossy());

            if logical_path.ends_with(STYLESHEET_EXTENSION) {
                logical_path = self.namer.output_name(&logical_path, &artifact.contents);
                output.stylesheets.push(logical_path.clone());
            }

            debug!(
                %mode,
                %kind,
                path = %logical_path,
                bytes = artifact.contents.len(),
                "artifact"
            );
            output.artifacts.push(OutputArtifact {
                logical_path,
                content: artifact.contents,
            });
        }
        Ok(output)
    }
}
