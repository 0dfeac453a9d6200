//! Sprite transform trait and shared types.
//!
//! A [`SpriteTransform`] takes the ordered source files and produces a
//! nested result: build *mode* → output *type* → artifact. The pipeline
//! never interprets modes or types; it only flattens the tree into
//! `(mode, type, artifact)` leaves.
//!
//! The production implementation is [`SvgSpriter`](super::svg::SvgSpriter).

use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Invalid SVG in {path}: {reason}")]
    InvalidSvg { path: PathBuf, reason: String },
    #[error("Transform failed: {0}")]
    Failed(String),
}

/// One input handed to the transform: absolute path plus raw text.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content: String,
}

/// A single output produced by the transform, named by the transform.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformArtifact {
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

/// Nested transform result: mode → type → artifact.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformOutput {
    modes: BTreeMap<String, BTreeMap<String, TransformArtifact>>,
}

impl TransformOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        mode: impl Into<String>,
        kind: impl Into<String>,
        artifact: TransformArtifact,
    ) {
        self.modes
            .entry(mode.into())
            .or_default()
            .insert(kind.into(), artifact);
    }

    pub fn get(&self, mode: &str, kind: &str) -> Option<&TransformArtifact> {
        self.modes.get(mode)?.get(kind)
    }

    /// Number of leaves across all modes.
    pub fn len(&self) -> usize {
        self.modes.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consume the tree as a flat, lazy sequence of `(mode, type, artifact)`.
    pub fn into_leaves(self) -> impl Iterator<Item = (String, String, TransformArtifact)> {
        self.modes.into_iter().flat_map(|(mode, kinds)| {
            kinds
                .into_iter()
                .map(move |(kind, artifact)| (mode.clone(), kind, artifact))
        })
    }
}

/// Combines source files into named output blobs.
///
/// Called once per rebuild with every input, in input-set order.
pub trait SpriteTransform {
    fn compile(&self, sources: &[SourceFile]) -> Result<TransformOutput, TransformError>;
}
