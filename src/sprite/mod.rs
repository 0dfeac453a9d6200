//! Sprite building: the transform seam and the builder around it.
//!
//! The module is split into:
//! - **Transform**: [`SpriteTransform`] trait, its input/output types
//! - **SVG**: [`SvgSpriter`], the built-in transform (`css` and `symbol` modes)
//! - **Builder**: [`SpriteBuilder`], which reads inputs, runs a transform and
//!   names the results

pub mod builder;
pub mod svg;
pub mod transform;

pub use builder::{BuildError, BuildOutput, OutputArtifact, SpriteBuilder};
pub use svg::SvgSpriter;
pub use transform::{
    SourceFile, SpriteTransform, TransformArtifact, TransformError, TransformOutput,
};
