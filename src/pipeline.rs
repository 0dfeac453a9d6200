//! Build coordination: one sprite build per host cycle.
//!
//! A [`Pipeline`] is created once per host process. Set-up checks the host's
//! API version, resolves the input set and records the start time used as
//! the change-detection baseline. After that the host drives it through two
//! calls per cycle:
//!
//! ```text
//! on_cycle_start(compilation)
//!   ├── in flight?           → AlreadyRunning (no-op)
//!   ├── register inputs as file dependencies
//!   ├── detector says no?    → UpToDate
//!   └── build, register every artifact → Rebuilt
//! on_cycle_end()             → back to idle, even after a failure
//! ```
//!
//! Assets are registered only after the whole build succeeded, so a failed
//! cycle leaves the compilation's asset map untouched.

use crate::config::PipelineConfig;
use crate::detect::ChangeDetector;
use crate::host::{Compilation, Host, MIN_HOST_API};
use crate::naming::OutputNamer;
use crate::resolve::{InputFileSet, ResolveError, resolve_inputs};
use crate::sprite::{BuildError, SpriteBuilder, SpriteTransform, SvgSpriter};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Host API version {found} is not supported (requires {required} or newer)")]
    IncompatibleHost { found: u32, required: u32 },
    #[error("Input resolution failed: {0}")]
    Resolve(#[from] ResolveError),
    #[error("Sprite build failed: {0}")]
    Build(#[from] BuildError),
}

/// What a call to [`Pipeline::on_cycle_start`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A build was already in progress; nothing happened.
    AlreadyRunning,
    /// No relevant input changed; nothing was rebuilt.
    UpToDate,
    /// A build ran and registered `assets` artifacts.
    Rebuilt {
        assets: usize,
        stylesheets: Vec<String>,
    },
}

pub struct Pipeline<T> {
    config: PipelineConfig,
    context: PathBuf,
    inputs: InputFileSet,
    detector: ChangeDetector,
    builder: SpriteBuilder<T>,
    in_flight: bool,
    stylesheets: Vec<String>,
}

impl Pipeline<SvgSpriter> {
    /// Set up with the built-in spriter, configured from `config.transform`.
    pub fn with_svg_spriter(
        config: PipelineConfig,
        host: &impl Host,
    ) -> Result<Self, PipelineError> {
        let spriter = SvgSpriter::new(config.transform.clone());
        Self::setup(config, host, spriter)
    }
}

impl<T: SpriteTransform> Pipeline<T> {
    /// Validate the host and resolve the input set.
    pub fn setup(
        config: PipelineConfig,
        host: &impl Host,
        transform: T,
    ) -> Result<Self, PipelineError> {
        let found = host.api_version();
        if found < MIN_HOST_API {
            return Err(PipelineError::IncompatibleHost {
                found,
                required: MIN_HOST_API,
            });
        }

        let start_time = SystemTime::now();
        let context = host.context().to_path_buf();
        let inputs = resolve_inputs(&config.source_glob, &context, host)?;
        info!(
            pattern = %config.source_glob,
            inputs = inputs.len(),
            "sprite pipeline ready"
        );

        let namer = OutputNamer::new(
            config.name.clone(),
            config.hash_function,
            config.hash_digest,
        );
        let builder = SpriteBuilder::new(transform, namer, config.dest_dir.clone());
        Ok(Self {
            config,
            context,
            inputs,
            detector: ChangeDetector::new(start_time),
            builder,
            in_flight: false,
            stylesheets: Vec::new(),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn context(&self) -> &Path {
        &self.context
    }

    pub fn inputs(&self) -> &InputFileSet {
        &self.inputs
    }

    pub fn transform(&self) -> &T {
        self.builder.transform()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Stylesheet paths produced by the last successful rebuild.
    pub fn stylesheets(&self) -> &[String] {
        &self.stylesheets
    }

    /// Run the cycle's work unless a build is already in progress.
    pub fn on_cycle_start(
        &mut self,
        compilation: &mut Compilation,
    ) -> Result<CycleOutcome, PipelineError> {
        if self.in_flight {
            debug!("sprite build already in flight, skipping");
            return Ok(CycleOutcome::AlreadyRunning);
        }
        self.in_flight = true;

        for file in &self.inputs {
            let dependency = file.strip_prefix(&compilation.context).unwrap_or(file);
            compilation.add_dependency(dependency);
        }

        if !self
            .detector
            .should_rebuild(&compilation.file_timestamps, &self.inputs)
        {
            debug!("no relevant input changed");
            return Ok(CycleOutcome::UpToDate);
        }

        self.stylesheets.clear();
        let output = self.builder.build(&self.inputs)?;
        let assets = output.artifacts.len();
        for artifact in output.artifacts {
            compilation.emit_asset(artifact);
        }
        self.stylesheets = output.stylesheets;

        info!(assets, stylesheets = self.stylesheets.len(), "sprite rebuilt");
        Ok(CycleOutcome::Rebuilt {
            assets,
            stylesheets: self.stylesheets.clone(),
        })
    }

    /// Return to idle so the next cycle can run.
    pub fn on_cycle_end(&mut self) {
        self.in_flight = false;
    }
}
