use clap::{Parser, Subcommand};
use sprite_bundler::config::{self, PipelineConfig, SpriteConfig};
use sprite_bundler::host::{AssetManifest, Compilation, FsHost};
use sprite_bundler::output;
use sprite_bundler::pipeline::{CycleOutcome, Pipeline, PipelineError};
use sprite_bundler::sprite::SvgSpriter;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "sprite-bundler")]
#[command(about = "Incremental SVG sprite and stylesheet builder")]
#[command(long_about = "\
Incremental SVG sprite and stylesheet builder

Every **/*.svg below the source directory is combined into a sprite sheet
plus a stylesheet whose name can carry a content hash. Rebuilds only happen
when one of those icons changed.

Project structure:

  project/
  ├── sprite.toml                # Config (optional)
  ├── icons/                     # Source directory
  │   ├── home.svg               # → .icon-home
  │   └── nav/arrow-left.svg     # → .icon-arrow-left
  └── dist/                      # Output directory
      ├── sprite.svg
      ├── sprite.1a2b3c4d.css    # Name from [name].[hash:8].css
      └── sprite-manifest.json   # Generated stylesheets, in order

Run 'sprite-bundler gen-config' to generate a documented sprite.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Project root (holds sprite.toml; relative paths resolve from here)
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Override the source directory
    #[arg(long, global = true)]
    src_dir: Option<String>,

    /// Override the output directory
    #[arg(long, global = true)]
    dest: Option<String>,

    /// Override the name substituted for [name]
    #[arg(long, global = true)]
    name: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the sprite and stylesheet once
    Build,
    /// Resolve and list the input icons without building
    Check,
    /// Print a stock sprite.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Command::Build => {
            let config = load_with_overrides(&cli)?;
            let host = FsHost::new(&cli.root)?;
            let mut pipeline = setup_pipeline(&config, &host)?;

            println!("==> Building sprite from {}", config.src_dir);
            let mut compilation = host.compilation(std::iter::empty::<PathBuf>());
            let outcome = run_cycle(&mut pipeline, &mut compilation)?;
            write_outputs(&host, pipeline.config(), &outcome, &compilation)?;
            output::print_cycle_outcome(&outcome, &compilation);
            println!("==> Build complete: {}", config.dest);
        }
        Command::Check => {
            let config = load_with_overrides(&cli)?;
            let host = FsHost::new(&cli.root)?;
            println!("==> Checking {}", cli.root.display());
            let pipeline = setup_pipeline(&config, &host)?;
            output::print_inputs(pipeline.inputs(), pipeline.context());
            println!("==> Configuration is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load `sprite.toml` from the root and apply CLI overrides.
fn load_with_overrides(cli: &Cli) -> Result<SpriteConfig, config::ConfigError> {
    let mut config = config::load_config(&cli.root)?;
    if let Some(src_dir) = &cli.src_dir {
        config.src_dir = src_dir.clone();
    }
    if let Some(dest) = &cli.dest {
        config.dest = dest.clone();
    }
    if let Some(name) = &cli.name {
        config.name = name.clone();
    }
    config.validate()?;
    Ok(config)
}

fn setup_pipeline(
    config: &SpriteConfig,
    host: &FsHost,
) -> Result<Pipeline<SvgSpriter>, PipelineError> {
    Pipeline::with_svg_spriter(PipelineConfig::from(config), host)
}

/// One full host cycle: start, then always end.
fn run_cycle(
    pipeline: &mut Pipeline<SvgSpriter>,
    compilation: &mut Compilation,
) -> Result<CycleOutcome, PipelineError> {
    let outcome = pipeline.on_cycle_start(compilation);
    pipeline.on_cycle_end();
    outcome
}

/// Write registered assets and, after a rebuild, the asset manifest.
fn write_outputs(
    host: &FsHost,
    config: &PipelineConfig,
    outcome: &CycleOutcome,
    compilation: &Compilation,
) -> Result<(), Box<dyn std::error::Error>> {
    host.write_assets(compilation)?;
    if let CycleOutcome::Rebuilt { stylesheets, .. } = outcome {
        let manifest = AssetManifest {
            stylesheets: stylesheets.clone(),
            assets: compilation.assets.keys().cloned().collect(),
        };
        host.write_manifest(&config.dest_dir, &manifest)?;
    }
    Ok(())
}
