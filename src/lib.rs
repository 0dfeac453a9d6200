//! # Sprite Bundler
//!
//! An incremental SVG sprite builder. A directory of icons goes in; a sprite
//! sheet and a stylesheet with a content-hashed name come out, and they are
//! rebuilt only when one of the icons actually changed.
//!
//! # Architecture: Set-Up Once, Then One Decision Per Cycle
//!
//! A host (a watcher, a bundler, or the one-shot CLI) owns the build cycles.
//! The pipeline is created once and then asked, at the start of every cycle,
//! to make sure its outputs are current:
//!
//! ```text
//! set-up      source glob  →  InputFileSet        (resolved once, fixed)
//! cycle       timestamps   →  rebuild? yes / no   (change detection)
//! rebuild     inputs       →  transform → named artifacts → host assets
//! ```
//!
//! The split keeps the interesting state small. The only mutable data is the
//! previous timestamp snapshot and the in-flight flag, both owned by
//! [`pipeline::Pipeline`], so the whole state machine can be driven from unit
//! tests without a real host.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `sprite.toml` loading, merging and validation; the normalized pipeline config |
//! | [`resolve`] | Expands the source glob and resolves every match to an absolute path |
//! | [`detect`] | Timestamp snapshots and the rebuild decision |
//! | [`naming`] | Content hashing and `[name]` / `[hash:N]` template substitution |
//! | [`sprite`] | The transform seam, the built-in SVG spriter and the builder around it |
//! | [`pipeline`] | Per-cycle coordination: in-flight guard, dependency and asset registration |
//! | [`host`] | Host trait, per-cycle compilation state and the filesystem host |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Whole Rebuilds Only
//!
//! A change to any input recombines all of them. Sprite layout depends on
//! every icon (offsets shift when one grows), so partial rebuilds would save
//! little and complicate the state considerably.
//!
//! ## Inputs Are Fixed at Set-Up
//!
//! The input set is resolved once. Icons added while a watcher runs are not
//! picked up until restart; changes and deletions of known icons are.
//!
//! ## Content-Addressed Stylesheets
//!
//! Stylesheet names can embed a digest of their own contents (`[hash:8]`),
//! which makes them safe to serve with far-future cache headers. The digest
//! is remapped to URL-safe characters before it is truncated.

pub mod config;
pub mod detect;
pub mod host;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod resolve;
pub mod sprite;

#[cfg(test)]
pub(crate) mod test_helpers;
