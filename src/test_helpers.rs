//! Shared test utilities for the sprite-bundler test suite.
//!
//! Provides fixture set-up plus lookup helpers that work with resolved input
//! sets and compilations.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let host = FsHost::new(tmp.path()).unwrap();
//! // ... run a cycle ...
//! let css = find_asset(&compilation, ".css");
//! assert_eq!(input_names(&inputs, host.context()), ["icons/a.svg", ...]);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::host::Compilation;
use crate::resolve::InputFileSet;
use crate::sprite::OutputArtifact;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/project/` to a temp directory and return it.
///
/// Tests get an isolated copy they can touch or delete files in without
/// affecting other tests or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/project");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Lookups, panicking with a clear message on miss
// =========================================================================

/// Input paths relative to `root`, `/`-separated, in input-set order.
pub fn input_names(inputs: &InputFileSet, root: &Path) -> Vec<String> {
    inputs
        .iter()
        .map(|p| {
            p.strip_prefix(root)
                .unwrap_or_else(|_| panic!("{} is not under {}", p.display(), root.display()))
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

/// Find the single registered asset whose path ends with `suffix`.
pub fn find_asset<'a>(compilation: &'a Compilation, suffix: &str) -> &'a OutputArtifact {
    let matches: Vec<_> = compilation
        .assets
        .values()
        .filter(|a| a.logical_path.ends_with(suffix))
        .collect();
    match matches.as_slice() {
        [one] => one,
        _ => {
            let paths: Vec<&str> = compilation.assets.keys().map(String::as_str).collect();
            panic!("expected one asset ending in '{suffix}'. Available: {paths:?}")
        }
    }
}
