//! CLI output formatting for `check` and `build`.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Inputs (3 files)
//! 001 icons/a.svg
//! 002 icons/b.svg
//! 003 icons/nested/c.svg
//! ```
//!
//! ## Build
//!
//! ```text
//! Rebuilt 2 assets
//! 001 out/sprite.svg (1.4 KB)
//! 002 out/5eb63bbbe01eeed093cb22bb8f5acdc3.css (312 B)
//!     Stylesheet
//! ```
//!
//! A cycle that rebuilt nothing prints a single status line instead.
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::host::Compilation;
use crate::pipeline::CycleOutcome;
use crate::resolve::InputFileSet;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte count.
///
/// ```text
/// 312 B
/// 1.4 KB
/// 2.0 MB
/// ```
fn format_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Check
// ============================================================================

/// List resolved inputs relative to the project root.
pub fn format_inputs(inputs: &InputFileSet, root: &Path) -> Vec<String> {
    let mut lines = vec![format!("Inputs ({})", plural(inputs.len(), "file"))];
    for (i, path) in inputs.iter().enumerate() {
        let shown = path.strip_prefix(root).unwrap_or(path);
        lines.push(format!("{} {}", format_index(i + 1), shown.display()));
    }
    lines
}

pub fn print_inputs(inputs: &InputFileSet, root: &Path) {
    for line in format_inputs(inputs, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

/// Describe a cycle outcome and the assets it registered.
pub fn format_cycle_outcome(outcome: &CycleOutcome, compilation: &Compilation) -> Vec<String> {
    match outcome {
        CycleOutcome::AlreadyRunning => vec!["Build already in progress".to_string()],
        CycleOutcome::UpToDate => vec!["Sprite is up to date".to_string()],
        CycleOutcome::Rebuilt {
            assets,
            stylesheets,
        } => {
            let mut lines = vec![format!("Rebuilt {}", plural(*assets, "asset"))];
            for (i, artifact) in compilation.assets.values().enumerate() {
                lines.push(format!(
                    "{} {} ({})",
                    format_index(i + 1),
                    artifact.logical_path,
                    format_size(artifact.content_length())
                ));
                if stylesheets.contains(&artifact.logical_path) {
                    lines.push(format!("{}Stylesheet", indent(1)));
                }
            }
            lines
        }
    }
}

pub fn print_cycle_outcome(outcome: &CycleOutcome, compilation: &Compilation) {
    for line in format_cycle_outcome(outcome, compilation) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprite::OutputArtifact;
    use std::path::PathBuf;

    fn compilation(assets: &[(&str, usize)]) -> Compilation {
        let mut c = Compilation::default();
        for (path, len) in assets {
            c.emit_asset(OutputArtifact {
                logical_path: path.to_string(),
                content: vec![b'x'; *len],
            });
        }
        c
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn format_size_units() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(2 * 1024 * 1024), "2.0 MB");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "file"), "1 file");
        assert_eq!(plural(0, "file"), "0 files");
    }

    // =========================================================================
    // Check
    // =========================================================================

    #[test]
    fn format_inputs_relative_to_root() {
        let root = Path::new("/project");
        let inputs = InputFileSet::new(vec![
            PathBuf::from("/project/icons/a.svg"),
            PathBuf::from("/elsewhere/b.svg"),
        ]);
        assert_eq!(
            format_inputs(&inputs, root),
            vec!["Inputs (2 files)", "001 icons/a.svg", "002 /elsewhere/b.svg"]
        );
    }

    #[test]
    fn format_inputs_empty() {
        let inputs = InputFileSet::default();
        assert_eq!(format_inputs(&inputs, Path::new("/")), vec!["Inputs (0 files)"]);
    }

    // =========================================================================
    // Build
    // =========================================================================

    #[test]
    fn rebuilt_marks_stylesheets() {
        let c = compilation(&[("out/sprite.svg", 2048), ("out/abc.css", 10)]);
        let outcome = CycleOutcome::Rebuilt {
            assets: 2,
            stylesheets: vec!["out/abc.css".into()],
        };
        assert_eq!(
            format_cycle_outcome(&outcome, &c),
            vec![
                "Rebuilt 2 assets",
                "001 out/abc.css (10 B)",
                "    Stylesheet",
                "002 out/sprite.svg (2.0 KB)",
            ]
        );
    }

    #[test]
    fn up_to_date_is_one_line() {
        let c = compilation(&[]);
        assert_eq!(
            format_cycle_outcome(&CycleOutcome::UpToDate, &c),
            vec!["Sprite is up to date"]
        );
        assert_eq!(
            format_cycle_outcome(&CycleOutcome::AlreadyRunning, &c),
            vec!["Build already in progress"]
        );
    }
}
