//! Bundler configuration.
//!
//! Handles loading, validating, and normalizing `sprite.toml`. Stock defaults
//! are overridden by the user file, which is in turn overridden by CLI flags.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! src_dir = "icons"          # Directory globbed for **/*.svg
//! dest = "dist"              # Output directory for every generated file
//! name = "sprite"            # Substituted for [name] in stylesheet names
//! hash_function = "md5"      # md5 | sha1 | sha256 | sha512
//! hash_digest = "hex"        # hex | base64 (base64 is made URL-safe)
//!
//! [sprite]
//! prefix = "icon-"           # Symbol id / CSS class prefix
//!
//! [sprite.css]
//! enabled = true
//! sprite = "sprite.svg"
//! stylesheet = "[name].[hash:8].css"
//!
//! [sprite.symbol]
//! enabled = false
//! sprite = "symbols.svg"
//! ```
//!
//! The `[sprite]` table is handed to the sprite transform as-is; the
//! pipeline itself only looks at the other keys.
//!
//! Unknown keys are rejected to catch typos early.

use crate::naming::{HashDigest, HashFunction};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file looked up in the project root.
pub const CONFIG_FILENAME: &str = "sprite.toml";

/// Recursive suffix appended to `src_dir` to form the source glob.
pub const SOURCE_SUFFIX: &str = "**/*.svg";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Bundler configuration as written in `sprite.toml`.
///
/// All fields have defaults; user files only specify overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpriteConfig {
    /// Directory holding the source SVGs, relative to the project root.
    pub src_dir: String,
    /// Output directory, relative to the project root.
    pub dest: String,
    /// Base name substituted for `[name]`.
    pub name: String,
    pub hash_function: HashFunction,
    pub hash_digest: HashDigest,
    /// Options forwarded untouched to the sprite transform.
    pub sprite: SpriteOptions,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self {
            src_dir: "icons".to_string(),
            dest: "dist".to_string(),
            name: "sprite".to_string(),
            hash_function: HashFunction::default(),
            hash_digest: HashDigest::default(),
            sprite: SpriteOptions::default(),
        }
    }
}

impl SpriteConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::Validation("name must not be empty".into()));
        }
        if !self.sprite.css.enabled && !self.sprite.symbol.enabled {
            return Err(ConfigError::Validation(
                "at least one of sprite.css or sprite.symbol must be enabled".into(),
            ));
        }
        if self.sprite.css.enabled && !self.sprite.css.stylesheet.ends_with(".css") {
            return Err(ConfigError::Validation(
                "sprite.css.stylesheet must end with .css".into(),
            ));
        }
        for (key, file) in [
            ("sprite.css.sprite", &self.sprite.css.sprite),
            ("sprite.symbol.sprite", &self.sprite.symbol.sprite),
        ] {
            if !file.ends_with(".svg") {
                return Err(ConfigError::Validation(format!("{key} must end with .svg")));
            }
        }
        Ok(())
    }
}

/// Options for the built-in SVG spriter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpriteOptions {
    /// Prefix for symbol ids and CSS class names.
    pub prefix: String,
    /// Stacked sprite plus background-position stylesheet.
    pub css: CssModeOptions,
    /// `<symbol>` sprite for `<use href="#id">` references.
    pub symbol: SymbolModeOptions,
}

impl Default for SpriteOptions {
    fn default() -> Self {
        Self {
            prefix: "icon-".to_string(),
            css: CssModeOptions::default(),
            symbol: SymbolModeOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CssModeOptions {
    pub enabled: bool,
    /// File name of the stacked sprite.
    pub sprite: String,
    /// Stylesheet name template; may use `[name]`, `[hash]`, `[hash:N]`.
    pub stylesheet: String,
}

impl Default for CssModeOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            sprite: "sprite.svg".to_string(),
            stylesheet: "[name].[hash:8].css".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SymbolModeOptions {
    pub enabled: bool,
    /// File name of the symbol sprite.
    pub sprite: String,
}

impl Default for SymbolModeOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            sprite: "symbols.svg".to_string(),
        }
    }
}

/// Append `/` unless the string is empty or already ends with one.
pub fn ensure_trailing_slash(s: &str) -> String {
    if s.is_empty() || s.ends_with('/') {
        s.to_string()
    } else {
        format!("{s}/")
    }
}

/// Normalized, immutable configuration the pipeline runs with.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// `src_dir` with a trailing slash, followed by [`SOURCE_SUFFIX`].
    pub source_glob: String,
    /// Output directory; always ends with `/` unless empty.
    pub dest_dir: String,
    pub name: String,
    pub hash_function: HashFunction,
    pub hash_digest: HashDigest,
    pub transform: SpriteOptions,
}

impl From<&SpriteConfig> for PipelineConfig {
    fn from(config: &SpriteConfig) -> Self {
        Self {
            source_glob: format!("{}{}", ensure_trailing_slash(&config.src_dir), SOURCE_SUFFIX),
            dest_dir: ensure_trailing_slash(&config.dest),
            name: config.name.clone(),
            hash_function: config.hash_function,
            hash_digest: config.hash_digest,
            transform: config.sprite.clone(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SpriteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `sprite.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SpriteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SpriteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `sprite.toml` in the given directory.
pub fn load_config(root: &Path) -> Result<SpriteConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(root)?)
}

/// Returns a fully-commented stock `sprite.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Sprite Bundler Configuration
# ============================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Directory holding the source icons. Every **/*.svg below it is bundled.
src_dir = "icons"

# Output directory for the sprite, the stylesheet and sprite-manifest.json.
dest = "dist"

# Substituted for [name] in the stylesheet template.
name = "sprite"

# Digest used for [hash] / [hash:N]: md5, sha1, sha256 or sha512.
hash_function = "md5"

# Digest encoding: hex or base64. Base64 digests are made URL-safe
# ('/' -> '_', '+' -> '-', '=' dropped).
hash_digest = "hex"

# ---------------------------------------------------------------------------
# Sprite transform
# ---------------------------------------------------------------------------
[sprite]
# Prefix for CSS class names and <symbol> ids: icons/home.svg -> icon-home.
prefix = "icon-"

# Stacked sprite plus a stylesheet positioning each icon as a background.
[sprite.css]
enabled = true
sprite = "sprite.svg"
# Stylesheet name template. [name] is the name above, [hash] the content
# digest of the stylesheet, [hash:8] its first 8 characters.
stylesheet = "[name].[hash:8].css"

# Sprite of <symbol> elements, referenced with <use href="symbols.svg#icon-home">.
[sprite.symbol]
enabled = false
sprite = "symbols.svg"
"##
}
