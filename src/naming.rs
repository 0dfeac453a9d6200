//! Content-addressed output naming.
//!
//! Stylesheet file names are produced from a template so that browsers can
//! cache them forever: a change in content always yields a new name.
//!
//! ## Template Grammar
//!
//! Everything outside a placeholder is copied verbatim:
//!
//! - `[name]` → the configured base name, unescaped
//! - `[hash]` → the full content digest
//! - `[hash:N]` → the first `N` characters of the digest
//!
//! ```text
//! out/[name].[hash:8].css   →   out/sprite.5eb63bbb.css
//! out/[hash].css            →   out/5eb63bbbe01eeed093cb22bb8f5acdc3.css
//! ```
//!
//! Anything else in square brackets (`[ext]`, `[hash:]`) is left alone.
//!
//! ## Web-Safe Digests
//!
//! A base64 digest may contain `/`, `+` and `=`, none of which belong in a
//! file name or URL path segment. Those are remapped (`/` → `_`, `+` → `-`)
//! or dropped (`=`) before truncation. Template text around the digest is
//! never touched.

use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::Digest;
use sha2::digest::Output;
use std::fmt;

/// Hash algorithm used for `[hash]` placeholders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashFunction {
    #[default]
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

impl fmt::Display for HashFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HashFunction::Md5 => "md5",
            HashFunction::Sha1 => "sha1",
            HashFunction::Sha256 => "sha256",
            HashFunction::Sha512 => "sha512",
        };
        f.write_str(name)
    }
}

/// Text encoding of the raw digest bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashDigest {
    #[default]
    Hex,
    Base64,
}

impl HashDigest {
    /// Whether the encoding alphabet includes characters that are unsafe
    /// in paths and URLs.
    pub fn is_web_unsafe(self) -> bool {
        matches!(self, HashDigest::Base64)
    }
}

impl fmt::Display for HashDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashDigest::Hex => f.write_str("hex"),
            HashDigest::Base64 => f.write_str("base64"),
        }
    }
}

/// Hash `content` and encode the digest, remapping web-unsafe characters.
pub fn hash_content(content: &[u8], function: HashFunction, digest: HashDigest) -> String {
    match function {
        HashFunction::Md5 => encode::<md5::Md5>(content, digest),
        HashFunction::Sha1 => encode::<sha1::Sha1>(content, digest),
        HashFunction::Sha256 => encode::<sha2::Sha256>(content, digest),
        HashFunction::Sha512 => encode::<sha2::Sha512>(content, digest),
    }
}

fn encode<D: Digest>(content: &[u8], digest: HashDigest) -> String
where
    Output<D>: fmt::LowerHex,
{
    let hash = D::digest(content);
    match digest {
        HashDigest::Hex => format!("{:x}", hash),
        HashDigest::Base64 => web_safe(&base64::engine::general_purpose::STANDARD.encode(hash)),
    }
}

/// `/` → `_`, `+` → `-`, `=` dropped.
fn web_safe(encoded: &str) -> String {
    encoded
        .chars()
        .filter_map(|c| match c {
            '/' => Some('_'),
            '+' => Some('-'),
            '=' => None,
            other => Some(other),
        })
        .collect()
}

/// One piece of a parsed name template.
#[derive(Debug, Clone, PartialEq)]
enum Segment<'a> {
    Literal(&'a str),
    Name,
    /// Digest, optionally truncated to the given number of characters.
    Hash(Option<usize>),
}

fn parse_placeholder(inner: &str) -> Option<Segment<'static>> {
    match inner {
        "name" => Some(Segment::Name),
        "hash" => Some(Segment::Hash(None)),
        _ => {
            let len = inner.strip_prefix("hash:")?;
            if len.is_empty() || !len.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            // Lengths past usize::MAX mean the whole digest.
            Some(Segment::Hash(len.parse().ok()))
        }
    }
}

fn parse_template(template: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut pos = 0;

    while let Some(open) = template[pos..].find('[') {
        let open = pos + open;
        let Some(close) = template[open..].find(']') else {
            break;
        };
        let close = open + close;
        match parse_placeholder(&template[open + 1..close]) {
            Some(segment) => {
                if literal_start < open {
                    segments.push(Segment::Literal(&template[literal_start..open]));
                }
                segments.push(segment);
                literal_start = close + 1;
                pos = close + 1;
            }
            None => pos = open + 1,
        }
    }
    if literal_start < template.len() {
        segments.push(Segment::Literal(&template[literal_start..]));
    }
    segments
}

/// Whether a template contains at least one `[hash]` / `[hash:N]` placeholder.
pub fn has_hash_placeholder(template: &str) -> bool {
    parse_template(template)
        .iter()
        .any(|s| matches!(s, Segment::Hash(_)))
}

/// Computes final output names from a template and content bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputNamer {
    name: String,
    function: HashFunction,
    digest: HashDigest,
}

impl OutputNamer {
    pub fn new(name: impl Into<String>, function: HashFunction, digest: HashDigest) -> Self {
        Self {
            name: name.into(),
            function,
            digest,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Encoded, web-safe digest of `content`.
    pub fn hash(&self, content: &[u8]) -> String {
        hash_content(content, self.function, self.digest)
    }

    /// Substitute every placeholder in `template`.
    ///
    /// The digest is computed at most once per call, and only if the
    /// template asks for it.
    pub fn output_name(&self, template: &str, content: &[u8]) -> String {
        let mut digest: Option<String> = None;
        let mut out = String::with_capacity(template.len() + 32);

        for segment in parse_template(template) {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Name => out.push_str(&self.name),
                Segment::Hash(len) => {
                    let full = digest.get_or_insert_with(|| self.hash(content));
                    // Digests are ASCII, so byte slicing is char slicing.
                    let n = len.unwrap_or(full.len()).min(full.len());
                    out.push_str(&full[..n]);
                }
            }
        }
        out
    }
}
