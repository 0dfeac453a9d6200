//! Built-in SVG spriter.
//!
//! | Mode | Type | Output |
//! |------|------|--------|
//! | `css` | `sprite` | icons stacked top to bottom in one SVG |
//! | `css` | `css` | one class per icon: background offset, width, height |
//! | `symbol` | `sprite` | one `<symbol>` per icon, for `<use href="#id">` |
//!
//! Icon ids come from the file stem with the configured prefix:
//! `icons/arrow-left.svg` → `icon-arrow-left`. Characters outside
//! `[A-Za-z0-9_-]` become `-`; clashing ids get a numeric suffix.
//!
//! Sources are parsed as XML, so comments, prologs and quoted `>` characters
//! never confuse root detection. Only the root `<svg>` element is inspected.
//! Its size is taken from `width`/`height` when present and from `viewBox`
//! otherwise; everything between the root tags is copied through untouched.

use super::transform::{
    SourceFile, SpriteTransform, TransformArtifact, TransformError, TransformOutput,
};
use crate::config::SpriteOptions;
use roxmltree::{Document, ParsingOptions};
use std::collections::HashSet;
use std::fmt::Write;
use std::path::Path;

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// A parsed source icon.
#[derive(Debug, Clone, PartialEq)]
struct Icon {
    id: String,
    width: f64,
    height: f64,
    view_box: String,
    body: String,
}

/// The default [`SpriteTransform`], driven by [`SpriteOptions`].
#[derive(Debug, Clone)]
pub struct SvgSpriter {
    options: SpriteOptions,
}

impl SvgSpriter {
    pub fn new(options: SpriteOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SpriteOptions {
        &self.options
    }

    fn parse_icons(&self, sources: &[SourceFile]) -> Result<Vec<Icon>, TransformError> {
        let mut seen = HashSet::new();
        sources
            .iter()
            .map(|source| {
                let id = unique_id(&self.options.prefix, &source.path, &mut seen);
                parse_icon(id, source)
            })
            .collect()
    }

    fn css_sprite(&self, icons: &[Icon]) -> String {
        let width = icons.iter().map(|i| i.width).fold(0.0, f64::max);
        let height: f64 = icons.iter().map(|i| i.height).sum();

        let mut out = format!(
            r#"<svg xmlns="{SVG_NS}" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
        );
        out.push('\n');
        let mut y = 0.0;
        for icon in icons {
            let _ = writeln!(
                out,
                r#"<svg id="{}" y="{y}" width="{}" height="{}" viewBox="{}">{}</svg>"#,
                icon.id, icon.width, icon.height, icon.view_box, icon.body
            );
            y += icon.height;
        }
        out.push_str("</svg>\n");
        out
    }

    fn css_stylesheet(&self, icons: &[Icon]) -> String {
        let sprite = &self.options.css.sprite;
        let mut out = String::new();
        let mut y = 0.0;
        for icon in icons {
            let offset = if y == 0.0 {
                "0".to_string()
            } else {
                format!("-{y}px")
            };
            let _ = write!(
                out,
                ".{} {{\n    background: url(\"{sprite}\") no-repeat 0 {offset};\n    width: {}px;\n    height: {}px;\n}}\n\n",
                icon.id, icon.width, icon.height
            );
            y += icon.height;
        }
        out
    }

    fn symbol_sprite(&self, icons: &[Icon]) -> String {
        let mut out = format!(r#"<svg xmlns="{SVG_NS}">"#);
        out.push('\n');
        for icon in icons {
            let _ = writeln!(
                out,
                r#"<symbol id="{}" viewBox="{}">{}</symbol>"#,
                icon.id, icon.view_box, icon.body
            );
        }
        out.push_str("</svg>\n");
        out
    }
}

impl SpriteTransform for SvgSpriter {
    fn compile(&self, sources: &[SourceFile]) -> Result<TransformOutput, TransformError> {
        let icons = self.parse_icons(sources)?;
        let mut output = TransformOutput::new();

        if self.options.css.enabled {
            output.insert(
                "css",
                "sprite",
                TransformArtifact {
                    path: self.options.css.sprite.clone().into(),
                    contents: self.css_sprite(&icons).into_bytes(),
                },
            );
            output.insert(
                "css",
                "css",
                TransformArtifact {
                    path: self.options.css.stylesheet.clone().into(),
                    contents: self.css_stylesheet(&icons).into_bytes(),
                },
            );
        }
        if self.options.symbol.enabled {
            output.insert(
                "symbol",
                "sprite",
                TransformArtifact {
                    path: self.options.symbol.sprite.clone().into(),
                    contents: self.symbol_sprite(&icons).into_bytes(),
                },
            );
        }
        Ok(output)
    }
}

fn sanitize_id(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

fn unique_id(prefix: &str, path: &Path, seen: &mut HashSet<String>) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let base = sanitize_id(&format!("{prefix}{stem}"));
    let mut id = base.clone();
    let mut n = 2;
    while !seen.insert(id.clone()) {
        id = format!("{base}-{n}");
        n += 1;
    }
    id
}

/// Numeric length in user units; `px` suffix allowed.
fn parse_length(value: &str) -> Option<f64> {
    value
        .trim()
        .trim_end_matches("px")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

fn parse_view_box(value: &str) -> Option<[f64; 4]> {
    let parts: Vec<f64> = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|p| !p.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    <[f64; 4]>::try_from(parts).ok()
}

fn parse_icon(id: String, source: &SourceFile) -> Result<Icon, TransformError> {
    let invalid = |reason: &str| TransformError::InvalidSvg {
        path: source.path.clone(),
        reason: reason.to_string(),
    };

    let content = source.content.as_str();
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(content, options)
        .map_err(|e| invalid(&e.to_string()))?;
    let root = doc.root_element();
    if root.tag_name().name() != "svg" {
        return Err(invalid("no <svg> root element"));
    }

    let view_box = root
        .attribute("viewBox")
        .map(|v| parse_view_box(v).ok_or_else(|| invalid("viewBox must have four numbers")))
        .transpose()?;

    let width = root
        .attribute("width")
        .and_then(parse_length)
        .or(view_box.map(|vb| vb[2]))
        .ok_or_else(|| invalid("missing width"))?;
    let height = root
        .attribute("height")
        .and_then(parse_length)
        .or(view_box.map(|vb| vb[3]))
        .ok_or_else(|| invalid("missing height"))?;

    let view_box = match root.attribute("viewBox") {
        Some(v) => v.trim().to_string(),
        None => format!("0 0 {width} {height}"),
    };

    // Children are copied as written, so entities and formatting survive.
    let body = match (root.first_child(), root.last_child()) {
        (Some(first), Some(last)) => content[first.range().start..last.range().end]
            .trim()
            .to_string(),
        _ => String::new(),
    };

    Ok(Icon {
        id,
        width,
        height,
        view_box,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(path: &str, content: &str) -> SourceFile {
        SourceFile {
            path: path.into(),
            content: content.to_string(),
        }
    }

    fn square(path: &str, size: u32) -> SourceFile {
        source(
            path,
            &format!(
                r#"<?xml version="1.0"?><svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}"><rect width="{size}" height="{size}"/></svg>"#
            ),
        )
    }

    fn text(output: &TransformOutput, mode: &str, kind: &str) -> String {
        String::from_utf8(output.get(mode, kind).unwrap().contents.clone()).unwrap()
    }

    #[test]
    fn parse_length_accepts_px() {
        assert_eq!(parse_length("16px"), Some(16.0));
        assert_eq!(parse_length("2.5"), Some(2.5));
        assert_eq!(parse_length("100%"), None);
        assert_eq!(parse_length("0"), None);
    }

    #[test]
    fn parse_view_box_requires_four_numbers() {
        assert_eq!(parse_view_box("0 0 24 24"), Some([0.0, 0.0, 24.0, 24.0]));
        assert_eq!(parse_view_box("0,0,10,20"), Some([0.0, 0.0, 10.0, 20.0]));
        assert_eq!(parse_view_box("0 0 24"), None);
    }

    #[test]
    fn icon_size_falls_back_to_view_box() {
        let icon = parse_icon(
            "icon-a".into(),
            &source("/a.svg", r#"<svg viewBox="0 0 24 32"><path d="M0 0"/></svg>"#),
        )
        .unwrap();
        assert_eq!((icon.width, icon.height), (24.0, 32.0));
        assert_eq!(icon.view_box, "0 0 24 32");
        assert_eq!(icon.body, r#"<path d="M0 0"/>"#);
    }

    #[test]
    fn icon_without_view_box_gets_one() {
        let icon = parse_icon("icon-a".into(), &square("/a.svg", 16)).unwrap();
        assert_eq!(icon.view_box, "0 0 16 16");
    }

    #[test]
    fn self_closing_root_has_empty_body() {
        let icon =
            parse_icon("i".into(), &source("/a.svg", r#"<svg width="8" height="8"/>"#)).unwrap();
        assert_eq!(icon.body, "");
    }

    #[test]
    fn missing_root_is_invalid() {
        let err = parse_icon("i".into(), &source("/a.svg", "<html></html>")).unwrap_err();
        assert!(matches!(err, TransformError::InvalidSvg { .. }));
    }

    #[test]
    fn svg_prefix_of_other_tag_is_not_root() {
        let err = parse_icon("i".into(), &source("/a.svg", "<svgfoo></svgfoo>")).unwrap_err();
        assert!(matches!(err, TransformError::InvalidSvg { .. }));
    }

    #[test]
    fn quoted_angle_bracket_stays_in_attribute() {
        let icon = parse_icon(
            "i".into(),
            &source(
                "/a.svg",
                r#"<svg width='16' height="16" aria-label="a>b"><path d="M0"/></svg>"#,
            ),
        )
        .unwrap();
        assert_eq!(icon.width, 16.0);
        assert_eq!(icon.body, r#"<path d="M0"/>"#);
    }

    #[test]
    fn commented_out_svg_is_not_root() {
        let icon = parse_icon(
            "i".into(),
            &source(
                "/a.svg",
                r#"<!-- <svg width="99" height="99"> -->
<svg width="16" height="16"><g/></svg>"#,
            ),
        )
        .unwrap();
        assert_eq!((icon.width, icon.height), (16.0, 16.0));
        assert_eq!(icon.body, "<g/>");
    }

    #[test]
    fn doctype_is_accepted() {
        let icon = parse_icon(
            "i".into(),
            &source(
                "/a.svg",
                r#"<?xml version="1.0"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">
<svg width="8" height="8"><!-- mark --><rect/></svg>"#,
            ),
        )
        .unwrap();
        assert_eq!((icon.width, icon.height), (8.0, 8.0));
        assert!(icon.body.contains("mark") && icon.body.ends_with("<rect/>"));
    }

    #[test]
    fn malformed_xml_is_invalid() {
        let err = parse_icon("i".into(), &source("/a.svg", "<svg width=\"8\"><g></svg>"))
            .unwrap_err();
        assert!(matches!(err, TransformError::InvalidSvg { .. }));
    }

    #[test]
    fn missing_dimensions_is_invalid() {
        let err = parse_icon("i".into(), &source("/a.svg", "<svg><g/></svg>")).unwrap_err();
        assert!(err.to_string().contains("missing width"));
    }

    #[test]
    fn ids_are_sanitized_and_unique() {
        let mut seen = HashSet::new();
        assert_eq!(
            unique_id("icon-", Path::new("/x/arrow left.svg"), &mut seen),
            "icon-arrow-left"
        );
        assert_eq!(unique_id("icon-", Path::new("/x/home.svg"), &mut seen), "icon-home");
        assert_eq!(unique_id("icon-", Path::new("/y/home.svg"), &mut seen), "icon-home-2");
        assert_eq!(unique_id("icon-", Path::new("/z/home.svg"), &mut seen), "icon-home-3");
    }

    #[test]
    fn default_options_produce_css_mode_only() {
        let spriter = SvgSpriter::new(SpriteOptions::default());
        let out = spriter
            .compile(&[square("/i/a.svg", 16), square("/i/b.svg", 24)])
            .unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(
            out.get("css", "css").unwrap().path,
            Path::new("[name].[hash:8].css")
        );
        assert_eq!(out.get("css", "sprite").unwrap().path, Path::new("sprite.svg"));
        assert!(out.get("symbol", "sprite").is_none());
    }

    #[test]
    fn css_sprite_stacks_icons() {
        let spriter = SvgSpriter::new(SpriteOptions::default());
        let out = spriter
            .compile(&[square("/i/a.svg", 16), square("/i/b.svg", 24)])
            .unwrap();

        let sprite = text(&out, "css", "sprite");
        assert!(sprite.starts_with(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="40" viewBox="0 0 24 40">"#
        ));
        assert!(sprite.contains(r#"<svg id="icon-a" y="0" width="16" height="16""#));
        assert!(sprite.contains(r#"<svg id="icon-b" y="16" width="24" height="24""#));
    }

    #[test]
    fn css_stylesheet_positions_icons() {
        let spriter = SvgSpriter::new(SpriteOptions::default());
        let out = spriter
            .compile(&[square("/i/a.svg", 16), square("/i/b.svg", 24)])
            .unwrap();

        let css = text(&out, "css", "css");
        assert!(css.contains(".icon-a {\n    background: url(\"sprite.svg\") no-repeat 0 0;"));
        assert!(css.contains(".icon-b {\n    background: url(\"sprite.svg\") no-repeat 0 -16px;"));
        assert!(css.contains("    width: 24px;\n    height: 24px;"));
    }

    #[test]
    fn symbol_mode_wraps_each_icon() {
        let mut options = SpriteOptions::default();
        options.css.enabled = false;
        options.symbol.enabled = true;
        let out = SvgSpriter::new(options)
            .compile(&[square("/i/a.svg", 16)])
            .unwrap();

        assert_eq!(out.len(), 1);
        let sprite = text(&out, "symbol", "sprite");
        assert!(sprite.contains(
            r#"<symbol id="icon-a" viewBox="0 0 16 16"><rect width="16" height="16"/></symbol>"#
        ));
    }

    #[test]
    fn invalid_source_fails_whole_compile() {
        let spriter = SvgSpriter::new(SpriteOptions::default());
        let result = spriter.compile(&[square("/i/a.svg", 16), source("/i/bad.svg", "nope")]);
        assert!(matches!(result, Err(TransformError::InvalidSvg { .. })));
    }

    #[test]
    fn output_is_deterministic() {
        let spriter = SvgSpriter::new(SpriteOptions::default());
        let inputs = [square("/i/a.svg", 16), square("/i/b.svg", 24)];
        assert_eq!(spriter.compile(&inputs).unwrap(), spriter.compile(&inputs).unwrap());
    }
}
