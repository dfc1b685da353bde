//! Canvas export: JSON snapshot, SVG drawing and PNG raster.
//!
//! # Responsibility
//! - Produce downloadable artifacts (`file_name`, `content_type`, bytes).
//! - Re-import JSON snapshots losslessly.
//!
//! # Invariants
//! - Exports never include transient selection state.
//! - File names are derived from the canvas title and safe for common file
//!   systems; an empty title becomes `untitled`.

mod json;
mod raster;
mod svg;

pub use json::{from_snapshot_json, to_snapshot_json, SNAPSHOT_FORMAT, SNAPSHOT_VERSION};
pub use raster::{render_png, RasterOptions};
pub use svg::{render_svg, render_svg_viewport, SvgOptions, Viewport};

use crate::model::Canvas;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static UNSAFE_FILE_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\\/:*?"<>|\x00-\x1f]"#).expect("valid file name regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

const FALLBACK_FILE_STEM: &str = "untitled";
const MAX_FILE_STEM_CHARS: usize = 120;

pub type ExportResult<T> = Result<T, ExportError>;

#[derive(Debug)]
pub enum ExportError {
    Json(serde_json::Error),
    /// Snapshot has a different `format` tag.
    UnsupportedFormat(String),
    /// Snapshot was written by a newer build.
    UnsupportedVersion(u32),
    /// Viewport is empty or not finite.
    InvalidViewport,
    SvgParse(String),
    PixmapAlloc { width: u32, height: u32 },
    PngEncode(String),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "canvas snapshot json error: {err}"),
            Self::UnsupportedFormat(format) => {
                write!(f, "unsupported snapshot format `{format}`")
            }
            Self::UnsupportedVersion(version) => write!(
                f,
                "snapshot version {version} is newer than supported {SNAPSHOT_VERSION}"
            ),
            Self::InvalidViewport => write!(f, "viewport must have a finite, positive size"),
            Self::SvgParse(message) => write!(f, "failed to parse exported svg: {message}"),
            Self::PixmapAlloc { width, height } => {
                write!(f, "failed to allocate {width}x{height} pixmap")
            }
            Self::PngEncode(message) => write!(f, "failed to encode png: {message}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Svg,
    Png,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Svg => "image/svg+xml",
            Self::Png => "image/png",
        }
    }
}

/// A finished export ready to be written or downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    fn new(title: &str, format: ExportFormat, bytes: Vec<u8>) -> Self {
        Self {
            file_name: export_file_name(title, format),
            content_type: format.content_type(),
            bytes,
        }
    }
}

/// `{sanitized title}.{extension}`.
pub fn export_file_name(title: &str, format: ExportFormat) -> String {
    let replaced = UNSAFE_FILE_CHARS_RE.replace_all(title, "_");
    let collapsed = WHITESPACE_RE.replace_all(replaced.trim(), " ");
    let stem: String = collapsed
        .trim_matches(|c: char| c == '.' || c.is_whitespace())
        .chars()
        .take(MAX_FILE_STEM_CHARS)
        .collect();
    let stem = stem.trim_end();
    let stem = if stem.is_empty() {
        FALLBACK_FILE_STEM
    } else {
        stem
    };
    format!("{stem}.{}", format.extension())
}

pub fn export_json(canvas: &Canvas) -> ExportResult<ExportArtifact> {
    let text = to_snapshot_json(canvas)?;
    Ok(ExportArtifact::new(
        &canvas.title,
        ExportFormat::Json,
        text.into_bytes(),
    ))
}

pub fn export_svg(canvas: &Canvas, options: &SvgOptions) -> ExportArtifact {
    let text = render_svg(&canvas.graph, options);
    ExportArtifact::new(&canvas.title, ExportFormat::Svg, text.into_bytes())
}

/// Rasterizes `viewport`, or the whole drawing when `None`.
pub fn export_png(
    canvas: &Canvas,
    viewport: Option<Viewport>,
    svg_options: &SvgOptions,
    raster_options: &RasterOptions,
) -> ExportResult<ExportArtifact> {
    let viewport =
        viewport.unwrap_or_else(|| Viewport::fit(&canvas.graph, svg_options.padding));
    let bytes = render_png(&canvas.graph, viewport, svg_options, raster_options)?;
    Ok(ExportArtifact::new(&canvas.title, ExportFormat::Png, bytes))
}

#[cfg(test)]
mod tests {
    use super::{export_file_name, ExportFormat};

    #[test]
    fn file_name_replaces_path_separators() {
        assert_eq!(
            export_file_name("  Q3 / plan: draft?  ", ExportFormat::Svg),
            "Q3 _ plan_ draft_.svg"
        );
        assert_eq!(export_file_name(" .. ", ExportFormat::Json), "untitled.json");
    }
}
