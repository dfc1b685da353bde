//! PNG export through `usvg` → `resvg` → `tiny-skia`.

use super::svg::{render_svg_viewport, SvgOptions, Viewport};
use super::{ExportError, ExportResult};
use crate::model::Graph;

/// Largest pixmap edge accepted, in pixels.
const MAX_PIXMAP_EDGE: u32 = 16_384;

#[derive(Debug, Clone, PartialEq)]
pub struct RasterOptions {
    /// Device pixels per canvas unit.
    pub scale: f32,
    /// Pixmap fill before drawing (`#rgb`, `#rrggbb`, `#rrggbbaa`, `white`,
    /// `black`, `transparent`). Unparseable values are ignored.
    pub background: Option<String>,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: 2.0,
            background: None,
        }
    }
}

/// Renders the part of `graph` inside `viewport` as PNG bytes.
pub fn render_png(
    graph: &Graph,
    viewport: Viewport,
    svg_options: &SvgOptions,
    raster: &RasterOptions,
) -> ExportResult<Vec<u8>> {
    if !viewport.is_valid() || !raster.scale.is_finite() || raster.scale <= 0.0 {
        return Err(ExportError::InvalidViewport);
    }
    let svg = render_svg_viewport(graph, viewport, svg_options);

    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    let tree =
        usvg::Tree::from_str(&svg, &opt).map_err(|err| ExportError::SvgParse(err.to_string()))?;

    let width = pixel_extent(viewport.width, raster.scale);
    let height = pixel_extent(viewport.height, raster.scale);
    if width > MAX_PIXMAP_EDGE || height > MAX_PIXMAP_EDGE {
        return Err(ExportError::PixmapAlloc { width, height });
    }
    let mut pixmap =
        tiny_skia::Pixmap::new(width, height).ok_or(ExportError::PixmapAlloc { width, height })?;

    if let Some(color) = raster.background.as_deref().and_then(parse_color) {
        pixmap.fill(color);
    }
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(raster.scale, raster.scale),
        &mut pixmap.as_mut(),
    );
    pixmap
        .encode_png()
        .map_err(|err| ExportError::PngEncode(err.to_string()))
}

fn pixel_extent(length: f64, scale: f32) -> u32 {
    (length * f64::from(scale)).ceil().clamp(1.0, f64::from(u32::MAX)) as u32
}

fn parse_color(text: &str) -> Option<tiny_skia::Color> {
    let value = text.trim().to_ascii_lowercase();
    match value.as_str() {
        "transparent" => return Some(tiny_skia::Color::TRANSPARENT),
        "white" => return Some(tiny_skia::Color::WHITE),
        "black" => return Some(tiny_skia::Color::BLACK),
        _ => {}
    }

    let hex = value.strip_prefix('#')?;
    let digits: Vec<u8> = hex
        .chars()
        .map(|c| c.to_digit(16).map(|d| d as u8))
        .collect::<Option<_>>()?;
    let channels: Vec<u8> = match digits.len() {
        3 | 4 => digits.iter().map(|d| (d << 4) | d).collect(),
        6 | 8 => digits.chunks(2).map(|pair| (pair[0] << 4) | pair[1]).collect(),
        _ => return None,
    };
    let alpha = channels.get(3).copied().unwrap_or(255);
    Some(tiny_skia::Color::from_rgba8(
        channels[0],
        channels[1],
        channels[2],
        alpha,
    ))
}
