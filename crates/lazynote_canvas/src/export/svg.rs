//! Static SVG drawing of a canvas graph.
//!
//! # Invariants
//! - Edges are drawn before nodes, nodes in document order, so later nodes
//!   paint over earlier ones the same way they do on the live canvas.
//! - Edge lines run between node borders along the center-to-center line.
//! - All user text and colors are XML-escaped; control characters XML 1.0
//!   cannot carry are dropped.

use crate::model::{Edge, EdgeKind, Graph, Node, Point};
use std::collections::BTreeSet;
use std::fmt::Write as _;

const DEFAULT_EDGE_COLOR: &str = "#64748b";
const TEXT_INSET: f64 = 8.0;
/// Rough glyph width relative to font size, used to truncate labels.
const GLYPH_WIDTH_RATIO: f64 = 0.6;

#[derive(Debug, Clone, PartialEq)]
pub struct SvgOptions {
    /// Space around the node bounding box.
    pub padding: f64,
    pub font_size: f64,
    pub arrowheads: bool,
    /// Fill behind the drawing; `None` keeps it transparent.
    pub background: Option<String>,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            padding: 24.0,
            font_size: 14.0,
            arrowheads: true,
            background: Some("#ffffff".to_string()),
        }
    }
}

/// Region of canvas coordinates to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_valid(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|value| value.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Node bounding box grown by `padding`. An empty graph gives a
    /// `2·padding` square at the origin (at least 1×1).
    pub fn fit(graph: &Graph, padding: f64) -> Self {
        let padding = if padding.is_finite() { padding.max(0.0) } else { 0.0 };
        let bounds = graph.nodes.iter().fold(None, |acc: Option<(f64, f64, f64, f64)>, node| {
            let (x0, y0) = (node.position.x, node.position.y);
            let (x1, y1) = (x0 + node.size.width, y0 + node.size.height);
            Some(match acc {
                Some((ax0, ay0, ax1, ay1)) => (ax0.min(x0), ay0.min(y0), ax1.max(x1), ay1.max(y1)),
                None => (x0, y0, x1, y1),
            })
        });
        match bounds {
            Some((x0, y0, x1, y1)) => Self::new(
                x0 - padding,
                y0 - padding,
                (x1 - x0 + 2.0 * padding).max(1.0),
                (y1 - y0 + 2.0 * padding).max(1.0),
            ),
            None => {
                let side = (2.0 * padding).max(1.0);
                Self::new(0.0, 0.0, side, side)
            }
        }
    }
}

/// Draws the whole graph.
pub fn render_svg(graph: &Graph, options: &SvgOptions) -> String {
    render_svg_viewport(graph, Viewport::fit(graph, options.padding), options)
}

/// Draws the graph cropped to `viewport`. The output's pixel size equals
/// the viewport size.
pub fn render_svg_viewport(graph: &Graph, viewport: Viewport, options: &SvgOptions) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="{x} {y} {w} {h}" font-family="sans-serif" font-size="{fs}">"#,
        x = num(viewport.x),
        y = num(viewport.y),
        w = num(viewport.width),
        h = num(viewport.height),
        fs = num(options.font_size),
    );

    let colors: BTreeSet<&str> = graph.edges.iter().map(edge_color).collect();
    let markers: Vec<&str> = colors.into_iter().collect();
    if options.arrowheads && !markers.is_empty() {
        out.push_str("<defs>");
        for (index, color) in markers.iter().enumerate() {
            let _ = write!(
                out,
                r#"<marker id="arrow-{index}" viewBox="0 0 10 10" refX="10" refY="5" markerWidth="8" markerHeight="8" orient="auto-start-reverse"><path d="M0,0 L10,5 L0,10 z" fill="{}"/></marker>"#,
                escape_xml(color)
            );
        }
        out.push_str("</defs>");
    }

    if let Some(background) = &options.background {
        let _ = write!(
            out,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
            num(viewport.x),
            num(viewport.y),
            num(viewport.width),
            num(viewport.height),
            escape_xml(background)
        );
    }

    for edge in &graph.edges {
        let (Some(source), Some(target)) = (graph.node(&edge.source), graph.node(&edge.target))
        else {
            continue;
        };
        let marker = options
            .arrowheads
            .then(|| markers.iter().position(|color| *color == edge_color(edge)))
            .flatten();
        write_edge(&mut out, edge, source, target, marker, options);
    }

    for node in &graph.nodes {
        write_node(&mut out, node, options);
    }

    out.push_str("</svg>");
    out
}

fn write_edge(
    out: &mut String,
    edge: &Edge,
    source: &Node,
    target: &Node,
    marker: Option<usize>,
    options: &SvgOptions,
) {
    let from_center = source.center();
    let to_center = target.center();
    let start = border_point(source, to_center);
    let end = border_point(target, from_center);
    let color = escape_xml(edge_color(edge));

    let _ = write!(
        out,
        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{color}" stroke-width="2""#,
        num(start.x),
        num(start.y),
        num(end.x),
        num(end.y),
    );
    if edge.kind == EdgeKind::Animated {
        out.push_str(r#" stroke-dasharray="6 4""#);
    }
    if let Some(index) = marker {
        let _ = write!(out, r#" marker-end="url(#arrow-{index})""#);
    }
    out.push_str("/>");

    if let Some(label) = edge.label.as_deref().filter(|label| !label.trim().is_empty()) {
        let mid = Point::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0);
        let _ = write!(
            out,
            r#"<text x="{}" y="{}" text-anchor="middle" fill="{color}" font-size="{}">{}</text>"#,
            num(mid.x),
            num(mid.y - 4.0),
            num(options.font_size * 0.85),
            escape_xml(label)
        );
    }
}

fn write_node(out: &mut String, node: &Node, options: &SvgOptions) {
    let _ = write!(
        out,
        r#"<g data-node-id="{}"><rect x="{}" y="{}" width="{}" height="{}" rx="8" fill="{}" stroke="{}" stroke-width="1.5"/>"#,
        escape_xml(&node.id),
        num(node.position.x),
        num(node.position.y),
        num(node.size.width),
        num(node.size.height),
        escape_xml(&node.style.background_color),
        escape_xml(&node.style.border_color),
    );

    let available = node.size.width - 2.0 * TEXT_INSET;
    let max_chars = (available / (options.font_size * GLYPH_WIDTH_RATIO)).floor().max(1.0) as usize;
    let label = truncate_label(&node.label(), max_chars);
    if !label.is_empty() {
        let _ = write!(
            out,
            r#"<text x="{}" y="{}" fill="{}">{}</text>"#,
            num(node.position.x + TEXT_INSET),
            num(node.position.y + TEXT_INSET + options.font_size),
            escape_xml(&node.style.foreground_color),
            escape_xml(&label)
        );
    }
    out.push_str("</g>");
}

fn edge_color(edge: &Edge) -> &str {
    edge.color
        .as_deref()
        .filter(|color| !color.trim().is_empty())
        .unwrap_or(DEFAULT_EDGE_COLOR)
}

/// Point where the ray from the node center towards `toward` leaves the box.
fn border_point(node: &Node, toward: Point) -> Point {
    let center = node.center();
    let dx = toward.x - center.x;
    let dy = toward.y - center.y;
    if dx == 0.0 && dy == 0.0 {
        return center;
    }
    let half_w = node.size.width / 2.0;
    let half_h = node.size.height / 2.0;
    let scale_x = if dx == 0.0 { f64::INFINITY } else { half_w / dx.abs() };
    let scale_y = if dy == 0.0 { f64::INFINITY } else { half_h / dy.abs() };
    let scale = scale_x.min(scale_y).min(1.0);
    center.offset(dx * scale, dy * scale)
}

fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_string();
    }
    let kept: String = label.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{kept}…")
}

/// Compact decimal for attribute values.
fn num(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded}")
    }
}

pub(super) fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\t' | '\n' | '\r' => escaped.push(ch),
            ch if ch < ' ' => {}
            _ => escaped.push(ch),
        }
    }
    escaped
}
