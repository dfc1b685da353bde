use lazynote_canvas::export::{
    export_file_name, export_json, export_png, export_svg, from_snapshot_json, render_png,
    render_svg, ExportError, ExportFormat, RasterOptions, SvgOptions, Viewport, SNAPSHOT_FORMAT,
};
use lazynote_canvas::model::{
    Canvas, ChecklistItem, Edge, EdgeKind, Graph, LinkMetadata, Node, NodePayload, Point,
    Visibility,
};
use uuid::Uuid;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

fn sample_canvas() -> Canvas {
    let nodes = vec![
        Node::new(
            "sticky",
            NodePayload::Sticky {
                text: "Tom & Jerry <3".to_string(),
            },
            Point::new(0.1, 0.2),
        ),
        Node::new(
            "todo",
            NodePayload::Checklist {
                title: "Launch".to_string(),
                items: vec![
                    ChecklistItem {
                        text: "docs".to_string(),
                        done: true,
                    },
                    ChecklistItem {
                        text: "release".to_string(),
                        done: false,
                    },
                ],
            },
            Point::new(320.0, -40.0),
        ),
        Node::new(
            "link",
            NodePayload::LinkPreview(LinkMetadata {
                url: "https://example.com".to_string(),
                title: Some("Example".to_string()),
                description: None,
                image: None,
            }),
            Point::new(1e-7, 640.333_333_333_333_3),
        ),
    ];
    let mut animated = Edge::new("e2", "todo", "link");
    animated.kind = EdgeKind::Animated;
    animated.label = Some("then".to_string());
    animated.color = Some("#ef4444".to_string());

    Canvas {
        id: Some(Uuid::new_v4()),
        title: "Q3 / Roadmap".to_string(),
        graph: Graph::new(nodes, vec![Edge::new("e1", "sticky", "todo"), animated]),
        workspace_id: Some("ws-1".to_string()),
        visibility: Visibility::Public,
    }
}

#[test]
fn json_snapshot_round_trips_exactly() {
    let canvas = sample_canvas();
    let artifact = export_json(&canvas).unwrap();
    assert_eq!(artifact.file_name, "Q3 _ Roadmap.json");
    assert_eq!(artifact.content_type, "application/json");

    let text = String::from_utf8(artifact.bytes).unwrap();
    assert!(text.contains(SNAPSHOT_FORMAT));
    let (back, repair) = from_snapshot_json(&text).unwrap();
    assert!(repair.is_clean());
    assert_eq!(back, canvas);
}

#[test]
fn json_snapshot_omits_selection() {
    let mut canvas = sample_canvas();
    canvas.graph = canvas
        .graph
        .with_selection(&["todo".to_string()], &["e1".to_string()]);
    let text = String::from_utf8(export_json(&canvas).unwrap().bytes).unwrap();
    assert!(!text.contains("selected"));

    let (back, _) = from_snapshot_json(&text).unwrap();
    assert!(back.graph.selected_node_ids().is_empty());
}

#[test]
fn json_import_rejects_foreign_format_and_newer_version() {
    let canvas_json = serde_json::to_value(sample_canvas()).unwrap();

    let foreign = serde_json::json!({ "format": "other-app", "version": 1, "canvas": canvas_json });
    assert!(matches!(
        from_snapshot_json(&foreign.to_string()),
        Err(ExportError::UnsupportedFormat(format)) if format == "other-app"
    ));

    let newer = serde_json::json!({
        "format": SNAPSHOT_FORMAT,
        "version": 99,
        "canvas": canvas_json,
    });
    assert!(matches!(
        from_snapshot_json(&newer.to_string()),
        Err(ExportError::UnsupportedVersion(99))
    ));

    assert!(matches!(from_snapshot_json("{"), Err(ExportError::Json(_))));
}

#[test]
fn json_import_repairs_dangling_edges() {
    let mut canvas = sample_canvas();
    canvas.graph.edges.push(Edge::new("ghost", "sticky", "missing"));
    let text = serde_json::json!({
        "format": SNAPSHOT_FORMAT,
        "version": 1,
        "canvas": canvas,
    })
    .to_string();

    let (back, repair) = from_snapshot_json(&text).unwrap();
    assert_eq!(back.graph.edges.len(), 2);
    assert_eq!(repair.dropped_edges.len(), 1);
    assert_eq!(repair.dropped_edges[0].id, "ghost");
}

#[test]
fn svg_draws_every_node_and_edge_with_escaped_text() {
    let canvas = sample_canvas();
    let artifact = export_svg(&canvas, &SvgOptions::default());
    assert_eq!(artifact.file_name, "Q3 _ Roadmap.svg");
    assert_eq!(artifact.content_type, "image/svg+xml");

    let svg = String::from_utf8(artifact.bytes).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.ends_with("</svg>"));
    assert_eq!(svg.matches("data-node-id=").count(), 3);
    assert_eq!(svg.matches("<line ").count(), 2);
    assert_eq!(svg.matches("stroke-dasharray").count(), 1);
    assert!(svg.contains("Tom &amp; Jerry &lt;3"));
    assert!(svg.contains("Launch (1/2)"));
    assert!(svg.contains(">then</text>"));
    assert!(!svg.contains("<3"));
}

#[test]
fn svg_without_arrowheads_has_no_markers() {
    let options = SvgOptions {
        arrowheads: false,
        background: None,
        ..SvgOptions::default()
    };
    let svg = render_svg(&sample_canvas().graph, &options);
    assert!(!svg.contains("<marker"));
    assert!(!svg.contains("marker-end"));
}

#[test]
fn viewport_fit_covers_all_nodes_plus_padding() {
    let graph = sample_canvas().graph;
    let viewport = Viewport::fit(&graph, 10.0);
    for node in &graph.nodes {
        assert!(node.position.x >= viewport.x + 10.0 - 1e-9);
        assert!(node.position.y >= viewport.y + 10.0 - 1e-9);
        assert!(node.position.x + node.size.width <= viewport.x + viewport.width - 10.0 + 1e-9);
        assert!(node.position.y + node.size.height <= viewport.y + viewport.height - 10.0 + 1e-9);
    }

    let empty = Viewport::fit(&Graph::default(), 0.0);
    assert!(empty.is_valid());
}

#[test]
fn png_export_produces_png_bytes() {
    let canvas = sample_canvas();
    let raster = RasterOptions {
        scale: 0.5,
        background: Some("#ffffff".to_string()),
    };
    let artifact = export_png(&canvas, None, &SvgOptions::default(), &raster).unwrap();
    assert_eq!(artifact.file_name, "Q3 _ Roadmap.png");
    assert_eq!(artifact.content_type, "image/png");
    assert!(artifact.bytes.starts_with(PNG_SIGNATURE));
}

#[test]
fn png_of_empty_canvas_still_renders() {
    let canvas = Canvas::new("");
    let artifact =
        export_png(&canvas, None, &SvgOptions::default(), &RasterOptions::default()).unwrap();
    assert_eq!(artifact.file_name, "untitled.png");
    assert!(artifact.bytes.starts_with(PNG_SIGNATURE));
}

#[test]
fn control_characters_in_text_do_not_break_svg_or_png() {
    let mut canvas = Canvas::new("Alarm");
    canvas.graph = Graph::new(
        vec![Node::new(
            "bell",
            NodePayload::Sticky {
                text: "ring\u{7}now\u{1b}".to_string(),
            },
            Point::default(),
        )],
        vec![],
    );

    let svg = String::from_utf8(export_svg(&canvas, &SvgOptions::default()).bytes).unwrap();
    assert!(svg.contains("ringnow"));
    assert!(!svg.contains('\u{7}'));
    assert!(!svg.contains('\u{1b}'));

    let artifact =
        export_png(&canvas, None, &SvgOptions::default(), &RasterOptions::default()).unwrap();
    assert!(artifact.bytes.starts_with(PNG_SIGNATURE));
}

#[test]
fn png_rejects_invalid_viewport_and_scale() {
    let graph = sample_canvas().graph;
    let options = SvgOptions::default();

    let empty = Viewport::new(0.0, 0.0, 0.0, 100.0);
    assert!(matches!(
        render_png(&graph, empty, &options, &RasterOptions::default()),
        Err(ExportError::InvalidViewport)
    ));

    let infinite = Viewport::new(f64::NAN, 0.0, 10.0, 10.0);
    assert!(matches!(
        render_png(&graph, infinite, &options, &RasterOptions::default()),
        Err(ExportError::InvalidViewport)
    ));

    let zero_scale = RasterOptions {
        scale: 0.0,
        background: None,
    };
    assert!(matches!(
        render_png(&graph, Viewport::new(0.0, 0.0, 10.0, 10.0), &options, &zero_scale),
        Err(ExportError::InvalidViewport)
    ));
}

#[test]
fn png_rejects_oversized_pixmaps() {
    let huge = Viewport::new(0.0, 0.0, 100_000.0, 10.0);
    assert!(matches!(
        render_png(&Graph::default(), huge, &SvgOptions::default(), &RasterOptions::default()),
        Err(ExportError::PixmapAlloc { .. })
    ));
}

#[test]
fn file_names_are_sanitized_per_format() {
    assert_eq!(export_file_name("notes", ExportFormat::Png), "notes.png");
    assert_eq!(export_file_name("a\tb\nc", ExportFormat::Json), "a_b_c.json");
    assert_eq!(export_file_name("", ExportFormat::Svg), "untitled.svg");
    let long = "x".repeat(500);
    assert_eq!(export_file_name(&long, ExportFormat::Json).len(), 120 + ".json".len());
}
