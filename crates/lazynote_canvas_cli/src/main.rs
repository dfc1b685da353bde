//! Command-line front end for the canvas core.
//!
//! # Responsibility
//! - Verify core linkage (`ping`).
//! - Export or re-layout canvases stored in a SQLite file.
//!
//! Logging is enabled when `LAZYNOTE_CANVAS_LOG_DIR` is set.

use lazynote_canvas::{
    export_json, export_png, export_svg, init_logging_from_env, CanvasSession, CanvasSync,
    LayoutStrategy, RasterOptions, SaveOutcome, SqliteCanvasStore, SvgOptions,
};
use log::info;
use std::error::Error;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use uuid::Uuid;

const USAGE: &str = "usage:
  lazynote-canvas ping
  lazynote-canvas list <db> [workspace-id]
  lazynote-canvas export <db> <canvas-id> <out-dir>
  lazynote-canvas layout <db> <canvas-id> <grid|circular|tree|hierarchical|force>";

type CliResult<T> = Result<T, Box<dyn Error>>;

fn main() -> ExitCode {
    if let Err(err) = init_logging_from_env() {
        eprintln!("warning: logging disabled: {err}");
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let argv: Vec<&str> = args.iter().map(String::as_str).collect();
    let result = match argv.as_slice() {
        ["ping"] => {
            println!("lazynote_canvas ping={}", lazynote_canvas::ping());
            println!("lazynote_canvas version={}", lazynote_canvas::core_version());
            Ok(())
        }
        ["list", db] => list(db, None),
        ["list", db, workspace] => list(db, Some(*workspace)),
        ["export", db, canvas_id, out_dir] => export(db, canvas_id, out_dir),
        ["layout", db, canvas_id, strategy] => layout(db, canvas_id, strategy),
        _ => {
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn runtime() -> CliResult<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread().build()?)
}

fn open_sync(db: &str) -> CliResult<CanvasSync<SqliteCanvasStore>> {
    Ok(CanvasSync::new(Arc::new(SqliteCanvasStore::open(db)?)))
}

fn list(db: &str, workspace: Option<&str>) -> CliResult<()> {
    use lazynote_canvas::CanvasStore;

    let store = SqliteCanvasStore::open(db)?;
    for summary in store.list_canvases(workspace)? {
        println!(
            "{}\t{}\t{} nodes\t{}",
            summary.canvas_uuid, summary.visibility, summary.node_count, summary.title
        );
    }
    Ok(())
}

fn export(db: &str, canvas_id: &str, out_dir: &str) -> CliResult<()> {
    let id = Uuid::parse_str(canvas_id)?;
    let sync = open_sync(db)?;
    let loaded = runtime()?.block_on(sync.load(id))?;
    let canvas = &loaded.canvas;

    let svg_options = SvgOptions::default();
    let artifacts = [
        export_json(canvas)?,
        export_svg(canvas, &svg_options),
        export_png(canvas, None, &svg_options, &RasterOptions::default())?,
    ];

    let out_dir = Path::new(out_dir);
    std::fs::create_dir_all(out_dir)?;
    for artifact in &artifacts {
        let path = out_dir.join(&artifact.file_name);
        std::fs::write(&path, &artifact.bytes)?;
        println!("{}\t{}", artifact.content_type, path.display());
    }
    info!(
        "event=cli_export module=cli status=ok canvas_id={} files={}",
        id,
        artifacts.len()
    );
    Ok(())
}

fn layout(db: &str, canvas_id: &str, strategy: &str) -> CliResult<()> {
    let id = Uuid::parse_str(canvas_id)?;
    let strategy: LayoutStrategy = strategy.parse()?;
    let sync = open_sync(db)?;
    let runtime = runtime()?;

    let loaded = runtime.block_on(sync.load(id))?;
    let mut session = CanvasSession::from_loaded(loaded);
    session.apply_layout(strategy)?;
    match runtime.block_on(session.save(&sync))? {
        SaveOutcome::Saved { node_count, .. } => {
            println!("applied {strategy} layout to {node_count} nodes");
        }
        SaveOutcome::Superseded => println!("save superseded"),
    }
    Ok(())
}
