use lazynote_canvas::db::migrations::{latest_version, schema_version};
use lazynote_canvas::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_canvas_tables() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    for table in ["canvases", "canvas_nodes", "canvas_edges"] {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn reopening_a_file_database_keeps_schema_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("canvas.db");

    drop(open_db(&path).unwrap());
    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn).unwrap(), latest_version());
}

#[test]
fn newer_schema_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn edges_must_reference_nodes_of_the_same_canvas() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO canvases (canvas_uuid, title, visibility, created_at, updated_at)
         VALUES ('c1', 'one', 'private', 0, 0), ('c2', 'two', 'private', 0, 0);
         INSERT INTO canvas_nodes (canvas_uuid, node_id, sort_order, node_type,
            position_x, position_y, width, height, style_json, data_json)
         VALUES ('c1', 'a', 0, 'sticky', 0, 0, 10, 10, '{}', '{}'),
                ('c2', 'b', 0, 'sticky', 0, 0, 10, 10, '{}', '{}');",
    )
    .unwrap();

    let cross_canvas = conn.execute(
        "INSERT INTO canvas_edges (canvas_uuid, edge_id, sort_order, source_node_id, target_node_id)
         VALUES ('c1', 'e1', 0, 'a', 'b');",
        [],
    );
    assert!(cross_canvas.is_err());
}

#[test]
fn deleting_a_canvas_cascades_to_contents() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO canvases (canvas_uuid, title, visibility, created_at, updated_at)
         VALUES ('c1', 'one', 'private', 0, 0);
         INSERT INTO canvas_nodes (canvas_uuid, node_id, sort_order, node_type,
            position_x, position_y, width, height, style_json, data_json)
         VALUES ('c1', 'a', 0, 'sticky', 0, 0, 10, 10, '{}', '{}'),
                ('c1', 'b', 1, 'sticky', 0, 0, 10, 10, '{}', '{}');
         INSERT INTO canvas_edges (canvas_uuid, edge_id, sort_order, source_node_id, target_node_id)
         VALUES ('c1', 'e1', 0, 'a', 'b');
         DELETE FROM canvases WHERE canvas_uuid = 'c1';",
    )
    .unwrap();

    let remaining: i64 = conn
        .query_row(
            "SELECT (SELECT COUNT(*) FROM canvas_nodes) + (SELECT COUNT(*) FROM canvas_edges);",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(remaining, 0);
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
