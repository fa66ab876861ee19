// Integration tests for the migration framework and topology schema

use rusqlite::Connection;
use topoingest_core::model::{DEFAULT_ROOT_IDX, DEFAULT_ROOT_NAME};
use topoingest_store::migrations::{applied_migrations, apply_migrations};
use topoingest_store::repo::{EventRepo, RootRepo};

fn setup_test_db() -> Connection {
    topoingest_store::db::open_in_memory().expect("Failed to create in-memory database")
}

fn get_table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}

#[test]
fn test_apply_migrations_on_empty_db() {
    let mut conn = setup_test_db();

    let result = apply_migrations(&mut conn);
    assert!(
        result.is_ok(),
        "Migrations should succeed: {:?}",
        result.err()
    );

    let tables = get_table_names(&conn);
    for expected in ["schema_version", "event", "zone", "root", "device", "sqlite_sequence"] {
        assert!(
            tables.contains(&expected.to_string()),
            "Missing table: {}",
            expected
        );
    }
}

#[test]
fn test_migrations_are_idempotent() {
    let mut conn = setup_test_db();
    apply_migrations(&mut conn).unwrap();
    apply_migrations(&mut conn).unwrap();

    assert_eq!(
        applied_migrations(&conn).unwrap(),
        vec!["001_topology_schema".to_string(), "002_seed_root".to_string()]
    );
    assert_eq!(EventRepo::count(&conn).unwrap(), 1);
}

#[test]
fn test_default_root_seeded() {
    let mut conn = setup_test_db();
    apply_migrations(&mut conn).unwrap();

    let root = RootRepo::idx_exists(&conn, DEFAULT_ROOT_IDX)
        .unwrap()
        .expect("default root should be seeded");
    assert_eq!(root.name, DEFAULT_ROOT_NAME);
    assert_eq!(root.idx_event, 1);

    let bootstrap = EventRepo::idx_exists(&conn, 1).unwrap().unwrap();
    assert_eq!(bootstrap.name, "bootstrap");
}

#[test]
fn test_migrations_on_file_database() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("topology.db");

    {
        let mut conn = topoingest_store::db::open(&path).unwrap();
        apply_migrations(&mut conn).unwrap();
    }

    let mut conn = topoingest_store::db::open(&path).unwrap();
    apply_migrations(&mut conn).unwrap();
    assert_eq!(applied_migrations(&conn).unwrap().len(), 2);
}
