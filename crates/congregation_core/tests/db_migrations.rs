use congregation_core::db::migrations::latest_version;
use congregation_core::db::{open_db, open_db_in_memory, DbError};
use congregation_core::repo::member_repo::SqliteMemberRepository;
use congregation_core::RepoError;
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "members");
    assert_table_exists(&conn, "classes");
    assert_table_exists(&conn, "meetings");
    assert_table_exists(&conn, "attendance_records");
}

#[test]
fn reopening_a_database_file_keeps_schema_and_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("congregation.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO classes (id, name) VALUES ('0b6f3c1e-4b5e-4d8a-9f8e-1c2d3e4f5a6b', 'Jovens');",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let classes: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM classes;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(classes, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
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
fn repositories_reject_unmigrated_connections() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteMemberRepository::try_new(&conn).err().unwrap();
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

#[test]
fn attendance_rows_cannot_be_updated() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO attendance_records (
            id, registered_at, member_id, member_name, class_id, class_name,
            meeting_id, meeting_name, recorded_by
        ) VALUES (
            'a', 1716112800000, 'm', 'Maria Souza', 'c', 'Jovens', 'g', 'Culto', 'user-1'
        );",
        [],
    )
    .unwrap();

    let err = conn
        .execute(
            "UPDATE attendance_records SET member_name = 'Outra Pessoa' WHERE id = 'a';",
            [],
        )
        .unwrap_err();
    assert!(err.to_string().contains("immutable"));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
