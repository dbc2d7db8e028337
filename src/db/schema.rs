//! SQL DDL for index databases.
//!
//! Defines the `chunks` table, the `chunks_vec` (vec0) companion keyed by
//! chunk id, and the `index_meta` key/value table recording which content
//! class and embedding model the index was built with. All DDL uses
//! `IF NOT EXISTS` for idempotent initialization.

use rusqlite::{Connection, OptionalExtension};

use crate::embedding::EMBEDDING_DIM;

/// Layout version written into `index_meta`.
pub const SCHEMA_VERSION: u32 = 1;

pub const META_SCHEMA_VERSION: &str = "schema_version";
pub const META_CONTENT_CLASS: &str = "content_class";
pub const META_EMBEDDING_MODEL: &str = "embedding_model";
pub const META_BUILT_AT: &str = "built_at";

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS chunks (
    id TEXT PRIMARY KEY,
    source TEXT NOT NULL,
    start_offset INTEGER NOT NULL CHECK(start_offset >= 0),
    content TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_chunks_source ON chunks(source, start_offset);

CREATE TABLE IF NOT EXISTS index_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    // vec0 virtual table must be created separately (sqlite-vec syntax).
    conn.execute_batch(&format!(
        "CREATE VIRTUAL TABLE IF NOT EXISTS chunks_vec USING vec0(\
             id TEXT PRIMARY KEY, \
             embedding FLOAT[{EMBEDDING_DIM}] distance_metric=cosine\
         );"
    ))?;

    conn.execute(
        "INSERT OR IGNORE INTO index_meta (key, value) VALUES (?1, ?2)",
        [META_SCHEMA_VERSION, &SCHEMA_VERSION.to_string()],
    )?;

    Ok(())
}

/// Read a value from `index_meta`.
pub fn get_meta(conn: &Connection, key: &str) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM index_meta WHERE key = ?1",
        [key],
        |row| row.get::<_, String>(0),
    )
    .optional()
}

/// Insert or replace a value in `index_meta`.
pub fn set_meta(conn: &Connection, key: &str, value: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO index_meta (key, value) VALUES (?1, ?2)",
        [key, value],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_db() -> Connection {
        crate::db::load_sqlite_vec();
        Connection::open_in_memory().unwrap()
    }

    #[test]
    fn schema_creates_all_tables() {
        let conn = memory_db();
        init_schema(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"chunks".to_string()));
        assert!(tables.contains(&"index_meta".to_string()));
        assert!(tables.contains(&"chunks_vec".to_string()));
    }

    #[test]
    fn schema_is_idempotent() {
        let conn = memory_db();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap(); // second call should not error
        assert_eq!(
            get_meta(&conn, META_SCHEMA_VERSION).unwrap(),
            Some(SCHEMA_VERSION.to_string())
        );
    }

    #[test]
    fn meta_set_and_get() {
        let conn = memory_db();
        init_schema(&conn).unwrap();
        assert!(get_meta(&conn, META_EMBEDDING_MODEL).unwrap().is_none());

        set_meta(&conn, META_EMBEDDING_MODEL, "all-MiniLM-L6-v2").unwrap();
        set_meta(&conn, META_EMBEDDING_MODEL, "new-model-v3").unwrap();
        assert_eq!(
            get_meta(&conn, META_EMBEDDING_MODEL).unwrap(),
            Some("new-model-v3".to_string())
        );
    }
}
