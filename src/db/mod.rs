//! SQLite storage for similarity indexes.
//!
//! Every content class owns one directory holding a single `index.db` file
//! with the chunk table and its sqlite-vec companion. Indexes are written once
//! by the batch builder ([`create_index`], then [`publish_index`]) and opened
//! read-only by the serving processes ([`open_index`]).

pub mod schema;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use serde::Serialize;
use sqlite_vec::sqlite3_vec_init;
use std::path::{Path, PathBuf};
use std::sync::Once;

use crate::index::types::ContentClass;

/// File name of the database inside an index directory.
pub const INDEX_FILE: &str = "index.db";

/// File name of an index while it is being built.
pub const BUILD_FILE: &str = "index.db.building";

static SQLITE_VEC_INIT: Once = Once::new();

/// Register the sqlite-vec extension globally. Safe to call multiple times.
pub fn load_sqlite_vec() {
    SQLITE_VEC_INIT.call_once(|| unsafe {
        rusqlite::ffi::sqlite3_auto_extension(Some(std::mem::transmute(
            sqlite3_vec_init as *const (),
        )));
    });
}

/// Path of the database file inside an index directory.
pub fn index_file(dir: &Path) -> PathBuf {
    dir.join(INDEX_FILE)
}

/// Create a fresh index database in `dir` for one content class.
///
/// The database is written beside the live index and only replaces it in
/// [`publish_index`]; a build that fails midway leaves the previous index
/// (or its absence) untouched.
pub fn create_index(dir: &Path, class: ContentClass, model: &str) -> Result<Connection> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory {}", dir.display()))?;

    let path = dir.join(BUILD_FILE);
    if path.exists() {
        std::fs::remove_file(&path)
            .with_context(|| format!("failed to remove stale build {}", path.display()))?;
        tracing::info!(path = %path.display(), "removed unfinished build");
    }

    load_sqlite_vec();

    let conn = Connection::open(&path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;

    schema::init_schema(&conn).context("failed to initialize schema")?;
    schema::set_meta(&conn, schema::META_CONTENT_CLASS, class.as_str())?;
    schema::set_meta(&conn, schema::META_EMBEDDING_MODEL, model)?;
    schema::set_meta(&conn, schema::META_BUILT_AT, &chrono::Utc::now().to_rfc3339())?;

    tracing::info!(path = %path.display(), class = %class, "index build started");
    Ok(conn)
}

/// Close a finished build and move it over the live index of `dir`.
pub fn publish_index(conn: Connection, dir: &Path) -> Result<PathBuf> {
    conn.close()
        .map_err(|(_, e)| e)
        .context("failed to close index build")?;

    let building = dir.join(BUILD_FILE);
    let path = index_file(dir);
    std::fs::rename(&building, &path)
        .with_context(|| format!("failed to move {} into place", building.display()))?;

    tracing::info!(path = %path.display(), "index published");
    Ok(path)
}

/// Open an existing index database read-only.
pub fn open_index(dir: &Path) -> Result<Connection> {
    let path = index_file(dir);
    anyhow::ensure!(path.exists(), "index database not found at {}", path.display());

    load_sqlite_vec();

    let conn = Connection::open_with_flags(
        &path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("failed to open index at {}", path.display()))?;

    conn.busy_timeout(std::time::Duration::from_millis(5000))?;
    Ok(conn)
}

/// Summary of one index database, used by `doctor` and `index stats`.
#[derive(Debug, Serialize)]
pub struct IndexHealth {
    pub schema_version: u32,
    pub sqlite_vec_version: String,
    pub content_class: Option<String>,
    pub embedding_model: Option<String>,
    pub built_at: Option<String>,
    pub chunk_count: u64,
    pub source_count: u64,
    pub integrity_ok: bool,
    pub integrity_details: String,
}

/// Inspect an index database.
pub fn check_index_health(conn: &Connection) -> Result<IndexHealth> {
    let sqlite_vec_version: String = conn.query_row("SELECT vec_version()", [], |r| r.get(0))?;
    let schema_version = schema::get_meta(conn, schema::META_SCHEMA_VERSION)?
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let chunk_count: i64 = conn.query_row("SELECT COUNT(*) FROM chunks", [], |r| r.get(0))?;
    let source_count: i64 =
        conn.query_row("SELECT COUNT(DISTINCT source) FROM chunks", [], |r| r.get(0))?;
    let integrity_details: String =
        conn.query_row("PRAGMA integrity_check", [], |r| r.get(0))?;

    Ok(IndexHealth {
        schema_version,
        sqlite_vec_version,
        content_class: schema::get_meta(conn, schema::META_CONTENT_CLASS)?,
        embedding_model: schema::get_meta(conn, schema::META_EMBEDDING_MODEL)?,
        built_at: schema::get_meta(conn, schema::META_BUILT_AT)?,
        chunk_count: chunk_count as u64,
        source_count: source_count as u64,
        integrity_ok: integrity_details == "ok",
        integrity_details,
    })
}
