// ==========================================
// BOM Navigator - SQLite connection setup
// ==========================================
// Goals:
// - One place for Connection::open PRAGMA behavior, so every module
//   gets foreign keys and busy_timeout instead of just some of them
// - Schema creation + column backfill for databases written by
//   earlier releases
// ==========================================

use rusqlite::Connection;
use std::collections::HashSet;
use std::time::Duration;

/// Default busy_timeout (milliseconds)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Index database schema.
///
/// Quantities are stored as decimal text, not REAL: order explosion
/// multiplies quantities along deep chains and must stay exact.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS articles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    article_number TEXT NOT NULL UNIQUE,
    title TEXT,
    source_bom_filename TEXT,
    source_bom_path TEXT,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS parts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    part_number TEXT NOT NULL UNIQUE,
    description TEXT,
    part_type TEXT,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS import_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT DEFAULT CURRENT_TIMESTAMP,
    finished_at TEXT,
    status TEXT NOT NULL,
    files_scanned INTEGER DEFAULT 0,
    boms_parsed INTEGER DEFAULT 0,
    lines_imported INTEGER DEFAULT 0,
    warnings_count INTEGER DEFAULT 0,
    errors_count INTEGER DEFAULT 0
);

CREATE TABLE IF NOT EXISTS bom_lines (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    article_id INTEGER NOT NULL,
    part_id INTEGER NOT NULL,
    item_no TEXT,
    line_no INTEGER,
    qty TEXT,
    unit TEXT,
    revision TEXT,
    description TEXT,
    material TEXT,
    finish TEXT,
    line_type TEXT,
    status TEXT,
    raw_columns_json TEXT,
    source_sheet TEXT,
    source_row_number INTEGER,
    import_run_id INTEGER,
    FOREIGN KEY(article_id) REFERENCES articles(id),
    FOREIGN KEY(part_id) REFERENCES parts(id),
    FOREIGN KEY(import_run_id) REFERENCES import_runs(id)
);

CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    linked_to_type TEXT,
    linked_id INTEGER,
    doc_type TEXT,
    filename TEXT NOT NULL,
    path TEXT NOT NULL UNIQUE,
    extension TEXT,
    size_bytes INTEGER,
    modified_at TEXT,
    sha256 TEXT,
    import_run_id INTEGER,
    part_revision TEXT,
    link_reason TEXT,
    FOREIGN KEY(import_run_id) REFERENCES import_runs(id)
);

CREATE TABLE IF NOT EXISTS import_issues (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    import_run_id INTEGER NOT NULL,
    severity TEXT NOT NULL,
    file_path TEXT,
    sheet_name TEXT,
    row_number INTEGER,
    message TEXT NOT NULL,
    raw_row_json TEXT,
    FOREIGN KEY(import_run_id) REFERENCES import_runs(id)
);

CREATE INDEX IF NOT EXISTS idx_articles_number ON articles(article_number);
CREATE INDEX IF NOT EXISTS idx_parts_number ON parts(part_number);
CREATE INDEX IF NOT EXISTS idx_bom_article ON bom_lines(article_id);
CREATE INDEX IF NOT EXISTS idx_bom_part ON bom_lines(part_id);
CREATE INDEX IF NOT EXISTS idx_documents_link ON documents(linked_to_type, linked_id);
"#;

/// Apply the unified PRAGMA set to a connection.
///
/// foreign_keys and busy_timeout are per-connection settings and must
/// be re-applied on every open.
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Open a SQLite connection with the unified configuration applied.
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Create the schema if missing and backfill columns added after the
/// first release. Idempotent; safe to run on every startup.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    ensure_bom_lines_columns(conn)?;
    ensure_documents_columns(conn)?;
    Ok(())
}

fn table_columns(conn: &Connection, table: &str) -> rusqlite::Result<HashSet<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<HashSet<_>, _>>()?;
    Ok(names)
}

// Databases created before finish/line_type/status were imported lack
// these columns; add them in place rather than forcing a reindex.
fn ensure_bom_lines_columns(conn: &Connection) -> rusqlite::Result<()> {
    let columns = table_columns(conn, "bom_lines")?;
    if !columns.contains("finish") {
        conn.execute("ALTER TABLE bom_lines ADD COLUMN finish TEXT", [])?;
    }
    if !columns.contains("line_type") {
        conn.execute("ALTER TABLE bom_lines ADD COLUMN line_type TEXT", [])?;
    }
    if !columns.contains("status") {
        conn.execute("ALTER TABLE bom_lines ADD COLUMN status TEXT", [])?;
    }
    Ok(())
}

fn ensure_documents_columns(conn: &Connection) -> rusqlite::Result<()> {
    let columns = table_columns(conn, "documents")?;
    if !columns.contains("part_revision") {
        conn.execute("ALTER TABLE documents ADD COLUMN part_revision TEXT", [])?;
    }
    if !columns.contains("link_reason") {
        conn.execute("ALTER TABLE documents ADD COLUMN link_reason TEXT", [])?;
    }
    Ok(())
}
