// ==========================================
// DocumentRepository - document persistence
// ==========================================
// Manages the documents table. Rows are keyed by absolute path; link
// fields are provided by the external matcher collaborator.
// ==========================================

use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::types::{DocType, LinkTarget};
use crate::domain::{Document, NewDocument};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::parse_timestamp;

pub struct DocumentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DocumentRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Insert or update a document by path.
    pub fn upsert(&self, doc: &NewDocument) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO documents(
                path, filename, extension, size_bytes, modified_at, import_run_id,
                linked_to_type, linked_id, doc_type, part_revision, link_reason
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(path) DO UPDATE SET
                filename=excluded.filename,
                extension=excluded.extension,
                size_bytes=excluded.size_bytes,
                modified_at=excluded.modified_at,
                import_run_id=excluded.import_run_id,
                linked_to_type=excluded.linked_to_type,
                linked_id=excluded.linked_id,
                doc_type=excluded.doc_type,
                part_revision=excluded.part_revision,
                link_reason=excluded.link_reason
            "#,
            params![
                doc.path,
                doc.filename,
                doc.extension,
                doc.size_bytes,
                doc.modified_at.map(|ts| ts.to_rfc3339()),
                doc.import_run_id,
                doc.linked_to_type.map(|t| t.to_string()),
                doc.linked_id,
                doc.doc_type.to_string(),
                doc.part_revision,
                doc.link_reason,
            ],
        )?;
        let id: i64 = conn.query_row(
            "SELECT id FROM documents WHERE path=?1",
            params![doc.path],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Documents linked to an article or part, ordered by filename.
    pub fn for_link(&self, target: LinkTarget, linked_id: i64) -> RepositoryResult<Vec<Document>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{DOCUMENT_COLUMNS} WHERE linked_to_type=?1 AND linked_id=?2 ORDER BY filename"
        ))?;
        let rows = stmt.query_map(params![target.to_string(), linked_id], map_document)?;
        collect(rows)
    }

    /// Documents for a part at a specific revision, falling back to
    /// all of the part's documents when none carry that revision.
    pub fn for_part_revision(
        &self,
        part_id: i64,
        revision: Option<&str>,
    ) -> RepositoryResult<Vec<Document>> {
        let conn = self.get_conn()?;
        if let Some(rev) = revision.map(str::trim).filter(|r| !r.is_empty()) {
            let mut stmt = conn.prepare(&format!(
                r#"{DOCUMENT_COLUMNS}
                WHERE linked_to_type='part' AND linked_id=?1
                  AND UPPER(COALESCE(part_revision, ''))=?2
                ORDER BY filename"#
            ))?;
            let rows = stmt.query_map(params![part_id, rev.to_uppercase()], map_document)?;
            let matched = collect(rows)?;
            if !matched.is_empty() {
                return Ok(matched);
            }
        }
        let mut stmt = conn.prepare(&format!(
            "{DOCUMENT_COLUMNS} WHERE linked_to_type='part' AND linked_id=?1 ORDER BY filename"
        ))?;
        let rows = stmt.query_map(params![part_id], map_document)?;
        collect(rows)
    }

    /// Documents no matcher could link, with their reasons.
    pub fn unlinked(&self, limit: u32) -> RepositoryResult<Vec<Document>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{DOCUMENT_COLUMNS} WHERE linked_to_type IS NULL ORDER BY filename LIMIT ?1"
        ))?;
        let rows = stmt.query_map(params![limit], map_document)?;
        collect(rows)
    }

    /// All stored (id, path) pairs; the importer's cleanup pass uses
    /// this to find rows whose file disappeared.
    pub fn all_paths(&self) -> RepositoryResult<Vec<(i64, String)>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT id, path FROM documents")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn delete(&self, document_id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute("DELETE FROM documents WHERE id=?1", params![document_id])?;
        Ok(())
    }
}

const DOCUMENT_COLUMNS: &str = r#"
    SELECT id, linked_to_type, linked_id, doc_type, filename, path, extension,
           size_bytes, modified_at, sha256, import_run_id, part_revision, link_reason
    FROM documents"#;

fn map_document(row: &rusqlite::Row<'_>) -> rusqlite::Result<Document> {
    let linked_to_type: Option<String> = row.get(1)?;
    let doc_type: Option<String> = row.get(3)?;
    Ok(Document {
        id: row.get(0)?,
        linked_to_type: linked_to_type.and_then(|t| t.parse().ok()),
        linked_id: row.get(2)?,
        doc_type: doc_type
            .and_then(|t| t.parse().ok())
            .unwrap_or(DocType::Other),
        filename: row.get(4)?,
        path: row.get(5)?,
        extension: row.get(6)?,
        size_bytes: row.get(7)?,
        modified_at: parse_timestamp(row.get(8)?),
        sha256: row.get(9)?,
        import_run_id: row.get(10)?,
        part_revision: row.get(11)?,
        link_reason: row.get(12)?,
    })
}

fn collect<I>(rows: I) -> RepositoryResult<Vec<Document>>
where
    I: Iterator<Item = rusqlite::Result<Document>>,
{
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
