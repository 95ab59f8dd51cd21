// ==========================================
// PartRepository - part persistence
// ==========================================
// Manages the parts table. Part numbers are stored uppercased; the
// import pipeline treats them as case-insensitive identifiers.
// ==========================================

use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::types::PartType;
use crate::domain::{Part, PartUsage};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{parse_qty, parse_timestamp};

pub struct PartRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PartRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Insert or update a part by number, returning its id.
    ///
    /// The description keeps the last non-null value seen across
    /// imports.
    pub fn upsert(&self, part_number: &str, description: Option<&str>) -> RepositoryResult<i64> {
        let number = part_number.trim().to_uppercase();
        if number.is_empty() {
            return Err(RepositoryError::FieldValueError {
                field: "part_number".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO parts(part_number, description, updated_at)
            VALUES (?1, ?2, CURRENT_TIMESTAMP)
            ON CONFLICT(part_number) DO UPDATE SET
                description=COALESCE(excluded.description, parts.description),
                updated_at=CURRENT_TIMESTAMP
            "#,
            params![number, description],
        )?;
        let id: i64 = conn.query_row(
            "SELECT id FROM parts WHERE part_number=?1",
            params![number],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Fetch a part by number, case-insensitive.
    pub fn find_by_number(&self, part_number: &str) -> RepositoryResult<Option<Part>> {
        let conn = self.get_conn()?;
        let part = conn
            .query_row(
                r#"
                SELECT id, part_number, description, part_type, created_at, updated_at
                FROM parts WHERE part_number=?1
                "#,
                params![part_number.trim().to_uppercase()],
                map_part,
            )
            .optional()?;
        Ok(part)
    }

    pub fn find_by_id(&self, part_id: i64) -> RepositoryResult<Option<Part>> {
        let conn = self.get_conn()?;
        let part = conn
            .query_row(
                r#"
                SELECT id, part_number, description, part_type, created_at, updated_at
                FROM parts WHERE id=?1
                "#,
                params![part_id],
                map_part,
            )
            .optional()?;
        Ok(part)
    }

    /// Where-used listing: every article line referencing the part.
    pub fn usages(&self, part_id: i64) -> RepositoryResult<Vec<PartUsage>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT a.article_number, a.title, bl.qty, bl.revision, bl.material
            FROM bom_lines bl
            JOIN articles a ON a.id = bl.article_id
            WHERE bl.part_id=?1
            ORDER BY a.article_number
            "#,
        )?;
        let rows = stmt.query_map(params![part_id], |row| {
            Ok(PartUsage {
                article_number: row.get(0)?,
                title: row.get(1)?,
                qty: parse_qty(row.get(2)?),
                revision: row.get(3)?,
                material: row.get(4)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Set or clear the curated part type.
    pub fn update_part_type(&self, part_id: i64, part_type: Option<PartType>) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            r#"
            UPDATE parts SET part_type=?1, updated_at=CURRENT_TIMESTAMP WHERE id=?2
            "#,
            params![part_type.map(|t| t.to_string()), part_id],
        )?;
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Part".to_string(),
                id: part_id.to_string(),
            });
        }
        Ok(())
    }
}

fn map_part(row: &rusqlite::Row<'_>) -> rusqlite::Result<Part> {
    let part_type: Option<String> = row.get(3)?;
    Ok(Part {
        id: row.get(0)?,
        part_number: row.get(1)?,
        description: row.get(2)?,
        // Unknown stored values read as None rather than failing the row.
        part_type: part_type.and_then(|t| t.parse().ok()),
        created_at: parse_timestamp(row.get(4)?),
        updated_at: parse_timestamp(row.get(5)?),
    })
}
