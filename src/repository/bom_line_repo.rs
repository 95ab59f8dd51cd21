// ==========================================
// BomLineRepository - BOM line persistence
// ==========================================
// Manages the bom_lines table. Reimporting an article clears its
// lines and inserts the new set under a fresh import run.
// ==========================================

use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::{ArticleUsage, BomLine, NewBomLine};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{parse_qty, qty_to_text};

pub struct BomLineRepository {
    conn: Arc<Mutex<Connection>>,
}

impl BomLineRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Insert one BOM line.
    pub fn insert(&self, line: &NewBomLine) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO bom_lines(
                article_id, part_id, item_no, line_no, qty, unit, revision, description,
                material, finish, line_type, status, raw_columns_json, source_sheet,
                source_row_number, import_run_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            "#,
            params![
                line.article_id,
                line.part_id,
                line.item_no,
                line.line_no,
                qty_to_text(line.qty),
                line.unit,
                line.revision,
                line.description,
                line.material,
                line.finish,
                line.line_type,
                line.status,
                serde_json::to_string(&line.raw_columns)
                    .map_err(|e| RepositoryError::InternalError(e.to_string()))?,
                line.source_sheet,
                line.source_row_number,
                line.import_run_id,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Insert an article's line set in one transaction.
    pub fn insert_many(&self, lines: &[NewBomLine]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let mut count = 0;
        for line in lines {
            tx.execute(
                r#"
                INSERT INTO bom_lines(
                    article_id, part_id, item_no, line_no, qty, unit, revision, description,
                    material, finish, line_type, status, raw_columns_json, source_sheet,
                    source_row_number, import_run_id
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
                "#,
                params![
                    line.article_id,
                    line.part_id,
                    line.item_no,
                    line.line_no,
                    qty_to_text(line.qty),
                    line.unit,
                    line.revision,
                    line.description,
                    line.material,
                    line.finish,
                    line.line_type,
                    line.status,
                    serde_json::to_string(&line.raw_columns)
                        .map_err(|e| RepositoryError::InternalError(e.to_string()))?,
                    line.source_sheet,
                    line.source_row_number,
                    line.import_run_id,
                ],
            )?;
            count += 1;
        }
        tx.commit()?;
        Ok(count)
    }

    /// Remove all lines of an article, ahead of a reimport.
    pub fn clear_article(&self, article_id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let removed = conn.execute("DELETE FROM bom_lines WHERE article_id=?1", params![article_id])?;
        Ok(removed)
    }

    /// An article's lines joined with their parts, in stored order.
    ///
    /// Callers wanting display order sort with the item-number key;
    /// this query keeps insertion order.
    pub fn lines_for_article(&self, article_id: i64) -> RepositoryResult<Vec<BomLine>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                bl.id, bl.article_id, bl.part_id, p.part_number, bl.item_no, bl.line_no,
                bl.qty, bl.unit, bl.revision,
                COALESCE(bl.description, p.description) AS description,
                bl.material, bl.finish, bl.line_type, bl.status,
                bl.source_sheet, bl.source_row_number
            FROM bom_lines bl
            JOIN parts p ON p.id = bl.part_id
            WHERE bl.article_id=?1
            ORDER BY bl.id
            "#,
        )?;
        let rows = stmt.query_map(params![article_id], map_bom_line)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Articles whose BOM references a part number (exact,
    /// case-insensitive).
    pub fn articles_using_part(&self, part_number: &str) -> RepositoryResult<Vec<ArticleUsage>> {
        let value = part_number.trim();
        if value.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT a.id, a.article_number, a.title, bl.item_no, p.part_number, bl.qty, bl.revision
            FROM bom_lines bl
            JOIN parts p ON p.id = bl.part_id
            JOIN articles a ON a.id = bl.article_id
            WHERE UPPER(p.part_number) = UPPER(?1)
            ORDER BY a.article_number, bl.item_no
            "#,
        )?;
        let rows = stmt.query_map(params![value], map_article_usage)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Articles whose BOM references any of the candidate part
    /// numbers (exact, case-insensitive).
    pub fn articles_using_candidates(&self, candidates: &[String]) -> RepositoryResult<Vec<ArticleUsage>> {
        let mut normalized: Vec<String> = candidates
            .iter()
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .collect();
        normalized.sort();
        normalized.dedup();
        if normalized.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; normalized.len()].join(",");
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT a.id, a.article_number, a.title, bl.item_no, p.part_number, bl.qty, bl.revision
            FROM bom_lines bl
            JOIN parts p ON p.id = bl.part_id
            JOIN articles a ON a.id = bl.article_id
            WHERE UPPER(p.part_number) IN ({placeholders})
            ORDER BY a.article_number, bl.item_no, p.part_number
            "#
        ))?;
        let rows = stmt.query_map(rusqlite::params_from_iter(normalized.iter()), map_article_usage)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Substring fallback of [`Self::articles_using_candidates`].
    pub fn articles_using_candidates_like(
        &self,
        candidates: &[String],
    ) -> RepositoryResult<Vec<ArticleUsage>> {
        let mut normalized: Vec<String> = candidates
            .iter()
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .collect();
        normalized.sort();
        normalized.dedup();
        if normalized.is_empty() {
            return Ok(Vec::new());
        }
        let like_clauses = vec!["UPPER(p.part_number) LIKE ?"; normalized.len()].join(" OR ");
        let patterns: Vec<String> = normalized.iter().map(|c| format!("%{c}%")).collect();
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT a.id, a.article_number, a.title, bl.item_no, p.part_number, bl.qty, bl.revision
            FROM bom_lines bl
            JOIN parts p ON p.id = bl.part_id
            JOIN articles a ON a.id = bl.article_id
            WHERE ({like_clauses})
            ORDER BY a.article_number, bl.item_no, p.part_number
            "#
        ))?;
        let rows = stmt.query_map(rusqlite::params_from_iter(patterns.iter()), map_article_usage)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Revisions present for a part across all BOM lines, uppercased
    /// and deduplicated; empty revisions read as "".
    pub fn revisions_for_part(&self, part_id: i64) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT DISTINCT UPPER(COALESCE(TRIM(revision), '')) FROM bom_lines WHERE part_id=?1
            "#,
        )?;
        let rows = stmt.query_map(params![part_id], |row| row.get::<_, String>(0))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

fn map_bom_line(row: &rusqlite::Row<'_>) -> rusqlite::Result<BomLine> {
    Ok(BomLine {
        id: row.get(0)?,
        article_id: row.get(1)?,
        part_id: row.get(2)?,
        part_number: row.get(3)?,
        item_no: row.get(4)?,
        line_no: row.get(5)?,
        qty: parse_qty(row.get(6)?),
        unit: row.get(7)?,
        revision: row.get(8)?,
        description: row.get(9)?,
        material: row.get(10)?,
        finish: row.get(11)?,
        line_type: row.get(12)?,
        status: row.get(13)?,
        source_sheet: row.get(14)?,
        source_row_number: row.get(15)?,
    })
}

fn map_article_usage(row: &rusqlite::Row<'_>) -> rusqlite::Result<ArticleUsage> {
    Ok(ArticleUsage {
        article_id: row.get(0)?,
        article_number: row.get(1)?,
        title: row.get(2)?,
        item_no: row.get(3)?,
        part_number: row.get(4)?,
        qty: parse_qty(row.get(5)?),
        revision: row.get(6)?,
    })
}
