// ==========================================
// ArticleRepository - article persistence
// ==========================================
// Manages the articles table. Upserts are keyed by article number;
// reimporting the same BOM file updates the row in place.
// ==========================================

use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::{Article, ArticleSummary};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::parse_timestamp;

pub struct ArticleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ArticleRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Insert or update an article by number, returning its id.
    pub fn upsert(
        &self,
        article_number: &str,
        title: Option<&str>,
        source_bom_path: Option<&str>,
        source_bom_filename: Option<&str>,
    ) -> RepositoryResult<i64> {
        let number = article_number.trim();
        if number.is_empty() {
            return Err(RepositoryError::FieldValueError {
                field: "article_number".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO articles(article_number, title, source_bom_filename, source_bom_path, updated_at)
            VALUES (?1, ?2, ?3, ?4, CURRENT_TIMESTAMP)
            ON CONFLICT(article_number) DO UPDATE SET
                title=excluded.title,
                source_bom_filename=excluded.source_bom_filename,
                source_bom_path=excluded.source_bom_path,
                updated_at=CURRENT_TIMESTAMP
            "#,
            params![number, title, source_bom_filename, source_bom_path],
        )?;
        let id: i64 = conn.query_row(
            "SELECT id FROM articles WHERE article_number=?1",
            params![number],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    pub fn find_by_id(&self, article_id: i64) -> RepositoryResult<Option<Article>> {
        let conn = self.get_conn()?;
        let article = conn
            .query_row(
                r#"
                SELECT id, article_number, title, source_bom_filename, source_bom_path,
                       created_at, updated_at
                FROM articles WHERE id=?1
                "#,
                params![article_id],
                map_article,
            )
            .optional()?;
        Ok(article)
    }

    pub fn find_by_number(&self, article_number: &str) -> RepositoryResult<Option<Article>> {
        let conn = self.get_conn()?;
        let article = conn
            .query_row(
                r#"
                SELECT id, article_number, title, source_bom_filename, source_bom_path,
                       created_at, updated_at
                FROM articles WHERE article_number=?1
                "#,
                params![article_number.trim()],
                map_article,
            )
            .optional()?;
        Ok(article)
    }

    /// Batch id lookup by article number; missing numbers are absent
    /// from the result.
    pub fn ids_by_numbers(&self, article_numbers: &[String]) -> RepositoryResult<HashMap<String, i64>> {
        let normalized: Vec<String> = article_numbers
            .iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        if normalized.is_empty() {
            return Ok(HashMap::new());
        }
        let placeholders = vec!["?"; normalized.len()].join(",");
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT id, article_number FROM articles WHERE article_number IN ({placeholders})"
        ))?;
        let rows = stmt.query_map(rusqlite::params_from_iter(normalized.iter()), |row| {
            Ok((row.get::<_, String>(1)?, row.get::<_, i64>(0)?))
        })?;
        let mut map = HashMap::new();
        for row in rows {
            let (number, id) = row?;
            map.insert(number, id);
        }
        Ok(map)
    }

    /// Article listing with BOM line counts.
    ///
    /// With a non-blank query, matches article number/title; with
    /// `search_in_children`, child part numbers and descriptions match
    /// as well. Ordered by article number.
    pub fn list(
        &self,
        query: &str,
        limit: u32,
        search_in_children: bool,
    ) -> RepositoryResult<Vec<ArticleSummary>> {
        let conn = self.get_conn()?;
        let term = query.trim();
        let mut out = Vec::new();
        if term.is_empty() {
            let mut stmt = conn.prepare(
                r#"
                SELECT a.id, a.article_number, a.title, COUNT(bl.id) AS bom_line_count
                FROM articles a
                LEFT JOIN bom_lines bl ON bl.article_id = a.id
                GROUP BY a.id, a.article_number, a.title
                ORDER BY a.article_number
                LIMIT ?1
                "#,
            )?;
            let rows = stmt.query_map(params![limit], map_summary)?;
            for row in rows {
                out.push(row?);
            }
            return Ok(out);
        }

        let like = format!("%{term}%");
        if search_in_children {
            let mut stmt = conn.prepare(
                r#"
                SELECT a.id, a.article_number, a.title, COUNT(bl.id) AS bom_line_count
                FROM articles a
                LEFT JOIN bom_lines bl ON bl.article_id = a.id
                LEFT JOIN parts p ON p.id = bl.part_id
                WHERE (a.article_number LIKE ?1
                    OR COALESCE(a.title, '') LIKE ?1
                    OR COALESCE(p.part_number, '') LIKE ?1
                    OR COALESCE(p.description, '') LIKE ?1)
                GROUP BY a.id, a.article_number, a.title
                ORDER BY a.article_number
                LIMIT ?2
                "#,
            )?;
            let rows = stmt.query_map(params![like, limit], map_summary)?;
            for row in rows {
                out.push(row?);
            }
        } else {
            let mut stmt = conn.prepare(
                r#"
                SELECT a.id, a.article_number, a.title, COUNT(bl.id) AS bom_line_count
                FROM articles a
                LEFT JOIN bom_lines bl ON bl.article_id = a.id
                WHERE (a.article_number LIKE ?1 OR COALESCE(a.title, '') LIKE ?1)
                GROUP BY a.id, a.article_number, a.title
                ORDER BY a.article_number
                LIMIT ?2
                "#,
            )?;
            let rows = stmt.query_map(params![like, limit], map_summary)?;
            for row in rows {
                out.push(row?);
            }
        }
        Ok(out)
    }

    /// Delete an article together with its BOM lines and
    /// article-linked documents. Used when the source BOM file
    /// disappeared from the archive.
    pub fn delete(&self, article_id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        tx.execute("DELETE FROM bom_lines WHERE article_id=?1", params![article_id])?;
        tx.execute(
            "DELETE FROM documents WHERE linked_to_type='article' AND linked_id=?1",
            params![article_id],
        )?;
        tx.execute("DELETE FROM articles WHERE id=?1", params![article_id])?;
        tx.commit()?;
        Ok(())
    }
}

fn map_article(row: &rusqlite::Row<'_>) -> rusqlite::Result<Article> {
    Ok(Article {
        id: row.get(0)?,
        article_number: row.get(1)?,
        title: row.get(2)?,
        source_bom_filename: row.get(3)?,
        source_bom_path: row.get(4)?,
        created_at: parse_timestamp(row.get(5)?),
        updated_at: parse_timestamp(row.get(6)?),
    })
}

fn map_summary(row: &rusqlite::Row<'_>) -> rusqlite::Result<ArticleSummary> {
    Ok(ArticleSummary {
        id: row.get(0)?,
        article_number: row.get(1)?,
        title: row.get(2)?,
        bom_line_count: row.get(3)?,
    })
}
