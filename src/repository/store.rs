// ==========================================
// BomStore - repository bundle over one database
// ==========================================
// Opens the index database, creates the schema, and hands out the
// repositories on a shared connection. Also the crate's BomSource:
// the read-only lookup the explosion engine resolves sub-assembly
// references through.
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::config::StoreConfig;
use crate::db::{configure_sqlite_connection, init_schema, open_sqlite_connection};
use crate::domain::BomLine;
use crate::engine::article_ref::{candidates, ArticleRef, BomSource};
use crate::engine::item_no;
use crate::repository::article_repo::ArticleRepository;
use crate::repository::bom_line_repo::BomLineRepository;
use crate::repository::document_repo::DocumentRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::import_run_repo::ImportRunRepository;
use crate::repository::part_repo::PartRepository;

pub struct BomStore {
    pub articles: ArticleRepository,
    pub parts: PartRepository,
    pub bom_lines: BomLineRepository,
    pub documents: DocumentRepository,
    pub import_runs: ImportRunRepository,
}

impl BomStore {
    /// Open (creating if necessary) the index database at the
    /// configured path.
    pub fn open(config: &StoreConfig) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(&config.db_path)
            .map_err(|e| RepositoryError::ConnectionError(e.to_string()))?;
        init_schema(&conn)?;
        info!(db_path = %config.db_path, "index database opened");
        Ok(Self::from_raw_connection(conn))
    }

    /// In-memory store, for tests and scratch sessions.
    pub fn open_in_memory() -> RepositoryResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| RepositoryError::ConnectionError(e.to_string()))?;
        configure_sqlite_connection(&conn)?;
        init_schema(&conn)?;
        Ok(Self::from_raw_connection(conn))
    }

    fn from_raw_connection(conn: Connection) -> Self {
        let conn = Arc::new(Mutex::new(conn));
        Self {
            articles: ArticleRepository::from_connection(Arc::clone(&conn)),
            parts: PartRepository::from_connection(Arc::clone(&conn)),
            bom_lines: BomLineRepository::from_connection(Arc::clone(&conn)),
            documents: DocumentRepository::from_connection(Arc::clone(&conn)),
            import_runs: ImportRunRepository::from_connection(conn),
        }
    }

    /// An article's BOM lines in display order.
    pub fn ordered_article_lines(&self, article_id: i64) -> RepositoryResult<Vec<BomLine>> {
        let mut lines = self.bom_lines.lines_for_article(article_id)?;
        item_no::sort_lines(&mut lines);
        Ok(lines)
    }
}

impl BomSource for BomStore {
    fn resolve_article_ref(&self, part_number: &str) -> anyhow::Result<Option<ArticleRef>> {
        for candidate in candidates(part_number) {
            if let Some(article) = self.articles.find_by_number(&candidate)? {
                return Ok(Some(ArticleRef {
                    article_id: article.id,
                    article_number: article.article_number,
                }));
            }
        }
        Ok(None)
    }

    fn article_lines(&self, article_id: i64) -> anyhow::Result<Vec<BomLine>> {
        Ok(self.ordered_article_lines(article_id)?)
    }
}
