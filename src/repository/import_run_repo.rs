// ==========================================
// ImportRunRepository - import run persistence
// ==========================================
// Records every index pass and its row-level issues. Driven by the
// external importer collaborator.
// ==========================================

use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::types::{IssueSeverity, RunStatus};
use crate::domain::{ImportIssue, ImportRun, ImportStats};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::parse_timestamp;

pub struct ImportRunRepository {
    conn: Arc<Mutex<Connection>>,
}

/// Context fields for one logged issue.
#[derive(Debug, Clone, Default)]
pub struct IssueContext {
    pub file_path: Option<String>,
    pub sheet_name: Option<String>,
    pub row_number: Option<i64>,
    pub raw_row: Option<serde_json::Value>,
}

impl ImportRunRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Open a new run in running state, returning its id.
    pub fn start(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO import_runs(status) VALUES (?1)",
            params![RunStatus::Running.to_string()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Close a run with its final status and counters.
    pub fn finish(
        &self,
        run_id: i64,
        status: RunStatus,
        stats: Option<ImportStats>,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = match stats {
            Some(stats) => conn.execute(
                r#"
                UPDATE import_runs SET
                    finished_at=CURRENT_TIMESTAMP, status=?1, files_scanned=?2,
                    boms_parsed=?3, lines_imported=?4, warnings_count=?5, errors_count=?6
                WHERE id=?7
                "#,
                params![
                    status.to_string(),
                    stats.files_scanned,
                    stats.boms_parsed,
                    stats.lines_imported,
                    stats.warnings_count,
                    stats.errors_count,
                    run_id,
                ],
            )?,
            None => conn.execute(
                "UPDATE import_runs SET finished_at=CURRENT_TIMESTAMP, status=?1 WHERE id=?2",
                params![status.to_string(), run_id],
            )?,
        };
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ImportRun".to_string(),
                id: run_id.to_string(),
            });
        }
        Ok(())
    }

    pub fn find_by_id(&self, run_id: i64) -> RepositoryResult<Option<ImportRun>> {
        let conn = self.get_conn()?;
        let run = conn
            .query_row(
                r#"
                SELECT id, started_at, finished_at, status, files_scanned, boms_parsed,
                       lines_imported, warnings_count, errors_count
                FROM import_runs WHERE id=?1
                "#,
                params![run_id],
                map_run,
            )
            .optional()?;
        Ok(run)
    }

    /// Most recently started run.
    pub fn latest(&self) -> RepositoryResult<Option<ImportRun>> {
        let conn = self.get_conn()?;
        let run = conn
            .query_row(
                r#"
                SELECT id, started_at, finished_at, status, files_scanned, boms_parsed,
                       lines_imported, warnings_count, errors_count
                FROM import_runs ORDER BY id DESC LIMIT 1
                "#,
                [],
                map_run,
            )
            .optional()?;
        Ok(run)
    }

    /// Log one row-level issue against a run.
    pub fn log_issue(
        &self,
        run_id: i64,
        severity: IssueSeverity,
        message: &str,
        context: IssueContext,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let raw_row_json = context
            .raw_row
            .map(|v| serde_json::to_string(&v))
            .transpose()
            .map_err(|e| RepositoryError::InternalError(e.to_string()))?;
        conn.execute(
            r#"
            INSERT INTO import_issues(
                import_run_id, severity, file_path, sheet_name, row_number, message, raw_row_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                run_id,
                severity.to_string(),
                context.file_path,
                context.sheet_name,
                context.row_number,
                message,
                raw_row_json,
            ],
        )?;
        Ok(())
    }

    pub fn issues_for_run(&self, run_id: i64) -> RepositoryResult<Vec<ImportIssue>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, import_run_id, severity, file_path, sheet_name, row_number, message,
                   raw_row_json
            FROM import_issues WHERE import_run_id=?1 ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            let severity: String = row.get(2)?;
            let raw_row_json: Option<String> = row.get(7)?;
            Ok(ImportIssue {
                id: row.get(0)?,
                import_run_id: row.get(1)?,
                severity: if severity == "error" {
                    IssueSeverity::Error
                } else {
                    IssueSeverity::Warning
                },
                file_path: row.get(3)?,
                sheet_name: row.get(4)?,
                row_number: row.get(5)?,
                message: row.get(6)?,
                raw_row: raw_row_json.and_then(|raw| serde_json::from_str(&raw).ok()),
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

fn map_run(row: &rusqlite::Row<'_>) -> rusqlite::Result<ImportRun> {
    let status: String = row.get(3)?;
    Ok(ImportRun {
        id: row.get(0)?,
        started_at: parse_timestamp(row.get(1)?),
        finished_at: parse_timestamp(row.get(2)?),
        status: status.parse().unwrap_or(RunStatus::Failed),
        stats: ImportStats {
            files_scanned: row.get(4)?,
            boms_parsed: row.get(5)?,
            lines_imported: row.get(6)?,
            warnings_count: row.get(7)?,
            errors_count: row.get(8)?,
        },
    })
}
