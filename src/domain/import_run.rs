// ==========================================
// BOM Navigator - import run entities
// ==========================================
// Every (re)index pass is recorded as an import run with counters and
// row-level issues, so the UI can show what the last index did.
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::{IssueSeverity, RunStatus};

/// One recorded index pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRun {
    pub id: i64,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub status: RunStatus,
    pub stats: ImportStats,
}

/// Counters reported by the importer collaborator.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ImportStats {
    pub files_scanned: i64,
    pub boms_parsed: i64,
    pub lines_imported: i64,
    pub warnings_count: i64,
    pub errors_count: i64,
}

impl ImportStats {
    /// Final status for a finished run with these counters.
    pub fn final_status(&self) -> RunStatus {
        if self.warnings_count > 0 || self.errors_count > 0 {
            RunStatus::CompletedWithWarnings
        } else {
            RunStatus::Completed
        }
    }
}

/// One row-level problem logged during an import run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportIssue {
    pub id: i64,
    pub import_run_id: i64,
    pub severity: IssueSeverity,
    pub file_path: Option<String>,
    pub sheet_name: Option<String>,
    pub row_number: Option<i64>,
    pub message: String,
    pub raw_row: Option<serde_json::Value>,
}
