// ==========================================
// BOM Navigator - document entities
// ==========================================
// Documents are indexed files (PDF/STEP/DXF/...) linked to a part or
// an article by the external matcher collaborator. The store only
// records the link and its reason.
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::{DocType, LinkTarget};

/// One indexed document file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub linked_to_type: Option<LinkTarget>,
    pub linked_id: Option<i64>,
    pub doc_type: DocType,
    pub filename: String,
    pub path: String,
    pub extension: Option<String>,
    pub size_bytes: Option<i64>,
    pub modified_at: Option<DateTime<Utc>>,
    pub sha256: Option<String>,
    pub import_run_id: Option<i64>,
    /// Revision parsed from the filename, when the matcher found one.
    pub part_revision: Option<String>,
    /// Why the document is (un)linked, e.g. "matched_part_and_revision",
    /// "revision_mismatch", "no_part_token_in_filename".
    pub link_reason: Option<String>,
}

/// Upsert payload for one document; keyed by path.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub path: String,
    pub filename: String,
    pub extension: Option<String>,
    pub size_bytes: Option<i64>,
    pub modified_at: Option<DateTime<Utc>>,
    pub import_run_id: i64,
    pub linked_to_type: Option<LinkTarget>,
    pub linked_id: Option<i64>,
    pub doc_type: DocType,
    pub part_revision: Option<String>,
    pub link_reason: Option<String>,
}
