// ==========================================
// BOM Navigator - repository layer
// ==========================================
// Data access only, no business rules. All repositories share one
// Arc<Mutex<Connection>>; SQLite serializes writers, readers wait on
// busy_timeout.
// ==========================================

pub mod article_repo;
pub mod bom_line_repo;
pub mod document_repo;
pub mod error;
pub mod import_run_repo;
pub mod part_repo;
pub mod store;

pub use article_repo::ArticleRepository;
pub use bom_line_repo::BomLineRepository;
pub use document_repo::DocumentRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use import_run_repo::ImportRunRepository;
pub use part_repo::PartRepository;
pub use store::BomStore;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use tracing::warn;

/// Parse a stored timestamp.
///
/// Accepts RFC 3339 (what this code writes) and SQLite's
/// CURRENT_TIMESTAMP format (what column defaults write).
pub(crate) fn parse_timestamp(value: Option<String>) -> Option<DateTime<Utc>> {
    let raw = value?;
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Parse a stored decimal quantity; unparseable text reads as None.
pub(crate) fn parse_qty(value: Option<String>) -> Option<Decimal> {
    let raw = value?;
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<Decimal>() {
        Ok(qty) => Some(qty),
        Err(_) => {
            warn!(raw = %raw, "unparseable qty in bom_lines, treated as missing");
            None
        }
    }
}

/// Decimal quantity to its stored text form.
pub(crate) fn qty_to_text(qty: Option<Decimal>) -> Option<String> {
    qty.map(|q| q.to_string())
}
