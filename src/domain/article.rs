// ==========================================
// BOM Navigator - article & part entities
// ==========================================
// An article is one imported BOM file's root; a part is one unique
// part number referenced by any BOM line.
// ==========================================

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::types::PartType;

/// One indexed article (the root of one imported BOM).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub article_number: String,
    pub title: Option<String>,
    pub source_bom_filename: Option<String>,
    pub source_bom_path: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Listing row for the article table: identity plus BOM line count,
/// as produced by the search query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub id: i64,
    pub article_number: String,
    pub title: Option<String>,
    pub bom_line_count: i64,
}

/// One unique part number across all indexed BOMs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    pub id: i64,
    pub part_number: String,
    pub description: Option<String>,
    pub part_type: Option<PartType>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Where-used row: one article's BOM line referencing a part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartUsage {
    pub article_number: String,
    pub title: Option<String>,
    pub qty: Option<Decimal>,
    pub revision: Option<String>,
    pub material: Option<String>,
}

/// Where-used row with article identity and line position, as returned
/// by the parent-article lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleUsage {
    pub article_id: i64,
    pub article_number: String,
    pub title: Option<String>,
    pub item_no: Option<String>,
    pub part_number: String,
    pub qty: Option<Decimal>,
    pub revision: Option<String>,
}
