// ==========================================
// BOM Navigator - engine error types
// ==========================================
// Structured failures only: malformed hierarchies are reported to the
// caller, never silently repaired into a partial tree or order list.
// ==========================================

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::types::{IncludeMode, NodeKind};

/// Engine layer errors.
#[derive(Error, Debug)]
pub enum EngineError {
    // ===== Tree construction =====
    #[error("orphan BOM line: item {item_no} has no parent {parent_item_no}")]
    OrphanLine {
        item_no: String,
        parent_item_no: String,
    },

    #[error("cyclic item numbering: {item_no} would become its own ancestor")]
    Cycle { item_no: String },

    // ===== Order explosion =====
    #[error("circular sub-assembly reference: article {article_number} is already on the explosion stack")]
    CircularReference { article_number: String },

    #[error("sub-assembly reference target not found for part {part_number}")]
    NotFound { part_number: String },

    #[error("mode {mode} needs a leaf part, selection {selection} is a {kind}")]
    InvalidMode {
        mode: IncludeMode,
        selection: String,
        kind: NodeKind,
    },

    #[error("order multiplier must be positive, got {multiplier}")]
    InvalidMultiplier { multiplier: Decimal },

    // ===== Collaborator failures =====
    #[error(transparent)]
    Source(#[from] anyhow::Error),
}

/// Result type alias.
pub type EngineResult<T> = Result<T, EngineError>;
