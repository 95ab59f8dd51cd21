// ==========================================
// BOM Navigator - domain layer
// ==========================================
// Entities and value types. No SQL, no I/O.
// ==========================================

pub mod article;
pub mod bom;
pub mod document;
pub mod import_run;
pub mod types;

pub use article::{Article, ArticleSummary, ArticleUsage, Part, PartUsage};
pub use bom::{BomLine, BomTree, NewBomLine, NodeId, OrderLine, TreeNode};
pub use document::{Document, NewDocument};
pub use import_run::{ImportIssue, ImportRun, ImportStats};
pub use types::{DocType, IncludeMode, IssueSeverity, LinkTarget, NodeKind, PartType, RunStatus};
