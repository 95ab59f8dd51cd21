// ==========================================
// BOM Navigator - core library
// ==========================================
// Offline article/BOM index: SQLite store, BOM tree construction,
// order explosion, order cart. The desktop shell, the spreadsheet
// importer and the document matcher are external collaborators built
// on top of this crate.
// ==========================================

// ==========================================
// Module declarations
// ==========================================

// Domain layer - entities and value types
pub mod domain;

// Repository layer - data access
pub mod repository;

// Engine layer - business rules
pub mod engine;

// Order layer - cart and export rows
pub mod order;

// Store configuration
pub mod config;

// Database infrastructure (connection init / PRAGMA / schema)
pub mod db;

// Logging
pub mod logging;

// API layer - UI-facing interfaces
pub mod api;

// ==========================================
// Core type re-exports
// ==========================================

// Domain types
pub use domain::types::{
    DocType, IncludeMode, IssueSeverity, LinkTarget, NodeKind, PartType, RunStatus,
};

// Domain entities
pub use domain::{
    Article, ArticleSummary, ArticleUsage, BomLine, BomTree, Document, ImportIssue, ImportRun,
    ImportStats, NewBomLine, NewDocument, NodeId, OrderLine, Part, PartUsage, TreeNode,
};

// Engines
pub use engine::{ArticleRef, BomSource, EngineError, EngineResult, ExplosionEngine, TreeBuilder};

// Order workflow
pub use order::{OrderCart, OrderRow, RoundingPolicy};

// Store
pub use config::StoreConfig;
pub use repository::{BomStore, RepositoryError, RepositoryResult};

// API
pub use api::{ApiError, ApiResult, BomApi, PartDetailView};

// ==========================================
// Constants
// ==========================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "BOM Navigator";
