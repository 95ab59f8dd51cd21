// ==========================================
// BOM Navigator - API layer
// ==========================================
// Interfaces for the UI collaborator.
// ==========================================

pub mod bom_api;
pub mod error;

pub use bom_api::{BomApi, PartDetailView};
pub use error::{ApiError, ApiResult};
