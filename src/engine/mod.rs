// ==========================================
// BOM Navigator - engine layer
// ==========================================
// Business rules: item numbering, tree construction, sub-assembly
// reference resolution, order explosion. No SQL in engines; the store
// is reached only through the BomSource seam.
// ==========================================

pub mod article_ref;
pub mod error;
pub mod explosion;
pub mod item_no;
pub mod tree;

pub use article_ref::{candidates, resolve_ref_map, ArticleRef, BomSource};
pub use error::{EngineError, EngineResult};
pub use explosion::ExplosionEngine;
pub use tree::TreeBuilder;
