// ==========================================
// BOM Navigator - order layer
// ==========================================
// Cart accumulation and export-row materialization for the
// order-export workflow.
// ==========================================

pub mod cart;

pub use cart::{OrderCart, OrderRow, RoundingPolicy};
