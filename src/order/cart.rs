// ==========================================
// BOM Navigator - order cart
// ==========================================
// Accumulation stage of the order-export workflow: successive
// explosions merge into one keyed cart. Quantities stay exact inside
// the cart; rounding happens only when rows are materialized for
// export under a caller-supplied policy.
// ==========================================

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::OrderLine;

// ==========================================
// RoundingPolicy
// ==========================================

/// Presentation-time rounding for accumulated quantities.
#[derive(Debug, Clone, Copy)]
pub struct RoundingPolicy {
    /// Decimal places kept on export.
    pub decimals: u32,
    pub strategy: RoundingStrategy,
}

impl RoundingPolicy {
    pub fn new(decimals: u32, strategy: RoundingStrategy) -> Self {
        Self { decimals, strategy }
    }

    /// Apply the policy to one quantity.
    pub fn round(&self, qty: Decimal) -> Decimal {
        qty.round_dp_with_strategy(self.decimals, self.strategy)
    }
}

impl Default for RoundingPolicy {
    fn default() -> Self {
        Self {
            decimals: 3,
            strategy: RoundingStrategy::MidpointAwayFromZero,
        }
    }
}

// ==========================================
// OrderCart
// ==========================================

/// Keyed accumulation of order lines across explosions.
///
/// First-encounter order is preserved across merges; repeated keys
/// only add quantity.
#[derive(Debug, Default, Clone)]
pub struct OrderCart {
    lines: Vec<OrderLine>,
    index: HashMap<(String, String), usize>,
}

impl OrderCart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one explosion result into the cart.
    ///
    /// Returns the number of lines processed.
    pub fn merge(&mut self, lines: Vec<OrderLine>) -> usize {
        let count = lines.len();
        for line in lines {
            match self.index.get(&line.key()) {
                Some(&idx) => self.lines[idx].qty += line.qty,
                None => {
                    self.index.insert(line.key(), self.lines.len());
                    self.lines.push(line);
                }
            }
        }
        count
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    /// Remove one keyed line. Returns whether it was present.
    pub fn remove(&mut self, part_number: &str, revision: &str) -> bool {
        let key = (part_number.to_string(), revision.to_string());
        let Some(idx) = self.index.remove(&key) else {
            return false;
        };
        self.lines.remove(idx);
        for slot in self.index.values_mut() {
            if *slot > idx {
                *slot -= 1;
            }
        }
        true
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.index.clear();
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// ==========================================
// OrderRow
// ==========================================

/// One export-ready row: cart line with rounded quantity and the
/// document bundle paths for the referenced part + revision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRow {
    pub part_number: String,
    pub revision: String,
    pub qty: Decimal,
    pub description: Option<String>,
    pub material: Option<String>,
    pub finish: Option<String>,
    pub documents: Vec<String>,
}

impl OrderRow {
    /// Materialize a cart line under a rounding policy, without
    /// documents attached yet.
    pub fn from_line(line: &OrderLine, policy: RoundingPolicy) -> Self {
        Self {
            part_number: line.part_number.clone(),
            revision: line.revision.clone(),
            qty: policy.round(line.qty),
            description: line.description.clone(),
            material: line.material.clone(),
            finish: line.finish.clone(),
            documents: Vec::new(),
        }
    }
}
