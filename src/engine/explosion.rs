// ==========================================
// BOM Navigator - order explosion engine
// ==========================================
// Depth-first traversal from a selected tree node, carrying the
// running quantity product. Leaf parts accumulate into order lines
// keyed by (part number, revision), emitted in first-encounter order.
// Sub-assembly references that resolve to another indexed article are
// built into their own tree and traversed with the same running
// quantity.
// ==========================================
// A node with inline children is expanded through those children
// only; its cross-BOM reference is not expanded as well. The inline
// rows are the imported copy of the sub-BOM, expanding both would
// double count.
// ==========================================
// Pure over its inputs plus the read-only BomSource; each invocation
// owns its accumulator exclusively.
// ==========================================

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::domain::bom::{BomLine, BomTree, NodeId, OrderLine};
use crate::domain::types::{IncludeMode, NodeKind};
use crate::engine::article_ref::{resolve_ref_map, BomSource};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::tree::TreeBuilder;

// ==========================================
// Accumulator
// ==========================================

/// (part number, revision) keyed accumulation, first-encounter ordered.
#[derive(Default)]
struct Accumulator {
    lines: Vec<OrderLine>,
    index: HashMap<(String, String), usize>,
}

impl Accumulator {
    fn add(&mut self, line: &BomLine, qty: Decimal) {
        let part_number = line.part_number.trim().to_string();
        if part_number.is_empty() {
            debug!("skipped BOM line without part number during explosion");
            return;
        }
        let revision = line.normalized_revision();
        let key = (part_number.clone(), revision.clone());
        match self.index.get(&key) {
            Some(&idx) => self.lines[idx].qty += qty,
            None => {
                self.index.insert(key, self.lines.len());
                self.lines.push(OrderLine {
                    part_number,
                    revision,
                    qty,
                    part_id: Some(line.part_id),
                    source_article_id: line.article_id,
                    item_no: line.item_no.clone(),
                    description: line.description.clone(),
                    material: line.material.clone(),
                    finish: line.finish.clone(),
                });
            }
        }
    }

    fn into_lines(self) -> Vec<OrderLine> {
        self.lines
    }
}

// ==========================================
// ExplosionEngine
// ==========================================

/// Order explosion engine over a read-only BOM lookup.
pub struct ExplosionEngine<'s, S: BomSource + ?Sized> {
    source: &'s S,
    builder: TreeBuilder,
}

impl<'s, S: BomSource + ?Sized> ExplosionEngine<'s, S> {
    pub fn new(source: &'s S) -> Self {
        Self {
            source,
            builder: TreeBuilder::new(),
        }
    }

    /// Explode a selection into accumulated order lines.
    ///
    /// # Arguments
    /// - `tree`: the built BOM tree of the viewed article
    /// - `selection`: node to explode from (the root for whole-article
    ///   orders)
    /// - `mode`: what to emit, see [`IncludeMode`]
    /// - `multiplier`: positive quantity applied at the explosion root
    ///
    /// # Errors
    /// - [`EngineError::InvalidMultiplier`] for a non-positive multiplier
    /// - [`EngineError::InvalidMode`] for `SelectedOnly` on a non-leaf
    /// - [`EngineError::CircularReference`] when a reference re-enters
    ///   an article already on the traversal stack
    /// - [`EngineError::NotFound`] when a reference target vanished
    ///   from the index
    pub fn explode(
        &self,
        tree: &BomTree,
        selection: NodeId,
        mode: IncludeMode,
        multiplier: Decimal,
    ) -> EngineResult<Vec<OrderLine>> {
        if multiplier <= Decimal::ZERO {
            return Err(EngineError::InvalidMultiplier { multiplier });
        }

        let mut acc = Accumulator::default();
        // Articles currently being traversed; seeded with the viewed
        // article so self-references fail instead of recursing.
        let mut stack: Vec<i64> = vec![tree.article_id];

        match mode {
            IncludeMode::SelectedOnly => {
                let node = tree.node(selection);
                if node.kind != NodeKind::Part || !tree.is_leaf(selection) {
                    return Err(EngineError::InvalidMode {
                        mode,
                        selection: describe(tree, selection),
                        kind: node.kind,
                    });
                }
                if let Some(line) = &node.line {
                    acc.add(line, line.effective_qty() * multiplier);
                }
            }
            IncludeMode::PartsOnly => {
                if selection == tree.root() {
                    for &child in &tree.node(selection).children {
                        self.descend_parts(tree, child, multiplier, &mut stack, &mut acc)?;
                    }
                } else {
                    let node = tree.node(selection);
                    if let Some(line) = &node.line {
                        let amount = multiplier * line.effective_qty();
                        if !tree.is_leaf(selection) {
                            for &child in &node.children {
                                self.descend_parts(tree, child, amount, &mut stack, &mut acc)?;
                            }
                        } else if node.kind == NodeKind::AssemblyRef {
                            self.expand_ref(line, amount, &mut stack, &mut acc)?;
                        }
                        // A selected leaf part has nothing to descend
                        // into; SelectedOnly covers that case.
                    }
                }
            }
            IncludeMode::SubsPlusParts => {
                if selection == tree.root() {
                    for &child in &tree.node(selection).children {
                        self.descend_full(tree, child, multiplier, &mut stack, &mut acc)?;
                    }
                } else {
                    self.descend_full(tree, selection, multiplier, &mut stack, &mut acc)?;
                }
            }
        }

        let lines = acc.into_lines();
        debug!(
            article_number = %tree.article_number,
            mode = %mode,
            multiplier = %multiplier,
            order_lines = lines.len(),
            "explosion finished"
        );
        Ok(lines)
    }

    /// Transparent descent: emit leaf parts only, every node's own
    /// quantity multiplies everything beneath it.
    fn descend_parts(
        &self,
        tree: &BomTree,
        node_id: NodeId,
        incoming: Decimal,
        stack: &mut Vec<i64>,
        acc: &mut Accumulator,
    ) -> EngineResult<()> {
        let node = tree.node(node_id);
        let Some(line) = &node.line else {
            return Ok(());
        };
        let amount = incoming * line.effective_qty();

        if !tree.is_leaf(node_id) {
            for &child in &node.children {
                self.descend_parts(tree, child, amount, stack, acc)?;
            }
            return Ok(());
        }
        match node.kind {
            NodeKind::AssemblyRef => self.expand_ref(line, amount, stack, acc),
            _ => {
                acc.add(line, amount);
                Ok(())
            }
        }
    }

    /// Full descent: every traversed line is emitted at its running
    /// quantity, sub-assembly lines included; referenced BOMs still
    /// explode transparently.
    fn descend_full(
        &self,
        tree: &BomTree,
        node_id: NodeId,
        incoming: Decimal,
        stack: &mut Vec<i64>,
        acc: &mut Accumulator,
    ) -> EngineResult<()> {
        let node = tree.node(node_id);
        let Some(line) = &node.line else {
            return Ok(());
        };
        let amount = incoming * line.effective_qty();
        acc.add(line, amount);

        if !tree.is_leaf(node_id) {
            for &child in &node.children {
                self.descend_full(tree, child, amount, stack, acc)?;
            }
            return Ok(());
        }
        if node.kind == NodeKind::AssemblyRef {
            self.expand_ref(line, amount, stack, acc)?;
        }
        Ok(())
    }

    /// Expand a childless sub-assembly reference through the store:
    /// resolve the target article, build its tree, continue the same
    /// running-quantity traversal into it.
    fn expand_ref(
        &self,
        line: &BomLine,
        amount: Decimal,
        stack: &mut Vec<i64>,
        acc: &mut Accumulator,
    ) -> EngineResult<()> {
        let part_number = line.part_number.trim();
        let target = self
            .source
            .resolve_article_ref(part_number)?
            .ok_or_else(|| EngineError::NotFound {
                part_number: part_number.to_string(),
            })?;

        if stack.contains(&target.article_id) {
            return Err(EngineError::CircularReference {
                article_number: target.article_number,
            });
        }

        let lines = self.source.article_lines(target.article_id)?;
        if lines.is_empty() {
            warn!(
                article_number = %target.article_number,
                part_number = %part_number,
                "referenced sub-assembly has no BOM lines"
            );
            return Ok(());
        }
        let refs = resolve_ref_map(&lines, self.source)?;
        let subtree =
            self.builder
                .build(target.article_id, &target.article_number, &lines, &refs)?;

        stack.push(target.article_id);
        for &child in &subtree.node(subtree.root()).children {
            self.descend_parts(&subtree, child, amount, stack, acc)?;
        }
        stack.pop();
        Ok(())
    }
}

fn describe(tree: &BomTree, node_id: NodeId) -> String {
    let node = tree.node(node_id);
    match &node.line {
        Some(line) => line.part_number.clone(),
        None => format!("article {}", tree.article_number),
    }
}
