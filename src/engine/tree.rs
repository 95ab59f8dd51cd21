// ==========================================
// BOM Navigator - BOM tree builder
// ==========================================
// Builds the hierarchical view of one article from its flat,
// parent-encoded BOM lines. Pure and deterministic: same lines in,
// same tree out. Rebuilt in full on every article view; no
// incremental update.
// ==========================================
// Orphans and cyclic numbering are structured failures, never
// silently repaired.
// ==========================================

use std::collections::HashMap;

use tracing::debug;

use crate::domain::bom::{BomLine, BomTree, NodeId};
use crate::domain::types::NodeKind;
use crate::engine::article_ref::ArticleRef;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::item_no;

/// BOM tree builder.
pub struct TreeBuilder;

impl TreeBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build the tree for one article.
    ///
    /// # Arguments
    /// - `article_id`, `article_number`: the root article
    /// - `lines`: the article's BOM lines in display order
    /// - `refs`: sub-assembly reference map (part number -> target),
    ///   precomputed via [`crate::engine::article_ref::resolve_ref_map`]
    ///
    /// # Linking
    /// Each line attaches under the node whose item number is its
    /// dotted parent prefix; unnumbered and top-level lines attach to
    /// the root. Duplicate item numbers are tolerated, the later line
    /// shadows the earlier one for subsequent parent lookups.
    ///
    /// # Errors
    /// - [`EngineError::OrphanLine`] when a line's parent token is not
    ///   present among already-built nodes
    /// - [`EngineError::Cycle`] when linking would make a node its own
    ///   ancestor
    pub fn build(
        &self,
        article_id: i64,
        article_number: &str,
        lines: &[BomLine],
        refs: &HashMap<String, ArticleRef>,
    ) -> EngineResult<BomTree> {
        let mut tree = BomTree::new(article_id, article_number);
        let mut nodes_by_item_no: HashMap<String, NodeId> = HashMap::new();

        for line in lines {
            let normalized = line.item_no.as_deref().and_then(item_no::normalize);

            let parent = match normalized.as_deref().and_then(item_no::parent_of) {
                None => tree.root(),
                Some(parent_token) => match nodes_by_item_no.get(parent_token) {
                    Some(&node) => node,
                    None => {
                        return Err(EngineError::OrphanLine {
                            item_no: normalized.clone().unwrap_or_default(),
                            parent_item_no: parent_token.to_string(),
                        });
                    }
                },
            };

            if let Some(token) = normalized.as_deref() {
                ensure_no_cycle(&tree, parent, token)?;
            }

            let (kind, ref_article_id) = match refs.get(line.part_number.trim()) {
                Some(target) => (NodeKind::AssemblyRef, Some(target.article_id)),
                None => (NodeKind::Part, None),
            };

            let node = tree.add_child(parent, kind, normalized.clone(), line.clone(), ref_article_id);
            if let Some(token) = normalized {
                nodes_by_item_no.insert(token, node);
            }
        }

        debug!(
            article_number = %article_number,
            lines = lines.len(),
            nodes = tree.len(),
            "BOM tree built"
        );
        Ok(tree)
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Refuse to attach `token` under a chain that already contains it.
///
/// Unreachable with well-formed dotted numbering (a parent token is
/// always strictly shorter), kept as a guard against malformed or
/// future numbering schemes.
fn ensure_no_cycle(tree: &BomTree, parent: NodeId, token: &str) -> EngineResult<()> {
    let mut current = Some(parent);
    while let Some(id) = current {
        let node = tree.node(id);
        if node.item_no.as_deref() == Some(token) {
            return Err(EngineError::Cycle {
                item_no: token.to_string(),
            });
        }
        current = node.parent;
    }
    Ok(())
}
