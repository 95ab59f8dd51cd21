// ==========================================
// BOM Navigator - BOM lines, tree, order lines
// ==========================================
// BomLine is one stored row of an imported BOM. BomTree is the
// arena-backed hierarchical view of one article's lines; it is built
// fresh per article view and never mutates the source lines.
// ==========================================

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::types::NodeKind;

// ==========================================
// BomLine
// ==========================================

/// One row of an imported bill of materials, joined with its part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BomLine {
    pub id: i64,
    pub article_id: i64,
    pub part_id: i64,
    pub part_number: String,
    /// Dotted hierarchical position token ("1", "1.1", "1.1.2").
    pub item_no: Option<String>,
    pub line_no: Option<i64>,
    /// Quantity per one unit of the immediate parent; None reads as 1.
    pub qty: Option<Decimal>,
    pub unit: Option<String>,
    pub revision: Option<String>,
    pub description: Option<String>,
    pub material: Option<String>,
    pub finish: Option<String>,
    pub line_type: Option<String>,
    /// Approval state; display coloring only, never used in explosion.
    pub status: Option<String>,
    pub source_sheet: Option<String>,
    pub source_row_number: Option<i64>,
}

impl BomLine {
    /// Quantity with the missing-value default applied.
    pub fn effective_qty(&self) -> Decimal {
        self.qty.unwrap_or(Decimal::ONE)
    }

    /// Revision normalized for accumulation keys: trimmed, uppercased,
    /// empty string when absent.
    pub fn normalized_revision(&self) -> String {
        self.revision
            .as_deref()
            .map(|r| r.trim().to_uppercase())
            .unwrap_or_default()
    }
}

/// Insert payload for one BOM line; ids are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewBomLine {
    pub article_id: i64,
    pub part_id: i64,
    pub item_no: Option<String>,
    pub line_no: Option<i64>,
    pub qty: Option<Decimal>,
    pub unit: Option<String>,
    pub revision: Option<String>,
    pub description: Option<String>,
    pub material: Option<String>,
    pub finish: Option<String>,
    pub line_type: Option<String>,
    pub status: Option<String>,
    /// Unmapped spreadsheet columns, kept verbatim.
    pub raw_columns: serde_json::Value,
    pub source_sheet: Option<String>,
    pub source_row_number: Option<i64>,
    pub import_run_id: i64,
}

// ==========================================
// BomTree
// ==========================================

/// Index of a node inside its owning [`BomTree`].
pub type NodeId = usize;

/// One node of a built BOM tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    /// Item number of the parent node; None for the article root.
    pub parent_item_no: Option<String>,
    pub kind: NodeKind,
    /// Normalized item number; None for the root and unnumbered lines.
    pub item_no: Option<String>,
    /// Backing BOM line; None for the article root.
    pub line: Option<BomLine>,
    /// Referenced article id when `kind` is [`NodeKind::AssemblyRef`].
    pub ref_article_id: Option<i64>,
    /// Children in original input order.
    pub children: Vec<NodeId>,
}

/// Hierarchical view of one article's BOM lines.
///
/// Node 0 is always the article root. Nodes appear in line input
/// order after the root, which is also the display order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BomTree {
    pub article_id: i64,
    pub article_number: String,
    nodes: Vec<TreeNode>,
}

impl BomTree {
    pub(crate) fn new(article_id: i64, article_number: &str) -> Self {
        let root = TreeNode {
            id: 0,
            parent: None,
            parent_item_no: None,
            kind: NodeKind::Article,
            item_no: None,
            line: None,
            ref_article_id: Some(article_id),
            children: Vec::new(),
        };
        Self {
            article_id,
            article_number: article_number.to_string(),
            nodes: vec![root],
        }
    }

    pub(crate) fn add_child(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        item_no: Option<String>,
        line: BomLine,
        ref_article_id: Option<i64>,
    ) -> NodeId {
        let id = self.nodes.len();
        let parent_item_no = self.nodes[parent].item_no.clone();
        self.nodes.push(TreeNode {
            id,
            parent: Some(parent),
            parent_item_no,
            kind,
            item_no,
            line: Some(line),
            ref_article_id,
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        id
    }

    pub fn root(&self) -> NodeId {
        0
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }

    /// Total node count, root included. Always at least 1.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &TreeNode> {
        self.nodes[id].children.iter().map(|&c| &self.nodes[c])
    }

    /// A node with no children in this tree.
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes[id].children.is_empty()
    }

    /// All nodes in display order, root first.
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter()
    }

    /// Walk ancestors from `id` towards the root, `id` excluded.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = &TreeNode> {
        std::iter::successors(self.nodes[id].parent.map(|p| &self.nodes[p]), |node| {
            node.parent.map(|p| &self.nodes[p])
        })
    }

    /// Find the line node best matching a part number search term:
    /// exact match first, then prefix, then substring, each in display
    /// order. Case-insensitive.
    pub fn find_part(&self, term: &str) -> Option<NodeId> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return None;
        }
        let part_numbers: Vec<(NodeId, String)> = self
            .nodes
            .iter()
            .skip(1)
            .filter_map(|n| {
                n.line
                    .as_ref()
                    .map(|l| (n.id, l.part_number.trim().to_lowercase()))
            })
            .collect();

        part_numbers
            .iter()
            .find(|(_, pn)| *pn == term)
            .or_else(|| part_numbers.iter().find(|(_, pn)| pn.starts_with(&term)))
            .or_else(|| part_numbers.iter().find(|(_, pn)| pn.contains(&term)))
            .map(|(id, _)| *id)
    }
}

// ==========================================
// OrderLine
// ==========================================

/// One accumulated explosion result row.
///
/// Keyed by (part_number, revision); `qty` is the exact sum over every
/// traversal path that reached this part. Display fields come from the
/// first encountered line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub part_number: String,
    /// Normalized revision ("" when the line carries none).
    pub revision: String,
    pub qty: Decimal,
    pub part_id: Option<i64>,
    /// Article whose BOM contributed the first encounter.
    pub source_article_id: i64,
    pub item_no: Option<String>,
    pub description: Option<String>,
    pub material: Option<String>,
    pub finish: Option<String>,
}

impl OrderLine {
    /// Accumulation key: part number plus normalized revision.
    pub fn key(&self) -> (String, String) {
        (self.part_number.clone(), self.revision.clone())
    }
}
