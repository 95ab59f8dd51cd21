// ==========================================
// BOM Navigator - BOM API
// ==========================================
// Orchestration surface for the UI collaborator: article search,
// tree construction, order explosion, cart handling, part details.
// Thin wiring only; rules live in the engines.
// ==========================================

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::types::{IncludeMode, LinkTarget};
use crate::domain::{ArticleSummary, ArticleUsage, BomTree, Document, NodeId, OrderLine, Part, PartUsage};
use crate::engine::article_ref::{candidates, resolve_ref_map, BomSource};
use crate::engine::{ExplosionEngine, TreeBuilder};
use crate::order::{OrderCart, OrderRow, RoundingPolicy};
use crate::repository::BomStore;

// ==========================================
// PartDetailView
// ==========================================

/// Part detail for the side panel: master data, where-used rows,
/// linked documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartDetailView {
    pub part: Part,
    pub usages: Vec<PartUsage>,
    pub documents: Vec<Document>,
}

// ==========================================
// BomApi
// ==========================================

pub struct BomApi {
    store: Arc<BomStore>,
    builder: TreeBuilder,
}

impl BomApi {
    pub fn new(store: Arc<BomStore>) -> Self {
        Self {
            store,
            builder: TreeBuilder::new(),
        }
    }

    /// Article listing for the search box.
    pub fn list_articles(
        &self,
        query: &str,
        limit: u32,
        search_in_children: bool,
    ) -> ApiResult<Vec<ArticleSummary>> {
        Ok(self.store.articles.list(query, limit, search_in_children)?)
    }

    /// Build the display tree for one article.
    pub fn article_tree(&self, article_id: i64) -> ApiResult<BomTree> {
        let article = self
            .store
            .articles
            .find_by_id(article_id)?
            .ok_or_else(|| ApiError::NotFound {
                entity: "Article".to_string(),
                id: article_id.to_string(),
            })?;
        let lines = self.store.ordered_article_lines(article_id)?;
        let refs = resolve_ref_map(&lines, self.store.as_ref())
            .map_err(crate::engine::EngineError::from)?;
        let tree = self
            .builder
            .build(article.id, &article.article_number, &lines, &refs)?;
        debug!(
            article_number = %article.article_number,
            nodes = tree.len(),
            "article tree built"
        );
        Ok(tree)
    }

    /// Explode a tree selection into order lines.
    pub fn explode(
        &self,
        tree: &BomTree,
        selection: NodeId,
        mode: IncludeMode,
        multiplier: Decimal,
    ) -> ApiResult<Vec<OrderLine>> {
        let engine = ExplosionEngine::new(self.store.as_ref());
        Ok(engine.explode(tree, selection, mode, multiplier)?)
    }

    /// Explode a selection and merge the result into a cart.
    ///
    /// Returns the number of order lines produced by this explosion.
    pub fn add_to_cart(
        &self,
        cart: &mut OrderCart,
        tree: &BomTree,
        selection: NodeId,
        mode: IncludeMode,
        multiplier: Decimal,
    ) -> ApiResult<usize> {
        let lines = self.explode(tree, selection, mode, multiplier)?;
        let added = cart.merge(lines);
        info!(
            article_number = %tree.article_number,
            mode = %mode,
            added,
            cart_size = cart.len(),
            "order cart updated"
        );
        Ok(added)
    }

    /// Materialize the cart for export: rounded quantities plus the
    /// document bundle paths per part + revision.
    pub fn order_rows(&self, cart: &OrderCart, policy: RoundingPolicy) -> ApiResult<Vec<OrderRow>> {
        let mut rows = Vec::with_capacity(cart.len());
        for line in cart.lines() {
            let mut row = OrderRow::from_line(line, policy);
            if let Some(part_id) = line.part_id {
                let revision = (!line.revision.is_empty()).then_some(line.revision.as_str());
                row.documents = self
                    .store
                    .documents
                    .for_part_revision(part_id, revision)?
                    .into_iter()
                    .map(|doc| doc.path)
                    .collect();
            }
            rows.push(row);
        }
        Ok(rows)
    }

    /// Part detail with where-used rows and linked documents.
    pub fn part_detail(&self, part_number: &str) -> ApiResult<Option<PartDetailView>> {
        let Some(part) = self.store.parts.find_by_number(part_number)? else {
            return Ok(None);
        };
        let usages = self.store.parts.usages(part.id)?;
        let documents = self.store.documents.for_link(LinkTarget::Part, part.id)?;
        Ok(Some(PartDetailView {
            part,
            usages,
            documents,
        }))
    }

    /// Articles whose BOM references a part, matched through the
    /// article-number candidate ladder; exact matches first, substring
    /// fallback when nothing matches exactly.
    pub fn parent_articles(&self, part_number: &str) -> ApiResult<Vec<ArticleUsage>> {
        let cands = candidates(part_number);
        let exact = self.store.bom_lines.articles_using_candidates(&cands)?;
        if !exact.is_empty() {
            return Ok(exact);
        }
        Ok(self.store.bom_lines.articles_using_candidates_like(&cands)?)
    }

    /// Documents no matcher could link.
    pub fn unlinked_documents(&self, limit: u32) -> ApiResult<Vec<Document>> {
        Ok(self.store.documents.unlinked(limit)?)
    }
}
