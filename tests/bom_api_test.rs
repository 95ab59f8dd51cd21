// ==========================================
// BOM API - end-to-end flow tests
// ==========================================
// Seeded store -> article search -> tree -> explosion -> cart ->
// export rows, the way the desktop shell drives the crate.
// ==========================================

use std::sync::Arc;

use bom_navigator::domain::types::{DocType, LinkTarget};
use bom_navigator::{
    ApiError, BomApi, BomStore, EngineError, IncludeMode, NewBomLine, NewDocument, NodeKind,
    OrderCart, RoundingPolicy,
};
use rust_decimal::Decimal;

// ==========================================
// Test helpers
// ==========================================

struct Fixture {
    api: BomApi,
    root_article_id: i64,
}

/// Article 1000 references sub-assembly 500 (qty 2) and part Q (qty 1);
/// article 500 holds part P (qty 3, rev A) with a linked drawing.
fn seed() -> Fixture {
    bom_navigator::logging::init_test();
    let store = Arc::new(BomStore::open_in_memory().unwrap());
    let run_id = store.import_runs.start().unwrap();

    let root = store
        .articles
        .upsert("1000", Some("Conveyor"), None, Some("BOM 1000.xlsx"))
        .unwrap();
    let sub = store.articles.upsert("500", Some("Drive unit"), None, None).unwrap();

    let asm_part = store.parts.upsert("ASM-00500", Some("Drive unit")).unwrap();
    let p = store.parts.upsert("20-10055", Some("Bracket")).unwrap();
    let q = store.parts.upsert("30-20044", Some("Cover")).unwrap();

    store
        .bom_lines
        .insert_many(&[
            line(root, asm_part, Some("1"), "2", None, run_id),
            line(root, q, Some("2"), "1", None, run_id),
            line(sub, p, Some("1"), "3", Some("A"), run_id),
        ])
        .unwrap();

    store
        .documents
        .upsert(&NewDocument {
            path: "/data/PDF/20-10055_REV_A.pdf".to_string(),
            filename: "20-10055_REV_A.pdf".to_string(),
            extension: Some(".pdf".to_string()),
            size_bytes: Some(2048),
            modified_at: None,
            import_run_id: run_id,
            linked_to_type: Some(LinkTarget::Part),
            linked_id: Some(p),
            doc_type: DocType::Pdf,
            part_revision: Some("A".to_string()),
            link_reason: Some("matched_part_and_revision".to_string()),
        })
        .unwrap();
    store
        .documents
        .upsert(&NewDocument {
            path: "/data/PDF/scan_without_token.pdf".to_string(),
            filename: "scan_without_token.pdf".to_string(),
            extension: Some(".pdf".to_string()),
            size_bytes: Some(100),
            modified_at: None,
            import_run_id: run_id,
            linked_to_type: None,
            linked_id: None,
            doc_type: DocType::Pdf,
            part_revision: None,
            link_reason: Some("no_part_token_in_filename".to_string()),
        })
        .unwrap();

    Fixture {
        api: BomApi::new(store),
        root_article_id: root,
    }
}

fn line(
    article_id: i64,
    part_id: i64,
    item_no: Option<&str>,
    qty: &str,
    revision: Option<&str>,
    run_id: i64,
) -> NewBomLine {
    NewBomLine {
        article_id,
        part_id,
        item_no: item_no.map(|s| s.to_string()),
        line_no: None,
        qty: Some(qty.parse().unwrap()),
        unit: None,
        revision: revision.map(|s| s.to_string()),
        description: None,
        material: None,
        finish: None,
        line_type: None,
        status: None,
        raw_columns: serde_json::json!({}),
        source_sheet: Some("BOM".to_string()),
        source_row_number: Some(2),
        import_run_id: run_id,
    }
}

// ==========================================
// Flows
// ==========================================

#[test]
fn test_search_then_view_tree() {
    let fixture = seed();

    let listing = fixture.api.list_articles("", 500, true).unwrap();
    assert_eq!(listing.len(), 2);

    // Searching by a child part description finds the parent article.
    let hits = fixture.api.list_articles("Bracket", 500, true).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].article_number, "500");

    let tree = fixture.api.article_tree(fixture.root_article_id).unwrap();
    assert_eq!(tree.len(), 3); // root + 2 lines
    let root = tree.node(tree.root());
    assert_eq!(root.kind, NodeKind::Article);

    let asm = tree.node(root.children[0]);
    assert_eq!(asm.kind, NodeKind::AssemblyRef);
    let q = tree.node(root.children[1]);
    assert_eq!(q.kind, NodeKind::Part);
}

#[test]
fn test_unknown_article_is_not_found() {
    let fixture = seed();
    assert!(matches!(
        fixture.api.article_tree(99999),
        Err(ApiError::NotFound { .. })
    ));
}

#[test]
fn test_explode_through_the_store() {
    let fixture = seed();
    let tree = fixture.api.article_tree(fixture.root_article_id).unwrap();

    let order = fixture
        .api
        .explode(&tree, tree.root(), IncludeMode::PartsOnly, Decimal::from(2))
        .unwrap();

    let parts: Vec<&str> = order.iter().map(|l| l.part_number.as_str()).collect();
    assert_eq!(parts, vec!["20-10055", "30-20044"]);
    assert_eq!(order[0].qty, Decimal::from(12)); // 2 x 2 x 3
    assert_eq!(order[0].revision, "A");
    assert_eq!(order[1].qty, Decimal::from(2));
}

#[test]
fn test_cart_accumulates_across_selections() {
    let fixture = seed();
    let tree = fixture.api.article_tree(fixture.root_article_id).unwrap();
    let mut cart = OrderCart::new();

    fixture
        .api
        .add_to_cart(&mut cart, &tree, tree.root(), IncludeMode::PartsOnly, Decimal::ONE)
        .unwrap();
    let q_node = tree.node(tree.root()).children[1];
    fixture
        .api
        .add_to_cart(&mut cart, &tree, q_node, IncludeMode::SelectedOnly, Decimal::from(5))
        .unwrap();

    assert_eq!(cart.len(), 2);
    assert_eq!(cart.lines()[0].part_number, "20-10055");
    assert_eq!(cart.lines()[0].qty, Decimal::from(6));
    assert_eq!(cart.lines()[1].part_number, "30-20044");
    assert_eq!(cart.lines()[1].qty, Decimal::from(6)); // 1 + 5
}

#[test]
fn test_order_rows_attach_documents_and_round() {
    let fixture = seed();
    let tree = fixture.api.article_tree(fixture.root_article_id).unwrap();
    let mut cart = OrderCart::new();
    fixture
        .api
        .add_to_cart(&mut cart, &tree, tree.root(), IncludeMode::PartsOnly, Decimal::ONE)
        .unwrap();

    let rows = fixture
        .api
        .order_rows(&cart, RoundingPolicy::default())
        .unwrap();
    assert_eq!(rows.len(), 2);

    let bracket = &rows[0];
    assert_eq!(bracket.part_number, "20-10055");
    assert_eq!(bracket.revision, "A");
    assert_eq!(bracket.documents, vec!["/data/PDF/20-10055_REV_A.pdf".to_string()]);

    let cover = &rows[1];
    assert!(cover.documents.is_empty());
}

#[test]
fn test_invalid_selection_surfaces_engine_error() {
    let fixture = seed();
    let tree = fixture.api.article_tree(fixture.root_article_id).unwrap();
    let asm = tree.node(tree.root()).children[0];

    let err = fixture
        .api
        .explode(&tree, asm, IncludeMode::SelectedOnly, Decimal::ONE)
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::Engine(EngineError::InvalidMode { .. })
    ));
}

#[test]
fn test_orphan_line_surfaces_through_the_api() {
    let store = Arc::new(BomStore::open_in_memory().unwrap());
    let run_id = store.import_runs.start().unwrap();
    let article = store.articles.upsert("1000", None, None, None).unwrap();
    let part = store.parts.upsert("P1", None).unwrap();
    store
        .bom_lines
        .insert(&line(article, part, Some("1.2.1"), "1", None, run_id))
        .unwrap();

    let api = BomApi::new(store);
    let err = api.article_tree(article).unwrap_err();
    assert!(matches!(
        err,
        ApiError::Engine(EngineError::OrphanLine { .. })
    ));
}

#[test]
fn test_part_detail_and_parents() {
    let fixture = seed();

    let detail = fixture.api.part_detail("20-10055").unwrap().unwrap();
    assert_eq!(detail.part.description.as_deref(), Some("Bracket"));
    assert_eq!(detail.usages.len(), 1);
    assert_eq!(detail.usages[0].article_number, "500");
    assert_eq!(detail.documents.len(), 1);

    assert!(fixture.api.part_detail("NO-SUCH").unwrap().is_none());

    // "ASM-00500" leads to article 500 being used inside article 1000.
    let parents = fixture.api.parent_articles("ASM-00500").unwrap();
    assert_eq!(parents.len(), 1);
    assert_eq!(parents[0].article_number, "1000");
}

#[test]
fn test_unlinked_documents_listing() {
    let fixture = seed();
    let unlinked = fixture.api.unlinked_documents(100).unwrap();
    assert_eq!(unlinked.len(), 1);
    assert_eq!(unlinked[0].filename, "scan_without_token.pdf");
}
