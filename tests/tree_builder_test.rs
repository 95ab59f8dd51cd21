// ==========================================
// BOM tree builder - contract tests
// ==========================================
// Construction of the hierarchical view from flat, parent-encoded
// lines: node counts, edge mirroring, orphan and reference handling.
// ==========================================

use std::collections::HashMap;

use bom_navigator::engine::article_ref::ArticleRef;
use bom_navigator::{BomLine, EngineError, NodeKind, TreeBuilder};
use rust_decimal::Decimal;

// ==========================================
// Test helpers
// ==========================================

fn bom_line(item_no: Option<&str>, part_number: &str, qty: i64) -> BomLine {
    BomLine {
        id: 0,
        article_id: 1,
        part_id: 1,
        part_number: part_number.to_string(),
        item_no: item_no.map(|s| s.to_string()),
        line_no: None,
        qty: Some(Decimal::from(qty)),
        unit: None,
        revision: None,
        description: None,
        material: None,
        finish: None,
        line_type: None,
        status: None,
        source_sheet: Some("BOM".to_string()),
        source_row_number: Some(2),
    }
}

fn no_refs() -> HashMap<String, ArticleRef> {
    HashMap::new()
}

// ==========================================
// Construction
// ==========================================

#[test]
fn test_node_count_is_line_count_plus_root() {
    let lines = vec![
        bom_line(Some("1"), "A", 1),
        bom_line(Some("1.1"), "B", 2),
        bom_line(Some("1.2"), "C", 1),
        bom_line(Some("2"), "D", 4),
        bom_line(None, "E", 1),
    ];
    let tree = TreeBuilder::new().build(7, "1000", &lines, &no_refs()).unwrap();
    assert_eq!(tree.len(), lines.len() + 1);
    assert_eq!(tree.article_id, 7);
    assert_eq!(tree.article_number, "1000");
}

#[test]
fn test_edges_mirror_the_numbering() {
    let lines = vec![
        bom_line(Some("1"), "A", 1),
        bom_line(Some("1.1"), "B", 2),
        bom_line(Some("1.1.1"), "C", 3),
        bom_line(Some("1.2"), "D", 1),
        bom_line(Some("2"), "E", 1),
    ];
    let tree = TreeBuilder::new().build(7, "1000", &lines, &no_refs()).unwrap();

    let root = tree.node(tree.root());
    assert_eq!(root.kind, NodeKind::Article);
    assert_eq!(root.children.len(), 2);

    let a = tree.node(root.children[0]);
    assert_eq!(a.item_no.as_deref(), Some("1"));
    assert_eq!(a.children.len(), 2);

    let b = tree.node(a.children[0]);
    assert_eq!(b.parent_item_no.as_deref(), Some("1"));
    let c = tree.node(b.children[0]);
    assert_eq!(c.parent_item_no.as_deref(), Some("1.1"));
    assert!(tree.is_leaf(c.id));

    // Ancestor chain from the deepest node walks back to the root.
    let chain: Vec<Option<&str>> = tree.ancestors(c.id).map(|n| n.item_no.as_deref()).collect();
    assert_eq!(chain, vec![Some("1.1"), Some("1"), None]);
}

#[test]
fn test_insertion_order_is_preserved() {
    let lines = vec![
        bom_line(Some("1"), "A", 1),
        bom_line(Some("1.2"), "LATER", 1),
        bom_line(Some("1.1"), "EARLIER", 1),
    ];
    let tree = TreeBuilder::new().build(7, "1000", &lines, &no_refs()).unwrap();
    let a = tree.node(tree.node(tree.root()).children[0]);
    let children: Vec<&str> = a
        .children
        .iter()
        .map(|&c| tree.node(c).line.as_ref().unwrap().part_number.as_str())
        .collect();
    // Input order wins, not numeric item order.
    assert_eq!(children, vec!["LATER", "EARLIER"]);
}

#[test]
fn test_messy_item_numbers_are_normalized() {
    let lines = vec![
        bom_line(Some(" 1 "), "A", 1),
        bom_line(Some("1 . 1"), "B", 1),
        bom_line(Some("1..1..2"), "C", 1),
    ];
    let tree = TreeBuilder::new().build(7, "1000", &lines, &no_refs()).unwrap();
    let a = tree.node(tree.node(tree.root()).children[0]);
    assert_eq!(a.item_no.as_deref(), Some("1"));
    let b = tree.node(a.children[0]);
    assert_eq!(b.item_no.as_deref(), Some("1.1"));
    let c = tree.node(b.children[0]);
    assert_eq!(c.item_no.as_deref(), Some("1.1.2"));
}

// ==========================================
// Failures
// ==========================================

#[test]
fn test_orphan_line_is_reported_not_repaired() {
    let lines = vec![
        bom_line(Some("1"), "A", 1),
        bom_line(Some("1.2.1"), "B", 1), // no "1.2" anywhere
    ];
    let err = TreeBuilder::new()
        .build(7, "1000", &lines, &no_refs())
        .unwrap_err();
    match err {
        EngineError::OrphanLine {
            item_no,
            parent_item_no,
        } => {
            assert_eq!(item_no, "1.2.1");
            assert_eq!(parent_item_no, "1.2");
        }
        other => panic!("expected OrphanLine, got {other:?}"),
    }
}

#[test]
fn test_build_is_deterministic() {
    let lines = vec![
        bom_line(Some("1"), "A", 1),
        bom_line(Some("1.1"), "B", 2),
        bom_line(Some("2"), "C", 1),
    ];
    let builder = TreeBuilder::new();
    let first = builder.build(7, "1000", &lines, &no_refs()).unwrap();
    let second = builder.build(7, "1000", &lines, &no_refs()).unwrap();
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.item_no, b.item_no);
        assert_eq!(a.parent, b.parent);
        assert_eq!(a.children, b.children);
    }
}

// ==========================================
// Reference classification & search
// ==========================================

#[test]
fn test_reference_classification_uses_ref_map() {
    let mut refs = HashMap::new();
    refs.insert(
        "ASM-00500".to_string(),
        ArticleRef {
            article_id: 42,
            article_number: "500".to_string(),
        },
    );
    let lines = vec![
        bom_line(Some("1"), "ASM-00500", 2),
        bom_line(Some("2"), "20-10055", 1),
    ];
    let tree = TreeBuilder::new().build(7, "1000", &lines, &refs).unwrap();
    let root = tree.node(tree.root());

    let asm = tree.node(root.children[0]);
    assert_eq!(asm.kind, NodeKind::AssemblyRef);
    assert_eq!(asm.ref_article_id, Some(42));

    let part = tree.node(root.children[1]);
    assert_eq!(part.kind, NodeKind::Part);
    assert_eq!(part.ref_article_id, None);
}

#[test]
fn test_find_part_walks_display_order() {
    let lines = vec![
        bom_line(Some("1"), "20-10055", 1),
        bom_line(Some("2"), "20-10055-X", 1),
        bom_line(Some("3"), "30-99999", 1),
    ];
    let tree = TreeBuilder::new().build(7, "1000", &lines, &no_refs()).unwrap();

    let exact = tree.find_part("20-10055").unwrap();
    assert_eq!(tree.node(exact).line.as_ref().unwrap().part_number, "20-10055");

    let prefix = tree.find_part("20-10055-").unwrap();
    assert_eq!(
        tree.node(prefix).line.as_ref().unwrap().part_number,
        "20-10055-X"
    );

    let contains = tree.find_part("9999").unwrap();
    assert_eq!(tree.node(contains).line.as_ref().unwrap().part_number, "30-99999");

    assert!(tree.find_part("nope").is_none());
}
