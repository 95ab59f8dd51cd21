// ==========================================
// Order explosion engine - integration tests
// ==========================================
// Inclusion modes, running-quantity products, cross-BOM recursion,
// cycle safety, first-encounter ordering. The store is replaced by an
// in-memory BomSource.
// ==========================================

use std::collections::HashMap;

use bom_navigator::engine::article_ref::resolve_ref_map;
use bom_navigator::{
    ArticleRef, BomLine, BomSource, BomTree, EngineError, ExplosionEngine, IncludeMode, OrderLine,
    TreeBuilder,
};
use rust_decimal::Decimal;

// ==========================================
// Test helpers
// ==========================================

/// BomSource over fixed in-memory articles, keyed by article number.
struct MemorySource {
    articles: Vec<(i64, String, Vec<BomLine>)>,
}

impl MemorySource {
    fn new(articles: Vec<(i64, &str, Vec<BomLine>)>) -> Self {
        Self {
            articles: articles
                .into_iter()
                .map(|(id, number, lines)| (id, number.to_string(), lines))
                .collect(),
        }
    }

    fn tree(&self, article_id: i64) -> BomTree {
        let (_, number, lines) = self
            .articles
            .iter()
            .find(|(id, _, _)| *id == article_id)
            .expect("unknown test article");
        let refs = resolve_ref_map(lines, self).unwrap();
        TreeBuilder::new()
            .build(article_id, number, lines, &refs)
            .unwrap()
    }
}

impl BomSource for MemorySource {
    fn resolve_article_ref(&self, part_number: &str) -> anyhow::Result<Option<ArticleRef>> {
        Ok(self
            .articles
            .iter()
            .find(|(_, number, _)| number == part_number.trim())
            .map(|(id, number, _)| ArticleRef {
                article_id: *id,
                article_number: number.clone(),
            }))
    }

    fn article_lines(&self, article_id: i64) -> anyhow::Result<Vec<BomLine>> {
        Ok(self
            .articles
            .iter()
            .find(|(id, _, _)| *id == article_id)
            .map(|(_, _, lines)| lines.clone())
            .unwrap_or_default())
    }
}

fn bom_line(article_id: i64, item_no: Option<&str>, part_number: &str, qty: &str) -> BomLine {
    BomLine {
        id: 0,
        article_id,
        part_id: 1,
        part_number: part_number.to_string(),
        item_no: item_no.map(|s| s.to_string()),
        line_no: None,
        qty: Some(qty.parse().unwrap()),
        unit: None,
        revision: None,
        description: None,
        material: None,
        finish: None,
        line_type: None,
        status: None,
        source_sheet: None,
        source_row_number: None,
    }
}

fn quantities(order: &[OrderLine]) -> HashMap<String, Decimal> {
    order
        .iter()
        .map(|line| (line.part_number.clone(), line.qty))
        .collect()
}

fn dec(value: &str) -> Decimal {
    value.parse().unwrap()
}

// ==========================================
// PartsOnly
// ==========================================

#[test]
fn test_parts_only_explodes_cross_bom_references() {
    // 1000: sub-assembly 500 (qty 2) and loose part Q (qty 1);
    // 500: part P (qty 1) and part R (qty 3).
    let source = MemorySource::new(vec![
        (
            1,
            "1000",
            vec![
                bom_line(1, Some("1"), "500", "2"),
                bom_line(1, Some("2"), "Q", "1"),
            ],
        ),
        (
            2,
            "500",
            vec![
                bom_line(2, Some("1"), "P", "1"),
                bom_line(2, Some("2"), "R", "3"),
            ],
        ),
    ]);
    let tree = source.tree(1);
    let order = ExplosionEngine::new(&source)
        .explode(&tree, tree.root(), IncludeMode::PartsOnly, Decimal::ONE)
        .unwrap();

    // First-encounter order: the reference explodes before Q is seen.
    let parts: Vec<&str> = order.iter().map(|l| l.part_number.as_str()).collect();
    assert_eq!(parts, vec!["P", "R", "Q"]);

    let totals = quantities(&order);
    assert_eq!(totals["P"], dec("2"));
    assert_eq!(totals["R"], dec("6"));
    assert_eq!(totals["Q"], dec("1"));
}

#[test]
fn test_inline_children_shadow_the_reference() {
    // The line for 500 carries inline child rows (the imported copy of
    // the sub-BOM). Those rows win; the cross-BOM reference is not
    // expanded on top of them.
    let source = MemorySource::new(vec![
        (
            1,
            "1000",
            vec![
                bom_line(1, Some("1"), "500", "2"),
                bom_line(1, Some("1.1"), "P", "3"),
                bom_line(1, Some("2"), "Q", "1"),
            ],
        ),
        (2, "500", vec![bom_line(2, Some("1"), "P", "1")]),
    ]);
    let tree = source.tree(1);
    let order = ExplosionEngine::new(&source)
        .explode(&tree, tree.root(), IncludeMode::PartsOnly, Decimal::ONE)
        .unwrap();

    let totals = quantities(&order);
    assert_eq!(totals["P"], dec("6")); // 2 x 3 through the inline row only
    assert_eq!(totals["Q"], dec("1"));
    assert_eq!(order.len(), 2);
}

#[test]
fn test_running_product_through_nested_references() {
    // A -> B -> C -> P with quantities 2, 3, 4.
    let source = MemorySource::new(vec![
        (1, "A1000", vec![bom_line(1, Some("1"), "B2000", "2")]),
        (2, "B2000", vec![bom_line(2, Some("1"), "C3000", "3")]),
        (3, "C3000", vec![bom_line(3, Some("1"), "P", "4")]),
    ]);
    let tree = source.tree(1);
    let order = ExplosionEngine::new(&source)
        .explode(&tree, tree.root(), IncludeMode::PartsOnly, Decimal::ONE)
        .unwrap();
    assert_eq!(quantities(&order)["P"], dec("24"));
}

#[test]
fn test_running_product_inside_referenced_bom() {
    // Structural nesting inside the referenced BOM multiplies too:
    // 1000 -> 500 (qty 2), 500's BOM nests SUB (qty 3) over P (qty 5).
    let source = MemorySource::new(vec![
        (1, "1000", vec![bom_line(1, Some("1"), "500", "2")]),
        (
            2,
            "500",
            vec![
                bom_line(2, Some("1"), "SUB", "3"),
                bom_line(2, Some("1.1"), "P", "5"),
            ],
        ),
    ]);
    let tree = source.tree(1);
    let order = ExplosionEngine::new(&source)
        .explode(&tree, tree.root(), IncludeMode::PartsOnly, Decimal::ONE)
        .unwrap();
    assert_eq!(quantities(&order)["P"], dec("30"));
}

#[test]
fn test_exact_decimal_accumulation() {
    let source = MemorySource::new(vec![(
        1,
        "1000",
        vec![
            bom_line(1, Some("1"), "P", "0.1"),
            bom_line(1, Some("2"), "P", "0.2"),
            bom_line(1, Some("3"), "P", "0.7"),
        ],
    )]);
    let tree = source.tree(1);
    let order = ExplosionEngine::new(&source)
        .explode(&tree, tree.root(), IncludeMode::PartsOnly, Decimal::ONE)
        .unwrap();
    assert_eq!(order.len(), 1);
    assert_eq!(order[0].qty, Decimal::ONE);
}

#[test]
fn test_missing_qty_reads_as_one() {
    let mut line = bom_line(1, Some("1"), "P", "1");
    line.qty = None;
    let source = MemorySource::new(vec![(1, "1000", vec![line])]);
    let tree = source.tree(1);
    let order = ExplosionEngine::new(&source)
        .explode(&tree, tree.root(), IncludeMode::PartsOnly, dec("5"))
        .unwrap();
    assert_eq!(order[0].qty, dec("5"));
}

#[test]
fn test_parts_only_from_a_subtree_node() {
    let source = MemorySource::new(vec![(
        1,
        "1000",
        vec![
            bom_line(1, Some("1"), "ASM", "2"),
            bom_line(1, Some("1.1"), "P", "3"),
            bom_line(1, Some("2"), "Q", "1"),
        ],
    )]);
    let tree = source.tree(1);
    let asm = tree.node(tree.root()).children[0];
    let order = ExplosionEngine::new(&source)
        .explode(&tree, asm, IncludeMode::PartsOnly, dec("10"))
        .unwrap();

    // The selection's own quantity participates; its sibling does not.
    let totals = quantities(&order);
    assert_eq!(totals["P"], dec("60"));
    assert!(!totals.contains_key("Q"));
}

// ==========================================
// SelectedOnly
// ==========================================

#[test]
fn test_selected_only_emits_one_leaf() {
    let source = MemorySource::new(vec![(
        1,
        "1000",
        vec![
            bom_line(1, Some("1"), "P", "3"),
            bom_line(1, Some("2"), "Q", "1"),
        ],
    )]);
    let tree = source.tree(1);
    let p = tree.node(tree.root()).children[0];
    let order = ExplosionEngine::new(&source)
        .explode(&tree, p, IncludeMode::SelectedOnly, dec("4"))
        .unwrap();
    assert_eq!(order.len(), 1);
    assert_eq!(order[0].part_number, "P");
    assert_eq!(order[0].qty, dec("12"));
}

#[test]
fn test_selected_only_rejects_assemblies() {
    let source = MemorySource::new(vec![
        (1, "1000", vec![bom_line(1, Some("1"), "500", "2")]),
        (2, "500", vec![bom_line(2, Some("1"), "P", "1")]),
    ]);
    let tree = source.tree(1);
    let selection = tree.node(tree.root()).children[0];
    let err = ExplosionEngine::new(&source)
        .explode(&tree, selection, IncludeMode::SelectedOnly, Decimal::ONE)
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidMode { .. }));

    // The article root is not a leaf part either.
    let err = ExplosionEngine::new(&source)
        .explode(&tree, tree.root(), IncludeMode::SelectedOnly, Decimal::ONE)
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidMode { .. }));
}

// ==========================================
// SubsPlusParts
// ==========================================

#[test]
fn test_subs_plus_parts_emits_assembly_lines_too() {
    let source = MemorySource::new(vec![(
        1,
        "1000",
        vec![
            bom_line(1, Some("1"), "ASM", "2"),
            bom_line(1, Some("1.1"), "P", "3"),
            bom_line(1, Some("2"), "Q", "1"),
        ],
    )]);
    let tree = source.tree(1);
    let order = ExplosionEngine::new(&source)
        .explode(&tree, tree.root(), IncludeMode::SubsPlusParts, Decimal::ONE)
        .unwrap();

    let parts: Vec<&str> = order.iter().map(|l| l.part_number.as_str()).collect();
    assert_eq!(parts, vec!["ASM", "P", "Q"]);
    let totals = quantities(&order);
    assert_eq!(totals["ASM"], dec("2"));
    assert_eq!(totals["P"], dec("6"));
    assert_eq!(totals["Q"], dec("1"));
}

#[test]
fn test_subs_plus_parts_reference_line_and_transparent_leaves() {
    let source = MemorySource::new(vec![
        (1, "1000", vec![bom_line(1, Some("1"), "500", "2")]),
        (
            2,
            "500",
            vec![
                bom_line(2, Some("1"), "P", "3"),
                bom_line(2, Some("2"), "R", "1"),
            ],
        ),
    ]);
    let tree = source.tree(1);
    let order = ExplosionEngine::new(&source)
        .explode(&tree, tree.root(), IncludeMode::SubsPlusParts, Decimal::ONE)
        .unwrap();

    // The reference line itself is emitted, then its leaves
    // transparently.
    let parts: Vec<&str> = order.iter().map(|l| l.part_number.as_str()).collect();
    assert_eq!(parts, vec!["500", "P", "R"]);
    let totals = quantities(&order);
    assert_eq!(totals["500"], dec("2"));
    assert_eq!(totals["P"], dec("6"));
    assert_eq!(totals["R"], dec("2"));
}

#[test]
fn test_subs_plus_parts_on_selection_includes_the_selection() {
    let source = MemorySource::new(vec![(
        1,
        "1000",
        vec![
            bom_line(1, Some("1"), "ASM", "2"),
            bom_line(1, Some("1.1"), "P", "3"),
        ],
    )]);
    let tree = source.tree(1);
    let asm = tree.node(tree.root()).children[0];
    let order = ExplosionEngine::new(&source)
        .explode(&tree, asm, IncludeMode::SubsPlusParts, dec("5"))
        .unwrap();
    let totals = quantities(&order);
    assert_eq!(totals["ASM"], dec("10"));
    assert_eq!(totals["P"], dec("30"));
}

// ==========================================
// Invariants across modes
// ==========================================

#[test]
fn test_multiplier_scaling() {
    let source = MemorySource::new(vec![
        (
            1,
            "1000",
            vec![
                bom_line(1, Some("1"), "500", "2"),
                bom_line(1, Some("2"), "Q", "3"),
            ],
        ),
        (2, "500", vec![bom_line(2, Some("1"), "P", "5")]),
    ]);
    let tree = source.tree(1);
    let engine = ExplosionEngine::new(&source);

    let base = engine
        .explode(&tree, tree.root(), IncludeMode::PartsOnly, Decimal::ONE)
        .unwrap();
    for k in [2i64, 3, 7] {
        let scaled = engine
            .explode(&tree, tree.root(), IncludeMode::PartsOnly, Decimal::from(k))
            .unwrap();
        assert_eq!(base.len(), scaled.len());
        for (b, s) in base.iter().zip(scaled.iter()) {
            assert_eq!(s.part_number, b.part_number);
            assert_eq!(s.qty, b.qty * Decimal::from(k));
        }
    }
}

#[test]
fn test_explosion_is_idempotent() {
    let source = MemorySource::new(vec![
        (
            1,
            "1000",
            vec![
                bom_line(1, Some("1"), "500", "2"),
                bom_line(1, Some("2"), "Q", "1"),
            ],
        ),
        (2, "500", vec![bom_line(2, Some("1"), "P", "3")]),
    ]);
    let tree = source.tree(1);
    let engine = ExplosionEngine::new(&source);

    let first = engine
        .explode(&tree, tree.root(), IncludeMode::SubsPlusParts, dec("2"))
        .unwrap();
    let second = engine
        .explode(&tree, tree.root(), IncludeMode::SubsPlusParts, dec("2"))
        .unwrap();
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.part_number, b.part_number);
        assert_eq!(a.revision, b.revision);
        assert_eq!(a.qty, b.qty);
    }
}

#[test]
fn test_revisions_accumulate_separately() {
    let mut rev_a = bom_line(1, Some("1"), "P", "1");
    rev_a.revision = Some("a".to_string());
    let mut rev_a2 = bom_line(1, Some("2"), "P", "2");
    rev_a2.revision = Some(" A ".to_string());
    let mut rev_b = bom_line(1, Some("3"), "P", "4");
    rev_b.revision = Some("B".to_string());

    let source = MemorySource::new(vec![(1, "1000", vec![rev_a, rev_a2, rev_b])]);
    let tree = source.tree(1);
    let order = ExplosionEngine::new(&source)
        .explode(&tree, tree.root(), IncludeMode::PartsOnly, Decimal::ONE)
        .unwrap();

    assert_eq!(order.len(), 2);
    assert_eq!(order[0].revision, "A");
    assert_eq!(order[0].qty, dec("3"));
    assert_eq!(order[1].revision, "B");
    assert_eq!(order[1].qty, dec("4"));
}

// ==========================================
// Cycle safety & missing targets
// ==========================================

#[test]
fn test_circular_reference_fails_instead_of_hanging() {
    let source = MemorySource::new(vec![
        (1, "A1000", vec![bom_line(1, Some("1"), "B2000", "1")]),
        (2, "B2000", vec![bom_line(2, Some("1"), "A1000", "1")]),
    ]);
    let tree = source.tree(1);
    let err = ExplosionEngine::new(&source)
        .explode(&tree, tree.root(), IncludeMode::PartsOnly, Decimal::ONE)
        .unwrap_err();
    match err {
        EngineError::CircularReference { article_number } => {
            assert_eq!(article_number, "A1000");
        }
        other => panic!("expected CircularReference, got {other:?}"),
    }
}

#[test]
fn test_self_reference_fails() {
    let source = MemorySource::new(vec![(
        1,
        "A1000",
        vec![bom_line(1, Some("1"), "A1000", "1")],
    )]);
    let tree = source.tree(1);
    let err = ExplosionEngine::new(&source)
        .explode(&tree, tree.root(), IncludeMode::PartsOnly, Decimal::ONE)
        .unwrap_err();
    assert!(matches!(err, EngineError::CircularReference { .. }));
}

#[test]
fn test_diamond_reference_is_not_a_cycle() {
    // A uses B and C; both use P. A diamond, not a cycle.
    let source = MemorySource::new(vec![
        (
            1,
            "A1000",
            vec![
                bom_line(1, Some("1"), "B2000", "2"),
                bom_line(1, Some("2"), "C3000", "3"),
            ],
        ),
        (2, "B2000", vec![bom_line(2, Some("1"), "P", "1")]),
        (3, "C3000", vec![bom_line(3, Some("1"), "P", "1")]),
    ]);
    let tree = source.tree(1);
    let order = ExplosionEngine::new(&source)
        .explode(&tree, tree.root(), IncludeMode::PartsOnly, Decimal::ONE)
        .unwrap();
    assert_eq!(quantities(&order)["P"], dec("5"));
}

#[test]
fn test_vanished_reference_target_is_not_found() {
    // The tree was classified against an index state that no longer
    // resolves; the explosion reports it.
    let source = MemorySource::new(vec![(1, "1000", vec![bom_line(1, Some("1"), "500", "2")])]);
    let lines = vec![bom_line(1, Some("1"), "500", "2")];
    let mut refs = HashMap::new();
    refs.insert(
        "500".to_string(),
        ArticleRef {
            article_id: 99,
            article_number: "500".to_string(),
        },
    );
    let tree = TreeBuilder::new().build(1, "1000", &lines, &refs).unwrap();

    let err = ExplosionEngine::new(&source)
        .explode(&tree, tree.root(), IncludeMode::PartsOnly, Decimal::ONE)
        .unwrap_err();
    match err {
        EngineError::NotFound { part_number } => assert_eq!(part_number, "500"),
        other => panic!("expected NotFound, got {other:?}"),
    }
}
