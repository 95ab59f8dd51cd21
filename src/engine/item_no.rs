// ==========================================
// BOM Navigator - item number handling
// ==========================================
// Dotted hierarchical position tokens as they come out of the import
// pipeline: "1", "1.1", "1.1.2". Parent linkage and display ordering
// both derive from these tokens.
// ==========================================

use crate::domain::BomLine;

/// Normalize a raw item number token.
///
/// Strips whitespace, collapses runs of dots, trims leading/trailing
/// dots. Returns None when nothing usable remains.
pub fn normalize(raw: &str) -> Option<String> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let mut out = String::with_capacity(compact.len());
    let mut prev_dot = true; // swallows leading dots
    for c in compact.chars() {
        if c == '.' {
            if !prev_dot {
                out.push('.');
            }
            prev_dot = true;
        } else {
            out.push(c);
            prev_dot = false;
        }
    }
    while out.ends_with('.') {
        out.pop();
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Parent token of a normalized item number: everything up to the last
/// dot. None for top-level tokens, whose parent is the article root.
pub fn parent_of(item_no: &str) -> Option<&str> {
    item_no.rsplit_once('.').map(|(parent, _)| parent)
}

// ==========================================
// Display ordering
// ==========================================

/// One dotted segment; numeric segments order before and among
/// themselves numerically, the rest lexically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Segment {
    Number(u64),
    Text(String),
}

/// Total order over BOM lines for display: numbered lines first (by
/// dotted segments), then lines with only a line number, then the
/// rest; part number is the final tiebreak.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct LineSortKey {
    group: u8,
    segments: Vec<Segment>,
    part_number: String,
}

/// Sort key for one BOM line.
pub fn line_sort_key(line: &BomLine) -> LineSortKey {
    let item_no = line
        .item_no
        .as_deref()
        .and_then(normalize)
        .unwrap_or_default();
    if !item_no.is_empty() {
        let segments = item_no
            .split('.')
            .map(|token| match token.parse::<u64>() {
                Ok(n) => Segment::Number(n),
                Err(_) => Segment::Text(token.to_string()),
            })
            .collect();
        return LineSortKey {
            group: 0,
            segments,
            part_number: line.part_number.clone(),
        };
    }
    if let Some(line_no) = line.line_no {
        return LineSortKey {
            group: 1,
            segments: vec![Segment::Number(line_no.max(0) as u64)],
            part_number: line.part_number.clone(),
        };
    }
    LineSortKey {
        group: 2,
        segments: Vec::new(),
        part_number: line.part_number.clone(),
    }
}

/// Sort lines into display order (stable).
pub fn sort_lines(lines: &mut [BomLine]) {
    lines.sort_by_cached_key(line_sort_key);
}
