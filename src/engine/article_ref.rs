// ==========================================
// BOM Navigator - sub-assembly reference resolution
// ==========================================
// A BOM line is a sub-assembly reference when its part number resolves
// to another indexed article. Part numbers rarely equal article
// numbers verbatim, so resolution tries a candidate ladder: the raw
// value, then embedded digit tokens (longest first), then their
// zero-stripped variants.
// ==========================================

use std::collections::HashMap;

use crate::domain::BomLine;

/// Resolved reference target: another indexed article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRef {
    pub article_id: i64,
    pub article_number: String,
}

/// Read-only lookup collaborator for cross-BOM resolution.
///
/// Implementations must be safe for concurrent read access; several
/// explosions may run at once.
pub trait BomSource {
    /// Resolve a part number to the article it references, if any.
    fn resolve_article_ref(&self, part_number: &str) -> anyhow::Result<Option<ArticleRef>>;

    /// The article's BOM lines in display order.
    fn article_lines(&self, article_id: i64) -> anyhow::Result<Vec<BomLine>>;
}

/// Article number candidates for one part number, in resolution order.
pub fn candidates(part_number: &str) -> Vec<String> {
    let raw = part_number.trim();
    if raw.is_empty() {
        return Vec::new();
    }
    let mut out: Vec<String> = vec![raw.to_string()];

    let mut tokens: Vec<String> = Vec::new();
    let mut current = String::new();
    for c in raw.chars() {
        if c.is_ascii_digit() {
            current.push(c);
        } else {
            if current.len() >= 3 && !tokens.contains(&current) {
                tokens.push(current.clone());
            }
            current.clear();
        }
    }
    if current.len() >= 3 && !tokens.contains(&current) {
        tokens.push(current);
    }
    // Longest tokens first; lexical order breaks length ties.
    tokens.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    for token in tokens {
        if !out.contains(&token) {
            out.push(token.clone());
        }
        let trimmed = token.trim_start_matches('0');
        if !trimmed.is_empty() && !out.iter().any(|c| c == trimmed) {
            out.push(trimmed.to_string());
        }
    }
    out
}

/// Resolve the sub-assembly reference for every distinct part number
/// in `lines`. First candidate hit wins per part number.
pub fn resolve_ref_map<S: BomSource + ?Sized>(
    lines: &[BomLine],
    source: &S,
) -> anyhow::Result<HashMap<String, ArticleRef>> {
    let mut map: HashMap<String, ArticleRef> = HashMap::new();
    for line in lines {
        let part = line.part_number.trim();
        if part.is_empty() || map.contains_key(part) {
            continue;
        }
        if let Some(target) = source.resolve_article_ref(part)? {
            map.insert(part.to_string(), target);
        }
    }
    Ok(map)
}
