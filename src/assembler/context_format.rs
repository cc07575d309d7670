use regex::Regex;

use crate::models::{MetadataValue, RetrievalResult};

/// One formatted context block handed to the prompt builder (spec §4.6
/// step 1): document title, section anchor/title, page, the clause
/// identifiers detected in the chunk's own text, and the text itself.
pub struct ContextBlock {
    pub chunk_id: String,
    pub doc_title: String,
    pub section_anchor: Option<String>,
    pub section_title: Option<String>,
    pub page: Option<u32>,
    pub clause_identifiers: Vec<String>,
    pub text: String,
}

/// Clause identifier patterns (spec §4.6 step 1): `clause N`, `section N`,
/// `article N`, `paragraph N`, `N.M`, `Na?` (a bare number, optionally
/// followed by a letter, e.g. "12a").
fn clause_pattern() -> Regex {
    Regex::new(r"(?i)\b(?:clause|section|article|paragraph)\s+\d+[a-z]?\b|\b\d+\.\d+\b|\b\d+[a-z]\b")
        .expect("clause identifier pattern is valid")
}

/// Scan `text` for clause identifiers, preserving first-seen order and
/// deduplicating. Shared by context formatting and citation extraction
/// (spec §4.6 steps 1 and 5 cross-reference the same identifier set).
pub fn detect_clause_identifiers(text: &str) -> Vec<String> {
    let mut seen = std::collections::BTreeSet::new();
    let mut identifiers = Vec::new();
    for m in clause_pattern().find_iter(text) {
        let matched = m.as_str().to_string();
        if seen.insert(matched.clone()) {
            identifiers.push(matched);
        }
    }
    identifiers
}

fn metadata_string(result: &RetrievalResult, key: &str) -> Option<String> {
    result
        .metadata
        .get(key)
        .and_then(MetadataValue::as_str)
        .map(str::to_string)
}

fn metadata_u32(result: &RetrievalResult, key: &str) -> Option<u32> {
    match result.metadata.get(key) {
        Some(MetadataValue::Number(n)) => Some(*n as u32),
        _ => None,
    }
}

pub fn format_context(results: &[RetrievalResult]) -> Vec<ContextBlock> {
    results
        .iter()
        .map(|result| ContextBlock {
            chunk_id: result.chunk_id.clone(),
            doc_title: metadata_string(result, "doc_title").unwrap_or_default(),
            section_anchor: metadata_string(result, "section_anchor"),
            section_title: metadata_string(result, "section_title"),
            page: metadata_u32(result, "page"),
            clause_identifiers: detect_clause_identifiers(&result.text),
            text: result.text.clone(),
        })
        .collect()
}

/// Render the formatted blocks into the flat context string handed to the
/// LLM's user block (spec §4.6 step 2).
pub fn render(blocks: &[ContextBlock]) -> String {
    let mut rendered = String::new();
    for block in blocks {
        rendered.push_str(&format!("Document: {}\n", block.doc_title));
        if let Some(anchor) = &block.section_anchor {
            rendered.push_str(&format!("Section {}", anchor));
            if let Some(title) = &block.section_title {
                rendered.push_str(&format!(": {title}"));
            }
            rendered.push('\n');
        } else if let Some(title) = &block.section_title {
            rendered.push_str(&format!("Section: {title}\n"));
        }
        if let Some(page) = block.page {
            rendered.push_str(&format!("Page: {page}\n"));
        }
        if !block.clause_identifiers.is_empty() {
            rendered.push_str(&format!("Clauses: {}\n", block.clause_identifiers.join(", ")));
        }
        rendered.push_str(&block.text);
        rendered.push_str("\n\n---\n\n");
    }
    rendered
}
