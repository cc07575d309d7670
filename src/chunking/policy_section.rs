use regex::Regex;

use super::{metadata, split_by_headings, HeadingMatch};
use crate::models::chunk::Chunk;
use crate::models::ChunkingMethod;

/// Numbered policy heading (spec §4.1): `^\d+(\.\d+)?\s+[A-Z][^\n]*$`.
/// Headings that fail to match yield no boundary — callers fall back to
/// sliding-window when this returns an empty list.
fn heading_pattern() -> Regex {
    Regex::new(r"(?m)^(\d+(?:\.\d+)?)[ \t]+([A-Z][^\n]*)$").expect("static pattern is valid")
}

pub fn chunk(doc_id: &str, doc_title: &str, text: &str) -> Vec<Chunk> {
    let pattern = heading_pattern();
    let headings: Vec<HeadingMatch> = pattern
        .captures_iter(text)
        .map(|cap| {
            let whole = cap.get(0).expect("group 0 always present");
            HeadingMatch {
                anchor: cap[1].to_string(),
                title: cap[2].trim().to_string(),
                start: whole.start(),
            }
        })
        .collect();

    if headings.is_empty() {
        return Vec::new();
    }

    split_by_headings(text, &headings)
        .into_iter()
        .map(|(heading, body)| {
            let meta = metadata::compute_metadata(body);
            Chunk {
                chunk_id: format!("{doc_id}:section_{}", heading.anchor),
                doc_id: doc_id.to_string(),
                doc_title: doc_title.to_string(),
                section_anchor: Some(heading.anchor.clone()),
                section_title: Some(heading.title.clone()),
                page: None,
                word_count: body.split_whitespace().count(),
                legal_density: meta.legal_density,
                legal_terms: meta.legal_terms,
                chunking_method: ChunkingMethod::PolicySection,
                text: body.to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLICY_TEXT: &str = "1.1 COVERAGE\nThe insurer shall cover hospitalization expenses.\n1.2 EXCLUSIONS\nPre-existing conditions are excluded for the first year.\n2.1 DEDUCTIBLE\nA deductible of $500 applies per claim.\n";

    #[test]
    fn segments_three_numbered_sections() {
        let chunks = chunk("D", "Policy", POLICY_TEXT);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].section_anchor.as_deref(), Some("1.1"));
        assert_eq!(chunks[1].section_anchor.as_deref(), Some("1.2"));
        assert_eq!(chunks[2].section_anchor.as_deref(), Some("2.1"));
        for c in &chunks {
            assert_eq!(c.chunking_method, ChunkingMethod::PolicySection);
            assert!(c.is_well_formed());
        }
    }

    #[test]
    fn chunk_text_contains_entire_section_body() {
        let chunks = chunk("D", "Policy", POLICY_TEXT);
        assert!(chunks[1].text.contains("Pre-existing conditions"));
        assert!(!chunks[1].text.contains("DEDUCTIBLE"));
    }

    #[test]
    fn stable_chunk_ids_use_section_anchor() {
        let chunks = chunk("D", "Policy", POLICY_TEXT);
        assert_eq!(chunks[0].chunk_id, "D:section_1.1");
    }

    #[test]
    fn no_headings_returns_empty_for_fallback() {
        assert!(chunk("D", "Policy", "just plain text with no headings at all").is_empty());
    }
}
