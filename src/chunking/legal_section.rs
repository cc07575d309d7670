use regex::Regex;

use super::{metadata, split_by_headings, HeadingMatch};
use crate::models::chunk::Chunk;
use crate::models::ChunkingMethod;

/// Contract/agreement heading forms (spec §4.1): `ARTICLE N`, `SECTION N`,
/// `CLAUSE N`, or `^N. <ALLCAPS>$`.
fn heading_pattern() -> Regex {
    Regex::new(
        r"(?m)^(?:(ARTICLE|SECTION|CLAUSE)[ \t]+(\d+)\b[ \t]*([^\n]*)|(\d+)\.[ \t]+([A-Z][A-Z0-9 ,'&\-]*))$",
    )
    .expect("static pattern is valid")
}

pub fn chunk(doc_id: &str, doc_title: &str, text: &str) -> Vec<Chunk> {
    let pattern = heading_pattern();
    let headings: Vec<HeadingMatch> = pattern
        .captures_iter(text)
        .map(|cap| {
            let whole = cap.get(0).expect("group 0 always present");
            let (anchor, title) = if let Some(number) = cap.get(2) {
                let title = cap.get(3).map(|m| m.as_str().trim()).unwrap_or("");
                (number.as_str().to_string(), title.to_string())
            } else {
                (
                    cap.get(4).expect("numeric alternative present").as_str().to_string(),
                    cap.get(5).expect("title alternative present").as_str().trim().to_string(),
                )
            };
            HeadingMatch {
                anchor,
                title,
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
                chunking_method: ChunkingMethod::LegalSection,
                text: body.to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTRACT_TEXT: &str = "ARTICLE 1 DEFINITIONS\nIn this agreement, \"Party\" means either signatory.\nSECTION 2 TERM\nThis agreement is effective for two years.\n3. TERMINATION RIGHTS\nEither party may terminate with 30 days notice.\n";

    #[test]
    fn segments_mixed_heading_forms() {
        let chunks = chunk("D", "Contract", CONTRACT_TEXT);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].section_anchor.as_deref(), Some("1"));
        assert_eq!(chunks[1].section_anchor.as_deref(), Some("2"));
        assert_eq!(chunks[2].section_anchor.as_deref(), Some("3"));
        for c in &chunks {
            assert_eq!(c.chunking_method, ChunkingMethod::LegalSection);
        }
    }

    #[test]
    fn chunk_text_excludes_following_heading() {
        let chunks = chunk("D", "Contract", CONTRACT_TEXT);
        assert!(chunks[0].text.contains("Party"));
        assert!(!chunks[0].text.contains("TERM"));
    }

    #[test]
    fn no_matching_headings_returns_empty() {
        assert!(chunk("D", "Contract", "no headings here whatsoever").is_empty());
    }
}
