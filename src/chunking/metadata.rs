use regex::Regex;

use crate::domain;
use crate::models::chunk::KeywordOccurrence;

/// Metadata computed over a chunk's text (spec §4.1): `legal_density =
/// legal_word_occurrences / total_words`, `is_legal_document = legal_density
/// > 0.01`, and the flat, order-preserving `legal_terms` occurrence list —
/// never a term-to-count mapping (spec §9).
pub struct ChunkMetadata {
    pub legal_density: f32,
    pub is_legal_document: bool,
    pub legal_terms: Vec<KeywordOccurrence>,
}

pub fn compute_metadata(text: &str) -> ChunkMetadata {
    let total_words = text.split_whitespace().count().max(1);
    let mut occurrences = Vec::new();

    for term in all_legal_terms() {
        let pattern = format!(r"(?i)\b{}\b", regex::escape(term));
        let re = match Regex::new(&pattern) {
            Ok(re) => re,
            Err(_) => continue,
        };
        for m in re.find_iter(text) {
            occurrences.push(KeywordOccurrence {
                term: term.to_string(),
                char_offset: m.start(),
            });
        }
    }
    occurrences.sort_by_key(|o| o.char_offset);

    let legal_density = occurrences.len() as f32 / total_words as f32;
    ChunkMetadata {
        legal_density,
        is_legal_document: legal_density > 0.01,
        legal_terms: occurrences,
    }
}

fn all_legal_terms() -> Vec<&'static str> {
    let mut terms: Vec<&'static str> = domain::Category::all()
        .iter()
        .flat_map(|c| c.surface_forms().iter().copied())
        .collect();
    terms.extend_from_slice(domain::GENERAL_LEGAL_TERMS);
    // Longest first so "pre-existing condition" matches before "condition"
    // would, keeping occurrence records specific rather than generic.
    terms.sort_by(|a, b| b.len().cmp(&a.len()));
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_zero_density() {
        let meta = compute_metadata("");
        assert_eq!(meta.legal_density, 0.0);
        assert!(!meta.is_legal_document);
        assert!(meta.legal_terms.is_empty());
    }

    #[test]
    fn text_with_legal_terms_is_flagged() {
        let meta = compute_metadata(
            "This clause describes the exclusion for pre-existing condition claims.",
        );
        assert!(meta.is_legal_document);
        assert!(!meta.legal_terms.is_empty());
    }

    #[test]
    fn occurrences_are_ordered_by_position() {
        let meta = compute_metadata("exclusion first, then another exclusion later");
        let offsets: Vec<usize> = meta.legal_terms.iter().map(|o| o.char_offset).collect();
        let mut sorted = offsets.clone();
        sorted.sort();
        assert_eq!(offsets, sorted);
    }

    #[test]
    fn plain_text_without_legal_terms_is_not_flagged() {
        let meta = compute_metadata("the quick brown fox jumps over the lazy dog");
        assert!(!meta.is_legal_document);
    }
}
