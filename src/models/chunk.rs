use serde::{Deserialize, Serialize};

/// How a `Chunk` was produced (spec §4.1). Carried on every chunk so
/// downstream stages (re-ranker, assembler) can reason about provenance
/// without re-deriving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkingMethod {
    PolicySection,
    LegalSection,
    SlidingWindow,
}

impl ChunkingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkingMethod::PolicySection => "policy_section",
            ChunkingMethod::LegalSection => "legal_section",
            ChunkingMethod::SlidingWindow => "sliding_window",
        }
    }
}

/// A single occurrence of a recognized legal keyword within a chunk's text,
/// in order of appearance (spec §3: "a list of detected legal keyword
/// occurrences (one entry per occurrence, preserving order)").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordOccurrence {
    pub term: String,
    pub char_offset: usize,
}

/// A contiguous text fragment emitted by the Chunker (spec §3). Created
/// during ingestion, never mutated, and deleted only when the owning
/// document is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// `{doc_id}:{index}` for sliding-window chunks, or `{doc_id}:section_{anchor}`
    /// for structure-derived chunks (spec §4.1).
    pub chunk_id: String,
    pub doc_id: String,
    pub doc_title: String,
    pub section_anchor: Option<String>,
    pub section_title: Option<String>,
    pub page: Option<u32>,
    pub word_count: usize,
    pub legal_density: f32,
    pub legal_terms: Vec<KeywordOccurrence>,
    pub chunking_method: ChunkingMethod,
    pub text: String,
}

impl Chunk {
    /// Invariant check (spec §8): text is non-empty and trimmed.
    pub fn is_well_formed(&self) -> bool {
        !self.text.is_empty() && self.text == self.text.trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_chunk(text: &str) -> Chunk {
        Chunk {
            chunk_id: "D:0".into(),
            doc_id: "D".into(),
            doc_title: "Policy".into(),
            section_anchor: None,
            section_title: None,
            page: None,
            word_count: text.split_whitespace().count(),
            legal_density: 0.0,
            legal_terms: Vec::new(),
            chunking_method: ChunkingMethod::SlidingWindow,
            text: text.to_string(),
        }
    }

    #[test]
    fn well_formed_requires_trimmed_nonempty_text() {
        assert!(sample_chunk("hello world").is_well_formed());
        assert!(!sample_chunk("").is_well_formed());
        assert!(!sample_chunk(" padded ").is_well_formed());
    }

    #[test]
    fn chunking_method_as_str_matches_glossary() {
        assert_eq!(ChunkingMethod::PolicySection.as_str(), "policy_section");
        assert_eq!(ChunkingMethod::LegalSection.as_str(), "legal_section");
        assert_eq!(ChunkingMethod::SlidingWindow.as_str(), "sliding_window");
    }
}
