//! Chunker (spec §4.1): converts cleaned document text into an ordered list
//! of `Chunk`s. Chunking method is selected by the caller's declared
//! document type; each sub-module implements one method and is otherwise
//! independent of the others.
//!
//! Grounded on `pipeline/storage/chunker.rs::MedicalChunker`'s structure
//! (heading-detect, section split, tiny-chunk merge), generalized here from
//! a single Markdown-heading family to the three regex families spec §4.1
//! names, and with the tiny-chunk merge dropped — the spec's segmentation
//! rule for structured chunks has no merge step, only heading-to-heading
//! spans.

pub mod legal_section;
pub mod metadata;
pub mod policy_section;
pub mod sliding_window;

use crate::models::chunk::Chunk;

/// Declared document type (spec §4.1), used only to select a chunking
/// strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentType {
    Policy,
    Contract,
    Other,
}

impl DocumentType {
    pub fn from_str(doc_type: &str) -> Self {
        match doc_type {
            "policy" | "insurance_policy" | "health_policy" => DocumentType::Policy,
            "contract" | "agreement" | "legal_contract" => DocumentType::Contract,
            _ => DocumentType::Other,
        }
    }
}

/// A heading match shared by `policy_section` and `legal_section`: the
/// anchor (leading section number) and title text, plus the char range the
/// heading line itself occupies in the source text.
pub(crate) struct HeadingMatch {
    pub anchor: String,
    pub title: String,
    pub start: usize,
}

/// Split `text` into heading-to-heading spans given a list of heading
/// matches already located in document order. Returns one span per
/// heading; each span's text runs from its heading's start to the next
/// heading's start (or end of text for the last one). Empty if `headings`
/// is empty — callers fall back to sliding-window in that case.
pub(crate) fn split_by_headings<'a>(
    text: &'a str,
    headings: &[HeadingMatch],
) -> Vec<(&'a HeadingMatch, &'a str)> {
    let mut spans = Vec::with_capacity(headings.len());
    for (i, heading) in headings.iter().enumerate() {
        let end = headings.get(i + 1).map(|h| h.start).unwrap_or(text.len());
        spans.push((heading, text[heading.start..end].trim()));
    }
    spans
        .into_iter()
        .filter(|(_, body)| !body.is_empty())
        .collect()
}

/// Entry point: convert `raw_text` into chunks per spec §4.1's contracts.
/// Empty input yields an empty list, not an error. Structure-derived
/// chunking that finds no headings falls back to sliding-window so every
/// non-empty document yields at least one chunk.
pub fn chunk_document(
    doc_id: &str,
    doc_title: &str,
    doc_type: &str,
    raw_text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
) -> Vec<Chunk> {
    if raw_text.trim().is_empty() {
        return Vec::new();
    }

    let structured = match DocumentType::from_str(doc_type) {
        DocumentType::Policy => policy_section::chunk(doc_id, doc_title, raw_text),
        DocumentType::Contract => legal_section::chunk(doc_id, doc_title, raw_text),
        DocumentType::Other => Vec::new(),
    };

    if !structured.is_empty() {
        return structured;
    }

    sliding_window::chunk(doc_id, doc_title, raw_text, chunk_size, chunk_overlap)
}
