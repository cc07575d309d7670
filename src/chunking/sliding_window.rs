use super::metadata;
use crate::models::chunk::Chunk;
use crate::models::ChunkingMethod;

/// Fallback chunking method (spec §4.1): split by whitespace into tokens,
/// emit windows of `chunk_size` tokens with `chunk_overlap` tokens of
/// overlap. Boundaries always fall on whitespace because windows are built
/// from whole tokens, never sub-token slices.
pub fn chunk(
    doc_id: &str,
    doc_title: &str,
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
) -> Vec<Chunk> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return Vec::new();
    }

    if tokens.len() <= chunk_size {
        let body = tokens.join(" ");
        return vec![build_chunk(doc_id, doc_title, 0, &body)];
    }

    let step = chunk_size.saturating_sub(chunk_overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0usize;
    let mut index = 0usize;
    while start < tokens.len() {
        let end = (start + chunk_size).min(tokens.len());
        let body = tokens[start..end].join(" ");
        chunks.push(build_chunk(doc_id, doc_title, index, &body));
        if end == tokens.len() {
            break;
        }
        start += step;
        index += 1;
    }
    chunks
}

fn build_chunk(doc_id: &str, doc_title: &str, index: usize, body: &str) -> Chunk {
    let meta = metadata::compute_metadata(body);
    Chunk {
        chunk_id: format!("{doc_id}:{index}"),
        doc_id: doc_id.to_string(),
        doc_title: doc_title.to_string(),
        section_anchor: None,
        section_title: None,
        page: None,
        word_count: body.split_whitespace().count(),
        legal_density: meta.legal_density,
        legal_terms: meta.legal_terms,
        chunking_method: ChunkingMethod::SlidingWindow,
        text: body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_yields_single_chunk() {
        let chunks = chunk("D", "Doc", "one two three", 800, 300);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_id, "D:0");
        assert_eq!(chunks[0].chunking_method, ChunkingMethod::SlidingWindow);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(chunk("D", "Doc", "   ", 800, 300).is_empty());
    }

    #[test]
    fn long_text_windows_with_overlap() {
        let words: Vec<String> = (0..1000).map(|i| format!("word{i}")).collect();
        let text = words.join(" ");
        let chunks = chunk("D", "Doc", &text, 800, 300);
        assert!(chunks.len() >= 2);
        for c in &chunks {
            assert!(c.word_count <= 800);
        }
        // Overlap: the last `chunk_overlap` words of chunk 0 reappear at
        // the start of chunk 1.
        let first_tail: Vec<&str> = chunks[0].text.split_whitespace().rev().take(5).collect();
        let second_head: Vec<&str> = chunks[1].text.split_whitespace().take(300).collect();
        for w in first_tail {
            assert!(second_head.contains(&w));
        }
    }

    #[test]
    fn stable_ids_are_sequential() {
        let words: Vec<String> = (0..2000).map(|i| format!("w{i}")).collect();
        let text = words.join(" ");
        let chunks = chunk("D", "Doc", &text, 800, 300);
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.chunk_id, format!("D:{i}"));
        }
    }
}
