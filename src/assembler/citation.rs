use crate::models::ClauseReference;

use super::context_format::{detect_clause_identifiers, ContextBlock};

/// Cross-reference the clause identifiers detected in the answer against
/// the ones detected in each context block's own text (spec §4.6 step 5).
/// An identifier that appears in both a block's source text and the answer
/// is marked `found_in_response=true`; identifiers only in the source
/// never appear at all (the assembler only surfaces citations the model
/// actually used).
pub fn extract_clause_references(answer: &str, blocks: &[ContextBlock]) -> Vec<ClauseReference> {
    let answer_identifiers = detect_clause_identifiers(answer);

    let mut references = Vec::new();
    for identifier in &answer_identifiers {
        if let Some(block) = blocks
            .iter()
            .find(|b| b.clause_identifiers.iter().any(|i| i.eq_ignore_ascii_case(identifier)))
        {
            references.push(ClauseReference {
                identifier: identifier.clone(),
                source_chunk_id: block.chunk_id.clone(),
                found_in_response: true,
            });
        }
    }
    references
}

/// Count of clause identifiers from the answer that were matched back to a
/// source chunk — drives `citation_quality` (spec §4.6 step 6).
pub fn citation_count(references: &[ClauseReference]) -> usize {
    references.iter().filter(|r| r.found_in_response).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(chunk_id: &str, clauses: Vec<&str>) -> ContextBlock {
        ContextBlock {
            chunk_id: chunk_id.to_string(),
            doc_title: "Policy".to_string(),
            section_anchor: None,
            section_title: None,
            page: None,
            clause_identifiers: clauses.into_iter().map(String::from).collect(),
            text: String::new(),
        }
    }

    #[test]
    fn matches_answer_citation_to_source_chunk() {
        let blocks = vec![block("D:0", vec!["clause 4"])];
        let refs = extract_clause_references("Per clause 4, this is excluded.", &blocks);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].source_chunk_id, "D:0");
        assert!(refs[0].found_in_response);
    }

    #[test]
    fn answer_citation_absent_from_any_source_is_dropped() {
        let blocks = vec![block("D:0", vec!["clause 4"])];
        let refs = extract_clause_references("Per clause 9, this applies.", &blocks);
        assert!(refs.is_empty());
    }

    #[test]
    fn citation_count_counts_found_references() {
        let refs = vec![ClauseReference {
            identifier: "clause 4".to_string(),
            source_chunk_id: "D:0".to_string(),
            found_in_response: true,
        }];
        assert_eq!(citation_count(&refs), 1);
    }
}
