use crate::models::{Confidence, RetrievalResult};

/// `source_relevance` = mean of the top-3 `combined_score` (spec §4.6 step 6).
/// Assumes `results` is already sorted best-first (the retrieval stage's
/// `(structural_rank, combined_score, chunk_id)` ordering).
fn source_relevance(results: &[RetrievalResult]) -> f32 {
    if results.is_empty() {
        return 0.0;
    }
    let top = &results[..results.len().min(3)];
    top.iter().map(|r| r.combined_score).sum::<f32>() / top.len() as f32
}

/// `response_completeness` from `{has_final_punctuation,
/// length_relative_to_budget, answers_all_sub_questions}` (spec §4.6 step 6).
fn response_completeness(answer: &str, llm_max_tokens: u32, all_sub_questions_answered: bool) -> f32 {
    let has_final_punctuation = matches!(answer.trim_end().chars().last(), Some('.') | Some('?') | Some('!'));
    // Token count approximated as whitespace-split word count, consistent
    // with the chunker's own token accounting.
    let word_count = answer.split_whitespace().count() as f32;
    let length_relative_to_budget = (word_count / llm_max_tokens.max(1) as f32).min(1.0);

    let mut score = 0.0;
    if has_final_punctuation {
        score += 0.3;
    }
    score += 0.4 * length_relative_to_budget;
    if all_sub_questions_answered {
        score += 0.3;
    }
    score.clamp(0.0, 1.0)
}

/// `citation_quality` = min(1, citations_in_answer / max(1, sub_question_count))
/// (spec §4.6 step 6).
fn citation_quality(citations_in_answer: usize, sub_question_count: usize) -> f32 {
    (citations_in_answer as f32 / sub_question_count.max(1) as f32).min(1.0)
}

/// `overall = 0.4*source_relevance + 0.3*response_completeness +
/// 0.2*citation_quality + 0.1*length_factor` (spec §4.6 step 6).
/// `length_factor` reuses the same length-relative-to-budget signal as
/// `response_completeness`'s length component, since the spec names no
/// separate definition for it.
pub fn compute(
    results: &[RetrievalResult],
    answer: &str,
    sub_question_count: usize,
    all_sub_questions_answered: bool,
    citations_in_answer: usize,
    llm_max_tokens: u32,
) -> Confidence {
    let relevance = source_relevance(results);
    let completeness = response_completeness(answer, llm_max_tokens, all_sub_questions_answered);
    let citation = citation_quality(citations_in_answer, sub_question_count);
    let word_count = answer.split_whitespace().count() as f32;
    let length_factor = (word_count / llm_max_tokens.max(1) as f32).min(1.0);

    let overall = (0.4 * relevance + 0.3 * completeness + 0.2 * citation + 0.1 * length_factor)
        .clamp(0.0, 1.0);

    Confidence {
        overall,
        source_relevance: relevance,
        response_completeness: completeness,
        citation_quality: citation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MetadataValue, RetrievalMethod, StructuralRank};
    use std::collections::BTreeMap;

    fn result(score: f32) -> RetrievalResult {
        RetrievalResult {
            chunk_id: "D:0".to_string(),
            text: "text".to_string(),
            metadata: BTreeMap::<String, MetadataValue>::new(),
            semantic_score: score,
            keyword_score: 0.0,
            combined_score: score,
            structural_rank: StructuralRank::CATEGORY_MATCH,
            retrieval_method: RetrievalMethod::Hybrid,
            matched_keywords: vec![],
        }
    }

    #[test]
    fn source_relevance_averages_top_three() {
        let results = vec![result(0.9), result(0.6), result(0.3), result(0.0)];
        assert!((source_relevance(&results) - 0.6).abs() < 1e-4);
    }

    #[test]
    fn empty_results_yield_zero_relevance() {
        assert_eq!(source_relevance(&[]), 0.0);
    }

    #[test]
    fn citation_quality_clamped_to_one() {
        assert_eq!(citation_quality(10, 5), 1.0);
    }

    #[test]
    fn citation_quality_divides_by_sub_question_count() {
        assert!((citation_quality(2, 5) - 0.4).abs() < 1e-4);
    }

    #[test]
    fn overall_confidence_in_unit_interval() {
        let results = vec![result(0.9), result(0.8)];
        let confidence = compute(&results, "A complete answer citing clause 4.", 1, true, 1, 4000);
        assert!(confidence.overall >= 0.0 && confidence.overall <= 1.0);
    }
}
