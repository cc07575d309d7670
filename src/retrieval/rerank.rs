use crate::domain::{self, Category};
use crate::models::{Intent, MetadataValue, RetrievalResult, StructuralRank};
use crate::query::normalizer;

/// Structural rank (spec §4.4): 1 when any of the query's matched legal
/// categories also appears in the candidate's text (category
/// co-occurrence); 2 when only a generic legal term overlaps between query
/// and candidate without a shared category; otherwise 3.
pub fn structural_rank(matched_categories: &[String], candidate_text: &str) -> StructuralRank {
    let category_overlap = matched_categories.iter().any(|name| {
        Category::all()
            .iter()
            .find(|c| c.as_str() == name)
            .map(|c| {
                c.surface_forms()
                    .iter()
                    .any(|form| normalizer::contains_whole_word(candidate_text, form))
            })
            .unwrap_or(false)
    });
    if category_overlap {
        return StructuralRank::CATEGORY_MATCH;
    }

    let generic_overlap = domain::GENERAL_LEGAL_TERMS.iter().any(|term| {
        normalizer::contains_whole_word(candidate_text, term)
    }) && !matched_categories.is_empty();

    if generic_overlap {
        StructuralRank::GENERIC_TERM_OVERLAP
    } else {
        StructuralRank::NO_OVERLAP
    }
}

/// Section-title / category keywords associated with each primary intent,
/// used by the context-aware re-rank's intent boost (spec §4.4: "temporal
/// intent <-> section titled 'Waiting Period'").
fn intent_title_keywords(intent: Intent) -> &'static [&'static str] {
    match intent {
        Intent::Exclusion => &["exclusion", "excluded", "limitation"],
        Intent::Coverage => &["coverage", "covered", "benefit"],
        Intent::Temporal => &["waiting period", "renewal", "moratorium"],
        Intent::Financial => &["premium", "deductible", "co-payment"],
        Intent::Claim => &["claim", "reimbursement", "settlement"],
        Intent::Procedural => &["termination", "cancellation", "procedure"],
        Intent::InformationSeeking => &[],
    }
}

fn candidate_matches_intent(result: &RetrievalResult, intent: Intent) -> bool {
    let section_title = result
        .metadata
        .get("section_title")
        .and_then(MetadataValue::as_str)
        .unwrap_or("");
    let title_match = intent_title_keywords(intent)
        .iter()
        .any(|kw| normalizer::contains_whole_word(section_title, kw));

    // The chunk's `category` metadata (written by `Core::ingest` via
    // `domain::classify_text`) matches the query's primary intent when
    // that category's own mapped intent (spec §4.2's `Category::primary_intent`)
    // is the same intent, not by comparing the category name against the
    // section-title keyword list directly.
    let category_match = result
        .metadata
        .get("category")
        .and_then(MetadataValue::as_str)
        .and_then(|name| Category::all().iter().find(|c| c.as_str() == name))
        .and_then(Category::primary_intent)
        == Some(intent);

    title_match || category_match
}

/// Context-aware re-rank (spec §4.4): apply a proportional bonus, capped at
/// +0.1 absolute, to candidates whose section title or metadata category
/// matches the query's primary intent. Re-sorts within each structural
/// bucket; buckets never cross.
pub fn apply_intent_boost(results: &mut [RetrievalResult], primary_intent: Intent) {
    for result in results.iter_mut() {
        if candidate_matches_intent(result, primary_intent) {
            let bonus = (result.combined_score * 0.1).min(0.1);
            result.combined_score = (result.combined_score + bonus).min(1.0);
        }
    }
    results.sort_by(RetrievalResult::cmp_by_rank_score_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use crate::models::RetrievalMethod;

    fn result(chunk_id: &str, rank: StructuralRank, score: f32, section_title: &str) -> RetrievalResult {
        let mut metadata = BTreeMap::new();
        metadata.insert(
            "section_title".to_string(),
            MetadataValue::String(section_title.to_string()),
        );
        RetrievalResult {
            chunk_id: chunk_id.into(),
            text: "text".into(),
            metadata,
            semantic_score: score,
            keyword_score: 0.0,
            combined_score: score,
            structural_rank: rank,
            retrieval_method: RetrievalMethod::Semantic,
            matched_keywords: Vec::new(),
        }
    }

    #[test]
    fn category_overlap_yields_rank_one() {
        let matched = vec!["exclusions".to_string()];
        let rank = structural_rank(&matched, "this section describes an exclusion clause");
        assert_eq!(rank, StructuralRank::CATEGORY_MATCH);
    }

    #[test]
    fn generic_term_overlap_yields_rank_two() {
        let matched = vec!["claims".to_string()];
        let rank = structural_rank(&matched, "this clause addresses liability");
        assert_eq!(rank, StructuralRank::GENERIC_TERM_OVERLAP);
    }

    #[test]
    fn no_overlap_yields_rank_three() {
        let matched: Vec<String> = Vec::new();
        let rank = structural_rank(&matched, "completely unrelated sentence");
        assert_eq!(rank, StructuralRank::NO_OVERLAP);
    }

    #[test]
    fn intent_boost_raises_matching_section_and_stays_within_bucket() {
        let mut results = vec![
            result("a", StructuralRank::CATEGORY_MATCH, 0.5, "Waiting Period"),
            result("b", StructuralRank::CATEGORY_MATCH, 0.6, "Coverage"),
        ];
        apply_intent_boost(&mut results, Intent::Temporal);
        assert!(results[0].combined_score > 0.5 || results[0].chunk_id == "a");
        for r in &results {
            assert_eq!(r.structural_rank, StructuralRank::CATEGORY_MATCH);
        }
    }

    #[test]
    fn intent_boost_fires_on_category_metadata_even_without_title_match() {
        let mut candidate = result("a", StructuralRank::CATEGORY_MATCH, 0.5, "General");
        candidate
            .metadata
            .insert("category".to_string(), MetadataValue::String("waiting_periods".to_string()));
        let mut results = vec![candidate];
        apply_intent_boost(&mut results, Intent::Temporal);
        assert!(results[0].combined_score > 0.5);
    }

    #[test]
    fn boost_never_exceeds_one() {
        let mut results = vec![result("a", StructuralRank::CATEGORY_MATCH, 0.97, "Waiting Period")];
        apply_intent_boost(&mut results, Intent::Temporal);
        assert!(results[0].combined_score <= 1.0);
    }
}
