use crate::adapters::{retry_once, Filter, ScannedRecord, VectorIndex};
use crate::config::Settings;
use crate::domain::{self, Category};
use crate::error::{CoreError, HardExternalError};
use crate::models::{MetadataValue, QueryContext, RetrievalMethod, RetrievalResult};
use crate::query::normalizer;

use super::{keyword_score, rerank};

/// Keyword-anchoring fallback (spec §4.5). Callers invoke this only when
/// the Hybrid Retriever (`hybrid::retrieve`) leaves zero survivors and
/// `Settings::enable_keyword_anchoring` is set — this function itself
/// always scans when called.
pub async fn anchor(
    query: &QueryContext,
    index: &dyn VectorIndex,
    filter: Option<&Filter>,
    settings: &Settings,
) -> Result<Vec<RetrievalResult>, CoreError> {
    let keywords = extract_fallback_keywords(query);
    if keywords.is_empty() {
        return Ok(Vec::new());
    }

    let scanned = retry_once(
        || index.scan(filter, settings.max_keyword_search_vectors),
        HardExternalError::Index,
    )
    .await?;

    let mut candidates: Vec<RetrievalResult> = scanned
        .iter()
        .filter_map(|record| build_candidate(record, &keywords, &query.matched_categories))
        .filter(|candidate| candidate.combined_score > 0.0)
        .collect();

    candidates.sort_by(RetrievalResult::cmp_by_rank_score_id);
    candidates.truncate(settings.max_keyword_results);
    Ok(candidates)
}

fn build_candidate(
    record: &ScannedRecord,
    keywords: &[String],
    matched_categories: &[String],
) -> Option<RetrievalResult> {
    let text = record
        .metadata
        .get("text")
        .and_then(MetadataValue::as_str)?
        .to_string();
    let scored = keyword_score::score(&text, keywords);
    let structural_rank = rerank::structural_rank(matched_categories, &text);
    Some(RetrievalResult {
        chunk_id: record.chunk_id.clone(),
        text,
        metadata: record.metadata.clone(),
        semantic_score: 0.0,
        keyword_score: scored.score,
        combined_score: scored.score,
        structural_rank,
        retrieval_method: RetrievalMethod::KeywordAnchoring,
        matched_keywords: scored.matched_keywords,
    })
}

/// Union of (a) every surface form of every category already matched
/// against the query, (b) general legal terms literally present in the
/// normalized query, (c) query tokens matching the general relevant-word
/// list (spec §4.5).
fn extract_fallback_keywords(query: &QueryContext) -> Vec<String> {
    let mut keywords = Vec::new();

    for name in &query.matched_categories {
        if let Some(category) = Category::all().iter().find(|c| c.as_str() == name) {
            for form in category.surface_forms() {
                keywords.push(form.to_string());
            }
        }
    }

    for term in domain::GENERAL_LEGAL_TERMS {
        if normalizer::contains_whole_word(&query.normalized, term) {
            keywords.push(term.to_string());
        }
    }

    for token in &query.keywords {
        if domain::RELEVANT_WORDS
            .iter()
            .any(|w| w.eq_ignore_ascii_case(token))
        {
            keywords.push(token.clone());
        }
    }

    keywords.sort();
    keywords.dedup();
    keywords
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::InMemoryVectorIndex;
    use crate::models::{Complexity, Intent};
    use std::collections::BTreeMap;

    fn query(matched_categories: Vec<&str>, keywords: Vec<&str>) -> QueryContext {
        QueryContext {
            raw: "raw".to_string(),
            normalized: "exclusion clause applies".to_string(),
            intent: Intent::Exclusion,
            matched_categories: matched_categories.into_iter().map(String::from).collect(),
            intent_confidence: 0.5,
            complexity: Complexity::Low,
            keywords: keywords.into_iter().map(String::from).collect(),
            sub_questions: vec!["raw?".to_string()],
        }
    }

    #[test]
    fn no_matched_categories_or_terms_yields_no_keywords() {
        let q = query(vec![], vec!["nothing"]);
        assert!(extract_fallback_keywords(&q).is_empty());
    }

    #[test]
    fn matched_category_contributes_surface_forms() {
        let q = query(vec!["exclusions"], vec![]);
        let keywords = extract_fallback_keywords(&q);
        assert!(keywords.iter().any(|k| k == "exclusion"));
    }

    #[tokio::test]
    async fn empty_scan_yields_empty_fallback() {
        let index = InMemoryVectorIndex::new(4);
        let settings = Settings::default();
        let q = query(vec!["exclusions"], vec![]);
        let results = anchor(&q, &index, None, &settings).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn no_fallback_keywords_short_circuits_before_scan() {
        let index = InMemoryVectorIndex::new(4);
        let settings = Settings::default();
        let q = query(vec![], vec![]);
        let results = anchor(&q, &index, None, &settings).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn scanned_records_without_metadata_text_are_skipped() {
        let index = InMemoryVectorIndex::new(2);
        let records = vec![crate::models::IndexRecord {
            chunk_id: "D:0".to_string(),
            embedding: vec![1.0, 0.0],
            metadata: BTreeMap::new(),
        }];
        index.replace_document("D", records).await.unwrap();
        let settings = Settings::default();
        let q = query(vec!["exclusions"], vec![]);
        let results = anchor(&q, &index, None, &settings).await.unwrap();
        assert!(results.is_empty());
    }
}
