use std::collections::BTreeMap;
use std::collections::HashMap;

use futures_util::future::join_all;

use crate::adapters::{retry_once, EmbeddingProvider, Filter, ScoredRecord, VectorIndex};
use crate::config::Settings;
use crate::domain::Category;
use crate::error::{CoreError, HardExternalError};
use crate::models::{MetadataValue, QueryContext, RetrievalMethod, RetrievalResult, StructuralRank};

use super::{keyword_score, rerank, threshold};

/// Below this many semantically-retrieved candidates, Stage 2 supplements
/// the pool with a bounded index scan (spec §4.3 Stage 2: "only when the
/// pool is below a configured floor"). Not part of `Settings` because the
/// spec's configuration surface (§6.5) does not list it as a tunable —
/// it is an internal stage-coupling constant, not an external contract.
const POOL_FLOOR: usize = 5;

const SCAN_LIMIT: usize = 1_000;

pub struct RetrieveOutcome {
    pub results: Vec<RetrievalResult>,
    pub effective_threshold: f32,
}

/// Stages 1-5 of the Hybrid Retriever (spec §4.3). Does not run the
/// keyword-anchoring fallback — callers invoke that separately when this
/// returns zero results (see `retrieval::retrieve_with_fallback`).
pub async fn retrieve(
    query: &QueryContext,
    embedder: &dyn EmbeddingProvider,
    index: &dyn VectorIndex,
    settings: &Settings,
    base_threshold: f32,
    return_count: usize,
    filter: Option<&Filter>,
) -> Result<RetrieveOutcome, CoreError> {
    // Stage 1: semantic fan-out over up to `max_query_variants` phrasings.
    let variants = query_variants(query, settings.max_query_variants);
    let embeddings = retry_once(
        || embedder.embed(&variants),
        HardExternalError::Embedding,
    )
    .await?;

    let mut fan_out = Vec::with_capacity(embeddings.len());
    for vector in &embeddings {
        fan_out.push(retry_once(
            || index.query(vector, settings.semantic_top_k, filter),
            HardExternalError::Index,
        ));
    }
    let query_results = join_all(fan_out).await;

    let mut merged: HashMap<String, ScoredRecord> = HashMap::new();
    for outcome in query_results {
        let scored = outcome?;
        for candidate in scored {
            merged
                .entry(candidate.chunk_id.clone())
                .and_modify(|existing| {
                    if candidate.score > existing.score {
                        *existing = candidate.clone();
                    }
                })
                .or_insert(candidate);
        }
    }

    // Stage 2: keyword scoring, with a bounded scan supplement below the floor.
    if merged.len() < POOL_FLOOR {
        let scanned = retry_once(|| index.scan(filter, SCAN_LIMIT), HardExternalError::Index).await?;
        for record in scanned {
            merged.entry(record.chunk_id.clone()).or_insert(ScoredRecord {
                chunk_id: record.chunk_id,
                score: 0.0,
                metadata: record.metadata,
            });
        }
    }

    let mut semantic_scores = Vec::with_capacity(merged.len());
    let mut results: Vec<RetrievalResult> = Vec::with_capacity(merged.len());

    for record in merged.into_values() {
        let text = extract_text(&record.metadata);
        semantic_scores.push(record.score);

        let (keyword, matched_keywords) = if settings.enable_hybrid_search {
            let scored = keyword_score::score(&text, &query.keywords);
            (scored.score, scored.matched_keywords)
        } else {
            (0.0, Vec::new())
        };

        let combined = if settings.enable_hybrid_search {
            (settings.semantic_weight * record.score + settings.keyword_weight * keyword)
                .clamp(0.0, 1.0)
        } else {
            record.score.clamp(0.0, 1.0)
        };

        results.push(RetrievalResult {
            chunk_id: record.chunk_id,
            text,
            metadata: record.metadata,
            semantic_score: record.score,
            keyword_score: keyword,
            combined_score: combined,
            structural_rank: StructuralRank::NO_OVERLAP,
            retrieval_method: if settings.enable_hybrid_search {
                RetrievalMethod::Hybrid
            } else {
                RetrievalMethod::Semantic
            },
            matched_keywords,
        });
    }

    // Stage 4: adaptive thresholding, with relaxation if below the floor.
    let effective_threshold = if settings.adaptive_threshold {
        threshold::effective_threshold(
            base_threshold,
            &semantic_scores,
            settings.min_similarity_threshold,
            settings.medium_similarity_threshold,
            settings.high_similarity_threshold,
        )
    } else {
        base_threshold.clamp(
            settings.min_similarity_threshold,
            settings.high_similarity_threshold,
        )
    };

    let mut survivors: Vec<RetrievalResult> = results
        .iter()
        .filter(|r| r.combined_score >= effective_threshold)
        .cloned()
        .collect();

    if survivors.len() < settings.min_results_required {
        survivors = results
            .iter()
            .filter(|r| r.combined_score >= settings.min_similarity_threshold)
            .cloned()
            .collect();
        survivors.sort_by(RetrievalResult::cmp_by_rank_score_id);
        survivors.truncate(settings.min_results_required);
    }

    // Stage 5: structural re-rank, intent boost, final truncation.
    for candidate in survivors.iter_mut() {
        candidate.structural_rank = rerank::structural_rank(&query.matched_categories, &candidate.text);
    }
    survivors.sort_by(RetrievalResult::cmp_by_rank_score_id);
    rerank::apply_intent_boost(&mut survivors, query.intent);
    survivors.truncate(return_count);

    Ok(RetrieveOutcome {
        results: survivors,
        effective_threshold,
    })
}

fn extract_text(metadata: &BTreeMap<String, MetadataValue>) -> String {
    metadata
        .get("text")
        .and_then(MetadataValue::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Up to `max_variants` phrasings (spec §4.3 Stage 1): the original
/// question, its normalized form, and intent-expanded phrasings built by
/// appending a matched category's leading surface form.
fn query_variants(query: &QueryContext, max_variants: usize) -> Vec<String> {
    let mut variants = vec![query.raw.clone(), query.normalized.clone()];
    for name in &query.matched_categories {
        if variants.len() >= max_variants {
            break;
        }
        if let Some(category) = Category::all().iter().find(|c| c.as_str() == name) {
            if let Some(form) = category.surface_forms().first() {
                variants.push(format!("{} {}", query.normalized, form));
            }
        }
    }
    variants.dedup();
    variants.truncate(max_variants.min(5));
    variants
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_variants_include_original_and_normalized() {
        let query = QueryContext {
            raw: "What are the PED exclusions?".to_string(),
            normalized: "what are the preexisting diseases exclusions?".to_string(),
            intent: crate::models::Intent::Exclusion,
            matched_categories: vec!["exclusions".to_string(), "preexisting_diseases".to_string()],
            intent_confidence: 0.2,
            complexity: crate::models::Complexity::Low,
            keywords: vec!["exclusions".to_string()],
            sub_questions: vec!["what are the preexisting diseases exclusions?".to_string()],
        };
        let variants = query_variants(&query, 5);
        assert!(variants.contains(&query.raw));
        assert!(variants.contains(&query.normalized));
        assert!(variants.len() <= 5);
    }

    #[test]
    fn query_variants_respects_max_variants_cap() {
        let query = QueryContext {
            raw: "q".to_string(),
            normalized: "q".to_string(),
            intent: crate::models::Intent::InformationSeeking,
            matched_categories: vec![
                "exclusions".to_string(),
                "coverage".to_string(),
                "claims".to_string(),
                "deductibles".to_string(),
            ],
            intent_confidence: 0.4,
            complexity: crate::models::Complexity::Low,
            keywords: vec![],
            sub_questions: vec!["q?".to_string()],
        };
        let variants = query_variants(&query, 3);
        assert!(variants.len() <= 3);
    }
}
