use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::index_record::MetadataValue;

/// How a `RetrievalResult` reached the candidate pool (spec §3, §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalMethod {
    Semantic,
    KeywordAnchoring,
    Hybrid,
}

/// Structural rank bucket (spec §3, §4.4): 1 is best (shared category
/// between query and candidate), 3 is worst (no overlap). Buckets never
/// cross during re-ranking — ordering within a bucket is by `combined_score`
/// only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StructuralRank(u8);

impl StructuralRank {
    pub const CATEGORY_MATCH: StructuralRank = StructuralRank(1);
    pub const GENERIC_TERM_OVERLAP: StructuralRank = StructuralRank(2);
    pub const NO_OVERLAP: StructuralRank = StructuralRank(3);

    pub fn value(&self) -> u8 {
        self.0
    }
}

/// A single ranked candidate surviving the Hybrid Retriever pipeline (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub chunk_id: String,
    pub text: String,
    pub metadata: BTreeMap<String, MetadataValue>,
    pub semantic_score: f32,
    pub keyword_score: f32,
    /// Invariant (spec §3): `combined_score ∈ [0,1]`.
    pub combined_score: f32,
    pub structural_rank: StructuralRank,
    pub retrieval_method: RetrievalMethod,
    pub matched_keywords: Vec<String>,
}

impl RetrievalResult {
    /// Total ordering used to sort the final result list (spec §4.3, §5):
    /// `(structural_rank asc, combined_score desc, chunk_id asc)`. `f32`
    /// has no `Ord` impl, so this is a comparator rather than a sort key.
    pub fn cmp_by_rank_score_id(a: &RetrievalResult, b: &RetrievalResult) -> std::cmp::Ordering {
        a.structural_rank
            .value()
            .cmp(&b.structural_rank.value())
            .then_with(|| {
                b.combined_score
                    .partial_cmp(&a.combined_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.chunk_id.cmp(&b.chunk_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(chunk_id: &str, rank: StructuralRank, score: f32) -> RetrievalResult {
        RetrievalResult {
            chunk_id: chunk_id.into(),
            text: "text".into(),
            metadata: BTreeMap::new(),
            semantic_score: score,
            keyword_score: 0.0,
            combined_score: score,
            structural_rank: rank,
            retrieval_method: RetrievalMethod::Semantic,
            matched_keywords: Vec::new(),
        }
    }

    #[test]
    fn ordering_prefers_lower_structural_rank_first() {
        let best = result("b", StructuralRank::CATEGORY_MATCH, 0.1);
        let worse = result("a", StructuralRank::NO_OVERLAP, 0.9);
        assert_eq!(
            RetrievalResult::cmp_by_rank_score_id(&best, &worse),
            std::cmp::Ordering::Less
        );
    }

    #[test]
    fn ordering_within_bucket_prefers_higher_score() {
        let higher = result("a", StructuralRank::CATEGORY_MATCH, 0.9);
        let lower = result("b", StructuralRank::CATEGORY_MATCH, 0.1);
        assert_eq!(
            RetrievalResult::cmp_by_rank_score_id(&higher, &lower),
            std::cmp::Ordering::Less
        );
    }

    #[test]
    fn ordering_tiebreak_is_ascending_chunk_id() {
        let a = result("a", StructuralRank::CATEGORY_MATCH, 0.5);
        let b = result("b", StructuralRank::CATEGORY_MATCH, 0.5);
        assert_eq!(
            RetrievalResult::cmp_by_rank_score_id(&a, &b),
            std::cmp::Ordering::Less
        );
    }
}
