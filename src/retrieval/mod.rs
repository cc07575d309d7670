//! Retrieval stack (spec §4.3-§4.5): adaptive threshold, structural
//! re-rank, keyword-anchoring fallback, and the Hybrid Retriever that
//! sequences semantic fan-out through both. Dependency order follows
//! spec §2 (leaves first): `threshold` and `rerank` have no intra-crate
//! dependents besides each other's callers, `fallback` depends on
//! `rerank`/`keyword_score`, and `hybrid` depends on all three.

pub mod fallback;
pub mod hybrid;
pub mod keyword_score;
pub mod rerank;
pub mod threshold;

pub use hybrid::RetrieveOutcome;

use crate::adapters::{EmbeddingProvider, Filter, VectorIndex};
use crate::config::Settings;
use crate::error::CoreError;
use crate::models::{QueryContext, RetrievalMethod, RetrievalResult};

/// Outcome of the full retrieval stage, including whether the
/// keyword-anchoring fallback had to run (spec §4.6 step 5 needs this to
/// raise a `fallback_used` warning).
pub struct RetrievalOutcome {
    pub results: Vec<RetrievalResult>,
    pub effective_threshold: f32,
    pub fallback_used: bool,
}

/// Runs the Hybrid Retriever (spec §4.3) and, only if it returns zero
/// candidates and `Settings::enable_keyword_anchoring` is set, falls back
/// to keyword anchoring (spec §4.5). This is the `retrieval` crate's single
/// public entry point, matching the dependency order's final leaf before
/// the response assembler.
pub async fn retrieve_with_fallback(
    query: &QueryContext,
    embedder: &dyn EmbeddingProvider,
    index: &dyn VectorIndex,
    settings: &Settings,
    base_threshold: f32,
    return_count: usize,
    filter: Option<&Filter>,
) -> Result<RetrievalOutcome, CoreError> {
    let outcome = hybrid::retrieve(
        query,
        embedder,
        index,
        settings,
        base_threshold,
        return_count,
        filter,
    )
    .await?;

    if !outcome.results.is_empty() || !settings.enable_keyword_anchoring {
        return Ok(RetrievalOutcome {
            results: outcome.results,
            effective_threshold: outcome.effective_threshold,
            fallback_used: false,
        });
    }

    let fallback_results = fallback::anchor(query, index, filter, settings).await?;
    Ok(RetrievalOutcome {
        fallback_used: !fallback_results.is_empty(),
        results: fallback_results,
        effective_threshold: outcome.effective_threshold,
    })
}

/// True when every result in `results` came from keyword anchoring rather
/// than semantic or hybrid scoring, used by the assembler's warning logic
/// (spec §4.6 step 8).
pub fn all_keyword_anchored(results: &[RetrievalResult]) -> bool {
    !results.is_empty()
        && results
            .iter()
            .all(|r| r.retrieval_method == RetrievalMethod::KeywordAnchoring)
}
