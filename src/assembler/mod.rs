//! Response Assembler (spec §4.6): builds the grounded prompt, calls the
//! external LLM, extracts citations, computes confidence, and assembles the
//! final `StructuredResponse`. Grounded on `pipeline/rag/orchestrator.rs`'s
//! numbered-step `generate` method and `pipeline/rag/citation.rs`'s
//! confidence/citation shape, generalized from patient-conversation
//! responses to the tagged `ResponseType` variant set this spec requires.

pub mod citation;
pub mod confidence;
pub mod context_format;
pub mod explainability;
pub mod prompt;
pub mod response_type;
pub mod warnings;

use chrono::Utc;
use uuid::Uuid;

use crate::adapters::{retry_once, LlmProvider};
use crate::config::Settings;
use crate::error::{CoreError, HardExternalError};
use crate::models::{
    Confidence, Explainability, QualityIndicators, QueryContext, Recommendation, ResponseType,
    RetrievalResult, SearchParameters, SourceRef, StructuredResponse, Warning,
};

const DEFAULT_STAGES: &[&str] = &[
    "received",
    "normalized",
    "intent_analyzed",
    "retrieved",
    "ranked",
];

/// Assemble a successful `StructuredResponse` from ranked retrieval results
/// (spec §4.6 steps 1-9). Callers invoke this only once the retrieval stage
/// has produced at least one survivor — zero survivors goes through
/// `no_results_response` instead.
pub async fn assemble(
    query: &QueryContext,
    results: &[RetrievalResult],
    effective_threshold: f32,
    fallback_used: bool,
    settings: &Settings,
    llm: &dyn LlmProvider,
) -> Result<StructuredResponse, CoreError> {
    // Step 1: context formatting.
    let blocks = context_format::format_context(results);

    // Step 2: prompt construction.
    let system = prompt::system_directive(query);
    let user = prompt::user_block(query, &blocks);

    // Step 3: LLM call, one retry on transient failure (spec §4.6 step 3, §7).
    tracing::debug!(sub_questions = query.sub_questions.len(), "prompting llm");
    let answer = retry_once(
        || llm.complete(&system, &user, settings.llm_max_tokens, settings.llm_temperature),
        HardExternalError::Llm,
    )
    .await?;

    // Step 4: completeness check against sub-questions.
    let unanswered = warnings::unanswered_sub_questions(&answer, &query.sub_questions);

    // Step 5: citation extraction.
    let clause_references = citation::extract_clause_references(&answer, &blocks);
    let citations_in_answer = citation::citation_count(&clause_references);

    // Step 6: confidence.
    let confidence = confidence::compute(
        results,
        &answer,
        query.sub_questions.len(),
        unanswered.is_empty(),
        citations_in_answer,
        settings.llm_max_tokens,
    );

    // Step 7: response type.
    let response_type = response_type::classify(query.intent, &answer);

    // Step 8: warnings and recommendations.
    let (response_warnings, recommendations) = warnings::build(
        &confidence,
        fallback_used,
        effective_threshold,
        settings.min_similarity_threshold,
        &unanswered,
    );

    // Step 9: explainability.
    let explainability = explainability::build(
        query,
        results,
        effective_threshold,
        fallback_used,
        DEFAULT_STAGES,
    );

    let sources = build_sources(results, &clause_references);
    let quality_indicators = QualityIndicators {
        completeness: confidence.response_completeness,
        specificity: specificity(results),
        citation_count: citations_in_answer,
    };

    tracing::info!(
        response_type = ?response_type,
        confidence = confidence.overall,
        sources = sources.len(),
        "assembled response"
    );

    Ok(StructuredResponse {
        response_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        answer,
        response_type,
        category: query.matched_categories.first().cloned(),
        query: query.clone(),
        confidence,
        sources,
        search_parameters: search_parameters(settings, effective_threshold, fallback_used),
        quality_indicators,
        warnings: response_warnings,
        recommendations,
        explainability,
    })
}

/// `response_type=no_results` (spec §4.6 state machine, §7: "not an error").
/// Sources empty; warnings populated per spec §7.
pub fn no_results_response(
    query: QueryContext,
    effective_threshold: f32,
    settings: &Settings,
) -> StructuredResponse {
    let confidence = Confidence {
        overall: 0.0,
        source_relevance: 0.0,
        response_completeness: 0.0,
        citation_quality: 0.0,
    };
    let explainability = explainability::build(&query, &[], effective_threshold, false, DEFAULT_STAGES);
    StructuredResponse {
        response_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        answer: String::new(),
        response_type: ResponseType::NoResults,
        category: None,
        query,
        confidence,
        sources: Vec::new(),
        search_parameters: search_parameters(settings, effective_threshold, false),
        quality_indicators: QualityIndicators {
            completeness: 0.0,
            specificity: 0.0,
            citation_count: 0,
        },
        warnings: vec![Warning::ThresholdBelowMinimum {
            effective_threshold,
            min: settings.min_similarity_threshold,
        }],
        recommendations: vec![
            Recommendation::RephraseQuestion,
            Recommendation::UploadAdditionalDocuments,
        ],
        explainability,
    }
}

/// `response_type=error` (spec §4.6 state machine, §7: "the caller receives
/// a well-formed envelope, never a bare fault"). `stage` names the pipeline
/// stage that failed, recorded in the explainability audit trail.
pub fn error_response(
    query: QueryContext,
    effective_threshold: f32,
    settings: &Settings,
    stage: &str,
    detail: &str,
) -> StructuredResponse {
    tracing::warn!(stage, detail, "query failed, returning error envelope");
    let confidence = Confidence {
        overall: 0.0,
        source_relevance: 0.0,
        response_completeness: 0.0,
        citation_quality: 0.0,
    };
    let mut explainability = explainability::build(&query, &[], effective_threshold, false, DEFAULT_STAGES);
    explainability.audit_trail.push(crate::models::AuditTrailEntry {
        stage: stage.to_string(),
        detail: detail.to_string(),
    });
    StructuredResponse {
        response_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        answer: String::new(),
        response_type: ResponseType::Error,
        category: None,
        query,
        confidence,
        sources: Vec::new(),
        search_parameters: search_parameters(settings, effective_threshold, false),
        quality_indicators: QualityIndicators {
            completeness: 0.0,
            specificity: 0.0,
            citation_count: 0,
        },
        warnings: Vec::new(),
        recommendations: Vec::new(),
        explainability,
    }
}

fn search_parameters(settings: &Settings, effective_threshold: f32, fallback_used: bool) -> SearchParameters {
    let method = if fallback_used {
        "keyword_anchoring"
    } else if settings.enable_hybrid_search {
        "hybrid"
    } else {
        "semantic"
    };
    SearchParameters {
        threshold_used: effective_threshold,
        adaptive: settings.adaptive_threshold,
        method: method.to_string(),
    }
}

fn build_sources(
    results: &[RetrievalResult],
    clause_references: &[crate::models::ClauseReference],
) -> Vec<SourceRef> {
    results
        .iter()
        .map(|result| {
            let doc_id = metadata_str(result, "doc_id").unwrap_or_default();
            let doc_title = metadata_str(result, "doc_title").unwrap_or_default();
            let section_anchor = metadata_str(result, "section_anchor");
            let section_title = metadata_str(result, "section_title");
            let page = match result.metadata.get("page") {
                Some(crate::models::MetadataValue::Number(n)) => Some(*n as u32),
                _ => None,
            };
            let references: Vec<_> = clause_references
                .iter()
                .filter(|r| r.source_chunk_id == result.chunk_id)
                .cloned()
                .collect();
            SourceRef {
                chunk_id: result.chunk_id.clone(),
                doc_id,
                doc_title,
                section_anchor,
                section_title,
                page,
                combined_score: result.combined_score,
                clause_references: references,
            }
        })
        .collect()
}

fn metadata_str(result: &RetrievalResult, key: &str) -> Option<String> {
    result
        .metadata
        .get(key)
        .and_then(crate::models::MetadataValue::as_str)
        .map(str::to_string)
}

/// Mean `combined_score` across all surfaced sources, used as a proxy for
/// how precisely the retrieved material matches the query (spec §3
/// `quality_indicators.specificity` names no exact formula).
fn specificity(results: &[RetrievalResult]) -> f32 {
    if results.is_empty() {
        return 0.0;
    }
    results.iter().map(|r| r.combined_score).sum::<f32>() / results.len() as f32
}
