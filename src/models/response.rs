use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::query::QueryContext;

/// Tagged response variant (spec §4.6 step 7, §9 "Polymorphism over response
/// variants"): each variant constrains which fields the assembler is
/// required to populate. `error` and `no_results` both carry empty
/// `sources`; every other variant carries at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    DirectAnswer,
    Procedural,
    Exclusion,
    Coverage,
    Claim,
    WaitingPeriod,
    Premium,
    Renewal,
    Termination,
    Limitation,
    General,
    Error,
    NoResults,
}

impl ResponseType {
    pub fn requires_empty_sources(&self) -> bool {
        matches!(self, ResponseType::Error | ResponseType::NoResults)
    }
}

/// Confidence breakdown (spec §3, §4.6 step 6).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Confidence {
    pub overall: f32,
    pub source_relevance: f32,
    pub response_completeness: f32,
    pub citation_quality: f32,
}

/// Discrete confidence band derived from `Confidence::overall` (spec §4.6
/// step 6): `>=0.8` high, `>=0.6` medium, `>=0.4` low, else very_low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
    VeryLow,
}

impl Confidence {
    pub fn level(&self) -> ConfidenceLevel {
        if self.overall >= 0.8 {
            ConfidenceLevel::High
        } else if self.overall >= 0.6 {
            ConfidenceLevel::Medium
        } else if self.overall >= 0.4 {
            ConfidenceLevel::Low
        } else {
            ConfidenceLevel::VeryLow
        }
    }
}

/// One citation surfaced to the caller, tying a clause identifier mentioned
/// in the answer back to the chunk it came from (spec §4.6 step 5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    pub chunk_id: String,
    pub doc_id: String,
    pub doc_title: String,
    pub section_anchor: Option<String>,
    pub section_title: Option<String>,
    pub page: Option<u32>,
    pub combined_score: f32,
    pub clause_references: Vec<ClauseReference>,
}

/// `{identifier, source_chunk_id, found_in_response}` (spec §4.6 step 5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClauseReference {
    pub identifier: String,
    pub source_chunk_id: String,
    pub found_in_response: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParameters {
    pub threshold_used: f32,
    pub adaptive: bool,
    pub method: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityIndicators {
    pub completeness: f32,
    pub specificity: f32,
    pub citation_count: usize,
}

/// Structured warning (spec §9: "Polymorphism over response variants" —
/// extended the same way to warnings: a fixed tagged set, not free strings,
/// so callers can branch on `kind` without string matching).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    LowConfidence { overall: f32 },
    FallbackUsed,
    ThresholdBelowMinimum { effective_threshold: f32, min: f32 },
    SubQuestionUnanswered { sub_question: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recommendation {
    RephraseQuestion,
    UploadAdditionalDocuments,
    NarrowQuestionScope,
}

/// Audit-trail entry (spec §4.6 step 9): one record per pipeline stage that
/// fired for this query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditTrailEntry {
    pub stage: String,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryAnalysis {
    pub intent: String,
    pub complexity: String,
    pub normalization_changed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceAnalysis {
    pub source_count: usize,
    pub documents_covered: usize,
    pub retrieval_method_counts: Vec<(String, usize)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explainability {
    pub query_analysis: QueryAnalysis,
    pub source_analysis: SourceAnalysis,
    pub audit_trail: Vec<AuditTrailEntry>,
}

/// `StructuredResponse` (spec §3): produced once per query, never mutated
/// thereafter. `response_type` constrains which of `answer`/`sources` are
/// meaningfully populated — see `ResponseType::requires_empty_sources`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredResponse {
    pub response_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub answer: String,
    pub response_type: ResponseType,
    pub category: Option<String>,
    pub query: QueryContext,
    pub confidence: Confidence,
    pub sources: Vec<SourceRef>,
    pub search_parameters: SearchParameters,
    pub quality_indicators: QualityIndicators,
    pub warnings: Vec<Warning>,
    pub recommendations: Vec<Recommendation>,
    pub explainability: Explainability,
}

impl StructuredResponse {
    /// Invariant from `ResponseType::requires_empty_sources`: `error` and
    /// `no_results` responses never carry sources.
    pub fn is_well_formed(&self) -> bool {
        if self.response_type.requires_empty_sources() {
            self.sources.is_empty()
        } else {
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_level_thresholds() {
        let c = |overall: f32| Confidence {
            overall,
            source_relevance: 0.0,
            response_completeness: 0.0,
            citation_quality: 0.0,
        };
        assert_eq!(c(0.95).level(), ConfidenceLevel::High);
        assert_eq!(c(0.8).level(), ConfidenceLevel::High);
        assert_eq!(c(0.7).level(), ConfidenceLevel::Medium);
        assert_eq!(c(0.6).level(), ConfidenceLevel::Medium);
        assert_eq!(c(0.5).level(), ConfidenceLevel::Low);
        assert_eq!(c(0.4).level(), ConfidenceLevel::Low);
        assert_eq!(c(0.1).level(), ConfidenceLevel::VeryLow);
    }

    #[test]
    fn error_and_no_results_require_empty_sources() {
        assert!(ResponseType::Error.requires_empty_sources());
        assert!(ResponseType::NoResults.requires_empty_sources());
        assert!(!ResponseType::DirectAnswer.requires_empty_sources());
    }
}
