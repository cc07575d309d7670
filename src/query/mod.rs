//! Query Normalizer & Intent Analyzer (spec §4.2). Grounded on
//! `pipeline/rag/classify.rs::classify_query`'s pattern-matching style and
//! `extract_medical_keywords`, generalized from a fixed if-chain over
//! patient-query categories to a domain-dictionary-driven count with a
//! documented priority tiebreak.

pub mod intent;
pub mod normalizer;
pub mod subquestion;

use crate::models::QueryContext;

/// Build a complete `QueryContext` from a raw user question (spec §3, §4.2):
/// normalize, detect sub-questions, extract keywords, and classify intent.
pub fn analyze(raw: &str) -> QueryContext {
    let normalized = normalizer::normalize(raw);
    let sub_questions = subquestion::split(&normalized);
    let keywords = normalizer::extract_keywords(&normalized);
    let classification = intent::classify(&normalized);
    let word_count = normalized.split_whitespace().count();

    QueryContext {
        raw: raw.to_string(),
        normalized,
        intent: classification.primary_intent,
        matched_categories: classification.matched_categories,
        intent_confidence: classification.confidence,
        complexity: intent::complexity(
            word_count,
            sub_questions.len(),
            classification.matched_category_count,
        ),
        keywords,
        sub_questions,
    }
}
