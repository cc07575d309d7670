use std::collections::BTreeSet;

use crate::models::{
    AuditTrailEntry, Explainability, MetadataValue, QueryAnalysis, QueryContext, RetrievalMethod,
    RetrievalResult, SourceAnalysis,
};

fn query_analysis(query: &QueryContext) -> QueryAnalysis {
    QueryAnalysis {
        intent: query.intent.as_str().to_string(),
        complexity: format!("{:?}", query.complexity).to_lowercase(),
        normalization_changed: query.raw.trim().to_lowercase() != query.normalized,
    }
}

fn source_analysis(results: &[RetrievalResult]) -> SourceAnalysis {
    let documents_covered = results
        .iter()
        .filter_map(|r| r.metadata.get("doc_id").and_then(MetadataValue::as_str))
        .collect::<BTreeSet<_>>()
        .len();

    let mut counts: Vec<(String, usize)> = Vec::new();
    for method in [
        RetrievalMethod::Semantic,
        RetrievalMethod::KeywordAnchoring,
        RetrievalMethod::Hybrid,
    ] {
        let count = results.iter().filter(|r| r.retrieval_method == method).count();
        if count > 0 {
            counts.push((method_name(method).to_string(), count));
        }
    }

    SourceAnalysis {
        source_count: results.len(),
        documents_covered,
        retrieval_method_counts: counts,
    }
}

fn method_name(method: RetrievalMethod) -> &'static str {
    match method {
        RetrievalMethod::Semantic => "semantic",
        RetrievalMethod::KeywordAnchoring => "keyword_anchoring",
        RetrievalMethod::Hybrid => "hybrid",
    }
}

/// Build the explainability record (spec §4.6 step 9): query analysis,
/// source analysis, and a minimal audit trail of the stages that fired.
pub fn build(
    query: &QueryContext,
    results: &[RetrievalResult],
    effective_threshold: f32,
    fallback_used: bool,
    stages: &[&str],
) -> Explainability {
    let mut audit_trail: Vec<AuditTrailEntry> = stages
        .iter()
        .map(|stage| AuditTrailEntry {
            stage: stage.to_string(),
            detail: String::new(),
        })
        .collect();
    audit_trail.push(AuditTrailEntry {
        stage: "adaptive_threshold".to_string(),
        detail: format!("effective_threshold={effective_threshold:.3}"),
    });
    if fallback_used {
        audit_trail.push(AuditTrailEntry {
            stage: "keyword_anchoring_fallback".to_string(),
            detail: "activated after zero hybrid survivors".to_string(),
        });
    }

    Explainability {
        query_analysis: query_analysis(query),
        source_analysis: source_analysis(results),
        audit_trail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Complexity, Intent, StructuralRank};
    use std::collections::BTreeMap;

    fn query() -> QueryContext {
        QueryContext {
            raw: "What is  excluded?".to_string(),
            normalized: "what is excluded?".to_string(),
            intent: Intent::Exclusion,
            matched_categories: vec!["exclusions".to_string()],
            intent_confidence: 1.0,
            complexity: Complexity::Low,
            keywords: vec!["excluded".to_string()],
            sub_questions: vec!["what is excluded?".to_string()],
        }
    }

    fn result(doc_id: &str, method: RetrievalMethod) -> RetrievalResult {
        let mut metadata = BTreeMap::new();
        metadata.insert("doc_id".to_string(), MetadataValue::String(doc_id.to_string()));
        RetrievalResult {
            chunk_id: format!("{doc_id}:0"),
            text: "text".to_string(),
            metadata,
            semantic_score: 0.5,
            keyword_score: 0.5,
            combined_score: 0.5,
            structural_rank: StructuralRank::CATEGORY_MATCH,
            retrieval_method: method,
            matched_keywords: vec![],
        }
    }

    #[test]
    fn documents_covered_counts_distinct_doc_ids() {
        let results = vec![
            result("A", RetrievalMethod::Hybrid),
            result("A", RetrievalMethod::Hybrid),
            result("B", RetrievalMethod::Hybrid),
        ];
        let analysis = source_analysis(&results);
        assert_eq!(analysis.documents_covered, 2);
        assert_eq!(analysis.source_count, 3);
    }

    #[test]
    fn audit_trail_records_fallback_when_used() {
        let explainability = build(&query(), &[], 0.5, true, &["received", "retrieved"]);
        assert!(explainability
            .audit_trail
            .iter()
            .any(|e| e.stage == "keyword_anchoring_fallback"));
    }

    #[test]
    fn normalization_changed_true_when_raw_differs_from_normalized() {
        let analysis = query_analysis(&query());
        assert!(analysis.normalization_changed);
    }
}
