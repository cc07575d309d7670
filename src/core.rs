//! Public operations (spec §6.4): `ingest`, `query`, `analyze`. `Core` wires
//! the Chunker, Query Normalizer/Intent Analyzer, Hybrid Retriever, and
//! Response Assembler together over the three external-adapter traits.
//!
//! Grounded on `pipeline/storage/orchestrator.rs::DocumentStoragePipeline`
//! (ingest-side: chunk → embed → store, a struct holding trait-object
//! collaborators) and `pipeline/rag/orchestrator.rs::DocumentRagPipeline`
//! (query-side: numbered-step `generate` method, with its
//! `no_context_result` early-exit generalized into this crate's
//! `no_results`/`error` response-type handling).

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::{retry_once, EmbeddingProvider, Filter, LlmProvider, VectorIndex};
use crate::assembler;
use crate::chunking;
use crate::config::Settings;
use crate::domain::Category;
use crate::error::{CoreError, HardExternalError, ValidationError};
use crate::models::{
    index_record::validate_metadata_json, ChunkingMethod, Complexity, Intent, IndexRecord,
    MetadataValue, QueryContext, StructuredResponse,
};
use crate::query;

/// Upper bound on a raw question's length (spec §7: "oversized payload").
/// Chosen generously relative to a legal/insurance question; no production
/// question this system is meant to field approaches it.
const MAX_QUESTION_CHARS: usize = 4_000;

/// Default number of results returned to the caller when `query()` omits
/// `top_k` — distinct from `Settings::semantic_top_k`, which bounds Stage
/// 1's per-variant candidate pool rather than the final truncation count
/// (spec §4.3 Stage 1: "independent of the caller's requested result count").
const DEFAULT_RETURN_COUNT: usize = 5;

/// `ingest()`'s return shape (spec §6.4).
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub chunks_written: usize,
    pub warnings: Vec<String>,
}

/// `analyze()`'s return shape (spec §6.4): diagnostic view of the same
/// `QueryContext` fields the hybrid retriever consumes.
#[derive(Debug, Clone)]
pub struct AnalyzeOutcome {
    pub normalized: String,
    pub intent: Intent,
    pub complexity: Complexity,
    pub sub_questions: Vec<String>,
    pub matched_categories: Vec<String>,
}

/// Ties the three external collaborators (spec §6.1-6.3) to the
/// normalizer/chunker/retriever/assembler pipeline. Holds no mutable state
/// of its own beyond the frozen `Settings` — safe to share behind an `Arc`
/// across concurrently-running queries (spec §5).
pub struct Core {
    settings: Arc<Settings>,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    llm: Arc<dyn LlmProvider>,
}

impl Core {
    /// Construct and validate a `Core`. Configuration errors (inconsistent
    /// thresholds, fusion weights not summing to 1, a dimension mismatch
    /// against the embedding provider) are raised here, before any external
    /// call is made (spec §7).
    pub fn new(
        settings: Settings,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        llm: Arc<dyn LlmProvider>,
    ) -> Result<Self, CoreError> {
        settings.validate()?;
        settings.validate_against_index_dimension(embedder.dimension())?;
        Ok(Self {
            settings: Arc::new(settings),
            embedder,
            index,
            llm,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Diagnostic entry point (spec §6.4): normalize, decompose, and
    /// classify a question without running retrieval or the LLM.
    pub fn analyze(&self, question: &str) -> Result<AnalyzeOutcome, CoreError> {
        validate_question(question)?;
        let ctx = query::analyze(question);
        Ok(AnalyzeOutcome {
            normalized: ctx.normalized,
            intent: ctx.intent,
            complexity: ctx.complexity,
            sub_questions: ctx.sub_questions,
            matched_categories: ctx.matched_categories,
        })
    }

    /// Idempotent by `doc_id` (spec §6.4): re-ingestion replaces all prior
    /// chunks for that id atomically, via the index adapter's
    /// `replace_document` (spec §5, §8 scenario 6).
    #[tracing::instrument(skip(self, raw_text, caller_metadata), fields(doc_id))]
    pub async fn ingest(
        &self,
        doc_id: &str,
        doc_type: &str,
        doc_title: &str,
        raw_text: &str,
        caller_metadata: Option<BTreeMap<String, serde_json::Value>>,
    ) -> Result<IngestOutcome, CoreError> {
        if doc_id.trim().is_empty() {
            return Err(ValidationError::EmptyDocumentId.into());
        }
        if raw_text.trim().is_empty() {
            return Err(ValidationError::EmptyDocument.into());
        }
        let caller_metadata = caller_metadata.unwrap_or_default();
        for (key, value) in &caller_metadata {
            validate_metadata_json(key, value)?;
        }

        let chunks = chunking::chunk_document(
            doc_id,
            doc_title,
            doc_type,
            raw_text,
            self.settings.chunk_size,
            self.settings.chunk_overlap,
        );
        if chunks.is_empty() {
            return Ok(IngestOutcome {
                chunks_written: 0,
                warnings: vec!["document produced no chunks".to_string()],
            });
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = retry_once(|| self.embedder.embed(&texts), HardExternalError::Embedding).await?;
        if vectors.len() != chunks.len() {
            return Err(CoreError::Internal(format!(
                "embedding provider returned {} vectors for {} chunks",
                vectors.len(),
                chunks.len()
            )));
        }

        let mut warnings = Vec::new();
        let mut records = Vec::with_capacity(chunks.len());
        for (chunk, vector) in chunks.into_iter().zip(vectors) {
            if vector.len() != self.settings.embedding_dimension {
                return Err(CoreError::HardExternal(HardExternalError::Embedding(format!(
                    "embedding dimension {} does not match configured {}",
                    vector.len(),
                    self.settings.embedding_dimension
                ))));
            }
            if vector.iter().all(|v| *v == 0.0) {
                return Err(CoreError::HardExternal(HardExternalError::Embedding(
                    "embedding provider returned an all-zero vector".to_string(),
                )));
            }

            let mut metadata: BTreeMap<String, MetadataValue> = BTreeMap::new();
            metadata.insert("doc_id".into(), MetadataValue::String(chunk.doc_id.clone()));
            metadata.insert("doc_title".into(), MetadataValue::String(chunk.doc_title.clone()));
            if let Some(anchor) = &chunk.section_anchor {
                metadata.insert("section_anchor".into(), MetadataValue::String(anchor.clone()));
            }
            if let Some(title) = &chunk.section_title {
                metadata.insert("section_title".into(), MetadataValue::String(title.clone()));
            }
            if let Some(category) = crate::domain::classify_text(&chunk.text) {
                metadata.insert("category".into(), MetadataValue::String(category.as_str().to_string()));
            }
            if let Some(page) = chunk.page {
                metadata.insert("page".into(), MetadataValue::Number(page as f64));
            }
            metadata.insert("word_count".into(), MetadataValue::Number(chunk.word_count as f64));
            metadata.insert("legal_density".into(), MetadataValue::Number(chunk.legal_density as f64));
            metadata.insert(
                "is_legal_document".into(),
                MetadataValue::Bool(chunk.legal_density > 0.01),
            );
            metadata.insert(
                "legal_terms".into(),
                MetadataValue::StringList(chunk.legal_terms.iter().map(|t| t.term.clone()).collect()),
            );
            metadata.insert(
                "chunking_method".into(),
                MetadataValue::String(chunk_method_str(chunk.chunking_method).to_string()),
            );
            metadata.insert("text".into(), MetadataValue::String(chunk.text.clone()));
            for (key, value) in &caller_metadata {
                metadata.insert(key.clone(), json_to_metadata_value(value));
            }

            records.push(IndexRecord {
                chunk_id: chunk.chunk_id,
                embedding: vector,
                metadata,
            });
        }

        let written = retry_once(
            || self.index.replace_document(doc_id, records.clone()),
            HardExternalError::Index,
        )
        .await?;

        tracing::info!(doc_id, chunks_written = written, "document ingested");
        Ok(IngestOutcome {
            chunks_written: written,
            warnings,
        })
    }

    /// Full query pipeline (spec §2 data flow, §4.6 state machine): normalize
    /// → analyze intent → retrieve (with fallback) → assemble. Every
    /// external-I/O stage runs under the per-query deadline (spec §5);
    /// hard external failures and a deadline overrun both produce an
    /// `error`-kind `StructuredResponse` rather than a bare `Err` — only
    /// validation/configuration failures propagate as `Err` (spec §7).
    #[tracing::instrument(skip(self, filter), fields(question_len = question.len()))]
    pub async fn query(
        &self,
        question: &str,
        top_k: Option<usize>,
        base_threshold: Option<f32>,
        filter: Option<Filter>,
    ) -> Result<StructuredResponse, CoreError> {
        validate_question(question)?;

        let query_ctx = query::analyze(question);
        let return_count = top_k.unwrap_or(DEFAULT_RETURN_COUNT).max(1);
        let base_threshold = base_threshold
            .unwrap_or(self.settings.min_similarity_threshold)
            .clamp(self.settings.min_similarity_threshold, self.settings.high_similarity_threshold);

        let deadline = Duration::from_millis(self.settings.query_deadline_ms);
        let retrieval = tokio::time::timeout(
            deadline,
            crate::retrieval::retrieve_with_fallback(
                &query_ctx,
                self.embedder.as_ref(),
                self.index.as_ref(),
                &self.settings,
                base_threshold,
                return_count,
                filter.as_ref(),
            ),
        )
        .await;

        let outcome = match retrieval {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(CoreError::HardExternal(hard))) => {
                return Ok(assembler::error_response(
                    query_ctx,
                    base_threshold,
                    &self.settings,
                    "retrieval",
                    &hard.to_string(),
                ));
            }
            Ok(Err(other)) => return Err(other),
            Err(_elapsed) => {
                let hard = HardExternalError::DeadlineExceeded {
                    deadline_ms: self.settings.query_deadline_ms,
                    stage: "retrieval",
                };
                return Ok(assembler::error_response(
                    query_ctx,
                    base_threshold,
                    &self.settings,
                    "retrieval",
                    &hard.to_string(),
                ));
            }
        };

        if outcome.results.is_empty() {
            return Ok(assembler::no_results_response(
                query_ctx,
                outcome.effective_threshold,
                &self.settings,
            ));
        }

        let assembled = tokio::time::timeout(
            deadline,
            assembler::assemble(
                &query_ctx,
                &outcome.results,
                outcome.effective_threshold,
                outcome.fallback_used,
                &self.settings,
                self.llm.as_ref(),
            ),
        )
        .await;

        match assembled {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(CoreError::HardExternal(hard))) => Ok(assembler::error_response(
                query_ctx,
                outcome.effective_threshold,
                &self.settings,
                "assembly",
                &hard.to_string(),
            )),
            Ok(Err(other)) => Err(other),
            Err(_elapsed) => {
                let hard = HardExternalError::DeadlineExceeded {
                    deadline_ms: self.settings.query_deadline_ms,
                    stage: "assembly",
                };
                Ok(assembler::error_response(
                    query_ctx,
                    outcome.effective_threshold,
                    &self.settings,
                    "assembly",
                    &hard.to_string(),
                ))
            }
        }
    }
}

fn validate_question(question: &str) -> Result<(), ValidationError> {
    if question.trim().is_empty() {
        return Err(ValidationError::EmptyQuestion);
    }
    if question.len() > MAX_QUESTION_CHARS {
        return Err(ValidationError::QuestionTooLong {
            max: MAX_QUESTION_CHARS,
            actual: question.len(),
        });
    }
    Ok(())
}

fn chunk_method_str(method: ChunkingMethod) -> &'static str {
    method.as_str()
}

/// Convert caller-supplied JSON metadata into the index's scalar-or-list
/// representation. Callers are expected to have already passed
/// `validate_metadata_json` for this value — mappings are structurally
/// impossible to reach here because `MetadataValue` has no mapping variant.
fn json_to_metadata_value(value: &serde_json::Value) -> MetadataValue {
    match value {
        serde_json::Value::String(s) => MetadataValue::String(s.clone()),
        serde_json::Value::Bool(b) => MetadataValue::Bool(*b),
        serde_json::Value::Number(n) => MetadataValue::Number(n.as_f64().unwrap_or(0.0)),
        serde_json::Value::Array(items) => MetadataValue::StringList(
            items
                .iter()
                .map(|item| item.as_str().map(str::to_string).unwrap_or_else(|| item.to_string()))
                .collect(),
        ),
        serde_json::Value::Null | serde_json::Value::Object(_) => MetadataValue::String(String::new()),
    }
}

/// Resolve a domain category name into its `Intent`, used by callers that
/// want to map a secondary matched category onto the closed intent set
/// directly (e.g. diagnostics/analytics built atop `analyze()`).
pub fn category_intent(name: &str) -> Option<Intent> {
    Category::all()
        .iter()
        .find(|c| c.as_str() == name)
        .and_then(Category::primary_intent)
}
