//! External-interface adapters (spec §6.1-6.3): thin trait contracts to the
//! embedding provider, vector index, and LLM provider. Grounded on
//! `pipeline/storage/types.rs::EmbeddingModel`/`VectorStore` and
//! `pipeline/rag/types.rs::VectorSearch` — one trait per external
//! collaborator, kept deliberately narrow.
//!
//! The teacher's collaborators are synchronous (SQLite-backed); spec §5
//! requires Stage 1's fan-out to suspend concurrently across up to 5
//! `(embed, query)` pairs, so these traits are `async_trait` rather than
//! plain trait methods — the concern the sibling pack repo
//! `modularflow-langextract-rust` uses `async-trait` for.

pub mod mock;

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::{CoreError, HardExternalError};
use crate::models::{IndexRecord, MetadataValue};

/// A provider-level failure, distinguishing retryable conditions from ones
/// that will not succeed on retry (spec §7). `core::retry_once` converts
/// an exhausted `Transient` into `HardExternalError`.
#[derive(Debug, Clone)]
pub enum ProviderError {
    Transient(String),
    Hard(String),
}

/// Equality filter over index metadata fields (spec §6.2's `filter?`
/// parameter), applied by `query`, `scan`, and `delete_by_filter`.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub equals: BTreeMap<String, MetadataValue>,
}

impl Filter {
    pub fn by_doc_id(doc_id: &str) -> Self {
        let mut equals = BTreeMap::new();
        equals.insert(
            "doc_id".to_string(),
            MetadataValue::String(doc_id.to_string()),
        );
        Self { equals }
    }

    pub fn matches(&self, metadata: &BTreeMap<String, MetadataValue>) -> bool {
        self.equals
            .iter()
            .all(|(key, expected)| metadata.get(key) == Some(expected))
    }
}

#[derive(Debug, Clone)]
pub struct ScoredRecord {
    pub chunk_id: String,
    pub score: f32,
    pub metadata: BTreeMap<String, MetadataValue>,
}

#[derive(Debug, Clone)]
pub struct ScannedRecord {
    pub chunk_id: String,
    pub metadata: BTreeMap<String, MetadataValue>,
}

#[derive(Debug, Clone)]
pub struct IndexStats {
    pub count: usize,
    pub dimension: usize,
    pub metric: &'static str,
}

/// Embedding provider (spec §6.1). Contract: deterministic per
/// `(model, text)`; dimension equals the index's declared dimension;
/// an implementation returning an all-zero vector is a contract violation
/// the caller must not observe — non-production implementations fall back
/// to a deterministic pseudo-random vector instead (see `mock::FallbackEmbedder`).
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError>;
    fn dimension(&self) -> usize;
}

/// Vector index (spec §6.2). `replace_document` is this crate's addition
/// over the spec's literal `upsert`/`delete_by_filter` pair: the spec
/// requires document-level ingestion atomicity (§5, §8 scenario 6), which
/// a generic two-call delete-then-upsert sequence cannot guarantee against
/// an arbitrary backend, so the trait exposes the atomic operation
/// directly. Grounded on `pipeline/storage/orchestrator.rs`'s
/// `delete_by_document` + `store_chunks` pairing, generalized into one
/// atomic call.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn replace_document(
        &self,
        doc_id: &str,
        records: Vec<IndexRecord>,
    ) -> Result<usize, ProviderError>;
    async fn delete_by_filter(&self, filter: &Filter) -> Result<(), ProviderError>;
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&Filter>,
    ) -> Result<Vec<ScoredRecord>, ProviderError>;
    async fn scan(
        &self,
        filter: Option<&Filter>,
        limit: usize,
    ) -> Result<Vec<ScannedRecord>, ProviderError>;
    async fn stats(&self) -> Result<IndexStats, ProviderError>;
}

/// LLM provider (spec §6.3). Contract: honors `max_tokens`; may fail
/// transiently; never returns an empty/null string on success.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, ProviderError>;
}

/// Retry-once policy (spec §7): a `Transient` failure is retried exactly
/// once; if the retry also fails (transient or hard), the call surfaces as
/// `HardExternalError`. A `Hard` failure on the first attempt never retries.
/// `kind` names which collaborator failed, for the wrapped error variant.
pub async fn retry_once<T, Fut>(
    mut op: impl FnMut() -> Fut,
    kind: fn(String) -> HardExternalError,
) -> Result<T, CoreError>
where
    Fut: std::future::Future<Output = Result<T, ProviderError>>,
{
    match op().await {
        Ok(value) => Ok(value),
        Err(ProviderError::Hard(msg)) => Err(CoreError::HardExternal(kind(msg))),
        Err(ProviderError::Transient(_)) => match op().await {
            Ok(value) => Ok(value),
            Err(ProviderError::Transient(msg)) => Err(CoreError::HardExternal(kind(msg))),
            Err(ProviderError::Hard(msg)) => Err(CoreError::HardExternal(kind(msg))),
        },
    }
}
