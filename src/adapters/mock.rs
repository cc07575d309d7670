use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Filter, IndexStats, ProviderError, ScannedRecord, ScoredRecord, VectorIndex};
use crate::adapters::EmbeddingProvider;
use crate::models::IndexRecord;

/// Deterministic pseudo-random embedding fallback (spec §6.1, §9): derives
/// a unit vector from a hash of the text, so the same text always produces
/// the same vector and two different texts produce (with overwhelming
/// probability) different vectors. Explicit, opt-in, non-production —
/// never the default embedding provider. Grounded on
/// `pipeline/storage/embedder.rs::MockEmbedder::deterministic_vector`.
pub struct FallbackEmbedder {
    dimension: usize,
}

impl FallbackEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn deterministic_vector(&self, text: &str) -> Vec<f32> {
        let mut state = fnv1a(text.as_bytes());
        let mut values = Vec::with_capacity(self.dimension);
        for _ in 0..self.dimension {
            state = splitmix64(state);
            // Map to [-1, 1).
            let unit = (state >> 11) as f64 / (1u64 << 53) as f64;
            values.push((unit * 2.0 - 1.0) as f32);
        }
        let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in values.iter_mut() {
                *v /= norm;
            }
        }
        values
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for b in bytes {
        hash ^= *b as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

#[async_trait]
impl EmbeddingProvider for FallbackEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        Ok(texts.iter().map(|t| self.deterministic_vector(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

struct StoredRecord {
    doc_id: String,
    generation: u64,
    vector: Vec<f32>,
    metadata: BTreeMap<String, crate::models::MetadataValue>,
}

#[derive(Default)]
struct IndexState {
    records: HashMap<String, StoredRecord>,
    generations: HashMap<String, u64>,
    dimension: usize,
}

/// In-memory vector index (spec §6.2, non-production). Re-ingestion is
/// atomic at the document level (spec §5, §8 scenario 6): `replace_document`
/// tags every new record with a freshly incremented per-document generation
/// and removes stale records for that document within a single critical
/// section, so a concurrent reader acquiring the same lock never observes a
/// mix of old and new chunks. Grounded on
/// `pipeline/storage/vectordb.rs::InMemoryVectorStore` (`Mutex<Vec<...>>`)
/// plus `cosine_similarity`.
pub struct InMemoryVectorIndex {
    state: Mutex<IndexState>,
}

impl InMemoryVectorIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            state: Mutex::new(IndexState {
                records: HashMap::new(),
                generations: HashMap::new(),
                dimension,
            }),
        }
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|v| v * v).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn replace_document(
        &self,
        doc_id: &str,
        records: Vec<IndexRecord>,
    ) -> Result<usize, ProviderError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| ProviderError::Hard("index lock poisoned".into()))?;

        let next_generation = state.generations.get(doc_id).copied().unwrap_or(0) + 1;
        state
            .records
            .retain(|_, record| record.doc_id != doc_id || record.generation == next_generation);

        let written = records.len();
        for record in records {
            state.records.insert(
                record.chunk_id.clone(),
                StoredRecord {
                    doc_id: doc_id.to_string(),
                    generation: next_generation,
                    vector: record.embedding,
                    metadata: record.metadata,
                },
            );
        }
        state.generations.insert(doc_id.to_string(), next_generation);
        Ok(written)
    }

    async fn delete_by_filter(&self, filter: &Filter) -> Result<(), ProviderError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| ProviderError::Hard("index lock poisoned".into()))?;
        state
            .records
            .retain(|_, record| !filter.matches(&record.metadata));
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&Filter>,
    ) -> Result<Vec<ScoredRecord>, ProviderError> {
        let state = self
            .state
            .lock()
            .map_err(|_| ProviderError::Hard("index lock poisoned".into()))?;

        let mut scored: Vec<ScoredRecord> = state
            .records
            .iter()
            .filter(|(_, record)| filter.map(|f| f.matches(&record.metadata)).unwrap_or(true))
            .map(|(chunk_id, record)| ScoredRecord {
                chunk_id: chunk_id.clone(),
                score: cosine_similarity(vector, &record.vector),
                metadata: record.metadata.clone(),
            })
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn scan(
        &self,
        filter: Option<&Filter>,
        limit: usize,
    ) -> Result<Vec<ScannedRecord>, ProviderError> {
        let state = self
            .state
            .lock()
            .map_err(|_| ProviderError::Hard("index lock poisoned".into()))?;
        let scanned = state
            .records
            .iter()
            .filter(|(_, record)| filter.map(|f| f.matches(&record.metadata)).unwrap_or(true))
            .take(limit)
            .map(|(chunk_id, record)| ScannedRecord {
                chunk_id: chunk_id.clone(),
                metadata: record.metadata.clone(),
            })
            .collect();
        Ok(scanned)
    }

    async fn stats(&self) -> Result<IndexStats, ProviderError> {
        let state = self
            .state
            .lock()
            .map_err(|_| ProviderError::Hard("index lock poisoned".into()))?;
        Ok(IndexStats {
            count: state.records.len(),
            dimension: state.dimension,
            metric: "cosine",
        })
    }
}

/// Canned LLM provider for tests and non-production use, grounded on the
/// teacher's `MockLlm` test double.
pub struct MockLlmProvider {
    pub fixed_response: String,
}

impl MockLlmProvider {
    pub fn new(fixed_response: impl Into<String>) -> Self {
        Self {
            fixed_response: fixed_response.into(),
        }
    }
}

#[async_trait]
impl super::LlmProvider for MockLlmProvider {
    async fn complete(
        &self,
        _system: &str,
        _user: &str,
        _max_tokens: u32,
        _temperature: f32,
    ) -> Result<String, ProviderError> {
        Ok(self.fixed_response.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MetadataValue;

    #[tokio::test]
    async fn fallback_embedder_is_deterministic() {
        let embedder = FallbackEmbedder::new(16);
        let a = embedder.embed(&["hello".to_string()]).await.unwrap();
        let b = embedder.embed(&["hello".to_string()]).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn fallback_embedder_distinguishes_different_text() {
        let embedder = FallbackEmbedder::new(16);
        let a = embedder.embed(&["hello".to_string()]).await.unwrap();
        let b = embedder.embed(&["world".to_string()]).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn fallback_embedder_vectors_are_unit_norm() {
        let embedder = FallbackEmbedder::new(32);
        let vectors = embedder.embed(&["some text".to_string()]).await.unwrap();
        let norm: f32 = vectors[0].iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    fn record(chunk_id: &str, doc_id: &str, vector: Vec<f32>) -> IndexRecord {
        let mut metadata = BTreeMap::new();
        metadata.insert("doc_id".to_string(), MetadataValue::String(doc_id.to_string()));
        IndexRecord {
            chunk_id: chunk_id.to_string(),
            embedding: vector,
            metadata,
        }
    }

    #[tokio::test]
    async fn replace_document_swaps_atomically() {
        let index = InMemoryVectorIndex::new(2);
        let first = (0..10)
            .map(|i| record(&format!("D:{i}"), "D", vec![1.0, 0.0]))
            .collect();
        index.replace_document("D", first).await.unwrap();
        assert_eq!(index.stats().await.unwrap().count, 10);

        let second = (0..6)
            .map(|i| record(&format!("D:v2:{i}"), "D", vec![0.0, 1.0]))
            .collect();
        index.replace_document("D", second).await.unwrap();
        assert_eq!(index.stats().await.unwrap().count, 6);
    }

    #[tokio::test]
    async fn query_returns_top_k_by_cosine_similarity() {
        let index = InMemoryVectorIndex::new(2);
        let records = vec![
            record("D:0", "D", vec![1.0, 0.0]),
            record("D:1", "D", vec![0.0, 1.0]),
            record("D:2", "D", vec![0.9, 0.1]),
        ];
        index.replace_document("D", records).await.unwrap();
        let results = index.query(&[1.0, 0.0], 2, None).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk_id, "D:0");
    }
}
