use crate::error::ConfigurationError;

/// Typed configuration surface (spec §6.5). Built once, validated once,
/// and held behind `Arc` thereafter — no dynamic key/value layer, no
/// mutation after `validate()` succeeds.
#[derive(Debug, Clone)]
pub struct Settings {
    // Chunker
    pub chunk_size: usize,
    pub chunk_overlap: usize,

    // Adaptive threshold bounds
    pub min_similarity_threshold: f32,
    pub medium_similarity_threshold: f32,
    pub high_similarity_threshold: f32,
    pub adaptive_threshold: bool,

    // Hybrid retriever
    pub min_results_required: usize,
    pub enable_hybrid_search: bool,
    pub semantic_weight: f32,
    pub keyword_weight: f32,
    pub semantic_top_k: usize,

    // Keyword-anchoring fallback
    pub enable_keyword_anchoring: bool,
    pub max_keyword_search_vectors: usize,
    pub max_keyword_results: usize,

    // Query enhancement / fan-out
    pub enable_query_enhancement: bool,
    pub max_query_variants: usize,

    // LLM call shape
    pub llm_max_tokens: u32,
    pub llm_temperature: f32,

    // Deadline
    pub query_deadline_ms: u64,

    // Embedding
    pub embedding_dimension: usize,

    /// Opt-in, explicit, never-default non-production mode (spec §9):
    /// allows a deterministic pseudo-random embedding to stand in for the
    /// embedding provider on read-side query embedding only. Never applies
    /// to ingestion writes.
    pub allow_embedding_fallback: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 300,

            min_similarity_threshold: 0.2,
            medium_similarity_threshold: 0.5,
            high_similarity_threshold: 0.8,
            adaptive_threshold: true,

            min_results_required: 1,
            enable_hybrid_search: true,
            semantic_weight: 0.7,
            keyword_weight: 0.3,
            semantic_top_k: 10,

            enable_keyword_anchoring: true,
            max_keyword_search_vectors: 1000,
            max_keyword_results: 3,

            enable_query_enhancement: true,
            max_query_variants: 5,

            llm_max_tokens: 4000,
            llm_temperature: 0.1,

            query_deadline_ms: 10_000,

            embedding_dimension: 1024,

            allow_embedding_fallback: false,
        }
    }
}

impl Settings {
    /// Validate internal consistency (spec §7: configuration errors are
    /// surfaced without any external call). Call once after construction,
    /// before the settings are frozen into an `Arc`.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.min_similarity_threshold > self.medium_similarity_threshold
            || self.medium_similarity_threshold > self.high_similarity_threshold
        {
            return Err(ConfigurationError::ThresholdBoundsInvalid {
                min: self.min_similarity_threshold,
                med: self.medium_similarity_threshold,
                high: self.high_similarity_threshold,
            });
        }

        if self.enable_hybrid_search {
            let sum = self.semantic_weight + self.keyword_weight;
            if (sum - 1.0).abs() > 1e-4 {
                return Err(ConfigurationError::FusionWeightsInvalid {
                    semantic: self.semantic_weight,
                    keyword: self.keyword_weight,
                    sum,
                });
            }
        }

        if self.chunk_size == 0 {
            return Err(ConfigurationError::MustBePositive {
                field: "chunk_size",
                value: 0,
            });
        }
        if self.embedding_dimension == 0 {
            return Err(ConfigurationError::MustBePositive {
                field: "embedding_dimension",
                value: 0,
            });
        }
        if self.max_query_variants == 0 || self.max_query_variants > 5 {
            return Err(ConfigurationError::MustBePositive {
                field: "max_query_variants",
                value: self.max_query_variants as i64,
            });
        }

        Ok(())
    }

    /// Validate that the embedding dimension this crate was configured
    /// with matches the vector index's declared dimension (spec §3
    /// Embedding invariant).
    pub fn validate_against_index_dimension(
        &self,
        index_dimension: usize,
    ) -> Result<(), ConfigurationError> {
        if self.embedding_dimension != index_dimension {
            return Err(ConfigurationError::DimensionMismatch {
                declared: self.embedding_dimension,
                index: index_dimension,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        Settings::default().validate().unwrap();
    }

    #[test]
    fn inconsistent_thresholds_rejected() {
        let mut s = Settings::default();
        s.min_similarity_threshold = 0.9;
        s.high_similarity_threshold = 0.1;
        assert!(s.validate().is_err());
    }

    #[test]
    fn fusion_weights_must_sum_to_one() {
        let mut s = Settings::default();
        s.semantic_weight = 0.5;
        s.keyword_weight = 0.2;
        assert!(matches!(
            s.validate(),
            Err(ConfigurationError::FusionWeightsInvalid { .. })
        ));
    }

    #[test]
    fn fusion_weights_ignored_when_hybrid_disabled() {
        let mut s = Settings::default();
        s.enable_hybrid_search = false;
        s.semantic_weight = 0.9;
        s.keyword_weight = 0.9;
        s.validate().unwrap();
    }

    #[test]
    fn dimension_mismatch_detected() {
        let s = Settings::default();
        assert!(s.validate_against_index_dimension(1536).is_err());
        assert!(s.validate_against_index_dimension(1024).is_ok());
    }
}
