use crate::error::ConfigurationError;

/// Fixed-dimension float vector (spec §3). Constructed only through
/// `Embedding::new`, which enforces the two invariants an adapter's raw
/// output is not trusted to satisfy on its own: declared dimension, and
/// non-zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    values: Vec<f32>,
}

impl Embedding {
    pub fn new(values: Vec<f32>, expected_dimension: usize) -> Result<Self, ConfigurationError> {
        if values.len() != expected_dimension {
            return Err(ConfigurationError::DimensionMismatch {
                declared: expected_dimension,
                index: values.len(),
            });
        }
        if values.iter().all(|v| *v == 0.0) {
            return Err(ConfigurationError::MustBePositive {
                field: "embedding_norm",
                value: 0,
            });
        }
        Ok(Self { values })
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.values
    }

    /// Cosine similarity with another embedding of the same dimension.
    /// Grounded on `pipeline/rag/retrieval.rs::cosine_similarity`.
    pub fn cosine_similarity(&self, other: &Embedding) -> f32 {
        debug_assert_eq!(self.dimension(), other.dimension());
        let dot: f32 = self
            .values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| a * b)
            .sum();
        let norm_a = self.values.iter().map(|v| v * v).sum::<f32>().sqrt();
        let norm_b = other.values.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        dot / (norm_a * norm_b)
    }
}
