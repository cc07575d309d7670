//! Data model (spec §3): the typed records that flow between Chunker,
//! Query Normalizer/Intent Analyzer, Hybrid Retriever, and Response
//! Assembler. Grounded on the teacher's `pipeline/rag/types.rs` and
//! `pipeline/storage/types.rs` shapes, generalized from patient-record
//! fields to legal/insurance document fields.

pub mod chunk;
pub mod embedding;
pub mod index_record;
pub mod query;
pub mod response;
pub mod retrieval;

pub use chunk::{Chunk, ChunkingMethod};
pub use embedding::Embedding;
pub use index_record::{IndexRecord, MetadataValue};
pub use query::{Complexity, Intent, QueryContext};
pub use response::{
    AuditTrailEntry, ClauseReference, Confidence, ConfidenceLevel, Explainability,
    QualityIndicators, QueryAnalysis, Recommendation, ResponseType, SearchParameters,
    SourceAnalysis, SourceRef, StructuredResponse, Warning,
};
pub use retrieval::{RetrievalMethod, RetrievalResult, StructuralRank};
