//! Retrieval and answer-assembly core for a legal/insurance document
//! question-answering service.
//!
//! This crate owns the hard engineering described in its design
//! documentation: domain-aware chunking, hybrid retrieval with adaptive
//! thresholds and structural re-ranking, keyword-anchoring fallback, query
//! normalization/intent analysis, and the structured response assembler.
//! The HTTP surface, authentication, file storage, OCR/extraction, and the
//! embedding/vector-index/LLM providers themselves are external
//! collaborators reached only through the traits in [`adapters`].

pub mod adapters;
pub mod assembler;
pub mod chunking;
pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod models;
pub mod query;
pub mod retrieval;

pub use config::Settings;
pub use core::Core;
pub use error::CoreError;

use tracing_subscriber::EnvFilter;

/// Initialize the crate's tracing subscriber from `RUST_LOG`, falling back
/// to a sensible default when unset. Mirrors the teacher's `lib.rs::run()`
/// tracing bootstrap, minus anything Tauri-specific. Idempotent to call
/// more than once within a process only if the caller discards the error —
/// `tracing_subscriber::fmt().try_init()` returns `Err` on a second call.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_log_filter()));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn default_log_filter() -> &'static str {
    "legal_rag_core=info,warn"
}
