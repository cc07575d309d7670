use serde::{Deserialize, Serialize};

/// Closed set of primary query intents (spec §3, §4.2). Priority order for
/// tie-breaking when two intents tie on matched-category count (spec §4.2):
/// `exclusion > coverage > temporal > financial > claim > procedural >
/// information_seeking`, reflected by this enum's declaration order and by
/// `Intent::PRIORITY_ORDER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Exclusion,
    Coverage,
    Temporal,
    Financial,
    Claim,
    Procedural,
    InformationSeeking,
}

impl Intent {
    /// Highest to lowest priority, used to break ties in matched-category
    /// counts (spec §4.2).
    pub const PRIORITY_ORDER: [Intent; 7] = [
        Intent::Exclusion,
        Intent::Coverage,
        Intent::Temporal,
        Intent::Financial,
        Intent::Claim,
        Intent::Procedural,
        Intent::InformationSeeking,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Exclusion => "exclusion",
            Intent::Coverage => "coverage",
            Intent::Temporal => "temporal",
            Intent::Financial => "financial",
            Intent::Claim => "claim",
            Intent::Procedural => "procedural",
            Intent::InformationSeeking => "information_seeking",
        }
    }

    /// Priority rank, lower is higher priority. Used by the intent
    /// analyzer's tie-break and by the re-ranker's intent-boost matching.
    pub fn priority_rank(&self) -> usize {
        Intent::PRIORITY_ORDER
            .iter()
            .position(|i| i == self)
            .expect("PRIORITY_ORDER is exhaustive")
    }
}

impl Default for Intent {
    fn default() -> Self {
        Intent::InformationSeeking
    }
}

/// Query complexity band (spec §4.2), derived from word count, sub-question
/// count, and matched-category count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

/// `{raw, normalized, intent, complexity, keywords, sub_questions}` (spec §3).
/// Built once by the Normalizer/Intent Analyzer and carried unmodified
/// through retrieval and assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryContext {
    pub raw: String,
    pub normalized: String,
    pub intent: Intent,
    /// Secondary domain categories matched in the normalized query, beyond
    /// the single primary `intent` (spec §8 scenario 2: "preexisting_diseases
    /// as a secondary category"), most-matched first.
    pub matched_categories: Vec<String>,
    pub intent_confidence: f32,
    pub complexity: Complexity,
    pub keywords: Vec<String>,
    pub sub_questions: Vec<String>,
}
