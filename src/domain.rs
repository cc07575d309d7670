//! Static legal/insurance domain dictionary (spec §3 "Domain dictionary").
//!
//! Loaded once at startup, read-only thereafter. Mirrors the teacher's
//! pattern of hardcoded pattern arrays per category (`classify.rs`'s
//! `has_timeline_pattern`/`has_symptom_pattern`/...), generalized into a
//! data table so callers can count matches per category instead of
//! branching on a fixed if-chain.

/// A legal/insurance category the domain dictionary recognizes. Doubles as
/// the closed set of secondary categories the intent analyzer counts over;
/// `Intent` (in `models::query`) is the subset of these that can also be a
/// query's *primary* intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    PreexistingDiseases,
    Exclusions,
    Coverage,
    Claims,
    Deductibles,
    Premiums,
    WaitingPeriods,
    Renewals,
    Terminations,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::PreexistingDiseases => "preexisting_diseases",
            Category::Exclusions => "exclusions",
            Category::Coverage => "coverage",
            Category::Claims => "claims",
            Category::Deductibles => "deductibles",
            Category::Premiums => "premiums",
            Category::WaitingPeriods => "waiting_periods",
            Category::Renewals => "renewals",
            Category::Terminations => "terminations",
        }
    }

    pub fn all() -> &'static [Category] {
        &[
            Category::PreexistingDiseases,
            Category::Exclusions,
            Category::Coverage,
            Category::Claims,
            Category::Deductibles,
            Category::Premiums,
            Category::WaitingPeriods,
            Category::Renewals,
            Category::Terminations,
        ]
    }

    /// Surface forms recognized for this category, longest first so
    /// whole-word matching (query normalizer, intent analyzer) prefers the
    /// most specific form over a prefix of it.
    pub fn surface_forms(&self) -> &'static [&'static str] {
        match self {
            Category::PreexistingDiseases => &[
                "pre-existing disease",
                "pre-existing condition",
                "preexisting disease",
                "preexisting condition",
                "existing illness",
                "ped",
            ],
            Category::Exclusions => &[
                "exclusion clause",
                "not covered",
                "excluded",
                "exclusion",
                "limitation",
            ],
            Category::Coverage => &[
                "sum insured",
                "covered",
                "coverage",
                "benefit",
                "policy cover",
            ],
            Category::Claims => &[
                "claim settlement",
                "claim form",
                "claim",
                "reimbursement",
                "cashless",
            ],
            Category::Deductibles => &["deductible amount", "deductible", "co-payment", "copay"],
            Category::Premiums => &["premium amount", "premium payment", "premium"],
            Category::WaitingPeriods => &[
                "waiting period",
                "moratorium period",
                "cooling off period",
            ],
            Category::Renewals => &["renewal date", "policy renewal", "renewal"],
            Category::Terminations => &[
                "policy termination",
                "policy cancellation",
                "termination",
                "cancellation",
            ],
        }
    }
}

impl Category {
    /// Maps this domain category onto the closed `Intent` set the analyzer
    /// chooses a primary intent from (spec §4.2). `preexisting_diseases` has
    /// no direct intent counterpart — it only ever surfaces as a secondary
    /// matched category (spec §8 scenario 2), never as the primary intent.
    pub fn primary_intent(&self) -> Option<crate::models::Intent> {
        use crate::models::Intent;
        match self {
            Category::PreexistingDiseases => None,
            Category::Exclusions => Some(Intent::Exclusion),
            Category::Coverage => Some(Intent::Coverage),
            Category::Claims => Some(Intent::Claim),
            Category::Deductibles => Some(Intent::Financial),
            Category::Premiums => Some(Intent::Financial),
            Category::WaitingPeriods => Some(Intent::Temporal),
            Category::Renewals => Some(Intent::Temporal),
            Category::Terminations => Some(Intent::Procedural),
        }
    }
}

/// All surface forms across all categories, longest-first, for the query
/// normalizer's synonym table. Each entry maps a surface form to its
/// canonical token (spec §4.2).
pub fn synonym_table() -> Vec<(&'static str, &'static str)> {
    let mut table = Vec::new();
    for category in Category::all() {
        let canonical = category_canonical_token(*category);
        for form in category.surface_forms() {
            table.push((*form, canonical));
        }
    }
    table.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    table
}

fn category_canonical_token(category: Category) -> &'static str {
    match category {
        Category::PreexistingDiseases => "preexisting diseases",
        Category::Exclusions => "exclusions",
        Category::Coverage => "coverage",
        Category::Claims => "claims",
        Category::Deductibles => "deductibles",
        Category::Premiums => "premiums",
        Category::WaitingPeriods => "waiting periods",
        Category::Renewals => "renewals",
        Category::Terminations => "terminations",
    }
}

/// General legal terms counted toward `legal_density` regardless of which
/// domain category they belong to, and used directly by keyword-anchoring
/// (spec §4.5: "a fixed set of general legal terms when literally present").
pub const GENERAL_LEGAL_TERMS: &[&str] = &[
    "clause",
    "section",
    "article",
    "liability",
    "indemnify",
    "indemnification",
    "waiver",
    "arbitration",
    "jurisdiction",
    "breach",
    "force majeure",
    "warranty",
    "covenant",
    "provision",
    "statute",
    "compliance",
    "negligence",
    "damages",
    "remedy",
];

/// General relevant-word list for keyword-anchoring (spec §4.5: "query
/// tokens that match a general relevant-word list"), distinct from the
/// domain dictionary's per-category surface forms.
pub const RELEVANT_WORDS: &[&str] = &[
    "policy",
    "insurance",
    "insurer",
    "insured",
    "contract",
    "agreement",
    "terms",
    "conditions",
    "document",
    "beneficiary",
    "policyholder",
];

/// Count how many of `category`'s surface forms appear (whole-word) in
/// `normalized_query`. Used by the intent analyzer (spec §4.2).
pub fn count_matches(category: Category, normalized_query: &str) -> usize {
    category
        .surface_forms()
        .iter()
        .filter(|form| crate::query::normalizer::contains_whole_word(normalized_query, form))
        .count()
}

/// Classify a chunk's text into the domain category whose surface forms
/// occur most often in it, ties broken toward the earlier category in
/// `Category::all()`. Returns `None` when no category's surface forms
/// occur at all. Used by `Core::ingest` to populate the `category`
/// metadata the retriever's context-aware re-rank reads (spec §4.4).
pub fn classify_text(text: &str) -> Option<Category> {
    let mut best: Option<(Category, usize)> = None;
    for category in Category::all().iter().copied() {
        let count = count_matches(category, text);
        if count == 0 {
            continue;
        }
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((category, count));
        }
    }
    best.map(|(category, _)| category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synonym_table_is_longest_first() {
        let table = synonym_table();
        for w in table.windows(2) {
            assert!(w[0].0.len() >= w[1].0.len());
        }
    }

    #[test]
    fn all_categories_have_surface_forms() {
        for category in Category::all() {
            assert!(!category.surface_forms().is_empty());
        }
    }

    #[test]
    fn category_as_str_matches_glossary_names() {
        assert_eq!(Category::PreexistingDiseases.as_str(), "preexisting_diseases");
        assert_eq!(Category::WaitingPeriods.as_str(), "waiting_periods");
    }

    #[test]
    fn count_matches_finds_plural_surface_forms() {
        assert_eq!(
            count_matches(Category::Exclusions, "what are the preexisting diseases exclusions?"),
            1
        );
        assert_eq!(
            count_matches(
                Category::PreexistingDiseases,
                "what are the preexisting diseases exclusions?"
            ),
            1
        );
    }

    #[test]
    fn classify_text_picks_category_with_most_matches() {
        let text = "this section describes an exclusion clause and excluded conditions";
        assert_eq!(classify_text(text), Some(Category::Exclusions));
    }

    #[test]
    fn classify_text_returns_none_when_no_category_matches() {
        assert_eq!(classify_text("completely unrelated sentence"), None);
    }
}
