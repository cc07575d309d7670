use regex::Regex;

use crate::domain;

/// Lowercase, collapse internal whitespace, trim, then apply the domain
/// synonym table (spec §4.2). `normalize(normalize(q)) == normalize(q)`
/// holds because canonical tokens are chosen to not themselves match a
/// *different* surface form (see `domain::synonym_table`'s doc comment).
pub fn normalize(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let collapsed = collapse_whitespace(&lowered);
    let trimmed = collapsed.trim().to_string();
    apply_synonyms(&trimmed)
}

fn collapse_whitespace(text: &str) -> String {
    let re = Regex::new(r"\s+").expect("static pattern is valid");
    re.replace_all(text, " ").to_string()
}

/// Whole-word, longest-match-first synonym substitution (spec §4.2): "apply
/// a domain synonym table ... only as whole-word matches, longest-match
/// first to avoid partial substitution."
fn apply_synonyms(text: &str) -> String {
    let mut result = text.to_string();
    for (form, canonical) in domain::synonym_table() {
        result = replace_whole_word(&result, form, canonical);
    }
    result
}

fn replace_whole_word(text: &str, pattern: &str, replacement: &str) -> String {
    let re = word_boundary_regex(pattern);
    re.replace_all(text, replacement).to_string()
}

/// Whole-word containment check shared with the domain dictionary's
/// per-category match counting (spec §4.2) and the retriever's structural
/// and fallback keyword matching (spec §4.4, §4.5). Tolerant of a trailing
/// "s" so a singular dictionary entry ("exclusion") still matches the
/// plural form ("exclusions") that both natural queries and the
/// normalizer's own canonical tokens commonly use, the way the teacher's
/// `classify.rs` matches on stems rather than requiring the dictionary and
/// its callers to agree on grammatical number.
pub fn contains_whole_word(text: &str, pattern: &str) -> bool {
    stem_word_regex(pattern).is_match(text)
}

fn word_boundary_regex(pattern: &str) -> Regex {
    let escaped = regex::escape(pattern);
    Regex::new(&format!(r"(?i)\b{escaped}\b")).expect("escaped pattern is always valid")
}

fn stem_word_regex(pattern: &str) -> Regex {
    let escaped = regex::escape(pattern);
    Regex::new(&format!(r"(?i)\b{escaped}s?\b")).expect("escaped pattern is always valid")
}

/// Keyword extraction for the retriever's keyword stage (spec §4.3):
/// whitespace tokens, stripped of leading/trailing non-alphanumeric
/// characters, length >= 3, generalized from the teacher's
/// `extract_medical_keywords`.
pub fn extract_keywords(normalized: &str) -> Vec<String> {
    normalized
        .split_whitespace()
        .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|token| token.len() >= 3)
        .map(|token| token.to_string())
        .collect()
}
