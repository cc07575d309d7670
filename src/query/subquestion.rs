use regex::Regex;

/// Sub-question decomposition (spec §4.2): split on `,`, `;`, ` and `, or
/// multiple `?`. Total (never raises), always returns a non-empty list, and
/// idempotent under re-normalization — re-splitting an already-split
/// fragment that ends in a single `?` and contains no further separators
/// yields the same single fragment back.
pub fn split(normalized: &str) -> Vec<String> {
    let splitter = splitter_regex();

    if !splitter.is_match(normalized) {
        return vec![ensure_question_mark(normalized.trim())];
    }

    let fragments: Vec<String> = splitter
        .split(normalized)
        .map(str::trim)
        .filter(|fragment| fragment.chars().count() >= 4)
        .map(ensure_question_mark)
        .collect();

    if fragments.is_empty() {
        vec![ensure_question_mark(normalized.trim())]
    } else {
        fragments
    }
}

fn splitter_regex() -> Regex {
    Regex::new(r",|;| and |\?{2,}").expect("static pattern is valid")
}

fn ensure_question_mark(fragment: &str) -> String {
    if fragment.ends_with('?') {
        fragment.to_string()
    } else {
        format!("{fragment}?")
    }
}
