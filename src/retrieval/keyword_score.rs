use regex::Regex;

/// Result of scoring one candidate against the query's keyword set (spec
/// §4.3 Stage 2, reused verbatim by fallback §4.5 — "compute the
/// keyword-anchoring relevance exactly as in Stage 2 keyword scoring").
pub struct KeywordScoreResult {
    pub score: f32,
    pub matched_keywords: Vec<String>,
}

/// Weighted sum of density / coverage / position bonus (spec §4.3 Stage 2):
/// 0.4 / 0.4 / 0.2. Kept distinct from the 0.7/0.3 semantic/keyword fusion
/// weights in `hybrid.rs` (spec §9 — the two weight sets must not be
/// conflated).
pub fn score(candidate_text: &str, query_keywords: &[String]) -> KeywordScoreResult {
    if query_keywords.is_empty() {
        return KeywordScoreResult {
            score: 0.0,
            matched_keywords: Vec::new(),
        };
    }

    let total_words = candidate_text.split_whitespace().count().max(1);
    let mut matched_keywords = Vec::new();
    let mut occurrences = 0usize;
    let mut earliest: Option<usize> = None;

    for keyword in query_keywords {
        let re = word_boundary_regex(keyword);
        let mut found = false;
        for m in re.find_iter(candidate_text) {
            occurrences += 1;
            found = true;
            earliest = Some(earliest.map_or(m.start(), |e| e.min(m.start())));
        }
        if found {
            matched_keywords.push(keyword.clone());
        }
    }

    let density = occurrences as f32 / total_words as f32;
    let coverage = matched_keywords.len() as f32 / query_keywords.len() as f32;
    let position_bonus = match earliest {
        Some(offset) => {
            (1.0 - offset as f32 / candidate_text.len().max(1) as f32).clamp(0.0, 1.0)
        }
        None => 0.0,
    };

    let raw = 0.4 * density + 0.4 * coverage + 0.2 * position_bonus;
    KeywordScoreResult {
        score: raw.clamp(0.0, 1.0),
        matched_keywords,
    }
}

fn word_boundary_regex(pattern: &str) -> Regex {
    let escaped = regex::escape(pattern);
    Regex::new(&format!(r"(?i)\b{escaped}\b")).expect("escaped pattern is always valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_keywords_yields_zero_score() {
        let result = score("some legal text", &[]);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn earlier_occurrence_scores_higher() {
        let keywords = vec!["exclusion".to_string()];
        let early = score("exclusion applies here and covers nothing else at all", &keywords);
        let late =
            score("this section covers nothing else at all until the exclusion", &keywords);
        assert!(early.score > late.score);
    }

    #[test]
    fn coverage_counts_distinct_matched_keywords() {
        let keywords = vec!["exclusion".to_string(), "claim".to_string()];
        let result = score("the exclusion applies to every claim filed", &keywords);
        assert_eq!(result.matched_keywords.len(), 2);
    }

    #[test]
    fn unmatched_keywords_yield_zero_score() {
        let keywords = vec!["nonexistent".to_string()];
        let result = score("completely unrelated text", &keywords);
        assert_eq!(result.score, 0.0);
        assert!(result.matched_keywords.is_empty());
    }
}
