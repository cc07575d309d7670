use crate::domain::{self, Category};
use crate::models::{Complexity, Intent};

/// Result of classifying a normalized query (spec §4.2). `matched_categories`
/// lists every domain category with at least one surface-form match,
/// most-matched first — `primary_intent` is derived from the subset of
/// those categories that map onto the closed `Intent` set (see
/// `Category::primary_intent`), not from the raw category list directly.
pub struct Classification {
    pub primary_intent: Intent,
    pub confidence: f32,
    pub matched_categories: Vec<String>,
    pub matched_category_count: usize,
}

pub fn classify(normalized: &str) -> Classification {
    let mut per_category_counts: Vec<(Category, usize)> = Category::all()
        .iter()
        .map(|c| (*c, domain::count_matches(*c, normalized)))
        .collect();
    per_category_counts.sort_by(|a, b| b.1.cmp(&a.1));

    let matched_categories: Vec<String> = per_category_counts
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|(c, _)| c.as_str().to_string())
        .collect();
    let matched_category_count = matched_categories.len();

    // Priority order is ascending in `Intent::PRIORITY_ORDER`, so the first
    // intent reached at the maximum count is the highest-priority tie.
    let intent_counts: Vec<(Intent, usize)> = Intent::PRIORITY_ORDER
        .iter()
        .map(|intent| {
            let count = per_category_counts
                .iter()
                .filter(|(c, _)| c.primary_intent() == Some(*intent))
                .map(|(_, n)| *n)
                .sum();
            (*intent, count)
        })
        .collect();

    let max_count = intent_counts.iter().map(|(_, n)| *n).max().unwrap_or(0);
    let primary_intent = if max_count == 0 {
        Intent::InformationSeeking
    } else {
        intent_counts
            .iter()
            .find(|(_, n)| *n == max_count)
            .map(|(intent, _)| *intent)
            .unwrap_or(Intent::InformationSeeking)
    };

    let total_categories_considered = Category::all().len();
    let confidence = matched_category_count as f32 / total_categories_considered.max(1) as f32;

    Classification {
        primary_intent,
        confidence,
        matched_categories,
        matched_category_count,
    }
}

/// Complexity banding (spec §4.2): `>=3` matched categories forces `high`;
/// more than one sub-question forces at least `medium`; otherwise a long
/// query (more than 25 words) also reaches `medium`. The highest band any
/// signal reaches wins.
pub fn complexity(word_count: usize, sub_question_count: usize, matched_category_count: usize) -> Complexity {
    let from_categories = if matched_category_count >= 3 {
        Complexity::High
    } else if matched_category_count >= 2 {
        Complexity::Medium
    } else {
        Complexity::Low
    };
    let from_sub_questions = if sub_question_count > 1 {
        Complexity::Medium
    } else {
        Complexity::Low
    };
    let from_word_count = if word_count > 25 {
        Complexity::Medium
    } else {
        Complexity::Low
    };

    [from_categories, from_sub_questions, from_word_count]
        .into_iter()
        .max_by_key(rank)
        .unwrap_or(Complexity::Low)
}

fn rank(c: &Complexity) -> u8 {
    match c {
        Complexity::Low => 0,
        Complexity::Medium => 1,
        Complexity::High => 2,
    }
}
