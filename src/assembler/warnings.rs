use crate::models::{Confidence, ConfidenceLevel, Recommendation, Warning};

/// Sub-questions whose ordinal marker or first content words do not appear
/// in the answer (spec §4.6 step 4). A sub-question is considered
/// addressed if its numbered marker (`"1."`, `"2."`, ...) or its first
/// three content words appear somewhere in the answer.
pub fn unanswered_sub_questions(answer: &str, sub_questions: &[String]) -> Vec<String> {
    if sub_questions.len() <= 1 {
        return Vec::new();
    }
    let lower_answer = answer.to_lowercase();

    sub_questions
        .iter()
        .enumerate()
        .filter(|(index, sub_question)| {
            let marker = format!("{}.", index + 1);
            if lower_answer.contains(&marker) {
                return false;
            }
            let first_words: Vec<&str> = sub_question
                .trim_end_matches('?')
                .split_whitespace()
                .take(3)
                .collect();
            if first_words.is_empty() {
                return false;
            }
            !first_words
                .iter()
                .all(|word| lower_answer.contains(&word.to_lowercase()))
        })
        .map(|(_, sub_question)| sub_question.clone())
        .collect()
}

/// Build the structured warnings and recommendations for a query (spec
/// §4.6 step 8): low confidence, fallback used, threshold below minimum,
/// and unanswered sub-questions.
pub fn build(
    confidence: &Confidence,
    fallback_used: bool,
    effective_threshold: f32,
    min_similarity_threshold: f32,
    unanswered: &[String],
) -> (Vec<Warning>, Vec<Recommendation>) {
    let mut warnings = Vec::new();
    let mut recommendations = Vec::new();

    if matches!(confidence.level(), ConfidenceLevel::Low | ConfidenceLevel::VeryLow) {
        warnings.push(Warning::LowConfidence {
            overall: confidence.overall,
        });
        recommendations.push(Recommendation::RephraseQuestion);
    }

    if fallback_used {
        warnings.push(Warning::FallbackUsed);
        recommendations.push(Recommendation::UploadAdditionalDocuments);
    }

    if effective_threshold <= min_similarity_threshold {
        warnings.push(Warning::ThresholdBelowMinimum {
            effective_threshold,
            min: min_similarity_threshold,
        });
    }

    for sub_question in unanswered {
        warnings.push(Warning::SubQuestionUnanswered {
            sub_question: sub_question.clone(),
        });
    }
    if !unanswered.is_empty() {
        recommendations.push(Recommendation::NarrowQuestionScope);
    }

    (warnings, recommendations)
}
