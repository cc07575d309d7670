use crate::models::{Intent, ResponseType};

/// Choose `response_type` from the primary intent plus content cues (spec
/// §4.6 step 7). Content cues can tilt the classification away from the
/// intent's default mapping, e.g. the literal word "excluded" in the
/// answer tilts toward `exclusion` even for a coverage-leaning intent.
pub fn classify(primary_intent: Intent, answer: &str) -> ResponseType {
    let lower = answer.to_lowercase();

    if lower.contains("excluded") || lower.contains("exclusion") || lower.contains("not covered") {
        return ResponseType::Exclusion;
    }
    if lower.contains("waiting period") || lower.contains("moratorium") {
        return ResponseType::WaitingPeriod;
    }
    if lower.contains("premium") {
        return ResponseType::Premium;
    }
    if lower.contains("renewal") {
        return ResponseType::Renewal;
    }
    if lower.contains("terminat") || lower.contains("cancellation") {
        return ResponseType::Termination;
    }
    if lower.contains("limit") || lower.contains("cap of") || lower.contains("maximum of") {
        return ResponseType::Limitation;
    }

    match primary_intent {
        Intent::Exclusion => ResponseType::Exclusion,
        Intent::Coverage => ResponseType::Coverage,
        Intent::Temporal => ResponseType::WaitingPeriod,
        Intent::Financial => ResponseType::Premium,
        Intent::Claim => ResponseType::Claim,
        Intent::Procedural => ResponseType::Procedural,
        Intent::InformationSeeking => ResponseType::DirectAnswer,
    }
}
