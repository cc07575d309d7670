/// Adaptive threshold computation (spec §4.4). Given the caller's base
/// threshold, the observed semantic scores for this query, and the
/// configured bounds, produces the effective filter threshold, always
/// clamped to `[t_min, t_high]` (spec §8: "the effective threshold lies in
/// `[T_min, T_high]`" for every query).
pub fn effective_threshold(
    base: f32,
    semantic_scores: &[f32],
    t_min: f32,
    t_med: f32,
    t_high: f32,
) -> f32 {
    let mut t = base;

    if semantic_scores.is_empty() {
        return t.clamp(t_min, t_high);
    }

    let max = semantic_scores
        .iter()
        .cloned()
        .fold(f32::NEG_INFINITY, f32::max);

    if semantic_scores.len() >= 2 {
        let min = semantic_scores.iter().cloned().fold(f32::INFINITY, f32::min);
        let range = max - min;
        let mean = semantic_scores.iter().sum::<f32>() / semantic_scores.len() as f32;
        let variance = semantic_scores
            .iter()
            .map(|s| (s - mean).powi(2))
            .sum::<f32>()
            / semantic_scores.len() as f32;
        let sigma = variance.sqrt();

        if range > 0.4 && max > t_high {
            t = t.max(mean + 0.5 * sigma);
        } else if range < 0.2 {
            t = t.min(mean - 0.5 * sigma);
        }
    }

    if max > t_high {
        t = t.max(t_med);
    }
    if max < t_min {
        t = t.min(t_min);
    }

    t.clamp(t_min, t_high)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_clamped_into_bounds() {
        let t = effective_threshold(0.3, &[0.05, 0.02], 0.2, 0.5, 0.8);
        assert!(t >= 0.2 && t <= 0.8);
    }

    #[test]
    fn tightens_on_wide_high_quality_distribution() {
        // Mirrors spec §8 scenario 3.
        let t = effective_threshold(0.3, &[0.92, 0.85, 0.80, 0.30, 0.25], 0.2, 0.5, 0.8);
        assert!(t > 0.3);
        assert!((0.7..=0.8).contains(&t));
    }

    #[test]
    fn loosens_on_tight_middling_distribution() {
        let t = effective_threshold(0.5, &[0.42, 0.44, 0.46, 0.48], 0.2, 0.5, 0.8);
        assert!(t <= 0.5);
    }

    #[test]
    fn single_score_skips_range_adjustment_but_still_clamps() {
        let t = effective_threshold(0.3, &[0.95], 0.2, 0.5, 0.8);
        assert!(t >= 0.2 && t <= 0.8);
        // max > T_high raises the floor to T_med.
        assert!(t >= 0.5);
    }

    #[test]
    fn empty_scores_returns_clamped_base() {
        assert_eq!(effective_threshold(0.9, &[], 0.2, 0.5, 0.8), 0.8);
        assert_eq!(effective_threshold(0.05, &[], 0.2, 0.5, 0.8), 0.2);
    }
}
