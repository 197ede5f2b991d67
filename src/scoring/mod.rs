pub mod articulation;
pub mod timing;

pub use articulation::{feature_distance, score_articulation};
pub use timing::{duration_ratio, score_duration_ratio, score_timing, span_seconds, FrameRates};

/// Weighted blend of articulation and timing for one span.
pub fn span_overall(
    articulation_score: f64,
    timing_score: f64,
    articulation_weight: f64,
    timing_weight: f64,
) -> f64 {
    (articulation_weight * articulation_score + timing_weight * timing_score).clamp(0.0, 100.0)
}

/// Fluency from the normalized warping distance: 100 at distance 0, falling
/// linearly to 0 at `divisor`.
pub fn fluency_score(normalized_distance: f64, divisor: f64) -> f64 {
    if !normalized_distance.is_finite() || divisor <= 0.0 {
        return 0.0;
    }
    (1.0 - normalized_distance / divisor).clamp(0.0, 1.0) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_overall_weights_articulation_over_timing() {
        assert!((span_overall(100.0, 50.0, 0.6, 0.4) - 80.0).abs() < 1e-9);
        assert_eq!(span_overall(100.0, 100.0, 0.6, 0.4), 100.0);
    }

    #[test]
    fn fluency_endpoints() {
        assert_eq!(fluency_score(0.0, 50.0), 100.0);
        assert_eq!(fluency_score(25.0, 50.0), 50.0);
        assert_eq!(fluency_score(50.0, 50.0), 0.0);
        assert_eq!(fluency_score(500.0, 50.0), 0.0);
        assert_eq!(fluency_score(f64::NAN, 50.0), 0.0);
    }

    #[test]
    fn fluency_is_non_increasing_in_distance() {
        let mut prev = fluency_score(0.0, 50.0);
        for step in 1..=200 {
            let score = fluency_score(step as f64 * 0.5, 50.0);
            assert!(score <= prev);
            prev = score;
        }
    }
}
