use crate::config::TimingConfig;

/// Frame rates of the two recordings being compared.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRates {
    pub user_hz: f64,
    pub reference_hz: f64,
}

/// Seconds between two frame indices. A non-positive rate or inverted span is 0.
pub fn span_seconds(start: usize, end: usize, rate_hz: f64) -> f64 {
    if rate_hz.is_nan() || rate_hz <= 0.0 {
        return 0.0;
    }
    end.saturating_sub(start) as f64 / rate_hz
}

/// User / reference duration ratio, `None` when the reference span has no duration.
pub fn duration_ratio(
    user_start: usize,
    user_end: usize,
    ref_start: usize,
    ref_end: usize,
    rates: FrameRates,
) -> Option<f64> {
    let user_seconds = span_seconds(user_start, user_end, rates.user_hz);
    let ref_seconds = span_seconds(ref_start, ref_end, rates.reference_hz);
    (ref_seconds > 0.0).then(|| user_seconds / ref_seconds)
}

/// Timing score in `[0, 100]` for a pair of frame spans.
pub fn score_timing(
    user_start: usize,
    user_end: usize,
    ref_start: usize,
    ref_end: usize,
    rates: FrameRates,
    config: &TimingConfig,
) -> f64 {
    match duration_ratio(user_start, user_end, ref_start, ref_end, rates) {
        Some(ratio) => score_duration_ratio(ratio, config),
        None => config.neutral_score,
    }
}

/// Three-tier score of a duration ratio.
///
/// Inside the good band the score slides from the peak at 1.0 down to the good
/// floor; in the fair band it slides from the good floor to the fair floor by
/// distance from the nearer good edge; outside it falls linearly with
/// `|ratio - 1|` and stops at 0.
pub fn score_duration_ratio(ratio: f64, config: &TimingConfig) -> f64 {
    if !ratio.is_finite() {
        return 0.0;
    }
    let deviation = (ratio - 1.0).abs();
    let score = if (config.good_low..=config.good_high).contains(&ratio) {
        config.peak_score
            - deviation / config.good_deviation_scale
                * (config.peak_score - config.good_floor_score)
    } else if (config.fair_low..=config.fair_high).contains(&ratio) {
        let past_edge = if ratio < 1.0 {
            config.good_low - ratio
        } else {
            ratio - config.good_high
        };
        config.good_floor_score
            - past_edge / config.fair_deviation_scale
                * (config.good_floor_score - config.fair_floor_score)
    } else {
        (config.fair_floor_score - config.poor_slope * deviation).max(0.0)
    };
    score.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATES: FrameRates = FrameRates {
        user_hz: 100.0,
        reference_hz: 100.0,
    };

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn equal_durations_score_peak() {
        let config = TimingConfig::default();
        assert_eq!(score_timing(0, 50, 10, 60, RATES, &config), 100.0);
        assert_eq!(score_duration_ratio(1.0, &config), 100.0);
    }

    #[test]
    fn zero_reference_duration_is_neutral() {
        let config = TimingConfig::default();
        assert_eq!(score_timing(0, 50, 7, 7, RATES, &config), 50.0);
        assert_eq!(duration_ratio(0, 50, 7, 7, RATES), None);
    }

    #[test]
    fn double_duration_lands_in_poor_tier() {
        let config = TimingConfig::default();
        // User 2x slower: max(0, 50 - 25 * 1.0) = 25.
        assert!(approx(score_timing(0, 100, 0, 50, RATES, &config), 25.0));
    }

    #[test]
    fn half_duration_lands_on_fair_floor() {
        let config = TimingConfig::default();
        assert!(approx(score_duration_ratio(0.5, &config), 50.0));
    }

    #[test]
    fn band_edges() {
        let config = TimingConfig::default();
        assert!(approx(score_duration_ratio(0.8, &config), 80.0));
        assert!(approx(score_duration_ratio(1.2, &config), 80.0));
        assert!(approx(score_duration_ratio(1.5, &config), 50.0));
        assert!(approx(score_duration_ratio(0.9, &config), 90.0));
        assert!(approx(score_duration_ratio(1.35, &config), 65.0));
        assert!(approx(score_duration_ratio(3.0, &config), 0.0));
        assert_eq!(score_duration_ratio(0.0, &config), 25.0);
    }

    #[test]
    fn strictly_decreasing_within_each_band() {
        let config = TimingConfig::default();
        let bands: [(f64, f64); 5] = [
            (1.0, 1.2),
            (1.21, 1.5),
            (1.0, 0.8),
            (0.79, 0.5),
            (1.51, 2.9),
        ];
        for (from, to) in bands {
            let steps = 20;
            let mut prev = score_duration_ratio(from, &config);
            for s in 1..=steps {
                let ratio = from + (to - from) * s as f64 / steps as f64;
                let score = score_duration_ratio(ratio, &config);
                assert!(score < prev, "ratio {ratio}: {score} !< {prev}");
                prev = score;
            }
        }
    }

    #[test]
    fn uses_each_side_frame_rate() {
        let config = TimingConfig::default();
        let rates = FrameRates {
            user_hz: 50.0,
            reference_hz: 100.0,
        };
        // 25 user frames at 50 Hz == 50 reference frames at 100 Hz.
        assert_eq!(score_timing(0, 25, 0, 50, rates, &config), 100.0);
    }

    #[test]
    fn span_seconds_guards_rate_and_order() {
        assert_eq!(span_seconds(10, 5, 100.0), 0.0);
        assert_eq!(span_seconds(0, 10, 0.0), 0.0);
        assert!(approx(span_seconds(0, 10, 100.0), 0.1));
    }

    #[test]
    fn non_finite_ratio_scores_zero() {
        let config = TimingConfig::default();
        assert_eq!(score_duration_ratio(f64::INFINITY, &config), 0.0);
        assert_eq!(score_duration_ratio(f64::NAN, &config), 0.0);
    }
}
