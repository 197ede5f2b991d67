use crate::config::ArticulationConfig;
use crate::types::FeatureSet;

/// Articulation similarity of two coefficient windows in `[0, 100]`.
///
/// Compares the average spectral shape (cosine of per-coefficient means) and
/// its texture (cosine of per-coefficient variances), then stretches the
/// useful similarity range above `rescale_floor` onto the score scale. Raw
/// cosine similarity between speech frames rarely drops below the floor, so
/// without the stretch every score would crowd near 100.
///
/// Either window empty → neutral score.
pub fn score_articulation(
    user: &[Vec<f32>],
    reference: &[Vec<f32>],
    config: &ArticulationConfig,
) -> f64 {
    let k = match (user.first(), reference.first()) {
        (Some(u), Some(r)) => u.len().min(r.len()),
        _ => return config.neutral_score,
    };
    if k == 0 {
        return config.neutral_score;
    }

    let (user_mean, user_var) = mean_and_variance(user, k);
    let (ref_mean, ref_var) = mean_and_variance(reference, k);

    let mean_similarity = cosine_similarity(&user_mean, &ref_mean);
    let user_var: Vec<f64> = user_var.iter().map(|v| v + config.variance_epsilon).collect();
    let ref_var: Vec<f64> = ref_var.iter().map(|v| v + config.variance_epsilon).collect();
    let variance_similarity = cosine_similarity(&user_var, &ref_var);

    let combined =
        config.mean_weight * mean_similarity + config.variance_weight * variance_similarity;
    let score = ((combined - config.rescale_floor) / config.rescale_span).clamp(0.0, 1.0) * 100.0;
    score.min(100.0)
}

/// Euclidean distance between the mean coefficient vectors of two recordings.
///
/// A cheap whole-recording similarity check; `None` when either side has no frames.
pub fn feature_distance(a: &FeatureSet, b: &FeatureSet) -> Option<f64> {
    let k = a.coefficient_count().min(b.coefficient_count());
    if a.is_empty() || b.is_empty() {
        return None;
    }
    let (mean_a, _) = mean_and_variance(&a.coefficients, k);
    let (mean_b, _) = mean_and_variance(&b.coefficients, k);
    Some(
        mean_a
            .iter()
            .zip(&mean_b)
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f64>()
            .sqrt(),
    )
}

/// Per-coefficient mean and population variance over the first `k` coefficients.
pub(crate) fn mean_and_variance(frames: &[Vec<f32>], k: usize) -> (Vec<f64>, Vec<f64>) {
    let mut mean = vec![0.0f64; k];
    let mut var = vec![0.0f64; k];
    if frames.is_empty() {
        return (mean, var);
    }
    let n = frames.len() as f64;
    for frame in frames {
        for (acc, &v) in mean.iter_mut().zip(frame.iter().take(k)) {
            *acc += v as f64;
        }
    }
    for acc in &mut mean {
        *acc /= n;
    }
    for frame in frames {
        for ((acc, &v), m) in var.iter_mut().zip(frame.iter().take(k)).zip(&mean) {
            let d = v as f64 - m;
            *acc += d * d;
        }
    }
    for acc in &mut var {
        *acc /= n;
    }
    (mean, var)
}

/// Cosine similarity in `[-1, 1]`. Two zero vectors are identical (1); a zero
/// vector against a non-zero one is orthogonal (0).
pub(crate) fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    match (norm_a > 0.0, norm_b > 0.0) {
        (false, false) => 1.0,
        (true, true) => (dot / (norm_a * norm_b)).clamp(-1.0, 1.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(rows: &[[f32; 3]]) -> Vec<Vec<f32>> {
        rows.iter().map(|r| r.to_vec()).collect()
    }

    #[test]
    fn empty_windows_score_neutral() {
        let config = ArticulationConfig::default();
        assert_eq!(score_articulation(&[], &[], &config), 50.0);
        let one = window(&[[1.0, 2.0, 3.0]]);
        assert_eq!(score_articulation(&one, &[], &config), 50.0);
        assert_eq!(score_articulation(&[], &one, &config), 50.0);
    }

    #[test]
    fn identical_windows_score_maximum() {
        let config = ArticulationConfig::default();
        let w = window(&[[1.0, -2.0, 3.0], [2.0, -1.0, 4.0], [0.5, -3.0, 2.0]]);
        let score = score_articulation(&w, &w, &config);
        assert!((score - 100.0).abs() < 1e-9, "score {score}");
    }

    #[test]
    fn opposite_spectral_shape_scores_zero() {
        let config = ArticulationConfig::default();
        let user = window(&[[1.0, 2.0, 3.0], [1.0, 2.0, 3.0]]);
        let reference = window(&[[-1.0, -2.0, -3.0], [-1.0, -2.0, -3.0]]);
        // Means are opposite (-1); flat windows have equal epsilon variances (1).
        // 0.7 * -1 + 0.3 * 1 = -0.4, below the floor.
        assert_eq!(score_articulation(&user, &reference, &config), 0.0);
    }

    #[test]
    fn score_stays_bounded_for_mixed_windows() {
        let config = ArticulationConfig::default();
        let user = window(&[[10.0, 0.0, -5.0], [12.0, 1.0, -4.0]]);
        let reference = window(&[[0.0, 8.0, 1.0], [1.0, 9.0, 0.0], [2.0, 7.0, 1.0]]);
        let score = score_articulation(&user, &reference, &config);
        assert!((0.0..=100.0).contains(&score));
        assert!(score < 100.0);
    }

    #[test]
    fn zero_coefficient_rows_score_neutral() {
        let config = ArticulationConfig::default();
        let empty_rows = vec![Vec::<f32>::new(); 3];
        assert_eq!(score_articulation(&empty_rows, &empty_rows, &config), 50.0);
    }

    #[test]
    fn mean_and_variance_are_population_statistics() {
        let frames = window(&[[1.0, 0.0, 2.0], [3.0, 0.0, 2.0]]);
        let (mean, var) = mean_and_variance(&frames, 3);
        assert_eq!(mean, vec![2.0, 0.0, 2.0]);
        assert_eq!(var, vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn cosine_similarity_zero_vector_policy() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]), 1.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 1.0], &[2.0, 2.0]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn feature_distance_compares_mean_vectors() {
        let make = |rows: Vec<Vec<f32>>| {
            let n = rows.len();
            FeatureSet {
                coefficients: rows,
                spectral_centroid: vec![0.0; n],
                pitch_hz: vec![0.0; n],
                rms_energy: vec![0.0; n],
                frame_rate_hz: 10.0,
            }
        };
        let a = make(vec![vec![0.0, 0.0], vec![2.0, 0.0]]);
        let b = make(vec![vec![1.0, 4.0]]);
        let d = feature_distance(&a, &b).expect("both sides have frames");
        assert!((d - 4.0).abs() < 1e-12);
        assert_eq!(feature_distance(&a, &make(Vec::new())), None);
    }
}
