use crate::alignment::dtw::{dtw, Warp};
use crate::config::{AlignmentConfig, DistanceMetric};
use crate::error::ScoringError;
use crate::pipeline::traits::{LocalDistance, SequenceAligner};

pub struct EuclideanDistance;

impl LocalDistance for EuclideanDistance {
    fn distance(&self, user: &[f32], reference: &[f32]) -> f64 {
        user.iter()
            .zip(reference)
            .map(|(&a, &b)| {
                let d = a as f64 - b as f64;
                d * d
            })
            .sum::<f64>()
            .sqrt()
    }

    fn name(&self) -> &'static str {
        "euclidean"
    }
}

/// `1 - cos(user, reference)` in `[0, 2]`. Two zero frames are identical (0);
/// a zero frame against a non-zero one is treated as orthogonal (1).
pub struct CosineDistance;

impl LocalDistance for CosineDistance {
    fn distance(&self, user: &[f32], reference: &[f32]) -> f64 {
        let mut dot = 0.0f64;
        let mut norm_u = 0.0f64;
        let mut norm_r = 0.0f64;
        for (&a, &b) in user.iter().zip(reference) {
            let (a, b) = (a as f64, b as f64);
            dot += a * b;
            norm_u += a * a;
            norm_r += b * b;
        }
        match (norm_u > 0.0, norm_r > 0.0) {
            (false, false) => 0.0,
            (true, true) => (1.0 - dot / (norm_u.sqrt() * norm_r.sqrt())).clamp(0.0, 2.0),
            _ => 1.0,
        }
    }

    fn name(&self) -> &'static str {
        "cosine"
    }
}

pub fn local_distance_for(metric: DistanceMetric) -> Box<dyn LocalDistance> {
    match metric {
        DistanceMetric::Euclidean => Box::new(EuclideanDistance),
        DistanceMetric::Cosine => Box::new(CosineDistance),
    }
}

/// Full cost-matrix DTW, optionally restricted to a Sakoe-Chiba band.
pub struct DtwSequenceAligner {
    distance: Box<dyn LocalDistance>,
    band_radius: Option<usize>,
}

impl DtwSequenceAligner {
    pub fn new(distance: Box<dyn LocalDistance>, band_radius: Option<usize>) -> Self {
        Self {
            distance,
            band_radius,
        }
    }

    pub fn from_config(config: &AlignmentConfig) -> Self {
        Self::new(local_distance_for(config.distance), config.band_radius)
    }
}

impl Default for DtwSequenceAligner {
    fn default() -> Self {
        Self::from_config(&AlignmentConfig::default())
    }
}

impl SequenceAligner for DtwSequenceAligner {
    fn warp(&self, user: &[Vec<f32>], reference: &[Vec<f32>]) -> Result<Warp, ScoringError> {
        let warp = dtw(user, reference, self.distance.as_ref(), self.band_radius);
        tracing::debug!(
            metric = self.distance.name(),
            user_frames = user.len(),
            ref_frames = reference.len(),
            path_len = warp.path.len(),
            distance = format!("{:.3}", warp.distance),
            "dtw: warping path found"
        );
        Ok(warp)
    }
}
