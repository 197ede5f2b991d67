use crate::alignment::dtw::Warp;
use crate::error::ScoringError;

/// Distance between two coefficient frames of equal length. Lower is closer.
pub trait LocalDistance: Send + Sync {
    fn distance(&self, user: &[f32], reference: &[f32]) -> f64;

    fn name(&self) -> &'static str;
}

/// Finds a monotone warping path between two frame-major coefficient sequences.
///
/// Both inputs are non-empty and share a coefficient count. The returned path
/// must start at `(0, 0)`, end at `(user.len() - 1, reference.len() - 1)` and
/// never decrease in either coordinate.
pub trait SequenceAligner: Send + Sync {
    fn warp(&self, user: &[Vec<f32>], reference: &[Vec<f32>]) -> Result<Warp, ScoringError>;
}
