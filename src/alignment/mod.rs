pub mod dtw;

use crate::config::AlignmentConfig;
use crate::error::ScoringError;
use crate::pipeline::defaults::DtwSequenceAligner;
use crate::pipeline::traits::SequenceAligner;
use crate::types::{AlignmentResult, FeatureSet};

use self::dtw::Warp;

/// Aligns `user` against `reference` with the default DTW settings.
pub fn align(user: &FeatureSet, reference: &FeatureSet) -> Result<AlignmentResult, ScoringError> {
    let config = AlignmentConfig::default();
    align_with(&DtwSequenceAligner::from_config(&config), user, reference, &config)
}

/// Aligns two feature sets through `aligner` and derives frame maps and
/// time-stretch ratios from the path.
///
/// Mismatched coefficient counts are the only failure. An empty side yields a
/// degenerate result with an empty path.
pub fn align_with(
    aligner: &dyn SequenceAligner,
    user: &FeatureSet,
    reference: &FeatureSet,
    config: &AlignmentConfig,
) -> Result<AlignmentResult, ScoringError> {
    user.validate()?;
    reference.validate()?;

    if user.is_empty() || reference.is_empty() {
        tracing::warn!(
            user_frames = user.frame_count(),
            ref_frames = reference.frame_count(),
            "alignment: empty feature sequence, returning degenerate alignment"
        );
        return Ok(AlignmentResult::degenerate());
    }

    let (user_k, ref_k) = (user.coefficient_count(), reference.coefficient_count());
    if user_k != ref_k {
        return Err(ScoringError::dimension_mismatch(user_k, ref_k));
    }

    let warp = aligner.warp(&user.coefficients, &reference.coefficients)?;
    check_path(&warp, user.frame_count(), reference.frame_count())?;
    Ok(build_alignment(warp, user, reference, config.time_stretch_chunk))
}

fn check_path(warp: &Warp, user_frames: usize, ref_frames: usize) -> Result<(), ScoringError> {
    let starts = warp.path.first() == Some(&(0, 0));
    let ends = warp.path.last() == Some(&(user_frames - 1, ref_frames - 1));
    let monotone = warp
        .path
        .windows(2)
        .all(|w| {
            w[1].0 >= w[0].0 && w[1].1 >= w[0].1 && w[1].0 - w[0].0 <= 1 && w[1].1 - w[0].1 <= 1
        });
    if starts && ends && monotone {
        Ok(())
    } else {
        Err(ScoringError::invalid_input(format!(
            "sequence aligner returned an invalid path of {} points for {user_frames}x{ref_frames} frames",
            warp.path.len()
        )))
    }
}

pub(crate) fn build_alignment(
    warp: Warp,
    user: &FeatureSet,
    reference: &FeatureSet,
    time_stretch_chunk: usize,
) -> AlignmentResult {
    let (user_to_ref, ref_to_user) =
        frame_maps(&warp.path, user.frame_count(), reference.frame_count());
    let time_stretch = compute_time_stretch(
        &warp.path,
        user.frame_rate_hz,
        reference.frame_rate_hz,
        time_stretch_chunk,
    );
    let normalized_distance = if warp.path.is_empty() {
        0.0
    } else {
        warp.distance / warp.path.len() as f64
    };

    tracing::debug!(
        path_len = warp.path.len(),
        distance = format!("{:.3}", warp.distance),
        normalized_distance = format!("{:.4}", normalized_distance),
        stretch_chunks = time_stretch.len(),
        "alignment: derived frame maps and time stretch"
    );

    AlignmentResult {
        path: warp.path,
        distance: warp.distance,
        normalized_distance,
        user_to_ref,
        ref_to_user,
        time_stretch,
    }
}

/// Forward map keeps the reference frame of the last path point for each user
/// frame (the end of a held user sound); the reverse map keeps the first user
/// frame for each reference frame (the start of a held reference sound).
pub(crate) fn frame_maps(
    path: &[(usize, usize)],
    user_frames: usize,
    ref_frames: usize,
) -> (Vec<usize>, Vec<usize>) {
    let mut user_to_ref = vec![0usize; user_frames];
    let mut ref_to_user: Vec<Option<usize>> = vec![None; ref_frames];
    for &(u, r) in path {
        if let Some(slot) = user_to_ref.get_mut(u) {
            *slot = r;
        }
        if let Some(slot) = ref_to_user.get_mut(r) {
            slot.get_or_insert(u);
        }
    }
    // A valid path visits every frame on both sides.
    let ref_to_user = ref_to_user.into_iter().map(|u| u.unwrap_or(0)).collect();
    (user_to_ref, ref_to_user)
}

/// Local duration ratios (user / reference) over chunks of roughly
/// `chunk_points` path points. Neighbouring chunks share their boundary point.
pub fn compute_time_stretch(
    path: &[(usize, usize)],
    user_rate_hz: f64,
    ref_rate_hz: f64,
    chunk_points: usize,
) -> Vec<f64> {
    if path.len() < 2 {
        return vec![1.0];
    }

    let n_chunks = (path.len() / chunk_points.max(1)).max(1);
    let chunk_size = path.len() / n_chunks;

    let mut stretches = Vec::with_capacity(n_chunks);
    for i in 0..n_chunks {
        let start_idx = i * chunk_size;
        let end_idx = ((i + 1) * chunk_size).min(path.len() - 1);
        if start_idx >= end_idx {
            break;
        }
        let (user_start, ref_start) = path[start_idx];
        let (user_end, ref_end) = path[end_idx];

        let user_elapsed = (user_end - user_start) as f64 / user_rate_hz;
        let ref_elapsed = (ref_end - ref_start) as f64 / ref_rate_hz;
        let stretch = if ref_elapsed > 0.0 && ref_elapsed.is_finite() {
            user_elapsed / ref_elapsed
        } else {
            1.0
        };
        stretches.push(stretch);
    }

    if stretches.is_empty() {
        vec![1.0]
    } else {
        stretches
    }
}
