//! Window statistics used by the issue detector.

pub(crate) fn mean(values: &[f32]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64)
    }
}

/// Mean of coefficients `[from, to)` across every frame of the window.
/// `None` when the window is empty or has no coefficient in range.
pub(crate) fn band_mean(frames: &[Vec<f32>], from: usize, to: usize) -> Option<f64> {
    let mut sum = 0.0f64;
    let mut count = 0usize;
    for frame in frames {
        let end = to.min(frame.len());
        if from >= end {
            continue;
        }
        sum += frame[from..end].iter().map(|&v| v as f64).sum::<f64>();
        count += end - from;
    }
    (count > 0).then(|| sum / count as f64)
}

fn voiced(pitch_hz: &[f32]) -> impl Iterator<Item = f64> + '_ {
    pitch_hz.iter().filter(|&&p| p > 0.0).map(|&p| p as f64)
}

pub(crate) fn voiced_mean(pitch_hz: &[f32]) -> Option<f64> {
    let (sum, count) = voiced(pitch_hz).fold((0.0, 0usize), |(s, c), p| (s + p, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Population standard deviation over voiced frames; needs two of them.
pub(crate) fn voiced_std(pitch_hz: &[f32]) -> Option<f64> {
    let values: Vec<f64> = voiced(pitch_hz).collect();
    if values.len() < 2 {
        return None;
    }
    let m = values.iter().sum::<f64>() / values.len() as f64;
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    Some(var.sqrt())
}

/// Largest pitch change between adjacent frames that are both voiced.
pub(crate) fn max_voiced_jump(pitch_hz: &[f32]) -> f64 {
    pitch_hz
        .windows(2)
        .filter(|w| w[0] > 0.0 && w[1] > 0.0)
        .map(|w| (w[1] as f64 - w[0] as f64).abs())
        .fold(0.0, f64::max)
}

/// `numerator / denominator`, or a neutral 1.0 when the reference-side
/// denominator is missing, zero or non-finite.
pub(crate) fn guarded_ratio(numerator: f64, denominator: Option<f64>) -> f64 {
    match denominator {
        Some(d) if d > 0.0 && d.is_finite() && numerator.is_finite() => numerator / d,
        _ => 1.0,
    }
}
