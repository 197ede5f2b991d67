//! Rule-based pronunciation diagnostics over one aligned span.
//!
//! Checks run in a fixed order and each appends at most one message:
//! timing, articulation band, spectral brightness, pitch level, pitch
//! stability, pitch jump, loudness. Every ratio is user / reference and falls
//! back to a neutral 1.0 when the reference side has nothing to divide by, so
//! silent or unvoiced spans never raise.

mod stats;

use crate::config::IssueThresholds;
use crate::types::FeatureWindow;

use self::stats::{band_mean, guarded_ratio, max_voiced_jump, mean, voiced_mean, voiced_std};

pub const TOO_FAST: &str = "Reciting too fast - slow down to give long sounds their full length";
pub const TOO_SLOW: &str = "Reciting too slow - elongation may be excessive";
pub const ARTICULATION_POINT: &str = "Articulation point may be incorrect";
pub const LETTER_CHARACTERISTICS: &str = "Letter characteristics may need refinement";
pub const DULL_TONE: &str = "Tone is duller than the reference - articulate more openly";
pub const BRIGHT_TONE: &str = "Tone is brighter than the reference - sound may be too thin";
pub const LOW_PITCH: &str = "Pitch is lower than the reference";
pub const HIGH_PITCH: &str = "Pitch is higher than the reference";
pub const UNSTEADY_PITCH: &str = "Pitch is unsteady - hold a steadier tone";
pub const PITCH_JUMP: &str = "Sudden pitch jump - keep melodic transitions smooth";
pub const QUIET: &str = "Consider more emphasis/projection";
pub const LOUD: &str = "Reduce volume for this segment";
pub const SKIPPED_WORD: &str = "Word may have been skipped or unclear";

/// Coefficients describing the overall vocal-tract shape.
const LOW_BAND: (usize, usize) = (1, 5);
/// Coefficients describing finer articulation detail; only compared when present.
const HIGH_BAND: (usize, usize) = (5, 9);

/// Runs every check over a user window and its aligned reference window.
///
/// `articulation_score` and `timing_score` are the span's already computed
/// scores; they gate the band and timing checks so a span that scored well on
/// a dimension is not also flagged on it.
pub fn detect(
    user: &FeatureWindow<'_>,
    reference: &FeatureWindow<'_>,
    articulation_score: f64,
    timing_score: f64,
    thresholds: &IssueThresholds,
) -> Vec<String> {
    let checks: [fn(&Inputs<'_>) -> Option<&'static str>; 7] = [
        check_timing,
        check_articulation_band,
        check_brightness,
        check_pitch_level,
        check_pitch_stability,
        check_pitch_jump,
        check_loudness,
    ];
    let inputs = Inputs {
        user,
        reference,
        articulation_score,
        timing_score,
        thresholds,
    };
    let issues: Vec<String> = checks
        .iter()
        .filter_map(|check| check(&inputs))
        .map(str::to_string)
        .collect();

    if !issues.is_empty() {
        tracing::debug!(
            user_start = user.start_frame,
            ref_start = reference.start_frame,
            issues = issues.len(),
            "diagnostics: span flagged"
        );
    }
    issues
}

struct Inputs<'a> {
    user: &'a FeatureWindow<'a>,
    reference: &'a FeatureWindow<'a>,
    articulation_score: f64,
    timing_score: f64,
    thresholds: &'a IssueThresholds,
}

fn check_timing(i: &Inputs<'_>) -> Option<&'static str> {
    if i.timing_score >= i.thresholds.timing_gate_score || i.user.is_empty() {
        return None;
    }
    let ref_seconds = i.reference.span_seconds();
    if ref_seconds <= 0.0 || !ref_seconds.is_finite() {
        return None;
    }
    let ratio = i.user.span_seconds() / ref_seconds;
    if ratio < i.thresholds.too_fast_ratio {
        Some(TOO_FAST)
    } else if ratio > i.thresholds.too_slow_ratio {
        Some(TOO_SLOW)
    } else {
        None
    }
}

fn check_articulation_band(i: &Inputs<'_>) -> Option<&'static str> {
    if i.articulation_score >= i.thresholds.articulation_gate_score
        || i.user.is_empty()
        || i.reference.is_empty()
    {
        return None;
    }
    let low_user = band_mean(i.user.coefficients, LOW_BAND.0, LOW_BAND.1);
    let low_ref = band_mean(i.reference.coefficients, LOW_BAND.0, LOW_BAND.1);
    if let (Some(u), Some(r)) = (low_user, low_ref) {
        if (u - r).abs() > i.thresholds.low_band_delta {
            return Some(ARTICULATION_POINT);
        }
    }

    let high_mean = |w: &FeatureWindow<'_>| {
        let has_band = w.coefficients.first().map_or(false, |f| f.len() >= HIGH_BAND.1);
        if has_band {
            band_mean(w.coefficients, HIGH_BAND.0, HIGH_BAND.1).unwrap_or(0.0)
        } else {
            0.0
        }
    };
    if (high_mean(i.user) - high_mean(i.reference)).abs() > i.thresholds.high_band_delta {
        return Some(LETTER_CHARACTERISTICS);
    }
    None
}

fn check_brightness(i: &Inputs<'_>) -> Option<&'static str> {
    let user = mean(i.user.spectral_centroid)?;
    let ratio = guarded_ratio(user, mean(i.reference.spectral_centroid));
    if ratio < i.thresholds.dull_centroid_ratio {
        Some(DULL_TONE)
    } else if ratio > i.thresholds.bright_centroid_ratio {
        Some(BRIGHT_TONE)
    } else {
        None
    }
}

fn check_pitch_level(i: &Inputs<'_>) -> Option<&'static str> {
    let user = voiced_mean(i.user.pitch_hz)?;
    let ratio = guarded_ratio(user, voiced_mean(i.reference.pitch_hz));
    if ratio < i.thresholds.low_pitch_ratio {
        Some(LOW_PITCH)
    } else if ratio > i.thresholds.high_pitch_ratio {
        Some(HIGH_PITCH)
    } else {
        None
    }
}

fn check_pitch_stability(i: &Inputs<'_>) -> Option<&'static str> {
    let user = voiced_std(i.user.pitch_hz)?;
    let ratio = guarded_ratio(user, voiced_std(i.reference.pitch_hz));
    (ratio > i.thresholds.unstable_pitch_ratio).then_some(UNSTEADY_PITCH)
}

fn check_pitch_jump(i: &Inputs<'_>) -> Option<&'static str> {
    let floor = i.thresholds.pitch_jump_floor_hz;
    let user_jump = max_voiced_jump(i.user.pitch_hz);
    if user_jump < floor {
        return None;
    }
    let ref_jump = max_voiced_jump(i.reference.pitch_hz).max(floor);
    (user_jump > i.thresholds.pitch_jump_ratio * ref_jump).then_some(PITCH_JUMP)
}

fn check_loudness(i: &Inputs<'_>) -> Option<&'static str> {
    if i.user.len() < 2 || i.reference.len() < 2 {
        return None;
    }
    let user = mean(i.user.rms_energy)?;
    let reference = mean(i.reference.rms_energy).filter(|&r| r > 0.0)?;
    let ratio = user / reference;
    if ratio < i.thresholds.quiet_energy_ratio {
        Some(QUIET)
    } else if ratio > i.thresholds.loud_energy_ratio {
        Some(LOUD)
    } else {
        None
    }
}
