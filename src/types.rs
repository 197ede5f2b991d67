use serde::{Deserialize, Serialize};

use crate::error::ScoringError;

/// Per-frame acoustic features of one recording.
///
/// `coefficients` is frame-major: one row of K articulation coefficients per
/// frame. Every per-frame sequence has the same length, and frame `i` sits at
/// `i / frame_rate_hz` seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub coefficients: Vec<Vec<f32>>,
    pub spectral_centroid: Vec<f32>,
    /// Fundamental frequency in Hz, 0 for unvoiced frames.
    pub pitch_hz: Vec<f32>,
    pub rms_energy: Vec<f32>,
    pub frame_rate_hz: f64,
}

impl FeatureSet {
    /// Builds a feature set whose frame rate is derived from the extractor's
    /// sample rate and hop size.
    pub fn from_hop(
        sample_rate_hz: u32,
        hop_length: usize,
        coefficients: Vec<Vec<f32>>,
        spectral_centroid: Vec<f32>,
        pitch_hz: Vec<f32>,
        rms_energy: Vec<f32>,
    ) -> Result<Self, ScoringError> {
        if hop_length == 0 {
            return Err(ScoringError::invalid_input("hop_length must be > 0"));
        }
        let features = Self {
            coefficients,
            spectral_centroid,
            pitch_hz,
            rms_energy,
            frame_rate_hz: sample_rate_hz as f64 / hop_length as f64,
        };
        features.validate()?;
        Ok(features)
    }

    pub fn frame_count(&self) -> usize {
        self.coefficients.len()
    }

    /// Coefficient count K, or 0 for an empty feature set.
    pub fn coefficient_count(&self) -> usize {
        self.coefficients.first().map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    pub fn frame_to_seconds(&self, frame: usize) -> f64 {
        frame as f64 / self.frame_rate_hz
    }

    pub fn duration_seconds(&self) -> f64 {
        self.frame_to_seconds(self.frame_count())
    }

    pub fn validate(&self) -> Result<(), ScoringError> {
        if !self.frame_rate_hz.is_finite() || self.frame_rate_hz <= 0.0 {
            return Err(ScoringError::invalid_input(format!(
                "frame_rate_hz must be finite and > 0, got {}",
                self.frame_rate_hz
            )));
        }

        let n = self.frame_count();
        for (name, len) in [
            ("spectral_centroid", self.spectral_centroid.len()),
            ("pitch_hz", self.pitch_hz.len()),
            ("rms_energy", self.rms_energy.len()),
        ] {
            if len != n {
                return Err(ScoringError::invalid_input(format!(
                    "{name} has {len} frames, coefficients have {n}"
                )));
            }
        }

        let k = self.coefficient_count();
        if let Some(frame) = self.coefficients.iter().position(|row| row.len() != k) {
            return Err(ScoringError::invalid_input(format!(
                "coefficient row {frame} has {} values, expected {k}",
                self.coefficients[frame].len()
            )));
        }

        let non_finite = self.coefficients.iter().flatten().any(|v| !v.is_finite())
            || self
                .spectral_centroid
                .iter()
                .chain(&self.pitch_hz)
                .chain(&self.rms_energy)
                .any(|v| !v.is_finite());
        if non_finite {
            return Err(ScoringError::invalid_input(
                "feature set contains non-finite values",
            ));
        }
        Ok(())
    }

    /// Inclusive frame window `[start, end]`, clamped to the available frames.
    /// An inverted or out-of-range request yields an empty window.
    pub fn window(&self, start: usize, end: usize) -> FeatureWindow<'_> {
        let n = self.frame_count();
        let range = if n == 0 || start > end || start >= n {
            0..0
        } else {
            start..end.min(n - 1) + 1
        };
        FeatureWindow {
            start_frame: range.start,
            coefficients: &self.coefficients[range.clone()],
            spectral_centroid: &self.spectral_centroid[range.clone()],
            pitch_hz: &self.pitch_hz[range.clone()],
            rms_energy: &self.rms_energy[range],
            frame_rate_hz: self.frame_rate_hz,
        }
    }
}

/// Borrowed view over a contiguous frame range of a [`FeatureSet`].
#[derive(Debug, Clone, Copy)]
pub struct FeatureWindow<'a> {
    pub start_frame: usize,
    pub coefficients: &'a [Vec<f32>],
    pub spectral_centroid: &'a [f32],
    pub pitch_hz: &'a [f32],
    pub rms_energy: &'a [f32],
    pub frame_rate_hz: f64,
}

impl FeatureWindow<'_> {
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Elapsed seconds between the first and last frame of the window.
    pub fn span_seconds(&self) -> f64 {
        self.len().saturating_sub(1) as f64 / self.frame_rate_hz
    }
}

/// Word timing in reference-audio time, supplied by an external source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordBoundary {
    pub index: usize,
    pub text: String,
    pub start_ms: u64,
    pub end_ms: u64,
}

impl WordBoundary {
    /// `start_ms == end_ms == 0` marks a word whose timing the source does not know.
    pub fn has_unknown_timing(&self) -> bool {
        self.start_ms == 0 && self.end_ms == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignmentResult {
    /// Monotone `(user_frame, ref_frame)` pairs from `(0, 0)` to `(Nu-1, Nr-1)`.
    pub path: Vec<(usize, usize)>,
    pub distance: f64,
    /// `distance / path.len()`.
    pub normalized_distance: f64,
    /// Reference frame paired with the last occurrence of each user frame.
    pub user_to_ref: Vec<usize>,
    /// User frame paired with the first occurrence of each reference frame.
    pub ref_to_user: Vec<usize>,
    /// Local user/reference duration ratios along the path; > 1 means the user is slower.
    pub time_stretch: Vec<f64>,
}

impl AlignmentResult {
    pub(crate) fn degenerate() -> Self {
        Self {
            path: Vec::new(),
            distance: 0.0,
            normalized_distance: 0.0,
            user_to_ref: Vec::new(),
            ref_to_user: Vec::new(),
            time_stretch: vec![1.0],
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.path.is_empty()
    }

    /// Every reference frame the path pairs with `user_frame`, in path order.
    pub fn aligned_ref_frames(&self, user_frame: usize) -> Vec<usize> {
        self.path
            .iter()
            .filter(|&&(u, _)| u == user_frame)
            .map(|&(_, r)| r)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentFeedback {
    /// Seconds in the user's recording.
    pub start_time: f64,
    pub end_time: f64,
    pub articulation_score: f64,
    pub timing_score: f64,
    pub overall_score: f64,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordFeedback {
    pub word_index: usize,
    pub text: String,
    /// Seconds in the user's recording.
    pub start_time: f64,
    pub end_time: f64,
    pub articulation_score: f64,
    pub timing_score: f64,
    pub overall_score: f64,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PronunciationReport {
    pub overall_score: f64,
    pub articulation_score: f64,
    pub timing_score: f64,
    pub fluency_score: f64,
    pub segments: Vec<SegmentFeedback>,
    pub words: Vec<WordFeedback>,
    pub summary: String,
}
