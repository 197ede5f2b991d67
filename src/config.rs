use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ScoringError;

/// Local frame distance used by the warping search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    #[default]
    Euclidean,
    Cosine,
}

impl DistanceMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Euclidean => "euclidean",
            Self::Cosine => "cosine",
        }
    }
}

/// Every empirically tuned constant of the scoring pipeline.
///
/// Each section deserializes with its own defaults, so a JSON file only needs
/// to name the values it overrides. A partial issue threshold table is merged
/// onto the matching built-in table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub alignment: AlignmentConfig,
    pub articulation: ArticulationConfig,
    pub timing: TimingConfig,
    pub aggregation: AggregationConfig,
    #[serde(
        default = "IssueThresholds::segment",
        deserialize_with = "segment_thresholds"
    )]
    pub segment_issues: IssueThresholds,
    #[serde(default = "IssueThresholds::word", deserialize_with = "word_thresholds")]
    pub word_issues: IssueThresholds,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            alignment: AlignmentConfig::default(),
            articulation: ArticulationConfig::default(),
            timing: TimingConfig::default(),
            aggregation: AggregationConfig::default(),
            segment_issues: IssueThresholds::segment(),
            word_issues: IssueThresholds::word(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    pub distance: DistanceMetric,
    /// Path points per time-stretch chunk.
    pub time_stretch_chunk: usize,
    /// Sakoe-Chiba band half-width in frames; `None` searches the full matrix.
    pub band_radius: Option<usize>,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            distance: DistanceMetric::Euclidean,
            time_stretch_chunk: 20,
            band_radius: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticulationConfig {
    pub mean_weight: f64,
    pub variance_weight: f64,
    /// Added to every variance before comparing, keeps flat windows off the zero vector.
    pub variance_epsilon: f64,
    /// Combined similarity mapped to score 0.
    pub rescale_floor: f64,
    /// Similarity range above the floor mapped onto 0..=100.
    pub rescale_span: f64,
    pub neutral_score: f64,
}

impl Default for ArticulationConfig {
    fn default() -> Self {
        Self {
            mean_weight: 0.7,
            variance_weight: 0.3,
            variance_epsilon: 1e-6,
            rescale_floor: 0.3,
            rescale_span: 0.7,
            neutral_score: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub good_low: f64,
    pub good_high: f64,
    pub fair_low: f64,
    pub fair_high: f64,
    pub peak_score: f64,
    /// Score at the edges of the good band.
    pub good_floor_score: f64,
    /// Score at the outer edges of the fair band.
    pub fair_floor_score: f64,
    /// Ratio deviation that spends the whole good-band score range.
    pub good_deviation_scale: f64,
    /// Distance past the good band that spends the whole fair-band score range.
    pub fair_deviation_scale: f64,
    /// Points lost per unit of `|ratio - 1|` outside the fair band.
    pub poor_slope: f64,
    pub neutral_score: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            good_low: 0.8,
            good_high: 1.2,
            fair_low: 0.5,
            fair_high: 1.5,
            peak_score: 100.0,
            good_floor_score: 80.0,
            fair_floor_score: 50.0,
            good_deviation_scale: 0.2,
            fair_deviation_scale: 0.3,
            poor_slope: 25.0,
            neutral_score: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    pub segment_count: usize,
    pub span_articulation_weight: f64,
    pub span_timing_weight: f64,
    pub overall_articulation_weight: f64,
    pub overall_timing_weight: f64,
    pub overall_fluency_weight: f64,
    /// Normalized DTW distance at which fluency reaches 0.
    pub fluency_distance_divisor: f64,
    /// Score given to words the alignment could not anchor.
    pub unresolved_word_score: f64,
    /// Score given to words whose timing is unknown.
    pub unknown_timing_word_score: f64,
    pub summary: SummaryConfig,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            segment_count: 5,
            span_articulation_weight: 0.6,
            span_timing_weight: 0.4,
            overall_articulation_weight: 0.5,
            overall_timing_weight: 0.3,
            overall_fluency_weight: 0.2,
            fluency_distance_divisor: 50.0,
            unresolved_word_score: 30.0,
            unknown_timing_word_score: 50.0,
            summary: SummaryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    pub excellent_score: f64,
    pub good_score: f64,
    pub acceptable_score: f64,
    /// Sub-scores below this add an advisory clause.
    pub advisory_score: f64,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            excellent_score: 90.0,
            good_score: 75.0,
            acceptable_score: 60.0,
            advisory_score: 70.0,
        }
    }
}

/// Hard thresholds for the rule-based issue detector.
///
/// Ratios are user / reference. Segment and word tables differ on purpose:
/// word spans are short, so their estimates are noisier and flagged sooner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueThresholds {
    pub too_fast_ratio: f64,
    pub too_slow_ratio: f64,
    /// Timing messages only fire when the timing score is below this.
    pub timing_gate_score: f64,
    /// Band comparison only runs when the articulation score is below this.
    pub articulation_gate_score: f64,
    pub low_band_delta: f64,
    pub high_band_delta: f64,
    pub dull_centroid_ratio: f64,
    pub bright_centroid_ratio: f64,
    pub low_pitch_ratio: f64,
    pub high_pitch_ratio: f64,
    pub unstable_pitch_ratio: f64,
    pub pitch_jump_ratio: f64,
    /// Jumps smaller than this (Hz) are never flagged.
    pub pitch_jump_floor_hz: f64,
    pub quiet_energy_ratio: f64,
    pub loud_energy_ratio: f64,
}

impl IssueThresholds {
    pub fn segment() -> Self {
        Self {
            too_fast_ratio: 0.7,
            too_slow_ratio: 1.5,
            timing_gate_score: 80.0,
            articulation_gate_score: 60.0,
            low_band_delta: 10.0,
            high_band_delta: 5.0,
            dull_centroid_ratio: 0.7,
            bright_centroid_ratio: 1.4,
            low_pitch_ratio: 0.8,
            high_pitch_ratio: 1.25,
            unstable_pitch_ratio: 2.0,
            pitch_jump_ratio: 2.0,
            pitch_jump_floor_hz: 50.0,
            quiet_energy_ratio: 0.5,
            loud_energy_ratio: 2.0,
        }
    }

    pub fn word() -> Self {
        Self {
            too_fast_ratio: 0.75,
            too_slow_ratio: 1.4,
            timing_gate_score: 80.0,
            articulation_gate_score: 65.0,
            low_band_delta: 8.0,
            high_band_delta: 4.0,
            dull_centroid_ratio: 0.75,
            bright_centroid_ratio: 1.3,
            low_pitch_ratio: 0.85,
            high_pitch_ratio: 1.2,
            unstable_pitch_ratio: 1.75,
            pitch_jump_ratio: 1.75,
            pitch_jump_floor_hz: 40.0,
            quiet_energy_ratio: 0.6,
            loud_energy_ratio: 1.75,
        }
    }
}

/// Declares the partial mirror of [`IssueThresholds`] used by config files.
macro_rules! threshold_overrides {
    ($($field:ident),* $(,)?) => {
        #[derive(Debug, Default, Deserialize)]
        #[serde(default, deny_unknown_fields)]
        struct IssueThresholdOverrides {
            $($field: Option<f64>,)*
        }

        impl IssueThresholdOverrides {
            fn apply(self, mut base: IssueThresholds) -> IssueThresholds {
                $(
                    if let Some(value) = self.$field {
                        base.$field = value;
                    }
                )*
                base
            }
        }

        impl IssueThresholds {
            fn named_values(&self) -> Vec<(&'static str, f64)> {
                vec![$((stringify!($field), self.$field)),*]
            }
        }
    };
}

threshold_overrides!(
    too_fast_ratio,
    too_slow_ratio,
    timing_gate_score,
    articulation_gate_score,
    low_band_delta,
    high_band_delta,
    dull_centroid_ratio,
    bright_centroid_ratio,
    low_pitch_ratio,
    high_pitch_ratio,
    unstable_pitch_ratio,
    pitch_jump_ratio,
    pitch_jump_floor_hz,
    quiet_energy_ratio,
    loud_energy_ratio,
);

fn segment_thresholds<'de, D>(deserializer: D) -> Result<IssueThresholds, D::Error>
where
    D: Deserializer<'de>,
{
    IssueThresholdOverrides::deserialize(deserializer)
        .map(|overrides| overrides.apply(IssueThresholds::segment()))
}

fn word_thresholds<'de, D>(deserializer: D) -> Result<IssueThresholds, D::Error>
where
    D: Deserializer<'de>,
{
    IssueThresholdOverrides::deserialize(deserializer)
        .map(|overrides| overrides.apply(IssueThresholds::word()))
}

impl IssueThresholds {
    fn validate(&self, table: &str) -> Result<(), ScoringError> {
        for (name, value) in self.named_values() {
            if !value.is_finite() || value < 0.0 {
                return Err(ScoringError::invalid_input(format!(
                    "{table}.{name} must be finite and >= 0, got {value}"
                )));
            }
        }

        let ordered = [
            ("too_fast_ratio", self.too_fast_ratio, "too_slow_ratio", self.too_slow_ratio),
            (
                "dull_centroid_ratio",
                self.dull_centroid_ratio,
                "bright_centroid_ratio",
                self.bright_centroid_ratio,
            ),
            ("low_pitch_ratio", self.low_pitch_ratio, "high_pitch_ratio", self.high_pitch_ratio),
            (
                "quiet_energy_ratio",
                self.quiet_energy_ratio,
                "loud_energy_ratio",
                self.loud_energy_ratio,
            ),
        ];
        for (low_name, low, high_name, high) in ordered {
            if low >= high {
                return Err(ScoringError::invalid_input(format!(
                    "{table}.{low_name} ({low}) must be below {table}.{high_name} ({high})"
                )));
            }
        }

        for (name, value) in [
            ("timing_gate_score", self.timing_gate_score),
            ("articulation_gate_score", self.articulation_gate_score),
        ] {
            if value > 100.0 {
                return Err(ScoringError::invalid_input(format!(
                    "{table}.{name} must be within 0..=100, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl ScoringConfig {
    pub fn load(path: &Path) -> Result<Self, ScoringError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| ScoringError::io("read scoring config", e))?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|e| ScoringError::json("parse scoring config", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ScoringError> {
        let positive = [
            ("articulation.rescale_span", self.articulation.rescale_span),
            ("timing.good_deviation_scale", self.timing.good_deviation_scale),
            ("timing.fair_deviation_scale", self.timing.fair_deviation_scale),
            (
                "aggregation.fluency_distance_divisor",
                self.aggregation.fluency_distance_divisor,
            ),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ScoringError::invalid_input(format!(
                    "{name} must be finite and > 0, got {value}"
                )));
            }
        }

        let t = &self.timing;
        let nested = t.fair_low <= t.good_low
            && t.good_low <= 1.0
            && 1.0 <= t.good_high
            && t.good_high <= t.fair_high;
        if !nested {
            return Err(ScoringError::invalid_input(format!(
                "timing bands must nest around 1.0: fair [{}, {}], good [{}, {}]",
                t.fair_low, t.fair_high, t.good_low, t.good_high
            )));
        }

        let a = &self.articulation;
        let g = &self.aggregation;
        let weight_groups: [&[(&str, f64)]; 3] = [
            &[
                ("articulation.mean_weight", a.mean_weight),
                ("articulation.variance_weight", a.variance_weight),
            ],
            &[
                ("aggregation.span_articulation_weight", g.span_articulation_weight),
                ("aggregation.span_timing_weight", g.span_timing_weight),
            ],
            &[
                ("aggregation.overall_articulation_weight", g.overall_articulation_weight),
                ("aggregation.overall_timing_weight", g.overall_timing_weight),
                ("aggregation.overall_fluency_weight", g.overall_fluency_weight),
            ],
        ];
        for group in weight_groups {
            for &(name, value) in group {
                if !value.is_finite() || value < 0.0 {
                    return Err(ScoringError::invalid_input(format!(
                        "{name} must be finite and >= 0, got {value}"
                    )));
                }
            }
            if group.iter().map(|&(_, value)| value).sum::<f64>() <= 0.0 {
                let names: Vec<&str> = group.iter().map(|&(name, _)| name).collect();
                return Err(ScoringError::invalid_input(format!(
                    "weights {} must not all be zero",
                    names.join(", ")
                )));
            }
        }

        if self.alignment.time_stretch_chunk == 0 {
            return Err(ScoringError::invalid_input(
                "alignment.time_stretch_chunk must be >= 1",
            ));
        }

        self.segment_issues.validate("segment_issues")?;
        self.word_issues.validate("word_issues")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoring_config_default() {
        let config = ScoringConfig::default();
        assert_eq!(config.alignment.distance, DistanceMetric::Euclidean);
        assert_eq!(config.alignment.time_stretch_chunk, 20);
        assert_eq!(config.aggregation.segment_count, 5);
        assert_eq!(config.aggregation.fluency_distance_divisor, 50.0);
        assert_eq!(config.articulation.rescale_floor, 0.3);
        assert_eq!(config.segment_issues, IssueThresholds::segment());
        assert_eq!(config.word_issues, IssueThresholds::word());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_overrides_only_named_values() {
        let json = r#"{
            "alignment": { "distance": "cosine", "band_radius": 40 },
            "aggregation": { "fluency_distance_divisor": 80.0 }
        }"#;
        let config: ScoringConfig = serde_json::from_str(json).expect("valid config json");
        assert_eq!(config.alignment.distance, DistanceMetric::Cosine);
        assert_eq!(config.alignment.band_radius, Some(40));
        assert_eq!(config.alignment.time_stretch_chunk, 20);
        assert_eq!(config.aggregation.fluency_distance_divisor, 80.0);
        assert_eq!(config.aggregation.segment_count, 5);
        assert_eq!(config.word_issues, IssueThresholds::word());
    }

    #[test]
    fn single_threshold_override_keeps_the_rest_of_its_table() {
        let json = r#"{
            "segment_issues": { "too_fast_ratio": 0.6 },
            "word_issues": { "loud_energy_ratio": 1.9 }
        }"#;
        let config: ScoringConfig = serde_json::from_str(json).expect("valid config json");

        let mut segment = IssueThresholds::segment();
        segment.too_fast_ratio = 0.6;
        assert_eq!(config.segment_issues, segment);

        let mut word = IssueThresholds::word();
        word.loud_energy_ratio = 1.9;
        assert_eq!(config.word_issues, word);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_threshold_names_are_rejected() {
        let json = r#"{ "segment_issues": { "too_fats_ratio": 0.6 } }"#;
        assert!(serde_json::from_str::<ScoringConfig>(json).is_err());
    }

    #[test]
    fn word_table_is_tighter_than_segment_table() {
        let segment = IssueThresholds::segment();
        let word = IssueThresholds::word();
        assert!(word.too_fast_ratio > segment.too_fast_ratio);
        assert!(word.too_slow_ratio < segment.too_slow_ratio);
        assert!(word.low_band_delta < segment.low_band_delta);
        assert!(word.pitch_jump_floor_hz < segment.pitch_jump_floor_hz);
        assert!(word.loud_energy_ratio < segment.loud_energy_ratio);
    }

    #[test]
    fn validate_rejects_zero_fluency_divisor() {
        let mut config = ScoringConfig::default();
        config.aggregation.fluency_distance_divisor = 0.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("fluency_distance_divisor"));
    }

    #[test]
    fn validate_rejects_inverted_timing_bands() {
        let mut config = ScoringConfig::default();
        config.timing.good_low = 0.4;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_crossed_threshold_pairs() {
        let mut config = ScoringConfig::default();
        config.segment_issues.too_fast_ratio = 1.6;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("segment_issues.too_fast_ratio"));

        let mut config = ScoringConfig::default();
        config.word_issues.quiet_energy_ratio = 2.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("word_issues.quiet_energy_ratio"));
    }

    #[test]
    fn validate_rejects_non_finite_thresholds() {
        let mut config = ScoringConfig::default();
        config.word_issues.pitch_jump_floor_hz = f64::NAN;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("word_issues.pitch_jump_floor_hz"));

        let mut config = ScoringConfig::default();
        config.segment_issues.timing_gate_score = 120.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_weights() {
        let mut config = ScoringConfig::default();
        config.aggregation.overall_timing_weight = -0.3;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("overall_timing_weight"));

        let mut config = ScoringConfig::default();
        config.articulation.mean_weight = 0.0;
        config.articulation.variance_weight = 0.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must not all be zero"));

        let mut config = ScoringConfig::default();
        config.aggregation.span_articulation_weight = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_reads_json_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("scoring.json");
        std::fs::write(&path, r#"{ "aggregation": { "segment_count": 8 } }"#)
            .expect("write config");
        let config = ScoringConfig::load(&path).expect("load should succeed");
        assert_eq!(config.aggregation.segment_count, 8);
    }

    #[test]
    fn load_rejects_invalid_threshold_override() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("scoring.json");
        std::fs::write(&path, r#"{ "segment_issues": { "too_slow_ratio": 0.5 } }"#)
            .expect("write config");
        let result = ScoringConfig::load(&path);
        assert!(matches!(result, Err(ScoringError::InvalidInput { .. })));
    }

    #[test]
    fn load_fails_on_missing_file() {
        let result = ScoringConfig::load(Path::new("/nonexistent/scoring.json"));
        assert!(matches!(result, Err(ScoringError::Io { .. })));
    }

    #[test]
    fn load_fails_on_invalid_json() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("scoring.json");
        std::fs::write(&path, "{ not json").expect("write config");
        let result = ScoringConfig::load(&path);
        assert!(matches!(result, Err(ScoringError::Json { .. })));
    }
}
