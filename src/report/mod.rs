//! Folds an alignment into segment, word and whole-recording feedback.

mod segments;
mod summary;
mod words;

#[cfg(test)]
mod tests;

pub use segments::{build_report, segment_spans, AlignedSpan};
pub use summary::summarize;
pub use words::build_word_report;

use crate::config::{IssueThresholds, ScoringConfig};
use crate::diagnostics::detect;
use crate::scoring::{score_articulation, score_timing, span_overall, FrameRates};
use crate::types::FeatureSet;

/// Scores of one aligned span before they are attached to a segment or word.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SpanScores {
    pub articulation: f64,
    pub timing: f64,
    pub overall: f64,
    pub issues: Vec<String>,
}

pub(crate) fn score_span(
    user: &FeatureSet,
    reference: &FeatureSet,
    span: AlignedSpan,
    config: &ScoringConfig,
    thresholds: &IssueThresholds,
) -> SpanScores {
    let user_window = user.window(span.user_start, span.user_end);
    let ref_window = reference.window(span.ref_start, span.ref_end);

    let articulation = score_articulation(
        user_window.coefficients,
        ref_window.coefficients,
        &config.articulation,
    );
    let rates = FrameRates {
        user_hz: user.frame_rate_hz,
        reference_hz: reference.frame_rate_hz,
    };
    let timing = score_timing(
        span.user_start,
        span.user_end,
        span.ref_start,
        span.ref_end,
        rates,
        &config.timing,
    );
    let issues = detect(&user_window, &ref_window, articulation, timing, thresholds);
    let overall = span_overall(
        articulation,
        timing,
        config.aggregation.span_articulation_weight,
        config.aggregation.span_timing_weight,
    );

    SpanScores {
        articulation,
        timing,
        overall,
        issues,
    }
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let n = values.len();
    if n == 0 {
        0.0
    } else {
        values.sum::<f64>() / n as f64
    }
}
