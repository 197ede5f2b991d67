use crate::config::ScoringConfig;
use crate::scoring::fluency_score;
use crate::types::{AlignmentResult, FeatureSet, PronunciationReport, SegmentFeedback};

use super::summary::summarize;
use super::{mean, score_span};

/// Inclusive frame spans on both sides of one stretch of the warping path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignedSpan {
    pub user_start: usize,
    pub user_end: usize,
    pub ref_start: usize,
    pub ref_end: usize,
}

/// Cuts the path into `segment_count` runs of `len / segment_count` points.
///
/// Every run has the same length; the `len % segment_count` trailing points
/// fall outside all runs. A path shorter than `segment_count` yields one span
/// per point.
pub fn segment_spans(alignment: &AlignmentResult, segment_count: usize) -> Vec<AlignedSpan> {
    let path = &alignment.path;
    if path.is_empty() || segment_count == 0 {
        return Vec::new();
    }
    let count = segment_count.min(path.len());
    let size = (path.len() / count).max(1);

    (0..count)
        .map(|i| {
            let start_idx = i * size;
            let end_idx = ((i + 1) * size - 1).min(path.len() - 1);
            let (user_start, ref_start) = path[start_idx];
            let (user_end, ref_end) = path[end_idx];
            AlignedSpan {
                user_start,
                user_end,
                ref_start,
                ref_end,
            }
        })
        .collect()
}

/// Scores `segment_count` uniform segments and folds them into a report.
///
/// Sub-scores are plain means over segments (0 when there are none); the
/// `words` list is left empty for [`build_word_report`](super::build_word_report).
pub fn build_report(
    user: &FeatureSet,
    reference: &FeatureSet,
    alignment: &AlignmentResult,
    segment_count: usize,
    config: &ScoringConfig,
) -> PronunciationReport {
    let segments: Vec<SegmentFeedback> = segment_spans(alignment, segment_count)
        .into_iter()
        .map(|span| {
            let scores = score_span(user, reference, span, config, &config.segment_issues);
            tracing::debug!(
                user_start = span.user_start,
                user_end = span.user_end,
                ref_start = span.ref_start,
                ref_end = span.ref_end,
                articulation = format!("{:.1}", scores.articulation),
                timing = format!("{:.1}", scores.timing),
                issues = scores.issues.len(),
                "report: scored segment"
            );
            SegmentFeedback {
                start_time: user.frame_to_seconds(span.user_start),
                end_time: user.frame_to_seconds(span.user_end),
                articulation_score: scores.articulation,
                timing_score: scores.timing,
                overall_score: scores.overall,
                issues: scores.issues,
            }
        })
        .collect();

    let agg = &config.aggregation;
    let articulation_score = mean(segments.iter().map(|s| s.articulation_score));
    let timing_score = mean(segments.iter().map(|s| s.timing_score));
    let fluency_score = fluency_score(alignment.normalized_distance, agg.fluency_distance_divisor);
    let overall_score = (agg.overall_articulation_weight * articulation_score
        + agg.overall_timing_weight * timing_score
        + agg.overall_fluency_weight * fluency_score)
        .clamp(0.0, 100.0);

    let mut report = PronunciationReport {
        overall_score,
        articulation_score,
        timing_score,
        fluency_score,
        segments,
        words: Vec::new(),
        summary: String::new(),
    };
    report.summary = summarize(&report, &agg.summary);
    report
}
