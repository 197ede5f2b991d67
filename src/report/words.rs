use crate::config::ScoringConfig;
use crate::diagnostics::SKIPPED_WORD;
use crate::types::{AlignmentResult, FeatureSet, WordBoundary, WordFeedback};

use super::segments::AlignedSpan;
use super::score_span;

/// Scores each externally timed word against the user's recording.
///
/// Word boundaries are in reference milliseconds. The user-side span of a word
/// is every user frame the path pairs with a reference frame inside the word.
/// Words the path never reaches get a fixed low score and a single "skipped"
/// issue; words with unknown timing (`0/0`) get a neutral score and no issues.
pub fn build_word_report(
    user: &FeatureSet,
    reference: &FeatureSet,
    alignment: &AlignmentResult,
    words: &[WordBoundary],
    config: &ScoringConfig,
) -> Vec<WordFeedback> {
    let agg = &config.aggregation;
    words
        .iter()
        .map(|word| {
            if word.has_unknown_timing() {
                return fixed_feedback(word, agg.unknown_timing_word_score, Vec::new());
            }

            let ref_start = ms_to_frame(word.start_ms, reference);
            let ref_end = ms_to_frame(word.end_ms, reference);
            let Some(span) = matched_span(alignment, ref_start, ref_end) else {
                tracing::debug!(
                    word = word.index,
                    ref_start,
                    ref_end,
                    "report: word not reached by alignment"
                );
                return fixed_feedback(
                    word,
                    agg.unresolved_word_score,
                    vec![SKIPPED_WORD.to_string()],
                );
            };

            let scores = score_span(user, reference, span, config, &config.word_issues);
            WordFeedback {
                word_index: word.index,
                text: word.text.clone(),
                start_time: user.frame_to_seconds(span.user_start),
                end_time: user.frame_to_seconds(span.user_end),
                articulation_score: scores.articulation,
                timing_score: scores.timing,
                overall_score: scores.overall,
                issues: scores.issues,
            }
        })
        .collect()
}

/// Reference frame at `ms`, clamped into `[0, frame_count]`.
fn ms_to_frame(ms: u64, reference: &FeatureSet) -> usize {
    let frame = (ms as f64 / 1000.0 * reference.frame_rate_hz).floor();
    if frame.is_finite() && frame > 0.0 {
        (frame as usize).min(reference.frame_count())
    } else {
        0
    }
}

/// Bounding span of every path point whose reference frame is in `[ref_start, ref_end)`.
fn matched_span(alignment: &AlignmentResult, ref_start: usize, ref_end: usize) -> Option<AlignedSpan> {
    alignment
        .path
        .iter()
        .filter(|&&(_, r)| (ref_start..ref_end).contains(&r))
        .fold(None, |span: Option<AlignedSpan>, &(u, r)| {
            Some(match span {
                None => AlignedSpan {
                    user_start: u,
                    user_end: u,
                    ref_start: r,
                    ref_end: r,
                },
                Some(s) => AlignedSpan {
                    user_start: s.user_start.min(u),
                    user_end: s.user_end.max(u),
                    ref_start: s.ref_start.min(r),
                    ref_end: s.ref_end.max(r),
                },
            })
        })
}

fn fixed_feedback(word: &WordBoundary, score: f64, issues: Vec<String>) -> WordFeedback {
    WordFeedback {
        word_index: word.index,
        text: word.text.clone(),
        start_time: 0.0,
        end_time: 0.0,
        articulation_score: score,
        timing_score: score,
        overall_score: score,
        issues,
    }
}
