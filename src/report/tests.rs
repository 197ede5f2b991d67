use super::{build_report, build_word_report, segment_spans, summarize, AlignedSpan};
use crate::alignment::align;
use crate::config::{ScoringConfig, SummaryConfig};
use crate::diagnostics::{SKIPPED_WORD, TOO_SLOW};
use crate::types::{AlignmentResult, FeatureSet, PronunciationReport, SegmentFeedback, WordBoundary};

fn recording(frames: usize, rate: f64) -> FeatureSet {
    FeatureSet {
        coefficients: (0..frames)
            .map(|j| (0..13).map(|k| (j as f32 * 0.37 + k as f32).sin() * 10.0).collect())
            .collect(),
        spectral_centroid: vec![1600.0; frames],
        pitch_hz: vec![140.0; frames],
        rms_energy: vec![0.25; frames],
        frame_rate_hz: rate,
    }
}

/// Every reference frame held for two user frames.
fn doubled(reference: &FeatureSet) -> FeatureSet {
    let coefficients: Vec<Vec<f32>> = reference
        .coefficients
        .iter()
        .flat_map(|row| [row.clone(), row.clone()])
        .collect();
    let n = coefficients.len();
    FeatureSet {
        coefficients,
        spectral_centroid: vec![1600.0; n],
        pitch_hz: vec![140.0; n],
        rms_energy: vec![0.25; n],
        frame_rate_hz: reference.frame_rate_hz,
    }
}

fn word(index: usize, start_ms: u64, end_ms: u64) -> WordBoundary {
    WordBoundary {
        index,
        text: format!("w{index}"),
        start_ms,
        end_ms,
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn diagonal_alignment(n: usize) -> AlignmentResult {
    AlignmentResult {
        path: (0..n).map(|i| (i, i)).collect(),
        distance: 0.0,
        normalized_distance: 0.0,
        user_to_ref: (0..n).collect(),
        ref_to_user: (0..n).collect(),
        time_stretch: vec![1.0],
    }
}

#[test]
fn identical_recordings_score_perfectly() {
    let f = recording(50, 100.0);
    let config = ScoringConfig::default();
    let alignment = align(&f, &f).unwrap();
    let report = build_report(&f, &f, &alignment, 5, &config);

    assert_eq!(report.segments.len(), 5);
    for segment in &report.segments {
        assert!(approx(segment.articulation_score, 100.0), "{segment:?}");
        assert_eq!(segment.timing_score, 100.0);
        assert!(approx(segment.overall_score, 100.0));
        assert!(segment.issues.is_empty(), "{:?}", segment.issues);
    }
    assert!(approx(report.overall_score, 100.0));
    assert_eq!(report.fluency_score, 100.0);
    assert!(report.words.is_empty());
    assert_eq!(report.summary, "Excellent recitation! Very close to the reference.");
}

#[test]
fn segments_are_contiguous_and_equal_length() {
    let alignment = diagonal_alignment(23);
    let spans = segment_spans(&alignment, 5);
    assert_eq!(spans.len(), 5);
    assert_eq!(spans[0].user_start, 0);
    assert_eq!(spans[0].user_end, 3);
    assert_eq!(spans[1].user_start, 4);
    assert_eq!(
        spans[4],
        AlignedSpan {
            user_start: 16,
            user_end: 19,
            ref_start: 16,
            ref_end: 19,
        }
    );
    assert!(spans.iter().all(|s| s.user_end - s.user_start + 1 == 4));
    for pair in spans.windows(2) {
        assert_eq!(pair[1].user_start, pair[0].user_end + 1);
    }
}

#[test]
fn short_path_yields_one_span_per_point() {
    let spans = segment_spans(&diagonal_alignment(3), 5);
    assert_eq!(spans.len(), 3);
    assert!(spans.iter().all(|s| s.user_start == s.user_end));
}

#[test]
fn zero_segments_or_empty_path_reports_no_segments() {
    let f = recording(10, 100.0);
    let config = ScoringConfig::default();
    let report = build_report(&f, &f, &diagonal_alignment(10), 0, &config);
    assert!(report.segments.is_empty());
    assert_eq!(report.articulation_score, 0.0);
    assert_eq!(report.timing_score, 0.0);
    assert_eq!(report.fluency_score, 100.0);
    assert!(approx(report.overall_score, 20.0));

    let empty = recording(0, 100.0);
    let degenerate = align(&empty, &f).unwrap();
    let report = build_report(&empty, &f, &degenerate, 5, &config);
    assert!(report.segments.is_empty());
    assert!(report.summary.starts_with("Needs practice."));
}

#[test]
fn doubled_duration_scores_poor_timing_and_flags_slowness() {
    let reference = recording(40, 100.0);
    let user = doubled(&reference);
    let config = ScoringConfig::default();
    let alignment = align(&user, &reference).unwrap();
    assert_eq!(alignment.distance, 0.0);
    assert_eq!(alignment.path.len(), 80);

    let report = build_report(&user, &reference, &alignment, 5, &config);
    // Each segment covers 15 user frame steps against 7 reference steps.
    let expected = 50.0 - 25.0 * (15.0 / 7.0 - 1.0);
    for segment in &report.segments {
        assert!(approx(segment.timing_score, expected), "{segment:?}");
        assert!(approx(segment.articulation_score, 100.0), "{segment:?}");
        assert_eq!(segment.issues, vec![TOO_SLOW.to_string()]);
    }
    assert!(report.summary.contains("Work on timing"));
    assert!(report.summary.ends_with("5 segment(s) need attention."));
    assert!(alignment.time_stretch.iter().all(|&s| s > 1.5));
}

#[test]
fn word_report_handles_sentinel_unmatched_and_timed_words() {
    let f = recording(50, 100.0);
    let config = ScoringConfig::default();
    let alignment = align(&f, &f).unwrap();
    let words = vec![word(0, 0, 0), word(1, 100, 300), word(2, 600, 800)];
    let feedback = build_word_report(&f, &f, &alignment, &words, &config);
    assert_eq!(feedback.len(), 3);

    let unknown = &feedback[0];
    assert_eq!(unknown.word_index, 0);
    assert_eq!(
        (unknown.articulation_score, unknown.timing_score, unknown.overall_score),
        (50.0, 50.0, 50.0)
    );
    assert!(unknown.issues.is_empty());

    let timed = &feedback[1];
    assert_eq!(timed.text, "w1");
    assert!(approx(timed.start_time, 0.10));
    assert!(approx(timed.end_time, 0.29));
    assert!(approx(timed.overall_score, 100.0));
    assert!(timed.issues.is_empty());

    let skipped = &feedback[2];
    assert_eq!(
        (skipped.articulation_score, skipped.timing_score, skipped.overall_score),
        (30.0, 30.0, 30.0)
    );
    assert_eq!(skipped.issues, vec![SKIPPED_WORD.to_string()]);
}

#[test]
fn word_report_of_empty_list_is_empty() {
    let f = recording(10, 100.0);
    let alignment = align(&f, &f).unwrap();
    assert!(build_word_report(&f, &f, &alignment, &[], &ScoringConfig::default()).is_empty());
}

#[test]
fn word_report_against_degenerate_alignment_marks_words_skipped() {
    let empty = recording(0, 100.0);
    let f = recording(10, 100.0);
    let alignment = align(&empty, &f).unwrap();
    let feedback =
        build_word_report(&empty, &f, &alignment, &[word(0, 0, 50)], &ScoringConfig::default());
    assert_eq!(feedback[0].overall_score, 30.0);
}

fn report_with(overall: f64, articulation: f64, timing: f64, fluency: f64) -> PronunciationReport {
    PronunciationReport {
        overall_score: overall,
        articulation_score: articulation,
        timing_score: timing,
        fluency_score: fluency,
        segments: Vec::new(),
        words: Vec::new(),
        summary: String::new(),
    }
}

#[test]
fn summary_bands_and_advisories() {
    let config = SummaryConfig::default();
    assert_eq!(
        summarize(&report_with(90.0, 95.0, 90.0, 80.0), &config),
        "Excellent recitation! Very close to the reference."
    );
    assert_eq!(
        summarize(&report_with(75.0, 69.9, 80.0, 80.0), &config),
        "Good recitation with minor areas for improvement. Pay attention to articulation points."
    );
    assert_eq!(
        summarize(&report_with(60.0, 80.0, 50.0, 40.0), &config),
        "Acceptable recitation. Focus on the highlighted areas. \
         Work on timing and elongation of long sounds. \
         Practice for smoother, more fluent recitation."
    );

    let mut report = report_with(10.0, 80.0, 80.0, 80.0);
    let flagged = SegmentFeedback {
        start_time: 0.0,
        end_time: 1.0,
        articulation_score: 10.0,
        timing_score: 10.0,
        overall_score: 10.0,
        issues: vec!["x".to_string()],
    };
    report.segments = vec![
        flagged.clone(),
        SegmentFeedback {
            issues: Vec::new(),
            ..flagged.clone()
        },
        flagged,
    ];
    assert_eq!(
        summarize(&report, &config),
        "Needs practice. Review the specific feedback below. 2 segment(s) need attention."
    );
}

#[test]
fn summary_is_deterministic() {
    let config = SummaryConfig::default();
    let report = report_with(72.5, 65.0, 71.0, 50.0);
    assert_eq!(summarize(&report, &config), summarize(&report, &config));
}
