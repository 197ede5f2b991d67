use serde::Serialize;

use crate::alignment::align_with;
use crate::config::ScoringConfig;
use crate::error::ScoringError;
use crate::pipeline::traits::SequenceAligner;
use crate::report;
use crate::types::{AlignmentResult, FeatureSet, PronunciationReport, WordBoundary, WordFeedback};

/// Alignment plus the report built from it, words included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonOutcome {
    pub alignment: AlignmentResult,
    pub report: PronunciationReport,
}

/// Compares recitations against references with one fixed configuration.
///
/// Holds no per-request state, so one comparator can serve many threads.
pub struct RecitationComparator {
    config: ScoringConfig,
    sequence_aligner: Box<dyn SequenceAligner>,
}

pub(crate) struct RecitationComparatorParts {
    pub config: ScoringConfig,
    pub sequence_aligner: Box<dyn SequenceAligner>,
}

impl RecitationComparator {
    pub(crate) fn from_parts(parts: RecitationComparatorParts) -> Self {
        Self {
            config: parts.config,
            sequence_aligner: parts.sequence_aligner,
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn align(
        &self,
        user: &FeatureSet,
        reference: &FeatureSet,
    ) -> Result<AlignmentResult, ScoringError> {
        align_with(
            self.sequence_aligner.as_ref(),
            user,
            reference,
            &self.config.alignment,
        )
    }

    pub fn build_report(
        &self,
        user: &FeatureSet,
        reference: &FeatureSet,
        alignment: &AlignmentResult,
    ) -> PronunciationReport {
        report::build_report(
            user,
            reference,
            alignment,
            self.config.aggregation.segment_count,
            &self.config,
        )
    }

    pub fn build_word_report(
        &self,
        user: &FeatureSet,
        reference: &FeatureSet,
        alignment: &AlignmentResult,
        words: &[WordBoundary],
    ) -> Vec<WordFeedback> {
        report::build_word_report(user, reference, alignment, words, &self.config)
    }

    /// Aligns, scores segments and words, and attaches the words to the report.
    pub fn compare(
        &self,
        user: &FeatureSet,
        reference: &FeatureSet,
        words: &[WordBoundary],
    ) -> Result<ComparisonOutcome, ScoringError> {
        let alignment = self.align(user, reference)?;
        let mut report = self.build_report(user, reference, &alignment);
        report.words = self.build_word_report(user, reference, &alignment, words);

        tracing::info!(
            user_frames = user.frame_count(),
            ref_frames = reference.frame_count(),
            path_len = alignment.path.len(),
            overall = format!("{:.1}", report.overall_score),
            articulation = format!("{:.1}", report.articulation_score),
            timing = format!("{:.1}", report.timing_score),
            fluency = format!("{:.1}", report.fluency_score),
            segments = report.segments.len(),
            words = report.words.len(),
            "comparison finished"
        );
        Ok(ComparisonOutcome { alignment, report })
    }
}
