use crate::config::ScoringConfig;
use crate::error::ScoringError;
use crate::pipeline::defaults::DtwSequenceAligner;
use crate::pipeline::runtime::{RecitationComparator, RecitationComparatorParts};
use crate::pipeline::traits::SequenceAligner;

pub struct ComparatorBuilder {
    config: ScoringConfig,
    sequence_aligner: Option<Box<dyn SequenceAligner>>,
    segment_count: Option<usize>,
}

impl ComparatorBuilder {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            config,
            sequence_aligner: None,
            segment_count: None,
        }
    }

    pub fn with_sequence_aligner(mut self, sequence_aligner: Box<dyn SequenceAligner>) -> Self {
        self.sequence_aligner = Some(sequence_aligner);
        self
    }

    /// Overrides `aggregation.segment_count` from the config.
    pub fn with_segment_count(mut self, segment_count: usize) -> Self {
        self.segment_count = Some(segment_count);
        self
    }

    pub fn build(self) -> Result<RecitationComparator, ScoringError> {
        let mut config = self.config;
        if let Some(segment_count) = self.segment_count {
            config.aggregation.segment_count = segment_count;
        }
        config.validate()?;

        let sequence_aligner = self
            .sequence_aligner
            .unwrap_or_else(|| Box::new(DtwSequenceAligner::from_config(&config.alignment)));

        tracing::debug!(
            distance = config.alignment.distance.as_str(),
            band_radius = ?config.alignment.band_radius,
            segment_count = config.aggregation.segment_count,
            "comparator: built"
        );

        Ok(RecitationComparator::from_parts(RecitationComparatorParts {
            config,
            sequence_aligner,
        }))
    }
}

impl Default for ComparatorBuilder {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}
