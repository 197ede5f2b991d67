pub mod alignment;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod scoring;
pub mod timing_cache;
pub mod types;

pub use alignment::{align, align_with};
pub use config::{DistanceMetric, IssueThresholds, ScoringConfig};
pub use diagnostics::detect;
pub use error::ScoringError;
pub use pipeline::builder::ComparatorBuilder;
pub use pipeline::runtime::{ComparisonOutcome, RecitationComparator};
pub use pipeline::traits::{LocalDistance, SequenceAligner};
pub use report::{build_report, build_word_report, segment_spans, summarize, AlignedSpan};
pub use scoring::{feature_distance, score_articulation, score_timing, FrameRates};
pub use timing_cache::{
    CachedTimingSource, InMemoryTimingStore, JsonFileTimingStore, ReferenceKey, WordTimingLoader,
    WordTimingStore,
};
pub use types::{
    AlignmentResult, FeatureSet, FeatureWindow, PronunciationReport, SegmentFeedback,
    WordBoundary, WordFeedback,
};
