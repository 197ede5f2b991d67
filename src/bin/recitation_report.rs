use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Parser, ValueEnum};
use recitation_scorer::{
    ComparatorBuilder, DistanceMetric, FeatureSet, ScoringConfig, WordBoundary,
};
use serde::de::DeserializeOwned;
use tracing_subscriber::EnvFilter;

#[path = "recitation_report/json_report_formatter.rs"]
mod json_report_formatter;

use json_report_formatter::{Meta, ReportEnvelope};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum MetricChoice {
    Euclidean,
    Cosine,
}

impl MetricChoice {
    fn metric(self) -> DistanceMetric {
        match self {
            Self::Euclidean => DistanceMetric::Euclidean,
            Self::Cosine => DistanceMetric::Cosine,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "recitation_report")]
#[command(about = "Score a recitation against a reference recording and emit a JSON report")]
struct Args {
    /// Feature set JSON of the user's recitation.
    #[arg(long, env = "RECITATION_REPORT_USER")]
    user: PathBuf,
    /// Feature set JSON of the reference recitation.
    #[arg(long, env = "RECITATION_REPORT_REFERENCE")]
    reference: PathBuf,
    /// Word boundary list JSON in reference milliseconds.
    #[arg(long, env = "RECITATION_REPORT_WORDS")]
    words: Option<PathBuf>,
    /// Scoring config JSON; missing values keep their defaults.
    #[arg(long, env = "RECITATION_REPORT_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "RECITATION_REPORT_SEGMENTS")]
    segments: Option<usize>,
    #[arg(long, env = "RECITATION_REPORT_DISTANCE", value_enum)]
    distance: Option<MetricChoice>,
    #[arg(long, env = "RECITATION_REPORT_BAND_RADIUS")]
    band_radius: Option<usize>,
    /// Output file; the report goes to stdout when omitted.
    #[arg(long, env = "RECITATION_REPORT_OUT")]
    out: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ScoringConfig::load(path).map_err(|err| err.to_string())?,
        None => ScoringConfig::default(),
    };
    if let Some(distance) = args.distance {
        config.alignment.distance = distance.metric();
    }
    if args.band_radius.is_some() {
        config.alignment.band_radius = args.band_radius;
    }

    let user: FeatureSet = read_json(&args.user, "user features")?;
    let reference: FeatureSet = read_json(&args.reference, "reference features")?;
    let words: Vec<WordBoundary> = match &args.words {
        Some(path) => read_json(path, "word boundaries")?,
        None => Vec::new(),
    };

    let mut builder = ComparatorBuilder::new(config);
    if let Some(segments) = args.segments {
        builder = builder.with_segment_count(segments);
    }
    let comparator = builder.build().map_err(|err| err.to_string())?;

    let outcome = comparator
        .compare(&user, &reference, &words)
        .map_err(|err| err.to_string())?;

    let envelope = ReportEnvelope {
        meta: Meta {
            generated_at: Utc::now().to_rfc3339(),
            user_features: args.user.display().to_string(),
            reference_features: args.reference.display().to_string(),
            distance_metric: comparator.config().alignment.distance.as_str(),
            segment_count: comparator.config().aggregation.segment_count,
            user_frames: user.frame_count(),
            reference_frames: reference.frame_count(),
            normalized_distance: outcome.alignment.normalized_distance,
        },
        report: &outcome.report,
    };

    match &args.out {
        Some(path) => {
            json_report_formatter::write_report(path, &envelope)?;
            tracing::info!(out = %path.display(), "report written");
        }
        None => json_report_formatter::print_report(&envelope)?,
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T, String> {
    let data = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read {what} '{}': {err}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|err| format!("Failed to parse {what} '{}': {err}", path.display()))
}
