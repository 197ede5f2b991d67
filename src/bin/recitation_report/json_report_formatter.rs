use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use recitation_scorer::PronunciationReport;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub generated_at: String,
    pub user_features: String,
    pub reference_features: String,
    pub distance_metric: &'static str,
    pub segment_count: usize,
    pub user_frames: usize,
    pub reference_frames: usize,
    pub normalized_distance: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportEnvelope<'a> {
    pub meta: Meta,
    pub report: &'a PronunciationReport,
}

pub fn write_report(path: &Path, envelope: &ReportEnvelope<'_>) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| {
            format!(
                "Failed to create report output directory '{}': {err}",
                parent.display()
            )
        })?;
    }

    let mut file = File::create(path)
        .map_err(|err| format!("Failed to create report file '{}': {err}", path.display()))?;
    write_json(&mut file, envelope)
        .map_err(|err| format!("Failed to write report file '{}': {err}", path.display()))
}

pub fn print_report(envelope: &ReportEnvelope<'_>) -> Result<(), String> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    write_json(&mut handle, envelope).map_err(|err| format!("Failed to print report: {err}"))
}

fn write_json<W: Write>(writer: &mut W, envelope: &ReportEnvelope<'_>) -> Result<(), String> {
    serde_json::to_writer_pretty(&mut *writer, envelope).map_err(|err| err.to_string())?;
    writer.write_all(b"\n").map_err(|err| err.to_string())
}
