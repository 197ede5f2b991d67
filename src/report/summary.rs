use crate::config::SummaryConfig;
use crate::types::PronunciationReport;

/// One-paragraph verdict: overall band, an advisory per weak sub-score, and
/// the number of segments that raised issues.
pub fn summarize(report: &PronunciationReport, config: &SummaryConfig) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(5);

    let verdict = if report.overall_score >= config.excellent_score {
        "Excellent recitation! Very close to the reference."
    } else if report.overall_score >= config.good_score {
        "Good recitation with minor areas for improvement."
    } else if report.overall_score >= config.acceptable_score {
        "Acceptable recitation. Focus on the highlighted areas."
    } else {
        "Needs practice. Review the specific feedback below."
    };
    parts.push(verdict.to_string());

    let advisories = [
        (report.articulation_score, "Pay attention to articulation points."),
        (report.timing_score, "Work on timing and elongation of long sounds."),
        (report.fluency_score, "Practice for smoother, more fluent recitation."),
    ];
    for (score, advice) in advisories {
        if score < config.advisory_score {
            parts.push(advice.to_string());
        }
    }

    let flagged = report.segments.iter().filter(|s| !s.issues.is_empty()).count();
    if flagged > 0 {
        parts.push(format!("{flagged} segment(s) need attention."));
    }

    parts.join(" ")
}
