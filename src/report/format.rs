//! Formatted terminal-style output for analysis reports.
//!
//! We keep formatting code in one place so:
//! - the numeric code stays clean and testable
//! - output changes are localized (important for future snapshot tests)
//!
//! The engine never prints; these builders return strings and the display
//! collaborator decides where they go. Curve names are looked up through a
//! caller-supplied label map and fall back to the bare id.

use std::collections::BTreeMap;

use crate::aggregate::IqrAnalysis;
use crate::bestfit::BestFitReport;
use crate::domain::CurveId;

/// Render a best-fit ranking as a fixed-width table.
pub fn format_best_fit_report(
    report: &BestFitReport,
    labels: &BTreeMap<CurveId, String>,
    reference_label: &str,
) -> String {
    let mut out = String::new();

    out.push_str("-- Standard deviation of weighted residual error (Swr) --\n");
    out.push_str(&format!(
        "Reference: {reference_label}    Comparison frequency points: {}\n\n",
        report.reference_points
    ));

    out.push_str(&format!(
        "{:<4} {:<40} {:>10} {:>8}\n",
        "rank", "name", "Swr", "points"
    ));
    out.push_str(&format!("{:-<4} {:-<40} {:-<10} {:-<8}\n", "", "", "", ""));

    for (rank, score) in report.scores.iter().enumerate() {
        out.push_str(&format!(
            "{:<4} {:<40} {:>10.4} {:>8}\n",
            rank + 1,
            truncate(&display_name(labels, score.id), 40),
            score.std_dev,
            score.columns_used,
        ));
    }

    if !report.skipped.is_empty() {
        out.push('\n');
        for (id, reason) in &report.skipped {
            out.push_str(&format!(
                "  (skipped {}) {reason}\n",
                display_name(labels, *id)
            ));
        }
    }

    out
}

/// One-line summary of an IQR fencing run.
pub fn format_outlier_summary(
    analysis: &IqrAnalysis,
    labels: &BTreeMap<CurveId, String>,
) -> String {
    if analysis.outliers.is_empty() {
        return "No curves fall outside the fences.".to_string();
    }

    let names: Vec<String> = analysis
        .outliers
        .iter()
        .map(|&id| display_name(labels, id))
        .collect();
    format!(
        "{} curve(s) outside the fences: {}",
        names.len(),
        names.join(", ")
    )
}

fn display_name(labels: &BTreeMap<CurveId, String>, id: CurveId) -> String {
    labels.get(&id).cloned().unwrap_or_else(|| id.to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bestfit::BestFitScore;

    #[test]
    fn best_fit_table_lists_ranked_names() {
        let report = BestFitReport {
            scores: vec![
                BestFitScore {
                    id: CurveId(2),
                    std_dev: 0.0,
                    columns_used: 97,
                },
                BestFitScore {
                    id: CurveId(0),
                    std_dev: 1.25,
                    columns_used: 97,
                },
            ],
            skipped: vec![(CurveId(5), "no overlap".to_string())],
            reference_points: 97,
        };
        let labels: BTreeMap<CurveId, String> = [
            (CurveId(0), "unit 01".to_string()),
            (CurveId(2), "unit 03".to_string()),
        ]
        .into();

        let text = format_best_fit_report(&report, &labels, "unit 03");
        let unit3 = text.find("1    unit 03").unwrap();
        let unit1 = text.find("2    unit 01").unwrap();
        assert!(text.starts_with("-- Standard deviation"));
        assert!(text.contains("Comparison frequency points: 97"));
        assert!(unit3 < unit1, "reference row should come first:\n{text}");
        // The unlabeled skipped curve falls back to its id.
        assert!(text.contains("(skipped #05) no overlap"));
    }

    #[test]
    fn outlier_summary_handles_both_cases() {
        let empty = IqrAnalysis {
            lower_fence: crate::domain::Curve::from_pairs(&[(100.0, 1.0)]).unwrap(),
            median: crate::domain::Curve::from_pairs(&[(100.0, 2.0)]).unwrap(),
            upper_fence: crate::domain::Curve::from_pairs(&[(100.0, 3.0)]).unwrap(),
            outliers: vec![],
        };
        assert_eq!(
            format_outlier_summary(&empty, &BTreeMap::new()),
            "No curves fall outside the fences."
        );

        let some = IqrAnalysis {
            outliers: vec![CurveId(1), CurveId(4)],
            ..empty
        };
        let text = format_outlier_summary(&some, &BTreeMap::new());
        assert_eq!(text, "2 curve(s) outside the fences: #01, #04");
    }
}
