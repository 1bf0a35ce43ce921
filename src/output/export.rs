// File exports — the labeled review CSV and the per-bank themes JSON.
//
// Both files share one timestamp so a run's outputs sort together:
//   sentiment_thematic_analysis_<YYYYmmdd_HHMMSS>.csv
//   themes_<YYYYmmdd_HHMMSS>.json

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::reviews::Review;
use crate::themes::aggregate::Analysis;
use crate::themes::theme::ThemeAssignment;

/// Paths of the files written for one run.
#[derive(Debug, Clone)]
pub struct ExportPaths {
    pub csv: PathBuf,
    pub themes_json: PathBuf,
}

/// One row of the labeled review CSV.
#[derive(Debug, Serialize)]
struct LabeledRow<'a> {
    review_id: &'a str,
    review_text: &'a str,
    sentiment_label: Option<&'a str>,
    sentiment_score: Option<f64>,
    identified_themes: String,
    primary_theme: &'a str,
    bank: &'a str,
    rating: Option<f64>,
    date: Option<&'a str>,
}

/// Timestamp used in export file names, local time.
pub fn file_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Pair every review with its assignment, in input order.
///
/// Within a bank the analysis keeps input order, so walking the reviews with
/// a per-bank cursor lines them back up even when banks are interleaved.
pub fn labeled_reviews<'a>(
    reviews: &'a [Review],
    analysis: &'a Analysis,
) -> Vec<(&'a Review, ThemeAssignment)> {
    let mut cursors: HashMap<&str, usize> = HashMap::new();
    reviews
        .iter()
        .map(|review| {
            let cursor = cursors.entry(review.bank.as_str()).or_insert(0);
            let assignment = analysis
                .group(&review.bank)
                .and_then(|g| g.assignments.get(*cursor))
                .cloned()
                .unwrap_or_else(ThemeAssignment::uncategorized);
            *cursor += 1;
            (review, assignment)
        })
        .collect()
}

/// Write the labeled review CSV and the themes JSON into `dir`.
pub fn export_run(
    dir: &Path,
    reviews: &[Review],
    analysis: &Analysis,
    timestamp: &str,
) -> Result<ExportPaths> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let csv_path = dir.join(format!("sentiment_thematic_analysis_{timestamp}.csv"));
    write_reviews_csv(&csv_path, reviews, analysis)?;

    let json_path = dir.join(format!("themes_{timestamp}.json"));
    write_themes_json(&json_path, analysis)?;

    info!(
        csv = %csv_path.display(),
        themes = %json_path.display(),
        "Exported analysis results"
    );

    Ok(ExportPaths {
        csv: csv_path,
        themes_json: json_path,
    })
}

pub fn write_reviews_csv(path: &Path, reviews: &[Review], analysis: &Analysis) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    for (review, assignment) in labeled_reviews(reviews, analysis) {
        writer.serialize(LabeledRow {
            review_id: &review.review_id,
            review_text: &review.text,
            sentiment_label: review.sentiment_label.as_deref(),
            sentiment_score: review.sentiment_score,
            identified_themes: assignment.identified_themes(),
            primary_theme: assignment.primary_theme(),
            bank: &review.bank,
            rating: review.rating,
            date: review.date.as_deref(),
        })?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

pub fn write_themes_json(path: &Path, analysis: &Analysis) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), analysis)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::themes::aggregate::GroupAnalysis;
    use crate::themes::theme::ThemeSet;

    #[test]
    fn test_labeled_reviews_follow_input_order() {
        let reviews = vec![
            Review::new("a1", "x", "A"),
            Review::new("b1", "y", "B"),
            Review::new("a2", "z", "A"),
        ];
        let analysis = Analysis {
            groups: vec![
                GroupAnalysis {
                    group: "A".into(),
                    themes: ThemeSet::new(),
                    review_ids: vec!["a1".into(), "a2".into()],
                    assignments: vec![
                        ThemeAssignment::from_matches(vec!["T1".into()]),
                        ThemeAssignment::from_matches(vec!["T2".into()]),
                    ],
                },
                GroupAnalysis {
                    group: "B".into(),
                    themes: ThemeSet::new(),
                    review_ids: vec!["b1".into()],
                    assignments: vec![ThemeAssignment::uncategorized()],
                },
            ],
        };

        let rows = labeled_reviews(&reviews, &analysis);
        let labels: Vec<(&str, &str)> = rows
            .iter()
            .map(|(r, a)| (r.review_id.as_str(), a.primary_theme()))
            .collect();
        assert_eq!(labels, vec![("a1", "T1"), ("b1", "Uncategorized"), ("a2", "T2")]);
    }

    #[test]
    fn test_file_timestamp_shape() {
        let ts = file_timestamp();
        assert_eq!(ts.len(), 15);
        assert_eq!(&ts[8..9], "_");
    }
}
