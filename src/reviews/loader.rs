// CSV loading for review batches.
//
// Columns are looked up by header name so column order doesn't matter and
// extra columns (source, cleaned text, ...) are ignored. A missing `review`
// or `bank` column, or a file with no rows, is a hard error: there's nothing
// meaningful to analyze. So is a repeated review_id, since results are keyed
// by it.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use tracing::info;

use super::models::Review;

/// Header names accepted for the review text, in preference order.
const TEXT_COLUMNS: &[&str] = &["review", "review_text"];
const BANK_COLUMN: &str = "bank";

/// Reviews loaded from one file.
#[derive(Debug, Clone)]
pub struct ReviewBatch {
    pub reviews: Vec<Review>,
    /// Whether the file carried a `sentiment_label` column at all
    pub has_sentiment_column: bool,
}

impl ReviewBatch {
    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }
}

/// Load reviews from a CSV file on disk.
pub fn load_reviews(path: &Path) -> Result<ReviewBatch> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open review file: {}", path.display()))?;
    let batch = read_reviews(file)
        .with_context(|| format!("Failed to load reviews from {}", path.display()))?;
    info!(
        path = %path.display(),
        reviews = batch.len(),
        "Loaded reviews"
    );
    Ok(batch)
}

/// Load reviews from any CSV source.
pub fn read_reviews<R: Read>(source: R) -> Result<ReviewBatch> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let headers = reader.headers().context("Failed to read CSV header")?.clone();
    let columns = Columns::locate(&headers)?;

    let mut reviews = Vec::new();
    let mut first_seen: HashMap<String, usize> = HashMap::new();
    for (row, result) in reader.records().enumerate() {
        // +2: 1-indexed, plus the header line
        let line = row + 2;
        let record = result.with_context(|| format!("Failed to parse CSV line {line}"))?;
        let review = columns.review(&record, row + 1, line)?;
        if let Some(earlier) = first_seen.insert(review.review_id.clone(), line) {
            anyhow::bail!(
                "Duplicate review_id '{}' on line {line} (first seen on line {earlier})",
                review.review_id
            );
        }
        reviews.push(review);
    }

    if reviews.is_empty() {
        anyhow::bail!("Review file has a header but no rows");
    }

    Ok(ReviewBatch {
        reviews,
        has_sentiment_column: columns.sentiment_label.is_some(),
    })
}

/// Split reviews by bank, banks in order of first appearance, reviews in
/// input order within each bank.
pub fn group_by_bank(reviews: &[Review]) -> Vec<(String, Vec<&Review>)> {
    let mut groups: Vec<(String, Vec<&Review>)> = Vec::new();
    for review in reviews {
        match groups.iter_mut().find(|(bank, _)| *bank == review.bank) {
            Some((_, members)) => members.push(review),
            None => groups.push((review.bank.clone(), vec![review])),
        }
    }
    groups
}

/// Column positions resolved from the header row.
struct Columns {
    text: usize,
    bank: usize,
    review_id: Option<usize>,
    rating: Option<usize>,
    date: Option<usize>,
    sentiment_label: Option<usize>,
    sentiment_score: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));

        let text = TEXT_COLUMNS
            .iter()
            .find_map(|name| find(*name))
            .ok_or_else(|| anyhow::anyhow!("Review file has no 'review' column"))?;
        let bank = find(BANK_COLUMN)
            .ok_or_else(|| anyhow::anyhow!("Review file has no '{BANK_COLUMN}' column"))?;

        Ok(Self {
            text,
            bank,
            review_id: find("review_id"),
            rating: find("rating"),
            date: find("date"),
            sentiment_label: find("sentiment_label"),
            sentiment_score: find("sentiment_score"),
        })
    }

    /// Build a review from one record. `row` is the 1-based data row.
    fn review(&self, record: &StringRecord, row: usize, line: usize) -> Result<Review> {
        let bank = field(record, Some(self.bank)).unwrap_or_default();
        let review_id =
            field(record, self.review_id).unwrap_or_else(|| format!("{bank}-{row}"));

        Ok(Review {
            text: record.get(self.text).unwrap_or("").trim().to_string(),
            rating: parse_number(record, self.rating, "rating", line)?,
            date: field(record, self.date),
            sentiment_label: field(record, self.sentiment_label),
            sentiment_score: parse_number(record, self.sentiment_score, "sentiment_score", line)?,
            review_id,
            bank,
        })
    }
}

/// A trimmed, non-empty field value.
fn field(record: &StringRecord, index: Option<usize>) -> Option<String> {
    index
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_number(
    record: &StringRecord,
    index: Option<usize>,
    column: &str,
    line: usize,
) -> Result<Option<f64>> {
    match field(record, index) {
        Some(raw) => raw
            .parse::<f64>()
            .map(Some)
            .with_context(|| format!("Invalid {column} '{raw}' on line {line}")),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_found_by_name() {
        let csv = "bank,rating,review\nCBE,5,works well\n";
        let batch = read_reviews(csv.as_bytes()).unwrap();
        assert_eq!(batch.reviews[0].text, "works well");
        assert_eq!(batch.reviews[0].rating, Some(5.0));
        assert!(!batch.has_sentiment_column);
    }

    #[test]
    fn test_missing_bank_column_fails() {
        let err = read_reviews("review\nhello\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("bank"));
    }

    #[test]
    fn test_bad_rating_names_line() {
        let err = read_reviews("review,bank,rating\nok,CBE,five\n".as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn test_duplicate_review_id_names_both_lines() {
        let csv = "review_id,review,bank\nr1,slow,CBE\nr2,fine,CBE\nr1,fast,Dashen\n";
        let err = read_reviews(csv.as_bytes()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("'r1'"), "{message}");
        assert!(message.contains("line 4"), "{message}");
        assert!(message.contains("line 2"), "{message}");
    }

    #[test]
    fn test_group_by_bank_first_appearance() {
        let reviews = vec![
            Review::new("1", "a", "Dashen"),
            Review::new("2", "b", "CBE"),
            Review::new("3", "c", "Dashen"),
        ];
        let groups = group_by_bank(&reviews);
        assert_eq!(groups[0].0, "Dashen");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, "CBE");
    }
}
