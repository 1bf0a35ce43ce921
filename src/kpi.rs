// KPI validation — quick health checks on an analysis run.
//
// These are the acceptance thresholds for a batch: enough reviews, enough
// distinct themes per bank, and enough sentiment coverage. A failed KPI is
// reported, never fatal.

use serde::Serialize;

use crate::reviews::Review;
use crate::themes::aggregate::Analysis;

/// Minimum number of reviews a run should cover.
pub const MIN_REVIEWS: usize = 400;

/// Target distinct primary themes per bank.
pub const TARGET_THEMES_PER_BANK: usize = 3;

/// Floor below which a bank's theme coverage is considered broken.
pub const MIN_THEMES_PER_BANK: usize = 2;

/// Share of reviews (percent) that must carry a sentiment label.
pub const MIN_SENTIMENT_COVERAGE: f64 = 90.0;

/// One KPI and whether it passed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiCheck {
    pub name: String,
    pub passed: bool,
    /// Observed value, formatted for display
    pub detail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KpiReport {
    pub checks: Vec<KpiCheck>,
    /// Distinct primary themes per bank, in processing order
    pub themes_per_bank: Vec<(String, usize)>,
}

impl KpiReport {
    pub fn all_passed(&self) -> bool {
        !self.checks.is_empty() && self.checks.iter().all(|c| c.passed)
    }

    pub fn get(&self, name: &str) -> Option<&KpiCheck> {
        self.checks.iter().find(|c| c.name == name)
    }

    fn push(&mut self, name: &str, passed: bool, detail: String) {
        self.checks.push(KpiCheck {
            name: name.to_string(),
            passed,
            detail,
        });
    }
}

/// Evaluate the KPIs for a run.
///
/// Sentiment coverage is only checked when the input had a sentiment column;
/// a theme-only batch has nothing to measure there.
pub fn validate(reviews: &[Review], analysis: &Analysis, has_sentiment_column: bool) -> KpiReport {
    let mut report = KpiReport::default();

    if has_sentiment_column {
        let labeled = reviews.iter().filter(|r| r.has_sentiment()).count();
        let rate = if reviews.is_empty() {
            0.0
        } else {
            labeled as f64 / reviews.len() as f64 * 100.0
        };
        report.push(
            "sentiment_90pct",
            rate >= MIN_SENTIMENT_COVERAGE,
            format!("{rate:.1}% labeled"),
        );
    }

    report.themes_per_bank = analysis
        .groups
        .iter()
        .map(|g| (g.group.clone(), g.distinct_primary_themes()))
        .collect();

    let has_banks = !report.themes_per_bank.is_empty();
    let min_seen = report
        .themes_per_bank
        .iter()
        .map(|(_, n)| *n)
        .min()
        .unwrap_or(0);

    report.push(
        "themes_per_bank",
        has_banks && min_seen >= TARGET_THEMES_PER_BANK,
        format!("min {min_seen} per bank"),
    );

    let total = analysis.total_reviews();
    report.push(
        "min_reviews",
        total >= MIN_REVIEWS,
        format!("{total} reviews"),
    );

    report.push(
        "min_themes_per_bank",
        has_banks && min_seen >= MIN_THEMES_PER_BANK,
        format!("min {min_seen} per bank"),
    );

    report
}
