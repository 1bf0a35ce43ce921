// Colored terminal output for themes, the catalog, and KPI results.
//
// This module handles all terminal-specific formatting. main.rs and the
// pipeline delegate here so display code stays out of the analysis logic.

use colored::Colorize;

use crate::db::models::{AnalysisRun, StoredTheme};
use crate::kpi::KpiReport;
use crate::themes::aggregate::{Analysis, GroupAnalysis};
use crate::themes::catalog::CatalogEntry;
use crate::themes::theme::{ThemeSource, UNCATEGORIZED};

const BAR_WIDTH: usize = 20;

/// Display one bank's themes with a share-of-reviews bar each.
pub fn display_group_themes(group: &GroupAnalysis) {
    println!(
        "\n{}",
        format!(
            "=== {} ({} reviews, {} themes) ===",
            group.group,
            group.review_count(),
            group.themes.len()
        )
        .bold()
    );
    println!();

    if group.themes.is_empty() {
        println!("  {}", "No themes identified; every review is Uncategorized.".dimmed());
        return;
    }

    let total = group.review_count().max(1) as f64;
    for (i, theme) in group.themes.iter().enumerate() {
        let share = theme.review_count as f64 / total;
        println!(
            "  {:>2}. {:<36} {} {:>4}  {}",
            i + 1,
            theme.name.bold(),
            share_bar(share),
            theme.review_count,
            source_tag(theme.source),
        );
        let keywords: Vec<&str> = theme.keyword_terms().collect();
        let keywords_str = super::truncate_chars(&keywords.join(", "), 90);
        println!("      Keywords: {}", keywords_str.dimmed());
        println!("      {}", theme.logic.dimmed());
    }

    let uncategorized = group.uncategorized_count();
    if uncategorized > 0 {
        println!(
            "\n  {} {} reviews matched no theme",
            "~".yellow(),
            uncategorized
        );
    }
}

/// Display the run-wide primary theme distribution.
pub fn display_analysis_summary(analysis: &Analysis) {
    let total = analysis.total_reviews();
    println!(
        "\n{}",
        format!(
            "=== Theme Distribution ({} reviews, {} banks) ===",
            total,
            analysis.groups.len()
        )
        .bold()
    );
    println!();

    for (name, count) in analysis.overall_primary_counts() {
        let share = count as f64 / total.max(1) as f64;
        let label = if name == UNCATEGORIZED {
            name.dimmed()
        } else {
            name.normal()
        };
        println!(
            "  {:<36} {} {:>5}  ({:.1}%)",
            label,
            share_bar(share),
            count,
            share * 100.0
        );
    }
}

/// Display the predefined theme catalog.
pub fn display_catalog(catalog: &[CatalogEntry]) {
    println!(
        "\n{}",
        format!("=== Theme Catalog ({} themes) ===", catalog.len()).bold()
    );
    println!();
    for (i, entry) in catalog.iter().enumerate() {
        println!("  {:>2}. {}", i + 1, entry.name.bold());
        println!("      {}", entry.seeds.join(", ").dimmed());
    }
}

/// Display a KPI report as a pass/fail list.
pub fn display_kpis(report: &KpiReport) {
    println!("\n{}", "=== KPI Validation ===".bold());
    println!();

    for check in &report.checks {
        let mark = if check.passed {
            "PASS".green().bold()
        } else {
            "FAIL".red().bold()
        };
        println!("  {}  {:<22} {}", mark, check.name, check.detail.dimmed());
    }

    for (bank, n) in &report.themes_per_bank {
        println!("        {:<22} {} distinct primary themes", bank, n);
    }

    println!();
    if report.all_passed() {
        println!("  {}", "All KPIs met.".green());
    } else {
        println!("  {}", "Some KPIs not met.".yellow());
    }
}

/// Display themes loaded from the database for a stored run.
pub fn display_stored_themes(run: &AnalysisRun, themes: &[StoredTheme]) {
    println!(
        "\n{}",
        format!(
            "=== Run #{} ({}, {} reviews, {}) ===",
            run.id, run.method, run.review_count, run.created_at
        )
        .bold()
    );

    if themes.is_empty() {
        println!("  No themes stored for this selection.");
        return;
    }

    let mut current_bank: Option<&str> = None;
    for theme in themes {
        if current_bank != Some(theme.bank.as_str()) {
            println!("\n  {}", theme.bank.bold().underline());
            current_bank = Some(theme.bank.as_str());
        }
        let keywords: Vec<&str> = theme.keywords.iter().map(|(k, _)| k.as_str()).collect();
        println!(
            "    {:<36} {:>5}  {}  {}",
            theme.name,
            theme.review_count,
            source_tag(theme.source),
            super::truncate_chars(&keywords.join(", "), 60).dimmed()
        );
    }
}

fn share_bar(share: f64) -> colored::ColoredString {
    let filled = (share.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    let bar = format!(
        "[{}{}]",
        "=".repeat(filled),
        " ".repeat(BAR_WIDTH.saturating_sub(filled))
    );
    if share >= 0.25 {
        bar.bright_green()
    } else if share >= 0.10 {
        bar.bright_yellow()
    } else {
        bar.bright_blue()
    }
}

fn source_tag(source: ThemeSource) -> colored::ColoredString {
    match source {
        ThemeSource::Catalog => "catalog".cyan(),
        ThemeSource::Cluster => "cluster".magenta(),
    }
}
