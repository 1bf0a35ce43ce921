// Batch analysis pipeline: CSV in, labeled CSV + themes JSON + database rows out.
//
// Steps:
//   1. Load and validate the review CSV
//   2. Analyze each bank in turn (progress bar over banks)
//   3. Show each bank's themes and the overall distribution
//   4. Export the labeled reviews and the themes JSON
//   5. Save the run to SQLite (unless --no-save)
//   6. Check the KPIs

use std::path::{Path, PathBuf};

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::db;
use crate::db::queries;
use crate::kpi::{self, KpiReport};
use crate::output::export::{self, ExportPaths};
use crate::output::terminal;
use crate::reviews::{group_by_bank, load_reviews, Review};
use crate::themes::aggregate::Analysis;
use crate::themes::ThematicAnalyzer;

/// Where a run reads from and writes to.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// Database to save into; `None` skips persistence
    pub db_path: Option<String>,
}

/// Everything a finished run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub analysis: Analysis,
    pub exports: ExportPaths,
    pub run_id: Option<i64>,
    pub kpis: KpiReport,
}

/// Analyze every bank with a progress bar, banks in order of first appearance.
pub fn analyze_with_progress(analyzer: &ThematicAnalyzer, reviews: &[Review]) -> Analysis {
    let groups = group_by_bank(reviews);

    let pb = ProgressBar::new(groups.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  Banks [{bar:30}] {pos}/{len} ({eta}) {msg}")
            .unwrap(),
    );

    let mut analysis = Analysis::default();
    for (bank, members) in &groups {
        pb.set_message(bank.clone());
        analysis.groups.push(analyzer.analyze_group(bank, members));
        pb.inc(1);
    }
    pb.finish_and_clear();

    analysis
}

/// Run the full batch pipeline.
pub fn run(analyzer: &ThematicAnalyzer, options: &RunOptions) -> Result<RunSummary> {
    println!("Loading reviews from {}...", options.input.display());
    let batch = load_reviews(&options.input)?;
    let bank_count = group_by_bank(&batch.reviews).len();
    println!(
        "  {} reviews across {} banks",
        batch.reviews.len(),
        bank_count
    );

    println!(
        "Identifying themes (method: {}, target {} per bank)...",
        analyzer.settings().method,
        analyzer.settings().n_themes
    );
    let analysis = analyze_with_progress(analyzer, &batch.reviews);
    info!(
        reviews = analysis.total_reviews(),
        banks = analysis.groups.len(),
        uncategorized = analysis.total_uncategorized(),
        "Thematic analysis finished"
    );

    for group in &analysis.groups {
        terminal::display_group_themes(group);
    }
    terminal::display_analysis_summary(&analysis);

    let exports = export::export_run(
        &options.output_dir,
        &batch.reviews,
        &analysis,
        &export::file_timestamp(),
    )?;
    println!("\nLabeled reviews: {}", exports.csv.display());
    println!("Themes JSON:     {}", exports.themes_json.display());

    let run_id = match &options.db_path {
        Some(db_path) => Some(save_run(
            db_path,
            &options.input,
            analyzer,
            &batch.reviews,
            &analysis,
        )?),
        None => None,
    };

    let kpis = kpi::validate(&batch.reviews, &analysis, batch.has_sentiment_column);
    terminal::display_kpis(&kpis);

    Ok(RunSummary {
        analysis,
        exports,
        run_id,
        kpis,
    })
}

fn save_run(
    db_path: &str,
    input: &Path,
    analyzer: &ThematicAnalyzer,
    reviews: &[Review],
    analysis: &Analysis,
) -> Result<i64> {
    let conn = db::initialize(db_path)?;
    let run_id = queries::save_analysis(
        &conn,
        &input.display().to_string(),
        analyzer.settings(),
        reviews,
        analysis,
    )?;
    info!(run_id, db = db_path, "Saved analysis run");
    println!("Saved as run #{run_id} in {db_path}");
    Ok(run_id)
}
