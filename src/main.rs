use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;

use reviewlens::config::Config;
use reviewlens::db::{self, queries, schema};
use reviewlens::output::terminal;
use reviewlens::pipeline::analyze::{self, RunOptions};
use reviewlens::themes::catalog::CATALOG;
use reviewlens::themes::keywords::ExtractionMethod;
use reviewlens::themes::ThematicAnalyzer;

/// reviewlens: thematic analysis of mobile banking app reviews.
///
/// Extracts keywords from each bank's reviews, maps them to a catalog of
/// banking themes (topped up with k-means clusters), and tags every review
/// with the themes it mentions.
#[derive(Parser)]
#[command(name = "reviewlens", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Analyze a CSV of reviews and export labeled results
    Analyze {
        /// CSV with at least `review` and `bank` columns
        #[arg(long)]
        input: PathBuf,

        /// Directory for the CSV and JSON exports (default: REVIEWLENS_OUTPUT_DIR)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Keyword strategy: tfidf, linguistic or both (default: REVIEWLENS_METHOD)
        #[arg(long)]
        method: Option<ExtractionMethod>,

        /// Don't save the run to the database
        #[arg(long)]
        no_save: bool,
    },

    /// Show themes from the most recent saved run
    Themes {
        /// Only show this bank
        #[arg(long)]
        bank: Option<String>,
    },

    /// List the predefined theme catalog
    Catalog,

    /// Show system status (database stats, last run)
    Status,
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("reviewlens=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            info!("Initializing reviewlens database...");
            let config = Config::load()?;
            let conn = db::initialize(&config.db_path)?;
            let table_count = schema::table_count(&conn)?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!("\nreviewlens is ready. Next step:");
            println!("  reviewlens analyze --input data/processed/reviews.csv");
        }

        Commands::Analyze {
            input,
            output_dir,
            method,
            no_save,
        } => {
            let mut config = Config::load()?;
            if let Some(method) = method {
                config.analyzer.method = method;
            }

            let analyzer = ThematicAnalyzer::new(config.analyzer.clone());
            let options = RunOptions {
                input,
                output_dir: output_dir.unwrap_or_else(|| config.output_dir.clone()),
                db_path: (!no_save).then(|| config.db_path.clone()),
            };

            let summary = analyze::run(&analyzer, &options)?;

            println!("\n{}", "Analysis complete.".bold());
            println!("  Reviews analyzed: {}", summary.analysis.total_reviews());
            println!("  Uncategorized:    {}", summary.analysis.total_uncategorized());
            if let Some(run_id) = summary.run_id {
                println!("  Run id:           {run_id}");
            }
        }

        Commands::Themes { bank } => {
            let config = Config::load()?;
            let conn = db::open(&config.db_path)?;

            let Some(run) = queries::get_latest_run(&conn)? else {
                println!("No runs saved yet. Run `reviewlens analyze --input <csv>` first.");
                return Ok(());
            };

            let themes = queries::get_bank_themes(&conn, run.id, bank.as_deref())?;
            terminal::display_stored_themes(&run, &themes);
        }

        Commands::Catalog => {
            terminal::display_catalog(CATALOG);
        }

        Commands::Status => {
            let config = Config::load()?;
            reviewlens::status::show(&config.db_path)?;
        }
    }

    Ok(())
}
