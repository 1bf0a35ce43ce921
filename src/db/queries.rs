// Database queries — reads and writes for analysis runs.
//
// Every database interaction goes through this module. This keeps SQL
// contained in one place and gives the rest of the app clean Rust interfaces.

use std::collections::HashMap;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use super::models::{AnalysisRun, StoreStats, StoredAssignment, StoredTheme};
use crate::reviews::Review;
use crate::themes::aggregate::Analysis;
use crate::themes::AnalyzerSettings;

// --- Runs ---

/// Save a complete analysis (run row, per-bank themes, per-review labels)
/// in one transaction. Returns the new run id.
///
/// Review ids must be unique within a run. A repeated id fails the save and
/// nothing from the run is kept.
pub fn save_analysis(
    conn: &Connection,
    input_path: &str,
    settings: &AnalyzerSettings,
    reviews: &[Review],
    analysis: &Analysis,
) -> Result<i64> {
    let settings_json = serde_json::to_string(settings)?;
    let sentiment: HashMap<&str, Option<&str>> = reviews
        .iter()
        .map(|r| (r.review_id.as_str(), r.sentiment_label.as_deref()))
        .collect();

    let tx = conn
        .unchecked_transaction()
        .context("Failed to start transaction")?;

    tx.execute(
        "INSERT INTO analysis_runs (input_path, method, settings_json, review_count, bank_count, uncategorized_count)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            input_path,
            settings.method.to_string(),
            settings_json,
            analysis.total_reviews() as i64,
            analysis.groups.len() as i64,
            analysis.total_uncategorized() as i64,
        ],
    )?;
    let run_id = tx.last_insert_rowid();

    {
        let mut theme_stmt = tx.prepare(
            "INSERT INTO bank_themes (run_id, bank, position, theme_name, source, review_count, keywords_json, logic)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        let mut review_stmt = tx.prepare(
            "INSERT INTO review_themes (run_id, review_id, bank, identified_themes, primary_theme, sentiment_label)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;

        for group in &analysis.groups {
            for (position, theme) in group.themes.iter().enumerate() {
                theme_stmt.execute(params![
                    run_id,
                    group.group,
                    position as i64,
                    theme.name,
                    theme.source.to_string(),
                    theme.review_count as i64,
                    serde_json::to_string(&theme.keywords)?,
                    theme.logic,
                ])?;
            }

            for (review_id, assignment) in group.rows() {
                review_stmt.execute(params![
                    run_id,
                    review_id,
                    group.group,
                    assignment.identified_themes(),
                    assignment.primary_theme(),
                    sentiment.get(review_id).copied().flatten(),
                ])
                .with_context(|| format!("Failed to save themes for review '{review_id}'"))?;
            }
        }
    }

    tx.commit().context("Failed to commit analysis run")?;
    Ok(run_id)
}

fn run_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AnalysisRun> {
    Ok(AnalysisRun {
        id: row.get(0)?,
        input_path: row.get(1)?,
        method: row.get(2)?,
        review_count: row.get(3)?,
        bank_count: row.get(4)?,
        uncategorized_count: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// The most recently saved run, if any.
pub fn get_latest_run(conn: &Connection) -> Result<Option<AnalysisRun>> {
    let mut stmt = conn.prepare(
        "SELECT id, input_path, method, review_count, bank_count, uncategorized_count, created_at
         FROM analysis_runs
         ORDER BY id DESC
         LIMIT 1",
    )?;
    let result = stmt.query_row([], run_from_row).optional()?;
    Ok(result)
}

/// The most recent runs, newest first.
pub fn get_recent_runs(conn: &Connection, limit: u32) -> Result<Vec<AnalysisRun>> {
    let mut stmt = conn.prepare(
        "SELECT id, input_path, method, review_count, bank_count, uncategorized_count, created_at
         FROM analysis_runs
         ORDER BY id DESC
         LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit], run_from_row)?;

    let mut runs = Vec::new();
    for row in rows {
        runs.push(row?);
    }
    Ok(runs)
}

// --- Themes ---

/// Themes stored for a run, banks and themes in the order they were discovered.
/// Pass `bank` to restrict to one bank.
pub fn get_bank_themes(
    conn: &Connection,
    run_id: i64,
    bank: Option<&str>,
) -> Result<Vec<StoredTheme>> {
    let mut stmt = conn.prepare(
        "SELECT bank, theme_name, source, review_count, keywords_json, logic
         FROM bank_themes
         WHERE run_id = ?1 AND (?2 IS NULL OR bank = ?2)
         ORDER BY rowid",
    )?;

    let rows = stmt.query_map(params![run_id, bank], |row| {
        let source: String = row.get(2)?;
        let keywords_json: String = row.get(4)?;
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            source,
            row.get::<_, u32>(3)?,
            keywords_json,
            row.get::<_, String>(5)?,
        ))
    })?;

    let mut themes = Vec::new();
    for row in rows {
        let (bank, name, source, review_count, keywords_json, logic) = row?;
        themes.push(StoredTheme {
            bank,
            source: source
                .parse()
                .with_context(|| format!("Bad theme source stored for '{name}'"))?,
            keywords: serde_json::from_str(&keywords_json)
                .with_context(|| format!("Bad keyword JSON stored for '{name}'"))?,
            name,
            review_count,
            logic,
        });
    }
    Ok(themes)
}

// --- Review labels ---

/// Theme labels for every review in a run, in insertion order.
pub fn get_review_themes(conn: &Connection, run_id: i64) -> Result<Vec<StoredAssignment>> {
    let mut stmt = conn.prepare(
        "SELECT review_id, bank, identified_themes, primary_theme, sentiment_label
         FROM review_themes
         WHERE run_id = ?1
         ORDER BY rowid",
    )?;
    let rows = stmt.query_map(params![run_id], |row| {
        Ok(StoredAssignment {
            review_id: row.get(0)?,
            bank: row.get(1)?,
            identified_themes: row.get(2)?,
            primary_theme: row.get(3)?,
            sentiment_label: row.get(4)?,
        })
    })?;

    let mut assignments = Vec::new();
    for row in rows {
        assignments.push(row?);
    }
    Ok(assignments)
}

/// Reviews per (bank, primary theme) for a run, largest first.
pub fn get_primary_theme_counts(conn: &Connection, run_id: i64) -> Result<Vec<(String, String, u32)>> {
    let mut stmt = conn.prepare(
        "SELECT bank, primary_theme, COUNT(*) AS n
         FROM review_themes
         WHERE run_id = ?1
         GROUP BY bank, primary_theme
         ORDER BY bank, n DESC, primary_theme",
    )?;
    let rows = stmt.query_map(params![run_id], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?;

    let mut counts = Vec::new();
    for row in rows {
        counts.push(row?);
    }
    Ok(counts)
}

// --- Stats ---

pub fn get_store_stats(conn: &Connection) -> Result<StoreStats> {
    let count = |table: &str| -> Result<u32> {
        let n: u32 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(n)
    };
    Ok(StoreStats {
        runs: count("analysis_runs")?,
        review_rows: count("review_themes")?,
        theme_rows: count("bank_themes")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::create_tables;
    use crate::themes::aggregate::GroupAnalysis;
    use crate::themes::theme::{Theme, ThemeAssignment, ThemeSet, ThemeSource};

    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn
    }

    fn sample() -> (Vec<Review>, Analysis) {
        let mut r1 = Review::new("r1", "login fails", "CBE");
        r1.sentiment_label = Some("NEGATIVE".into());
        let r2 = Review::new("r2", "nice", "CBE");

        let mut theme = Theme::from_catalog("Account Access Problems", vec![("login".into(), 0.4)]);
        theme.review_count = 1;
        let themes: ThemeSet = vec![theme].into_iter().collect();

        let analysis = Analysis {
            groups: vec![GroupAnalysis {
                group: "CBE".into(),
                themes,
                review_ids: vec!["r1".into(), "r2".into()],
                assignments: vec![
                    ThemeAssignment::from_matches(vec!["Account Access Problems".into()]),
                    ThemeAssignment::uncategorized(),
                ],
            }],
        };
        (vec![r1, r2], analysis)
    }

    #[test]
    fn test_latest_run_none_on_empty_db() {
        let conn = test_db();
        assert!(get_latest_run(&conn).unwrap().is_none());
    }

    #[test]
    fn test_save_and_read_back() {
        let conn = test_db();
        let (reviews, analysis) = sample();
        let run_id =
            save_analysis(&conn, "in.csv", &AnalyzerSettings::default(), &reviews, &analysis).unwrap();

        let run = get_latest_run(&conn).unwrap().unwrap();
        assert_eq!(run.id, run_id);
        assert_eq!(run.review_count, 2);
        assert_eq!(run.uncategorized_count, 1);
        assert_eq!(run.method, "both");

        let themes = get_bank_themes(&conn, run_id, None).unwrap();
        assert_eq!(themes.len(), 1);
        assert_eq!(themes[0].source, ThemeSource::Catalog);
        assert_eq!(themes[0].keywords, vec![("login".to_string(), 0.4)]);

        let labels = get_review_themes(&conn, run_id).unwrap();
        assert_eq!(labels[0].sentiment_label.as_deref(), Some("NEGATIVE"));
        assert_eq!(labels[1].primary_theme, "Uncategorized");
    }

    #[test]
    fn test_bank_filter() {
        let conn = test_db();
        let (reviews, analysis) = sample();
        let run_id =
            save_analysis(&conn, "in.csv", &AnalyzerSettings::default(), &reviews, &analysis).unwrap();
        assert!(get_bank_themes(&conn, run_id, Some("Dashen")).unwrap().is_empty());
        assert_eq!(get_bank_themes(&conn, run_id, Some("CBE")).unwrap().len(), 1);
    }

    #[test]
    fn test_stats_count_rows() {
        let conn = test_db();
        let (reviews, analysis) = sample();
        save_analysis(&conn, "a.csv", &AnalyzerSettings::default(), &reviews, &analysis).unwrap();
        save_analysis(&conn, "b.csv", &AnalyzerSettings::default(), &reviews, &analysis).unwrap();
        let stats = get_store_stats(&conn).unwrap();
        assert_eq!(
            stats,
            StoreStats {
                runs: 2,
                review_rows: 4,
                theme_rows: 2,
            }
        );
        assert_eq!(get_recent_runs(&conn, 1).unwrap()[0].input_path, "b.csv");
    }
}
