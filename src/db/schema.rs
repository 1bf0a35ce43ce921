// Database schema — table creation.
//
// A `schema_version` table records the version the tables were created at,
// so a later layout change can tell existing databases apart.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Create all tables if they don't exist yet.
///
/// This is idempotent — safe to call on every startup.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- Version the tables were created at
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- One row per `reviewlens analyze` invocation that was saved
        CREATE TABLE IF NOT EXISTS analysis_runs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            input_path TEXT NOT NULL,
            method TEXT NOT NULL,              -- tfidf / linguistic / both
            settings_json TEXT NOT NULL,       -- full AnalyzerSettings as JSON
            review_count INTEGER NOT NULL,
            bank_count INTEGER NOT NULL,
            uncategorized_count INTEGER NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Theme labels for every review in a run
        CREATE TABLE IF NOT EXISTS review_themes (
            run_id INTEGER NOT NULL REFERENCES analysis_runs(id) ON DELETE CASCADE,
            review_id TEXT NOT NULL,
            bank TEXT NOT NULL,
            identified_themes TEXT NOT NULL,   -- '; '-joined theme names
            primary_theme TEXT NOT NULL,
            sentiment_label TEXT,              -- carried from the input CSV
            PRIMARY KEY (run_id, review_id)
        );

        -- The themes discovered for each bank in a run
        CREATE TABLE IF NOT EXISTS bank_themes (
            run_id INTEGER NOT NULL REFERENCES analysis_runs(id) ON DELETE CASCADE,
            bank TEXT NOT NULL,
            position INTEGER NOT NULL,         -- discovery order within the bank
            theme_name TEXT NOT NULL,
            source TEXT NOT NULL,              -- 'catalog' or 'cluster'
            review_count INTEGER NOT NULL,
            keywords_json TEXT NOT NULL,       -- JSON array of [keyword, score] pairs
            logic TEXT NOT NULL,
            PRIMARY KEY (run_id, bank, theme_name)
        );

        -- Index for per-bank lookups of review labels
        CREATE INDEX IF NOT EXISTS idx_review_themes_bank
            ON review_themes(run_id, bank);

        -- Index for theme distribution queries
        CREATE INDEX IF NOT EXISTS idx_review_themes_primary
            ON review_themes(primary_theme);
        ",
    )
    .context("Failed to create database tables")?;

    // Record initial schema version if not already set
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [1],
    )?;

    Ok(())
}

/// Count the number of tables in the database (useful for init confirmation).
pub fn table_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tables_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();
    }

    #[test]
    fn test_table_count() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        // schema_version, analysis_runs, review_themes, bank_themes
        // (sqlite_sequence is excluded by the name filter)
        assert_eq!(table_count(&conn).unwrap(), 4i64);
    }

    #[test]
    fn test_review_themes_stores_sentiment_label() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();

        conn.execute(
            "INSERT INTO analysis_runs (input_path, method, settings_json, review_count, bank_count, uncategorized_count)
             VALUES ('in.csv', 'both', '{}', 1, 1, 0)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO review_themes (run_id, review_id, bank, identified_themes, primary_theme, sentiment_label)
             VALUES (1, 'r1', 'CBE', 'Uncategorized', 'Uncategorized', 'NEGATIVE')",
            [],
        )
        .unwrap();

        let label: String = conn
            .query_row(
                "SELECT sentiment_label FROM review_themes WHERE review_id = 'r1'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(label, "NEGATIVE");
    }

    #[test]
    fn test_schema_version_recorded_once() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();

        let versions: Vec<i64> = conn
            .prepare("SELECT version FROM schema_version ORDER BY version")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        assert_eq!(versions, vec![1]);
    }
}
