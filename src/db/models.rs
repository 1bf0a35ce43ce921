// Data models — Rust structs that map to database rows.
//
// These are separate from the queries so the output layer can display
// stored runs without depending on rusqlite directly.

use serde::{Deserialize, Serialize};

use crate::themes::theme::ThemeSource;

/// One saved analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRun {
    pub id: i64,
    pub input_path: String,
    pub method: String,
    pub review_count: u32,
    pub bank_count: u32,
    pub uncategorized_count: u32,
    pub created_at: String,
}

/// A theme as stored for one bank in one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredTheme {
    pub bank: String,
    pub name: String,
    pub source: ThemeSource,
    pub review_count: u32,
    pub keywords: Vec<(String, f64)>,
    pub logic: String,
}

/// A review's theme labels as stored for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAssignment {
    pub review_id: String,
    pub bank: String,
    pub identified_themes: String,
    pub primary_theme: String,
    pub sentiment_label: Option<String>,
}

/// Row counts across the whole database, for `reviewlens status`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreStats {
    pub runs: u32,
    pub review_rows: u32,
    pub theme_rows: u32,
}
