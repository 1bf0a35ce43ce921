use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::themes::keywords::ExtractionMethod;
use crate::themes::AnalyzerSettings;

/// Central configuration loaded from environment variables.
///
/// Everything has a default; the .env file is loaded automatically at
/// startup via dotenvy. A variable that is set but can't be parsed is an
/// error rather than a silent fallback.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    /// Where CSV and JSON exports are written
    pub output_dir: PathBuf,
    pub analyzer: AnalyzerSettings,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let defaults = AnalyzerSettings::default();

        let analyzer = AnalyzerSettings {
            n_themes: parse_var("REVIEWLENS_N_THEMES", defaults.n_themes)?,
            min_keyword_freq: parse_var("REVIEWLENS_MIN_KEYWORD_FREQ", defaults.min_keyword_freq)?,
            max_keywords_per_theme: parse_var(
                "REVIEWLENS_MAX_KEYWORDS_PER_THEME",
                defaults.max_keywords_per_theme,
            )?,
            max_features: parse_var("REVIEWLENS_MAX_FEATURES", defaults.max_features)?,
            method: parse_var::<ExtractionMethod>("REVIEWLENS_METHOD", defaults.method)?,
            ..defaults
        };

        if analyzer.max_features == 0 {
            anyhow::bail!("REVIEWLENS_MAX_FEATURES must be at least 1");
        }

        Ok(Self {
            db_path: env::var("REVIEWLENS_DB_PATH")
                .unwrap_or_else(|_| "./reviewlens.db".to_string()),
            output_dir: env::var("REVIEWLENS_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/analyzed")),
            analyzer,
        })
    }
}

/// Read and parse an env var, falling back to `default` when it's unset or blank.
fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Invalid value '{raw}' for {name}")),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own variable name so parallel tests don't collide.

    #[test]
    fn test_parse_var_default_when_unset() {
        assert_eq!(parse_var("REVIEWLENS_TEST_UNSET", 7usize).unwrap(), 7);
    }

    #[test]
    fn test_parse_var_reads_value() {
        env::set_var("REVIEWLENS_TEST_SET", " 12 ");
        assert_eq!(parse_var("REVIEWLENS_TEST_SET", 7usize).unwrap(), 12);
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        env::set_var("REVIEWLENS_TEST_BAD", "many");
        let err = parse_var("REVIEWLENS_TEST_BAD", 7usize).unwrap_err();
        assert!(err.to_string().contains("REVIEWLENS_TEST_BAD"));
    }

    #[test]
    fn test_parse_var_method() {
        env::set_var("REVIEWLENS_TEST_METHOD", "TF-IDF");
        let method = parse_var("REVIEWLENS_TEST_METHOD", ExtractionMethod::Both).unwrap();
        assert_eq!(method, ExtractionMethod::Tfidf);
    }
}
