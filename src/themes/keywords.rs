// Keyword sets and the extraction outcome type.
//
// A KeywordSet is an ordered term -> score mapping. Order is whatever the
// producing extractor emitted (TF-IDF: descending score; linguistic: first
// occurrence), and downstream stable sorts rely on it for tie-breaking.
//
// Extraction strategies can fail on degenerate input (a batch of one review
// has no term in two documents, for instance). Those failures never abort a
// batch: they become `Extraction::Empty` with the reason attached, so callers
// can tell "nothing found" apart from "nothing ran".

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::traits::KeywordExtractor;

/// Ordered keyword -> score mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordSet {
    entries: Vec<(String, f64)>,
    index: HashMap<String, usize>,
}

impl KeywordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a keyword, or overwrite its score in place if already present.
    pub fn insert(&mut self, term: impl Into<String>, score: f64) {
        let term = term.into();
        match self.index.get(&term) {
            Some(&i) => self.entries[i].1 = score,
            None => {
                self.index.insert(term.clone(), self.entries.len());
                self.entries.push((term, score));
            }
        }
    }

    pub fn get(&self, term: &str) -> Option<f64> {
        self.index.get(term).map(|&i| self.entries[i].1)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.index.contains_key(term)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate keywords in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(t, s)| (t.as_str(), *s))
    }

    /// Keep only the keywords for which `keep` returns true, preserving order.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str, f64) -> bool,
    {
        self.entries.retain(|(t, s)| keep(t, *s));
        self.reindex();
    }

    /// Stable sort by descending score.
    pub fn sort_by_score(&mut self) {
        self.entries
            .sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        self.reindex();
    }

    /// The `n` highest-scored keywords (stable on ties).
    pub fn top(&self, n: usize) -> Vec<(String, f64)> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        sorted.truncate(n);
        sorted
    }

    fn reindex(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, (t, _))| (t.clone(), i))
            .collect();
    }
}

impl FromIterator<(String, f64)> for KeywordSet {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut set = KeywordSet::new();
        for (term, score) in iter {
            set.insert(term, score);
        }
        set
    }
}

/// Which keyword strategies to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    Tfidf,
    Linguistic,
    Both,
}

impl ExtractionMethod {
    pub fn uses_tfidf(self) -> bool {
        matches!(self, ExtractionMethod::Tfidf | ExtractionMethod::Both)
    }

    pub fn uses_linguistic(self) -> bool {
        matches!(self, ExtractionMethod::Linguistic | ExtractionMethod::Both)
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExtractionMethod::Tfidf => "tfidf",
            ExtractionMethod::Linguistic => "linguistic",
            ExtractionMethod::Both => "both",
        };
        f.write_str(name)
    }
}

impl FromStr for ExtractionMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tfidf" | "tf-idf" => Ok(ExtractionMethod::Tfidf),
            "linguistic" | "nlp" => Ok(ExtractionMethod::Linguistic),
            "both" => Ok(ExtractionMethod::Both),
            other => anyhow::bail!(
                "Unknown extraction method '{other}' (expected tfidf, linguistic or both)"
            ),
        }
    }
}

/// Outcome of running one extraction strategy over a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// The strategy ran and produced at least one keyword.
    Keywords(KeywordSet),
    /// The strategy produced nothing; `reason` says why.
    Empty { reason: String },
}

impl Extraction {
    /// Run an extractor, downgrading any error to `Empty`.
    pub fn run(extractor: &dyn KeywordExtractor, texts: &[String]) -> Self {
        match extractor.extract(texts) {
            Ok(set) if set.is_empty() => Extraction::Empty {
                reason: format!("{} found no keywords", extractor.name()),
            },
            Ok(set) => {
                info!(
                    strategy = extractor.name(),
                    keywords = set.len(),
                    "Extracted keywords"
                );
                Extraction::Keywords(set)
            }
            Err(e) => {
                warn!(strategy = extractor.name(), error = %e, "Keyword extraction failed, contributing nothing");
                Extraction::Empty {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Extraction::Empty { .. })
    }

    /// The keywords, or an empty set.
    pub fn into_keywords(self) -> KeywordSet {
        match self {
            Extraction::Keywords(set) => set,
            Extraction::Empty { .. } => KeywordSet::new(),
        }
    }
}

/// Merge two keyword sets: union of terms, arithmetic mean where both have one.
///
/// Terms from `primary` keep their position; new terms from `secondary` are
/// appended in their own order.
pub fn combine(primary: KeywordSet, secondary: &KeywordSet) -> KeywordSet {
    let mut merged = primary;
    for (term, score) in secondary.iter() {
        match merged.get(term) {
            Some(existing) => merged.insert(term, (existing + score) / 2.0),
            None => merged.insert(term, score),
        }
    }
    merged
}

/// Drop keywords whose score falls below `min_freq / num_texts`.
///
/// An empty batch yields an empty set regardless of input.
pub fn filter_by_frequency(mut keywords: KeywordSet, min_freq: usize, num_texts: usize) -> KeywordSet {
    if num_texts == 0 {
        return KeywordSet::new();
    }
    let threshold = min_freq as f64 / num_texts as f64;
    let before = keywords.len();
    keywords.retain(|_, score| score >= threshold);
    debug!(
        threshold,
        before,
        after = keywords.len(),
        "Applied keyword frequency floor"
    );
    keywords
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(pairs: &[(&str, f64)]) -> KeywordSet {
        pairs.iter().map(|(t, s)| (t.to_string(), *s)).collect()
    }

    #[test]
    fn test_insert_preserves_order_and_overwrites() {
        let mut s = set(&[("login", 0.5), ("otp", 0.2)]);
        s.insert("login", 0.9);
        let terms: Vec<&str> = s.iter().map(|(t, _)| t).collect();
        assert_eq!(terms, vec!["login", "otp"]);
        assert_eq!(s.get("login"), Some(0.9));
    }

    #[test]
    fn test_combine_averages_shared_terms() {
        let a = set(&[("login", 0.4), ("crash", 0.2)]);
        let b = set(&[("crash", 0.6), ("design", 0.1)]);
        let merged = combine(a, &b);
        assert_eq!(merged.len(), 3);
        assert!((merged.get("crash").unwrap() - 0.4).abs() < 1e-12);
        assert_eq!(merged.get("login"), Some(0.4));
        assert_eq!(merged.get("design"), Some(0.1));
        let terms: Vec<&str> = merged.iter().map(|(t, _)| t).collect();
        assert_eq!(terms, vec!["login", "crash", "design"]);
    }

    #[test]
    fn test_filter_by_frequency() {
        let s = set(&[("a", 0.5), ("b", 0.3), ("c", 0.29)]);
        let kept = filter_by_frequency(s, 3, 10);
        assert_eq!(kept.len(), 2);
        assert!(!kept.contains("c"));
    }

    #[test]
    fn test_filter_empty_batch() {
        let s = set(&[("a", 0.5)]);
        assert!(filter_by_frequency(s, 3, 0).is_empty());
    }

    #[test]
    fn test_top_is_stable_on_ties() {
        let s = set(&[("x", 0.1), ("y", 0.5), ("z", 0.5)]);
        let top = s.top(2);
        assert_eq!(top[0].0, "y");
        assert_eq!(top[1].0, "z");
    }

    #[test]
    fn test_method_parse() {
        assert_eq!("both".parse::<ExtractionMethod>().unwrap(), ExtractionMethod::Both);
        assert_eq!("TF-IDF".parse::<ExtractionMethod>().unwrap(), ExtractionMethod::Tfidf);
        assert!("lda".parse::<ExtractionMethod>().is_err());
    }
}
