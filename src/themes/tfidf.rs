// TF-IDF keyword extraction.
//
// Each review is treated as a separate document for IDF computation: words
// that appear in nearly every review of a bank get downweighted, words that
// are distinctive to a subset of reviews get boosted.
//
// The vectorizer follows the usual bag-of-words recipe:
//   - unigrams and bigrams over stop-word-filtered tokens
//   - vocabulary pruned by document frequency (min_df absolute, max_df ratio)
//   - vocabulary capped at `max_features` by total corpus frequency
//   - smoothed idf: ln((1 + n) / (1 + df)) + 1
//   - raw counts * idf, each row L2-normalized
//
// The same vectorizer feeds the k-means clustering in cluster.rs.

use std::collections::{BTreeMap, HashMap, HashSet};

use anyhow::Result;
use tracing::debug;

use super::keywords::KeywordSet;
use super::tokenize::{word_ngrams, StopWords};
use super::traits::KeywordExtractor;

/// Bag-of-words TF-IDF vectorizer over unigrams and bigrams.
#[derive(Debug, Clone)]
pub struct TfIdfVectorizer {
    /// Maximum vocabulary size
    pub max_features: usize,
    /// Minimum number of documents a term must appear in
    pub min_df: usize,
    /// Maximum fraction of documents a term may appear in
    pub max_df: f64,
    stop_words: StopWords,
}

/// Fitted vocabulary plus one L2-normalized row per document.
#[derive(Debug, Clone)]
pub struct TfIdfMatrix {
    /// Terms in column order (alphabetical)
    pub vocabulary: Vec<String>,
    /// Dense document rows, `rows[doc][term]`
    pub rows: Vec<Vec<f64>>,
}

impl TfIdfMatrix {
    /// Mean TF-IDF weight per term across all documents.
    pub fn mean_scores(&self) -> Vec<f64> {
        let n = self.rows.len().max(1) as f64;
        let mut sums = vec![0.0; self.vocabulary.len()];
        for row in &self.rows {
            for (sum, v) in sums.iter_mut().zip(row) {
                *sum += v;
            }
        }
        sums.into_iter().map(|s| s / n).collect()
    }
}

impl TfIdfVectorizer {
    pub fn new(max_features: usize, min_df: usize, max_df: f64, stop_words: StopWords) -> Self {
        Self {
            max_features,
            min_df,
            max_df,
            stop_words,
        }
    }

    /// Learn the vocabulary from `texts` and return their TF-IDF rows.
    pub fn fit_transform(&self, texts: &[String]) -> Result<TfIdfMatrix> {
        let n_docs = texts.len();
        let docs: Vec<Vec<String>> = texts
            .iter()
            .map(|t| word_ngrams(t, &self.stop_words))
            .collect();

        // Document frequency and total corpus frequency per term. BTreeMap
        // keeps the vocabulary in alphabetical order.
        let mut doc_freq: BTreeMap<&str, usize> = BTreeMap::new();
        let mut term_freq: HashMap<&str, usize> = HashMap::new();
        for doc in &docs {
            let mut seen: HashSet<&str> = HashSet::new();
            for gram in doc {
                *term_freq.entry(gram.as_str()).or_insert(0) += 1;
                if seen.insert(gram.as_str()) {
                    *doc_freq.entry(gram.as_str()).or_insert(0) += 1;
                }
            }
        }

        if doc_freq.is_empty() {
            anyhow::bail!("empty vocabulary; the documents only contain stop words or are empty");
        }

        let max_doc_count = self.max_df * n_docs as f64;
        if max_doc_count < self.min_df as f64 {
            anyhow::bail!(
                "max_df corresponds to fewer documents than min_df ({:.2} < {})",
                max_doc_count,
                self.min_df
            );
        }

        let mut kept: Vec<&str> = doc_freq
            .iter()
            .filter(|(_, df)| **df >= self.min_df && **df as f64 <= max_doc_count)
            .map(|(term, _)| *term)
            .collect();

        if kept.len() > self.max_features {
            // Most frequent terms win; alphabetical order breaks ties.
            kept.sort_by(|a, b| term_freq[b].cmp(&term_freq[a]).then_with(|| a.cmp(b)));
            kept.truncate(self.max_features);
            kept.sort_unstable();
        }

        if kept.is_empty() {
            anyhow::bail!("after pruning, no terms remain; try a lower min_df or a higher max_df");
        }

        let column: HashMap<&str, usize> = kept.iter().enumerate().map(|(i, t)| (*t, i)).collect();
        let idf: Vec<f64> = kept
            .iter()
            .map(|t| ((1.0 + n_docs as f64) / (1.0 + doc_freq[t] as f64)).ln() + 1.0)
            .collect();

        let rows: Vec<Vec<f64>> = docs
            .iter()
            .map(|doc| {
                let mut row = vec![0.0; kept.len()];
                for gram in doc {
                    if let Some(&col) = column.get(gram.as_str()) {
                        row[col] += 1.0;
                    }
                }
                for (v, w) in row.iter_mut().zip(&idf) {
                    *v *= w;
                }
                let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
                if norm > 0.0 {
                    for v in &mut row {
                        *v /= norm;
                    }
                }
                row
            })
            .collect();

        debug!(
            documents = n_docs,
            vocabulary = kept.len(),
            "Fitted TF-IDF vocabulary"
        );

        Ok(TfIdfMatrix {
            vocabulary: kept.into_iter().map(str::to_string).collect(),
            rows,
        })
    }
}

/// Statistical keyword extractor: mean TF-IDF weight per vocabulary term.
pub struct TfIdfExtractor {
    pub vectorizer: TfIdfVectorizer,
}

impl TfIdfExtractor {
    pub fn new(max_features: usize, stop_words: StopWords) -> Self {
        Self {
            vectorizer: TfIdfVectorizer::new(max_features, 2, 0.95, stop_words),
        }
    }
}

impl Default for TfIdfExtractor {
    fn default() -> Self {
        Self::new(100, StopWords::english())
    }
}

impl KeywordExtractor for TfIdfExtractor {
    fn name(&self) -> &'static str {
        "tfidf"
    }

    fn extract(&self, texts: &[String]) -> Result<KeywordSet> {
        if texts.is_empty() {
            return Ok(KeywordSet::new());
        }

        let matrix = self.vectorizer.fit_transform(texts)?;
        let scores = matrix.mean_scores();

        let mut keywords: KeywordSet = matrix.vocabulary.into_iter().zip(scores).collect();
        keywords.sort_by_score();
        Ok(keywords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stops() -> StopWords {
        StopWords::from_words(["the", "is", "and", "my", "a", "to", "after"])
    }

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_vocabulary_respects_min_df() {
        let v = TfIdfVectorizer::new(100, 2, 1.0, stops());
        let m = v
            .fit_transform(&docs(&[
                "login failed",
                "login slow",
                "transfer failed",
            ]))
            .unwrap();
        assert_eq!(m.vocabulary, vec!["failed", "login"]);
        assert_eq!(m.rows.len(), 3);
    }

    #[test]
    fn test_rows_are_l2_normalized() {
        let v = TfIdfVectorizer::new(100, 2, 1.0, stops());
        let m = v
            .fit_transform(&docs(&["login failed", "login failed again", "login slow"]))
            .unwrap();
        for row in &m.rows {
            let norm: f64 = row.iter().map(|x| x * x).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9, "norm was {norm}");
        }
    }

    #[test]
    fn test_max_df_drops_ubiquitous_terms() {
        let v = TfIdfVectorizer::new(100, 2, 0.95, stops());
        let m = v
            .fit_transform(&docs(&[
                "app crash login",
                "app crash otp",
                "app slow otp",
                "app login",
            ]))
            .unwrap();
        assert!(!m.vocabulary.contains(&"app".to_string()));
        assert!(m.vocabulary.contains(&"crash".to_string()));
        assert!(m.vocabulary.contains(&"app crash".to_string()));
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let v = TfIdfVectorizer::new(1, 2, 1.0, stops());
        let m = v
            .fit_transform(&docs(&["otp otp login", "otp login", "otp"]))
            .unwrap();
        assert_eq!(m.vocabulary, vec!["otp"]);
    }

    #[test]
    fn test_single_document_fails() {
        let v = TfIdfVectorizer::new(100, 2, 0.95, stops());
        assert!(v.fit_transform(&docs(&["login failed"])).is_err());
    }

    #[test]
    fn test_only_stop_words_fails() {
        let v = TfIdfVectorizer::new(100, 2, 1.0, stops());
        assert!(v.fit_transform(&docs(&["the is", "and my"])).is_err());
    }

    #[test]
    fn test_extractor_sorted_descending() {
        let extractor = TfIdfExtractor::new(100, stops());
        let keywords = extractor
            .extract(&docs(&[
                "transfer failed transfer pending",
                "transfer failed",
                "login otp",
                "login otp code",
                "transfer pending",
            ]))
            .unwrap();
        assert!(!keywords.is_empty());
        let scores: Vec<f64> = keywords.iter().map(|(_, s)| s).collect();
        for pair in scores.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
    }

    #[test]
    fn test_extractor_empty_input() {
        let extractor = TfIdfExtractor::new(100, stops());
        assert!(extractor.extract(&[]).unwrap().is_empty());
    }
}
