// Cluster supplementer — synthesize extra themes when the catalog falls short.
//
// When a bank's reviews match fewer catalog themes than the target, the
// reviews are vectorized with TF-IDF and partitioned with k-means. Each
// resulting cluster becomes "Cluster Theme N" with its own top keywords,
// recomputed from just that cluster's reviews.
//
// Clustering can't always happen: too few reviews, or a vocabulary that
// prunes down to nothing. Those cases yield `ClusterOutcome::Skipped` and the
// bank simply ends up with fewer themes than requested.

use tracing::{info, warn};

use super::keywords::{filter_by_frequency, Extraction};
use super::kmeans::KMeans;
use super::tfidf::{TfIdfExtractor, TfIdfVectorizer};
use super::theme::Theme;
use super::tokenize::StopWords;

/// How many keywords each cluster theme keeps.
pub const KEYWORDS_PER_CLUSTER: usize = 5;

/// Outcome of a supplementing attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterOutcome {
    /// Clustering ran; one theme per non-empty cluster, in slot order.
    Themes(Vec<Theme>),
    /// Clustering didn't run or failed; `reason` says why.
    Skipped { reason: String },
}

impl ClusterOutcome {
    pub fn into_themes(self) -> Vec<Theme> {
        match self {
            ClusterOutcome::Themes(themes) => themes,
            ClusterOutcome::Skipped { .. } => Vec::new(),
        }
    }
}

pub struct ClusterSupplementer {
    vectorizer: TfIdfVectorizer,
    keyword_extractor: TfIdfExtractor,
    min_keyword_freq: usize,
    seed: u64,
    restarts: usize,
}

impl ClusterSupplementer {
    pub fn new(
        max_features: usize,
        min_keyword_freq: usize,
        seed: u64,
        restarts: usize,
        stop_words: StopWords,
    ) -> Self {
        Self {
            vectorizer: TfIdfVectorizer::new(max_features, 2, 1.0, stop_words.clone()),
            keyword_extractor: TfIdfExtractor::new(max_features, stop_words),
            min_keyword_freq,
            seed,
            restarts,
        }
    }

    /// Partition `texts` into at most `slots` clusters and build a theme per cluster.
    pub fn supplement(&self, texts: &[String], slots: usize) -> ClusterOutcome {
        if slots == 0 {
            return ClusterOutcome::Skipped {
                reason: "no theme slots left to fill".to_string(),
            };
        }
        if texts.len() < 2 {
            return ClusterOutcome::Skipped {
                reason: format!("need at least 2 texts to cluster, got {}", texts.len()),
            };
        }

        let k = slots.min(texts.len());

        let matrix = match self.vectorizer.fit_transform(texts) {
            Ok(m) => m,
            Err(e) => {
                warn!(error = %e, "Clustering skipped: vectorization failed");
                return ClusterOutcome::Skipped {
                    reason: e.to_string(),
                };
            }
        };

        let fit = match KMeans::new(k, self.seed)
            .with_restarts(self.restarts)
            .fit(&matrix.rows)
        {
            Ok(fit) => fit,
            Err(e) => {
                warn!(error = %e, "Clustering skipped: k-means failed");
                return ClusterOutcome::Skipped {
                    reason: e.to_string(),
                };
            }
        };

        let groups = group_by_label(&fit.labels);
        let themes: Vec<Theme> = groups
            .iter()
            .enumerate()
            .map(|(slot, members)| {
                let cluster_texts: Vec<String> = members.iter().map(|&i| texts[i].clone()).collect();
                let keywords = self.cluster_keywords(&cluster_texts);
                Theme::from_cluster(slot + 1, keywords, members.len())
            })
            .collect();

        info!(
            texts = texts.len(),
            clusters = themes.len(),
            inertia = fit.inertia,
            "Clustered reviews into supplementary themes"
        );

        ClusterOutcome::Themes(themes)
    }

    /// Top TF-IDF keywords for one cluster's texts.
    fn cluster_keywords(&self, texts: &[String]) -> Vec<(String, f64)> {
        let extracted = Extraction::run(&self.keyword_extractor, texts).into_keywords();
        filter_by_frequency(extracted, self.min_keyword_freq, texts.len()).top(KEYWORDS_PER_CLUSTER)
    }
}

/// Member indices per cluster, clusters ordered by first appearance.
pub fn group_by_label(labels: &[usize]) -> Vec<Vec<usize>> {
    let mut order: Vec<usize> = Vec::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (i, &label) in labels.iter().enumerate() {
        match order.iter().position(|&l| l == label) {
            Some(slot) => groups[slot].push(i),
            None => {
                order.push(label);
                groups.push(vec![i]);
            }
        }
    }
    groups
}
