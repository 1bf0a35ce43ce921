// Thematic analyzer — runs the full keyword → theme → classification flow.
//
// For each bank:
//   1. Extract keywords from all of the bank's reviews (TF-IDF, linguistic, or both)
//   2. Match them against the catalog; themes with no matches are dropped
//   3. If that leaves fewer themes than the target, cluster the reviews to
//      synthesize "Cluster Theme N" buckets for the remaining slots
//   4. Tag every review with the themes whose keywords it contains
//   5. Recount each theme as the number of reviews that have it as primary
//
// Banks are independent: each gets its own keyword set and theme list.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::aggregate::{recount, Analysis, GroupAnalysis};
use super::catalog::{CatalogEntry, CATALOG};
use super::classifier::classify_review;
use super::cluster::{ClusterOutcome, ClusterSupplementer};
use super::keywords::{combine, filter_by_frequency, Extraction, ExtractionMethod, KeywordSet};
use super::linguistic::LinguisticExtractor;
use super::matcher::match_keywords_to_themes;
use super::tfidf::TfIdfExtractor;
use super::theme::{Theme, ThemeAssignment, ThemeSet};
use super::tokenize::StopWords;
use crate::reviews::{group_by_bank, Review};

/// Knobs for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerSettings {
    /// Target number of themes per bank
    pub n_themes: usize,
    /// A keyword must score at least `min_keyword_freq / num_texts`
    pub min_keyword_freq: usize,
    pub max_keywords_per_theme: usize,
    /// TF-IDF vocabulary cap
    pub max_features: usize,
    pub method: ExtractionMethod,
    pub cluster_seed: u64,
    pub cluster_restarts: usize,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            n_themes: 5,
            min_keyword_freq: 3,
            max_keywords_per_theme: 10,
            max_features: 100,
            method: ExtractionMethod::Both,
            cluster_seed: 42,
            cluster_restarts: 10,
        }
    }
}

pub struct ThematicAnalyzer {
    settings: AnalyzerSettings,
    catalog: &'static [CatalogEntry],
    tfidf: TfIdfExtractor,
    linguistic: LinguisticExtractor,
    clusters: ClusterSupplementer,
}

impl ThematicAnalyzer {
    /// Analyzer over the built-in catalog with English stop words.
    pub fn new(settings: AnalyzerSettings) -> Self {
        Self::with_stop_words(settings, StopWords::english())
    }

    pub fn with_stop_words(settings: AnalyzerSettings, stop_words: StopWords) -> Self {
        Self {
            tfidf: TfIdfExtractor::new(settings.max_features, stop_words.clone()),
            linguistic: LinguisticExtractor::new(stop_words.clone()),
            clusters: ClusterSupplementer::new(
                settings.max_features,
                settings.min_keyword_freq,
                settings.cluster_seed,
                settings.cluster_restarts,
                stop_words,
            ),
            catalog: CATALOG,
            settings,
        }
    }

    /// Swap in a different theme catalog.
    pub fn with_catalog(mut self, catalog: &'static [CatalogEntry]) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }

    /// Keywords for a batch, after the frequency floor.
    ///
    /// A failing strategy contributes nothing; the other one still runs.
    pub fn extract_keywords(&self, texts: &[String], method: ExtractionMethod) -> KeywordSet {
        let mut keywords: Option<KeywordSet> = None;

        if method.uses_tfidf() {
            keywords = Some(Extraction::run(&self.tfidf, texts).into_keywords());
        }
        if method.uses_linguistic() {
            let linguistic = Extraction::run(&self.linguistic, texts).into_keywords();
            keywords = Some(match keywords {
                Some(primary) => combine(primary, &linguistic),
                None => linguistic,
            });
        }

        filter_by_frequency(
            keywords.unwrap_or_default(),
            self.settings.min_keyword_freq,
            texts.len(),
        )
    }

    /// Discover the themes for one bank's reviews.
    ///
    /// Catalog themes come first in catalog order, cluster themes after.
    /// An empty batch yields an empty set without doing any work.
    pub fn identify_themes(&self, texts: &[String], group: &str) -> ThemeSet {
        let mut themes = ThemeSet::new();
        if texts.is_empty() {
            return themes;
        }

        info!(bank = group, reviews = texts.len(), "Identifying themes");

        let keywords = self.extract_keywords(texts, self.settings.method);
        debug!(bank = group, keywords = keywords.len(), "Keywords after frequency floor");

        for m in match_keywords_to_themes(self.catalog, &keywords, self.settings.max_keywords_per_theme) {
            themes.push(Theme::from_catalog(m.theme, m.keywords));
        }
        let matched = themes.len();

        if matched < self.settings.n_themes && texts.len() >= 2 {
            match self.clusters.supplement(texts, self.settings.n_themes - matched) {
                ClusterOutcome::Themes(extra) => {
                    for theme in extra {
                        themes.push(theme);
                    }
                }
                ClusterOutcome::Skipped { reason } => {
                    debug!(bank = group, reason = %reason, "No cluster themes added");
                }
            }
        }

        info!(
            bank = group,
            catalog = matched,
            cluster = themes.len() - matched,
            "Identified themes"
        );
        themes
    }

    /// Tag one review against a bank's themes.
    pub fn classify(&self, text: &str, themes: &ThemeSet) -> ThemeAssignment {
        classify_review(text, themes)
    }

    /// Full analysis of one bank: themes, per-review assignments, counts.
    pub fn analyze_group(&self, group: &str, reviews: &[&Review]) -> GroupAnalysis {
        let texts: Vec<String> = reviews.iter().map(|r| r.text.clone()).collect();
        let mut themes = self.identify_themes(&texts, group);

        let assignments: Vec<ThemeAssignment> = if themes.is_empty() {
            vec![ThemeAssignment::uncategorized(); texts.len()]
        } else {
            texts.iter().map(|t| self.classify(t, &themes)).collect()
        };
        recount(&mut themes, &assignments);

        GroupAnalysis {
            group: group.to_string(),
            themes,
            review_ids: reviews.iter().map(|r| r.review_id.clone()).collect(),
            assignments,
        }
    }

    /// Analyze every bank in the batch, banks in order of first appearance.
    pub fn analyze(&self, reviews: &[Review]) -> Analysis {
        let groups = group_by_bank(reviews)
            .into_iter()
            .map(|(bank, members)| self.analyze_group(&bank, &members))
            .collect();
        Analysis { groups }
    }
}

impl Default for ThematicAnalyzer {
    fn default() -> Self {
        Self::new(AnalyzerSettings::default())
    }
}
