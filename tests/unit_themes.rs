// Behavioral tests for the thematic analyzer.
//
// Exercises the whole keyword → theme → classification flow on small review
// batches and checks the properties every run must hold: full coverage,
// consistent counts, bounded keyword lists, deterministic clustering, and
// the Uncategorized fallback.

use reviewlens::reviews::Review;
use reviewlens::themes::aggregate::Analysis;
use reviewlens::themes::keywords::ExtractionMethod;
use reviewlens::themes::theme::{ThemeSource, UNCATEGORIZED};
use reviewlens::themes::tokenize::StopWords;
use reviewlens::themes::{AnalyzerSettings, ThematicAnalyzer};

fn stop_words() -> StopWords {
    StopWords::from_words([
        "the", "a", "an", "and", "is", "it", "my", "to", "of", "after", "never", "cannot", "for",
        "very", "this", "i", "me", "again", "too",
    ])
}

fn analyzer(settings: AnalyzerSettings) -> ThematicAnalyzer {
    ThematicAnalyzer::with_stop_words(settings, stop_words())
}

fn permissive() -> AnalyzerSettings {
    AnalyzerSettings {
        min_keyword_freq: 0,
        ..AnalyzerSettings::default()
    }
}

fn reviews(bank: &str, texts: &[&str]) -> Vec<Review> {
    texts
        .iter()
        .enumerate()
        .map(|(i, t)| Review::new(format!("{bank}-{}", i + 1), *t, bank))
        .collect()
}

fn mixed_batch() -> Vec<Review> {
    let mut all = reviews(
        "CBE",
        &[
            "app keeps crashing after update",
            "login otp never arrives, cannot access account",
            "great simple design, love the ui",
            "transfer pending for two days",
            "transfer failed and money deducted",
            "customer service never answers the phone",
            "hidden charges on every transfer",
            "cashback rewards program expired",
            "cashback rewards points missing",
            "",
        ],
    );
    all.extend(reviews(
        "Dashen",
        &[
            "slow app, slow transfer",
            "fingerprint login broken after update",
            "support replied quickly, helpful staff",
            "exchange rates outdated",
            "exchange rates wrong",
        ],
    ));
    all
}

// ============================================================
// Coverage and counts
// ============================================================

#[test]
fn every_review_gets_a_primary_theme() {
    let batch = mixed_batch();
    let analysis = analyzer(permissive()).analyze(&batch);
    assert_eq!(analysis.total_reviews(), batch.len());
    for group in &analysis.groups {
        assert_eq!(group.assignments.len(), group.review_ids.len());
        for a in &group.assignments {
            assert!(!a.primary_theme().is_empty());
            assert!(!a.themes().is_empty());
        }
    }
}

#[test]
fn review_counts_match_primary_tally() {
    let analysis = analyzer(permissive()).analyze(&mixed_batch());
    for group in &analysis.groups {
        for theme in &group.themes {
            let expected = group
                .assignments
                .iter()
                .filter(|a| a.primary_theme() == theme.name)
                .count();
            assert_eq!(theme.review_count, expected, "theme {}", theme.name);
        }
        let counted: usize = group.themes.iter().map(|t| t.review_count).sum();
        assert_eq!(counted + group.uncategorized_count(), group.review_count());
    }
}

#[test]
fn empty_review_text_is_uncategorized() {
    let analysis = analyzer(permissive()).analyze(&mixed_batch());
    let a = analysis.assignment_for("CBE-10").unwrap();
    assert_eq!(a.identified_themes(), UNCATEGORIZED);
}

// ============================================================
// Keyword truncation
// ============================================================

#[test]
fn matched_keywords_respect_the_cap() {
    let settings = AnalyzerSettings {
        max_keywords_per_theme: 2,
        ..permissive()
    };
    let analysis = analyzer(settings).analyze(&mixed_batch());
    let mut saw_catalog = false;
    for group in &analysis.groups {
        for theme in group.themes.iter().filter(|t| t.source == ThemeSource::Catalog) {
            saw_catalog = true;
            assert!(theme.keywords.len() <= 2, "{} has {:?}", theme.name, theme.keywords);
        }
    }
    assert!(saw_catalog);
}

#[test]
fn matched_keywords_sorted_by_score() {
    let analysis = analyzer(permissive()).analyze(&mixed_batch());
    for group in &analysis.groups {
        for theme in &group.themes {
            for pair in theme.keywords.windows(2) {
                assert!(pair[0].1 >= pair[1].1, "{}: {:?}", theme.name, theme.keywords);
            }
        }
    }
}

// ============================================================
// Determinism
// ============================================================

#[test]
fn repeated_runs_are_identical() {
    let batch = mixed_batch();
    let first: Analysis = analyzer(permissive()).analyze(&batch);
    let second: Analysis = analyzer(permissive()).analyze(&batch);
    assert_eq!(first, second);
}

// ============================================================
// Uncategorized fallback
// ============================================================

#[test]
fn unrelated_review_is_uncategorized() {
    let a = analyzer(permissive());
    let themes = a.identify_themes(
        &[
            "login otp never arrives".to_string(),
            "login otp failed".to_string(),
            "otp login locked".to_string(),
        ],
        "CBE",
    );
    assert!(themes.get("Account Access Problems").is_some());

    let assignment = a.classify("zebra", &themes);
    assert_eq!(assignment.identified_themes(), UNCATEGORIZED);
    assert_eq!(assignment.primary_theme(), UNCATEGORIZED);
}

#[test]
fn batch_sharing_nothing_with_the_catalog_is_all_uncategorized() {
    // Too few texts to cluster and no catalog vocabulary.
    let batch = reviews("CBE", &["zebra", "yak"]);
    let analysis = analyzer(permissive()).analyze(&batch);
    let group = &analysis.groups[0];
    assert!(group.themes.is_empty());
    assert_eq!(group.uncategorized_count(), 2);
}

// ============================================================
// End-to-end example
// ============================================================

#[test]
fn three_review_example() {
    let batch = reviews(
        "CBE",
        &[
            "app keeps crashing after update",
            "login otp never arrives, cannot access account",
            "great simple design, love the UI",
        ],
    );
    let analysis = analyzer(permissive()).analyze(&batch);
    let group = &analysis.groups[0];

    let r1 = group.assignment_for("CBE-1").unwrap();
    let r2 = group.assignment_for("CBE-2").unwrap();
    let r3 = group.assignment_for("CBE-3").unwrap();

    // "update" is also a Feature Requests seed, and that theme comes first in
    // the catalog, so it takes the primary slot for review 1.
    assert!(r1.themes().iter().any(|t| t == "App Performance & Stability"));
    assert_eq!(r2.primary_theme(), "Account Access Problems");
    assert_eq!(r3.primary_theme(), "User Interface & Experience");

    assert_eq!(group.uncategorized_count(), 0);
    assert_eq!(group.themes.get("Account Access Problems").unwrap().review_count, 1);
    assert_eq!(group.themes.get("User Interface & Experience").unwrap().review_count, 1);
    let total: usize = group.themes.iter().map(|t| t.review_count).sum();
    assert_eq!(total, 3);

    // No term is shared by two reviews, so clustering had nothing to work with.
    assert_eq!(group.themes.count_from(ThemeSource::Cluster), 0);
}

#[test]
fn default_floor_filters_tiny_batches() {
    let batch = reviews(
        "CBE",
        &[
            "app keeps crashing after update",
            "login otp never arrives, cannot access account",
            "great simple design, love the UI",
        ],
    );
    let analysis = analyzer(AnalyzerSettings::default()).analyze(&batch);
    assert_eq!(analysis.groups[0].themes.count_from(ThemeSource::Catalog), 0);
}

// ============================================================
// Empty input
// ============================================================

#[test]
fn empty_batch_produces_nothing() {
    let a = analyzer(AnalyzerSettings::default());
    assert!(a.identify_themes(&[], "CBE").is_empty());
    assert!(a.extract_keywords(&[], ExtractionMethod::Both).is_empty());
    let analysis = a.analyze(&[]);
    assert!(analysis.groups.is_empty());
    assert_eq!(analysis.total_reviews(), 0);
}

// ============================================================
// Cluster supplementing
// ============================================================

#[test]
fn cluster_themes_follow_catalog_themes() {
    let batch = reviews(
        "CBE",
        &[
            "login otp failed",
            "login otp locked",
            "exchange rates outdated",
            "exchange rates wrong",
            "branch queue long",
            "branch queue slow",
        ],
    );
    let analysis = analyzer(permissive()).analyze(&batch);
    let themes = &analysis.groups[0].themes;
    assert!(themes.count_from(ThemeSource::Cluster) >= 1);
    assert!(themes.len() <= 5);

    let sources: Vec<ThemeSource> = themes.iter().map(|t| t.source).collect();
    let first_cluster = sources.iter().position(|s| *s == ThemeSource::Cluster).unwrap();
    assert!(sources[first_cluster..].iter().all(|s| *s == ThemeSource::Cluster));
    assert_eq!(themes.iter().nth(first_cluster).unwrap().name, "Cluster Theme 1");
}
