// Catalog matching — map extracted keywords onto the predefined themes.
//
// Matching is plain case-insensitive substring containment in either
// direction: the seed "crash" matches the keyword "app crash", and the keyword
// "ui" matches the seed "ui". That means short keywords can match inside
// unrelated longer words; downstream thresholds are tuned against this
// behavior, so it stays.

use super::catalog::CatalogEntry;
use super::keywords::KeywordSet;

/// Keyword matches for one catalog theme, highest score first.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeMatch {
    pub theme: &'static str,
    pub keywords: Vec<(String, f64)>,
}

/// Whether a seed and an extracted keyword overlap lexically.
pub fn lexical_match(seed: &str, keyword: &str) -> bool {
    let seed = seed.to_lowercase();
    let keyword = keyword.to_lowercase();
    keyword.contains(&seed) || seed.contains(&keyword)
}

/// Match extracted keywords against every catalog entry.
///
/// Matches are collected seed by seed, in extraction order, then stably
/// sorted by descending score and truncated to `max_per_theme`. Every
/// (seed, keyword) hit is recorded, so a keyword hit by two seeds of the
/// same theme appears twice. Themes with no matches are left out; the result
/// is in catalog order.
pub fn match_keywords_to_themes(
    catalog: &'static [CatalogEntry],
    keywords: &KeywordSet,
    max_per_theme: usize,
) -> Vec<ThemeMatch> {
    let mut matches = Vec::new();

    for entry in catalog {
        let mut found: Vec<(String, f64)> = Vec::new();

        for seed in entry.seeds {
            for (keyword, score) in keywords.iter() {
                if !keyword.trim().is_empty() && lexical_match(seed, keyword) {
                    found.push((keyword.to_string(), score));
                }
            }
        }

        if found.is_empty() {
            continue;
        }

        found.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        found.truncate(max_per_theme);

        matches.push(ThemeMatch {
            theme: entry.name,
            keywords: found,
        });
    }

    matches
}
