// Themes — the structured result of analyzing one bank's reviews.
//
// A ThemeSet is an insertion-ordered list of themes: catalog themes first (in
// catalog order), cluster themes after (in slot order). That order is what
// decides a review's primary theme, so it's preserved everywhere, including
// JSON output.

use std::collections::HashSet;
use std::fmt;

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};

/// Label given to reviews that match no theme.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Separator used when joining a review's theme names.
pub const THEME_SEPARATOR: &str = "; ";

/// Where a theme came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeSource {
    /// A predefined catalog theme whose seeds matched extracted keywords
    Catalog,
    /// A synthetic theme built from a k-means cluster
    Cluster,
}

impl fmt::Display for ThemeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThemeSource::Catalog => f.write_str("catalog"),
            ThemeSource::Cluster => f.write_str("cluster"),
        }
    }
}

impl std::str::FromStr for ThemeSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "catalog" => Ok(ThemeSource::Catalog),
            "cluster" => Ok(ThemeSource::Cluster),
            other => anyhow::bail!("Unknown theme source '{other}'"),
        }
    }
}

/// A discovered theme for one bank.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: String,
    pub source: ThemeSource,
    /// Keywords and their scores, highest score first
    pub keywords: Vec<(String, f64)>,
    /// Number of the bank's reviews whose primary theme is this one
    pub review_count: usize,
    /// Short human-readable note on how the theme was found
    pub logic: String,
}

impl Theme {
    /// A catalog theme built from its matched keywords.
    pub fn from_catalog(name: &str, keywords: Vec<(String, f64)>) -> Self {
        let logic = format!(
            "Matched {} keywords related to {}",
            keywords.len(),
            name.to_lowercase()
        );
        Self {
            name: name.to_string(),
            source: ThemeSource::Catalog,
            keywords,
            review_count: 0,
            logic,
        }
    }

    /// A synthetic cluster theme. `slot` is 1-based among the cluster themes.
    pub fn from_cluster(slot: usize, keywords: Vec<(String, f64)>, cluster_size: usize) -> Self {
        let top: Vec<&str> = keywords.iter().take(3).map(|(k, _)| k.as_str()).collect();
        Self {
            name: format!("Cluster Theme {slot}"),
            source: ThemeSource::Cluster,
            logic: format!(
                "Identified via clustering with top keywords: {}",
                top.join(", ")
            ),
            keywords,
            review_count: cluster_size,
        }
    }

    /// Keyword strings in score order.
    pub fn keyword_terms(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(|(k, _)| k.as_str())
    }
}

/// Serializes as `{keywords, keyword_scores, review_count, logic}`.
impl Serialize for Theme {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let terms: Vec<&str> = self.keyword_terms().collect();
        let mut state = serializer.serialize_struct("Theme", 4)?;
        state.serialize_field("keywords", &terms)?;
        state.serialize_field("keyword_scores", &OrderedScores(&self.keywords))?;
        state.serialize_field("review_count", &self.review_count)?;
        state.serialize_field("logic", &self.logic)?;
        state.end()
    }
}

/// A keyword list serialized as a JSON object in list order. A keyword
/// listed more than once is written at its first position only.
struct OrderedScores<'a>(&'a [(String, f64)]);

impl Serialize for OrderedScores<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seen = HashSet::new();
        let mut map = serializer.serialize_map(None)?;
        for (k, v) in self.0 {
            if seen.insert(k.as_str()) {
                map.serialize_entry(k, v)?;
            }
        }
        map.end()
    }
}

/// Insertion-ordered collection of a bank's themes, unique by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThemeSet {
    themes: Vec<Theme>,
}

impl ThemeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a theme. A theme with an existing name replaces the old one in place.
    pub fn push(&mut self, theme: Theme) {
        match self.themes.iter_mut().find(|t| t.name == theme.name) {
            Some(existing) => *existing = theme,
            None => self.themes.push(theme),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Theme> {
        self.themes.iter().find(|t| t.name == name)
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Theme> {
        self.themes.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Theme> {
        self.themes.iter_mut()
    }

    pub fn names(&self) -> Vec<&str> {
        self.themes.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn count_from(&self, source: ThemeSource) -> usize {
        self.themes.iter().filter(|t| t.source == source).count()
    }
}

impl<'a> IntoIterator for &'a ThemeSet {
    type Item = &'a Theme;
    type IntoIter = std::slice::Iter<'a, Theme>;

    fn into_iter(self) -> Self::IntoIter {
        self.themes.iter()
    }
}

impl FromIterator<Theme> for ThemeSet {
    fn from_iter<I: IntoIterator<Item = Theme>>(iter: I) -> Self {
        let mut set = ThemeSet::new();
        for theme in iter {
            set.push(theme);
        }
        set
    }
}

/// Serializes as a JSON object keyed by theme name, in discovery order.
impl Serialize for ThemeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.themes.len()))?;
        for theme in &self.themes {
            map.serialize_entry(&theme.name, theme)?;
        }
        map.end()
    }
}

/// The themes assigned to one review. Never empty: a review matching nothing
/// carries the single label "Uncategorized".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeAssignment {
    themes: Vec<String>,
}

impl ThemeAssignment {
    /// Build from matched theme names, falling back to "Uncategorized".
    pub fn from_matches(themes: Vec<String>) -> Self {
        if themes.is_empty() {
            Self::uncategorized()
        } else {
            Self { themes }
        }
    }

    pub fn uncategorized() -> Self {
        Self {
            themes: vec![UNCATEGORIZED.to_string()],
        }
    }

    /// All matched theme names joined with "; ".
    pub fn identified_themes(&self) -> String {
        self.themes.join(THEME_SEPARATOR)
    }

    /// The first (highest-priority) theme.
    pub fn primary_theme(&self) -> &str {
        self.themes.first().map(String::as_str).unwrap_or(UNCATEGORIZED)
    }

    pub fn themes(&self) -> &[String] {
        &self.themes
    }

    pub fn is_uncategorized(&self) -> bool {
        self.primary_theme() == UNCATEGORIZED
    }
}
