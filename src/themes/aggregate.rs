// Aggregation — per-theme review counts and the per-group result structure.

use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::theme::{ThemeAssignment, ThemeSet, UNCATEGORIZED};

/// Set each theme's `review_count` to the number of assignments whose primary
/// theme is that theme. Themes nobody picked as primary end up at 0.
pub fn recount(themes: &mut ThemeSet, assignments: &[ThemeAssignment]) {
    let tally = primary_tally(assignments);
    for theme in themes.iter_mut() {
        theme.review_count = tally.get(theme.name.as_str()).copied().unwrap_or(0);
    }
}

/// How many assignments have each primary theme (including "Uncategorized").
pub fn primary_tally(assignments: &[ThemeAssignment]) -> HashMap<&str, usize> {
    let mut tally: HashMap<&str, usize> = HashMap::new();
    for a in assignments {
        *tally.entry(a.primary_theme()).or_insert(0) += 1;
    }
    tally
}

/// The analysis of one group (bank): its themes and one assignment per review,
/// aligned with the input order.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupAnalysis {
    pub group: String,
    pub themes: ThemeSet,
    pub review_ids: Vec<String>,
    pub assignments: Vec<ThemeAssignment>,
}

impl GroupAnalysis {
    pub fn review_count(&self) -> usize {
        self.assignments.len()
    }

    pub fn uncategorized_count(&self) -> usize {
        self.assignments.iter().filter(|a| a.is_uncategorized()).count()
    }

    /// Number of distinct primary theme labels, "Uncategorized" included.
    pub fn distinct_primary_themes(&self) -> usize {
        primary_tally(&self.assignments).len()
    }

    /// Assignment for a review id, if the review belongs to this group.
    pub fn assignment_for(&self, review_id: &str) -> Option<&ThemeAssignment> {
        self.review_ids
            .iter()
            .position(|id| id == review_id)
            .map(|i| &self.assignments[i])
    }

    /// Review ids paired with their assignments.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &ThemeAssignment)> {
        self.review_ids
            .iter()
            .map(String::as_str)
            .zip(self.assignments.iter())
    }
}

/// Every group analyzed in a run, in processing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analysis {
    pub groups: Vec<GroupAnalysis>,
}

impl Analysis {
    pub fn group(&self, name: &str) -> Option<&GroupAnalysis> {
        self.groups.iter().find(|g| g.group == name)
    }

    pub fn total_reviews(&self) -> usize {
        self.groups.iter().map(GroupAnalysis::review_count).sum()
    }

    pub fn total_uncategorized(&self) -> usize {
        self.groups.iter().map(GroupAnalysis::uncategorized_count).sum()
    }

    /// Look up a review's assignment across all groups.
    pub fn assignment_for(&self, review_id: &str) -> Option<&ThemeAssignment> {
        self.groups.iter().find_map(|g| g.assignment_for(review_id))
    }

    /// Counts per primary theme across all groups, in first-seen order.
    pub fn overall_primary_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for a in self.groups.iter().flat_map(|g| &g.assignments) {
            let name = a.primary_theme();
            match counts.iter_mut().find(|(n, _)| n == name) {
                Some((_, c)) => *c += 1,
                None => counts.push((name.to_string(), 1)),
            }
        }
        // Keep "Uncategorized" last so real themes read first.
        if let Some(pos) = counts.iter().position(|(n, _)| n == UNCATEGORIZED) {
            let entry = counts.remove(pos);
            counts.push(entry);
        }
        counts
    }
}

/// Serializes as `{group: {theme: {...}}}` in processing order.
impl Serialize for Analysis {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for g in &self.groups {
            map.serialize_entry(&g.group, &g.themes)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::themes::theme::Theme;

    fn assign(names: &[&str]) -> ThemeAssignment {
        ThemeAssignment::from_matches(names.iter().map(|n| n.to_string()).collect())
    }

    fn themes() -> ThemeSet {
        vec![
            Theme::from_catalog("A", vec![("a".into(), 0.1)]),
            Theme::from_catalog("B", vec![("b".into(), 0.1)]),
            Theme::from_cluster(1, vec![], 9),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_recount_uses_primary_only() {
        let mut set = themes();
        let assignments = vec![assign(&["A", "B"]), assign(&["B"]), assign(&["A"]), assign(&[])];
        recount(&mut set, &assignments);
        assert_eq!(set.get("A").unwrap().review_count, 2);
        assert_eq!(set.get("B").unwrap().review_count, 1);
        // Cluster size is overwritten by the primary tally.
        assert_eq!(set.get("Cluster Theme 1").unwrap().review_count, 0);
    }

    #[test]
    fn test_distinct_primary_includes_uncategorized() {
        let group = GroupAnalysis {
            group: "Bank".into(),
            themes: themes(),
            review_ids: vec!["1".into(), "2".into(), "3".into()],
            assignments: vec![assign(&["A"]), assign(&[]), assign(&["A", "B"])],
        };
        assert_eq!(group.distinct_primary_themes(), 2);
        assert_eq!(group.uncategorized_count(), 1);
        assert_eq!(group.assignment_for("2").unwrap().primary_theme(), UNCATEGORIZED);
        assert!(group.assignment_for("9").is_none());
    }

    #[test]
    fn test_overall_counts_put_uncategorized_last() {
        let analysis = Analysis {
            groups: vec![GroupAnalysis {
                group: "Bank".into(),
                themes: themes(),
                review_ids: vec!["1".into(), "2".into(), "3".into()],
                assignments: vec![assign(&[]), assign(&["B"]), assign(&["B"])],
            }],
        };
        assert_eq!(
            analysis.overall_primary_counts(),
            vec![("B".to_string(), 2), (UNCATEGORIZED.to_string(), 1)]
        );
    }

    #[test]
    fn test_json_keyed_by_group_in_order() {
        let analysis = Analysis {
            groups: vec![
                GroupAnalysis {
                    group: "Zed Bank".into(),
                    themes: ThemeSet::new(),
                    review_ids: vec![],
                    assignments: vec![],
                },
                GroupAnalysis {
                    group: "Abyssinia".into(),
                    themes: themes(),
                    review_ids: vec![],
                    assignments: vec![],
                },
            ],
        };
        let json = serde_json::to_string(&analysis).unwrap();
        assert!(json.starts_with(r#"{"Zed Bank":{},"Abyssinia":{"A":"#));
    }
}
