// Review classification — tag a single review with the themes it mentions.
//
// A theme applies when any of its keywords appears (case-insensitively) as a
// substring of the review text. Themes are checked in ThemeSet order, so the
// first match is the review's primary theme.

use super::theme::{ThemeAssignment, ThemeSet};

/// Assign themes to one review. Reviews that match nothing get "Uncategorized".
pub fn classify_review(text: &str, themes: &ThemeSet) -> ThemeAssignment {
    if text.trim().is_empty() || themes.is_empty() {
        return ThemeAssignment::uncategorized();
    }

    let lowered = text.to_lowercase();
    let matched: Vec<String> = themes
        .iter()
        .filter(|theme| {
            theme
                .keyword_terms()
                .any(|kw| !kw.is_empty() && lowered.contains(&kw.to_lowercase()))
        })
        .map(|theme| theme.name.clone())
        .collect();

    ThemeAssignment::from_matches(matched)
}

/// Classify a batch of reviews against the same theme set, in input order.
pub fn classify_all<S: AsRef<str>>(texts: &[S], themes: &ThemeSet) -> Vec<ThemeAssignment> {
    texts
        .iter()
        .map(|t| classify_review(t.as_ref(), themes))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::themes::theme::{Theme, UNCATEGORIZED};

    fn themes() -> ThemeSet {
        vec![
            Theme::from_catalog("Access", vec![("login".into(), 0.4), ("otp".into(), 0.2)]),
            Theme::from_catalog("Stability", vec![("crash".into(), 0.5)]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_multiple_themes_in_set_order() {
        let a = classify_review("Crash right after LOGIN", &themes());
        assert_eq!(a.themes(), &["Access".to_string(), "Stability".to_string()]);
        assert_eq!(a.primary_theme(), "Access");
    }

    #[test]
    fn test_substring_inside_word() {
        let a = classify_review("the app crashed twice", &themes());
        assert_eq!(a.primary_theme(), "Stability");
    }

    #[test]
    fn test_no_match_is_uncategorized() {
        let a = classify_review("nice colors", &themes());
        assert_eq!(a.identified_themes(), UNCATEGORIZED);
    }

    #[test]
    fn test_empty_text_or_empty_set() {
        assert!(classify_review("", &themes()).is_uncategorized());
        assert!(classify_review("login broken", &ThemeSet::new()).is_uncategorized());
    }

    #[test]
    fn test_classify_all_keeps_order() {
        let out = classify_all(&["otp late", "meh"], &themes());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].primary_theme(), "Access");
        assert!(out[1].is_uncategorized());
    }
}
