// Linguistic keyword extraction.
//
// Counts lemmatized nouns, adjectives and verbs plus short noun phrases
// across the batch, then normalizes the counts so all scores sum to 1.0.
// Complements TF-IDF: it picks up phrases like "customer service" and
// single-document terms that TF-IDF's min_df prunes away.

use std::collections::HashMap;

use anyhow::Result;

use super::keywords::KeywordSet;
use super::tokenize::{linguistic_tokens, noun_phrases, StopWords};
use super::traits::KeywordExtractor;

/// Longest noun phrase (in words) that counts as a keyword.
const MAX_PHRASE_WORDS: usize = 3;

/// Phrases this short or shorter (in characters) are ignored.
const MIN_PHRASE_CHARS: usize = 3;

pub struct LinguisticExtractor {
    stop_words: StopWords,
}

impl LinguisticExtractor {
    pub fn new(stop_words: StopWords) -> Self {
        Self { stop_words }
    }
}

impl Default for LinguisticExtractor {
    fn default() -> Self {
        Self::new(StopWords::english())
    }
}

impl KeywordExtractor for LinguisticExtractor {
    fn name(&self) -> &'static str {
        "linguistic"
    }

    fn extract(&self, texts: &[String]) -> Result<KeywordSet> {
        // Counts in first-seen order so ties downstream stay deterministic.
        let mut order: Vec<String> = Vec::new();
        let mut counts: HashMap<String, u32> = HashMap::new();
        let mut bump = |term: String| {
            let count = counts.entry(term.clone()).or_insert(0);
            if *count == 0 {
                order.push(term);
            }
            *count += 1;
        };

        for text in texts {
            if text.trim().is_empty() {
                continue;
            }

            let tokens = linguistic_tokens(text, &self.stop_words);
            for token in tokens.iter().flatten() {
                if token.pos.is_content() {
                    bump(token.lemma.clone());
                }
            }

            for phrase in noun_phrases(&tokens, MAX_PHRASE_WORDS) {
                if phrase.chars().count() > MIN_PHRASE_CHARS {
                    bump(phrase);
                }
            }
        }

        let total: u32 = counts.values().sum();
        if total == 0 {
            return Ok(KeywordSet::new());
        }

        Ok(order
            .into_iter()
            .map(|term| {
                let score = counts[&term] as f64 / total as f64;
                (term, score)
            })
            .collect())
    }
}
