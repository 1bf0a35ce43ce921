// Text tokenization shared by both keyword extractors.
//
// Two flavours of tokenization live here:
//
// - `word_ngrams` mirrors a classic bag-of-words vectorizer: lowercase, pull
//   out runs of 2+ word characters in any script, drop stop words, then emit
//   unigrams and adjacent-pair bigrams. Used by the TF-IDF vectorizer.
// - `linguistic_tokens` keeps punctuation boundaries so phrases never span a
//   comma, and tags each word with a guessed part of speech and lemma. Used by
//   the linguistic extractor.
//
// The part-of-speech guesser is rule-based and tuned for short English app
// reviews, not general text. Lemmas come from the Snowball English stemmer.

use std::collections::HashSet;

use rust_stemmers::{Algorithm, Stemmer};
use stop_words::{get, LANGUAGE};

/// English stop words, loaded once per extractor.
#[derive(Debug, Clone)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    /// The English list from the `stop-words` crate.
    pub fn english() -> Self {
        Self {
            words: get(LANGUAGE::English)
                .into_iter()
                .map(|w| w.to_lowercase())
                .collect(),
        }
    }

    /// Build a stop word set from an explicit list (mostly for tests).
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(|w| w.into().to_lowercase()).collect(),
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for StopWords {
    fn default() -> Self {
        Self::english()
    }
}

/// Lowercased word tokens with stop words removed, in text order.
pub fn word_tokens(text: &str, stop_words: &StopWords) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| w.chars().count() >= 2 && !stop_words.contains(w))
        .map(str::to_string)
        .collect()
}

/// Unigrams followed by bigrams (space-joined adjacent pairs).
pub fn word_ngrams(text: &str, stop_words: &StopWords) -> Vec<String> {
    let tokens = word_tokens(text, stop_words);
    let mut grams = Vec::with_capacity(tokens.len() * 2);
    grams.extend(tokens.iter().cloned());
    for pair in tokens.windows(2) {
        grams.push(format!("{} {}", pair[0], pair[1]));
    }
    grams
}

/// Coarse part-of-speech classes the linguistic extractor cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartOfSpeech {
    Noun,
    Adjective,
    Verb,
    Adverb,
}

impl PartOfSpeech {
    /// Nouns, adjectives and verbs carry topical signal.
    pub fn is_content(self) -> bool {
        !matches!(self, PartOfSpeech::Adverb)
    }

    /// Nouns and adjectives can sit inside a noun phrase.
    pub fn joins_phrase(self) -> bool {
        matches!(self, PartOfSpeech::Noun | PartOfSpeech::Adjective)
    }
}

/// One word that survived stop-word and length filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedToken {
    /// Lowercased surface form as it appeared in the text
    pub text: String,
    pub lemma: String,
    pub pos: PartOfSpeech,
}

/// Tokenize a review into punctuation-delimited segments of tagged words.
///
/// A `None` entry marks a break: a stop word, a short or non-alphabetic
/// token, or a punctuation boundary. Phrase chunking never crosses a break.
pub fn linguistic_tokens(text: &str, stop_words: &StopWords) -> Vec<Option<TaggedToken>> {
    let lower = text.to_lowercase();
    let stemmer = Stemmer::create(Algorithm::English);
    let mut out = Vec::new();

    for segment in lower.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c.is_whitespace())) {
        for raw in segment.split_whitespace() {
            let word = raw.trim_matches('\'');
            if word.chars().count() < 3
                || stop_words.contains(word)
                || !word.chars().all(|c| c.is_alphabetic() || c == '\'')
            {
                out.push(None);
                continue;
            }
            let pos = guess_pos(word);
            out.push(Some(TaggedToken {
                text: word.to_string(),
                lemma: lemmatize(word, pos, &stemmer),
                pos,
            }));
        }
        out.push(None);
    }

    out
}

/// Split tagged tokens into noun-phrase chunks of at most `max_words` words.
///
/// A chunk is a maximal run of nouns/adjectives. Runs longer than `max_words`
/// are dropped entirely rather than truncated, and single-word chunks are
/// only kept when the word is a noun.
pub fn noun_phrases(tokens: &[Option<TaggedToken>], max_words: usize) -> Vec<String> {
    let mut phrases = Vec::new();
    let mut run: Vec<&TaggedToken> = Vec::new();

    let mut flush = |run: &mut Vec<&TaggedToken>| {
        let keep = match run.len() {
            0 => false,
            1 => run[0].pos == PartOfSpeech::Noun,
            n => n <= max_words,
        };
        if keep {
            let words: Vec<&str> = run.iter().map(|t| t.text.as_str()).collect();
            phrases.push(words.join(" "));
        }
        run.clear();
    };

    for token in tokens {
        match token {
            Some(t) if t.pos.joins_phrase() => run.push(t),
            _ => flush(&mut run),
        }
    }
    flush(&mut run);

    phrases
}

// Words ending in -ly that aren't adverbs.
const LY_NON_ADVERBS: &[&str] = &[
    "apply", "assembly", "butterfly", "daily", "early", "family", "friendly", "holy", "italy",
    "monthly", "reply", "silly", "supply", "ugly", "unfriendly", "weekly", "yearly", "lonely",
    "lovely", "costly", "timely", "user-friendly",
];

const KNOWN_ADJECTIVES: &[&str] = &[
    "bad", "best", "big", "cheap", "clean", "good", "great", "nice", "poor", "easy", "simple",
    "slow", "fast", "quick", "smooth", "worst", "awesome", "terrible", "horrible", "excellent",
    "amazing", "ugly", "safe", "secure", "stable", "modern", "fine", "hard", "convenient",
    "friendly", "unfriendly", "lovely", "costly", "timely",
];

const KNOWN_VERBS: &[&str] = &[
    "love", "hate", "keep", "keeps", "need", "want", "use", "make", "fix", "pay", "send", "open",
    "try", "work", "works", "like", "crash", "crashes", "freeze", "freezes", "install",
];

const ADJECTIVE_SUFFIXES: &[&str] = &["ful", "less", "ous", "ive", "able", "ible", "ic", "ish"];

/// Guess a word's part of speech from its shape.
///
/// Anything not recognisably an adjective, verb or adverb defaults to noun,
/// which is the right bet for the bulk of review vocabulary.
pub fn guess_pos(word: &str) -> PartOfSpeech {
    if is_adjective(word) {
        PartOfSpeech::Adjective
    } else if is_verb(word) {
        PartOfSpeech::Verb
    } else if is_adverb(word) {
        PartOfSpeech::Adverb
    } else {
        PartOfSpeech::Noun
    }
}

fn is_adjective(word: &str) -> bool {
    let len = word.chars().count();
    KNOWN_ADJECTIVES.contains(&word)
        || ADJECTIVE_SUFFIXES
            .iter()
            .any(|suffix| len > suffix.len() + 2 && word.ends_with(suffix))
}

/// Known verbs plus present and past participles.
fn is_verb(word: &str) -> bool {
    let len = word.chars().count();
    KNOWN_VERBS.contains(&word)
        || (len > 5 && word.ends_with("ing"))
        || (len > 4 && word.ends_with("ed"))
}

fn is_adverb(word: &str) -> bool {
    word.ends_with("ly") && !LY_NON_ADVERBS.contains(&word)
}

const IRREGULAR_LEMMAS: &[(&str, &str)] = &[
    ("paid", "pay"),
    ("made", "make"),
    ("took", "take"),
    ("gave", "give"),
    ("sent", "send"),
    ("got", "get"),
    ("went", "go"),
    ("gone", "go"),
    ("using", "use"),
    ("used", "use"),
    ("froze", "freeze"),
    ("frozen", "freeze"),
    ("children", "child"),
    ("people", "person"),
];

/// Reduce a lowercased word to its dictionary form.
///
/// Nouns and verbs go through the Snowball English stemmer. Only inflectional
/// endings (plural -s/-es, -ed, -ing) are taken from the stem; when the
/// stemmer also cut a derivational suffix ("transaction" -> "transact") the
/// word keeps that suffix, so lemmas stay readable keywords.
pub fn lemmatize(word: &str, pos: PartOfSpeech, stemmer: &Stemmer) -> String {
    if let Some((_, lemma)) = IRREGULAR_LEMMAS.iter().find(|(form, _)| *form == word) {
        return lemma.to_string();
    }
    if !matches!(pos, PartOfSpeech::Noun | PartOfSpeech::Verb) {
        return word.to_string();
    }
    let stem = stemmer.stem(word);
    inflection_base(word, &stem).unwrap_or_else(|| strip_plural(word).to_string())
}

/// Map a Snowball stem back to a base form, if the word is the stem plus an
/// inflectional ending.
fn inflection_base(word: &str, stem: &str) -> Option<String> {
    // Snowball turns a final y into i: "replies" -> "repli".
    if let Some(root) = stem.strip_suffix('i') {
        if matches!(word.strip_prefix(root), Some("y" | "ies" | "ied")) {
            return Some(format!("{root}y"));
        }
    }

    let Some(rest) = word.strip_prefix(stem) else {
        // The stemmer kept a final e the inflection dropped: "making" -> "make".
        let root = stem.strip_suffix('e')?;
        return match word.strip_prefix(root) {
            Some("ed" | "ing") => Some(stem.to_string()),
            _ => None,
        };
    };

    match rest {
        "s" if word.ends_with("us") || word.ends_with("is") => Some(word.to_string()),
        "" | "s" => Some(stem.to_string()),
        "e" => Some(word.to_string()),
        "es" | "ed" | "ing" | "d" => Some(restore_final_e(stem)),
        _ => {
            // Doubled consonant before the ending: "stopped" -> "stop".
            let last = stem.chars().last()?;
            let ending = rest.strip_prefix(last)?;
            (stem.len() >= 3 && matches!(ending, "ed" | "ing")).then(|| stem.to_string())
        }
    }
}

fn is_vowel(c: u8) -> bool {
    matches!(c, b'a' | b'e' | b'i' | b'o' | b'u')
}

/// Put back the final e Snowball strips from stems like "updat" or "arriv".
fn restore_final_e(stem: &str) -> String {
    let bytes = stem.as_bytes();
    let n = bytes.len();
    if n < 2 {
        return stem.to_string();
    }
    let last = bytes[n - 1];
    let prev = bytes[n - 2];

    let ends_cvc = n >= 3 && !is_vowel(bytes[n - 3]) && is_vowel(prev) && !is_vowel(last);
    let needs_e = matches!(last, b'v' | b'u' | b'z')
        || (last == b'r' && matches!(prev, b'i' | b'u'))
        || (ends_cvc && matches!(last, b'c' | b'g' | b'k' | b's'))
        || (ends_cvc && last == b't' && prev == b'a')
        || (ends_cvc && last == b'd' && prev == b'i')
        || stem.ends_with("rg")
        || stem.ends_with("nc");
    if needs_e {
        format!("{stem}e")
    } else {
        stem.to_string()
    }
}

/// Drop a plural s the stemmer couldn't account for.
fn strip_plural(word: &str) -> &str {
    match word.strip_suffix('s') {
        Some(root) if !root.ends_with(['s', 'u', 'i']) => root,
        _ => word,
    }
}
