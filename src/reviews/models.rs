// Data model for one app review.

use serde::{Deserialize, Serialize};

/// One review, read-only during analysis.
///
/// `rating`, `date` and the sentiment fields belong to other stages of the
/// pipeline; they're carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub review_id: String,
    pub text: String,
    /// Bank (app) the review was left for; the grouping key
    pub bank: String,
    pub rating: Option<f64>,
    /// Review date as it appeared in the input (usually YYYY-MM-DD)
    pub date: Option<String>,
    /// "POSITIVE" / "NEGATIVE" / "NEUTRAL" from the sentiment stage
    pub sentiment_label: Option<String>,
    /// Sentiment model confidence, 0.0 to 1.0
    pub sentiment_score: Option<f64>,
}

impl Review {
    /// A review with only the fields the thematic analysis needs.
    pub fn new(review_id: impl Into<String>, text: impl Into<String>, bank: impl Into<String>) -> Self {
        Self {
            review_id: review_id.into(),
            text: text.into(),
            bank: bank.into(),
            rating: None,
            date: None,
            sentiment_label: None,
            sentiment_score: None,
        }
    }

    pub fn has_sentiment(&self) -> bool {
        self.sentiment_label
            .as_deref()
            .is_some_and(|l| !l.trim().is_empty())
    }
}
