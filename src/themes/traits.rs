// Keyword extractor trait — swap-ready abstraction.
//
// Both the statistical (TF-IDF) and linguistic extractors sit behind this
// trait so the analyzer can run either, or both, without caring how keywords
// are scored.

use anyhow::Result;

use super::keywords::KeywordSet;

/// Trait for deriving salient keywords from a batch of review texts.
pub trait KeywordExtractor {
    /// Short strategy name used in logs.
    fn name(&self) -> &'static str;

    /// Analyze a batch of texts and score the keywords they share.
    ///
    /// Degenerate input (nothing to vectorize) is an error; callers decide
    /// whether that's fatal.
    fn extract(&self, texts: &[String]) -> Result<KeywordSet>;
}
