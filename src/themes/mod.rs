// Thematic analysis — turns a bank's reviews into named themes and tags
// every review with the themes it mentions.
//
// Keywords are extracted (TF-IDF and/or linguistic), matched against a fixed
// catalog of banking themes, topped up with k-means cluster themes when the
// catalog comes up short, and finally used to classify individual reviews.

pub mod aggregate;
pub mod analyzer;
pub mod catalog;
pub mod classifier;
pub mod cluster;
pub mod keywords;
pub mod kmeans;
pub mod linguistic;
pub mod matcher;
pub mod tfidf;
pub mod theme;
pub mod tokenize;
pub mod traits;

pub use analyzer::{AnalyzerSettings, ThematicAnalyzer};
pub use theme::{Theme, ThemeAssignment, ThemeSet, UNCATEGORIZED};
