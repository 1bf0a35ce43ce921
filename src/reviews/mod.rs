// Review input — the records the thematic analysis runs over.
//
// Reviews arrive as a CSV produced by the collection and sentiment stages.
// Only the text and the bank are required; everything else rides along so it
// can be written back out next to the theme labels.

pub mod loader;
pub mod models;

pub use loader::{group_by_bank, load_reviews, read_reviews, ReviewBatch};
pub use models::Review;
