// reviewlens: thematic analysis of mobile banking app reviews
//
// This is the library root. Each module corresponds to a stage of the
// analysis pipeline or one of the surfaces around it.

pub mod config;
pub mod db;
pub mod kpi;
pub mod output;
pub mod pipeline;
pub mod reviews;
pub mod status;
pub mod themes;
