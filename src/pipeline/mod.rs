// Batch pipelines driven by the CLI.

pub mod analyze;
