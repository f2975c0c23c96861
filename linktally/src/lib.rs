// Include the report module directly from report.rs
#[path = "report.rs"]
pub mod report;

// Re-export the report functions for convenience
pub use report::{generate_json_report, generate_report};
