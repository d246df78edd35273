//! Output formatting for dashboards and response listings

pub mod chart;
pub mod formatter;
pub mod report;

pub use formatter::{resolve_save_path, save_report_to_file, suggest_filename, ReportGenerator};
pub use report::ResponseListing;
