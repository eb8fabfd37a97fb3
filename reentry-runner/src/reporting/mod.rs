//! Output: console tables, CSV files, the JSON summary and the Markdown report.

pub mod console;
pub mod csv_export;
pub mod markdown;
pub mod summary;

pub use csv_export::write_csv;
pub use markdown::{render_report, ReportInputs};
pub use summary::{write_summary, AnalysisSummary, ANALYSIS_SUMMARY};
