//! Dashboard reporting — chart series, the assembled dashboard view, and CSV exports.

pub mod charts;
pub mod dashboard;
pub mod export;

pub use dashboard::DashboardView;
pub use export::{channels_csv, customers_csv, write_exports, ExportPaths};
