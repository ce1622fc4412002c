//! Activity report pipeline: aggregation, chart rendering, document layout
//! and export orchestration.
//!
//! The pipeline is request-scoped and stateless between calls: an export
//! builds its whole derived graph from the store, renders it, and discards
//! everything once the PDF bytes are handed back.

pub mod aggregate;
pub mod charts;
pub mod compose;
pub mod document;
pub mod export;

pub use aggregate::{ContributionCounts, ContributionSummary, TimelineBuckets};
pub use charts::{Chart, ChartError};
pub use compose::{compose, LayoutError};
pub use document::ReportDocument;
pub use export::{export_all, export_self, export_user, ExportOutput};
