#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/correlheat/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod html;
pub mod report;
pub mod table;

pub use export::{ExportError, ExportFormat, Exporter, MatrixExport, PairExport};
pub use html::render_html;
pub use report::{CorrelationReport, ReportBuilder, ReportError};
pub use table::{TableStyle, render_legend, render_table, status_message};
