//! Report generation for correlation analyses.

use crate::export::{ExportError, ExportFormat, Exporter, MatrixExport};
use crate::html::render_html;
use chrono::{DateTime, NaiveDate, Utc};
use correlheat_analysis::CorrelationAnalysis;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The builder was not given a matrix.
    #[error("Report has no correlation matrix")]
    MissingMatrix,
}

/// A correlation report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationReport {
    /// Report title.
    pub title: String,

    /// Report generation timestamp.
    pub generated_at: DateTime<Utc>,

    /// First requested date.
    pub period_start: Option<NaiveDate>,

    /// Last requested date.
    pub period_end: Option<NaiveDate>,

    /// Human-readable summary of overlap counts.
    pub status: Option<String>,

    /// Matrix contents.
    pub matrix: MatrixExport,
}

impl CorrelationReport {
    /// Create a new report stamped with the current time.
    pub fn new(title: String, matrix: MatrixExport) -> Self {
        Self {
            title,
            generated_at: Utc::now(),
            period_start: None,
            period_end: None,
            status: None,
            matrix,
        }
    }

    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// JSON formats serialise the whole report; CSV formats export the matrix;
/// HTML renders the heatmap under the report title.
impl Exporter for CorrelationReport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
            ExportFormat::Csv | ExportFormat::LongCsv => self.matrix.export_to_string(format),
            ExportFormat::Html => Ok(render_html(&self.matrix, &self.title)),
        }
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    title: Option<String>,
    period: Option<(NaiveDate, NaiveDate)>,
    status: Option<String>,
    matrix: Option<MatrixExport>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the requested date range.
    pub const fn period(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.period = Some((start, end));
        self
    }

    /// Set the status line.
    pub fn status(mut self, status: Option<String>) -> Self {
        self.status = status;
        self
    }

    /// Use an analysis result as the report contents.
    pub fn analysis(mut self, analysis: &CorrelationAnalysis) -> Self {
        self.matrix = Some(MatrixExport::from_analysis(analysis));
        self
    }

    /// Use an existing snapshot as the report contents.
    pub fn matrix(mut self, matrix: MatrixExport) -> Self {
        self.matrix = Some(matrix);
        self
    }

    /// Build the report.
    pub fn build(self) -> Result<CorrelationReport, ReportError> {
        let matrix = self.matrix.ok_or(ReportError::MissingMatrix)?;
        let mut report = CorrelationReport::new(
            self.title
                .unwrap_or_else(|| "Correlation heatmap".to_string()),
            matrix,
        );
        if let Some((start, end)) = self.period {
            report.period_start = Some(start);
            report.period_end = Some(end);
        }
        report.status = self.status;
        Ok(report)
    }
}
