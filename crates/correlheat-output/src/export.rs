//! Export functionality for correlation results.
//!
//! A [`MatrixExport`] is a plain, serialisable snapshot of a
//! [`CorrelationAnalysis`]: missing correlations become `null` in JSON and
//! empty fields in CSV.

use correlheat_analysis::{CorrelationAnalysis, CorrelationMatrix, ReturnKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Writer produced invalid UTF-8.
    #[error("Invalid UTF-8 in output: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Square matrix as comma-separated values.
    Csv,

    /// One row per ticker pair as comma-separated values.
    LongCsv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,

    /// Standalone HTML heatmap.
    Html,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv | Self::LongCsv => "csv",
            Self::Json | Self::PrettyJson => "json",
            Self::Html => "html",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "long-csv" | "long_csv" | "pairs" => Ok(Self::LongCsv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" => Ok(Self::PrettyJson),
            "html" => Ok(Self::Html),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Serialisable snapshot of a correlation analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatrixExport {
    /// Tickers labelling rows and columns.
    pub tickers: Vec<String>,

    /// Return definition used.
    pub return_kind: ReturnKind,

    /// Correlation values; `None` where undefined.
    pub correlations: Vec<Vec<Option<f64>>>,

    /// Overlapping observations per pair.
    pub observations: Vec<Vec<usize>>,

    /// Hex display colour per cell.
    pub colours: Vec<Vec<String>>,

    /// Requested tickers with no usable price data.
    pub dropped: Vec<String>,
}

impl MatrixExport {
    /// Snapshot an analysis result.
    pub fn from_analysis(analysis: &CorrelationAnalysis) -> Self {
        Self::from_matrix(&analysis.matrix, analysis.return_kind, analysis.dropped.clone())
    }

    /// Snapshot a bare matrix.
    pub fn from_matrix(
        matrix: &CorrelationMatrix,
        return_kind: ReturnKind,
        dropped: Vec<String>,
    ) -> Self {
        let n = matrix.len();

        Self {
            tickers: matrix.tickers().to_vec(),
            return_kind,
            correlations: (0..n)
                .map(|i| (0..n).map(|j| matrix.value(i, j)).collect())
                .collect(),
            observations: (0..n)
                .map(|i| (0..n).map(|j| matrix.observations(i, j)).collect())
                .collect(),
            colours: (0..n)
                .map(|i| (0..n).map(|j| matrix.colour(i, j).to_hex()).collect())
                .collect(),
            dropped,
        }
    }

    /// Flatten into one record per unordered pair, diagonal included.
    pub fn pairs(&self) -> Vec<PairExport> {
        let n = self.tickers.len();
        let mut pairs = Vec::with_capacity(n * (n + 1) / 2);

        for i in 0..n {
            for j in i..n {
                pairs.push(PairExport {
                    row: self.tickers[i].clone(),
                    column: self.tickers[j].clone(),
                    correlation: self.correlations[i][j],
                    observations: self.observations[i][j],
                    colour: self.colours[i][j].clone(),
                });
            }
        }

        pairs
    }

    /// Square matrix CSV: a `ticker` header followed by one column per
    /// ticker. Undefined cells are left empty.
    fn to_wide_csv(&self) -> Result<String, ExportError> {
        let mut wtr = csv::Writer::from_writer(vec![]);

        let mut header = Vec::with_capacity(self.tickers.len() + 1);
        header.push("ticker".to_string());
        header.extend(self.tickers.iter().cloned());
        wtr.write_record(&header)?;

        for (ticker, row) in self.tickers.iter().zip(&self.correlations) {
            let mut record = Vec::with_capacity(row.len() + 1);
            record.push(ticker.clone());
            record.extend(row.iter().map(|v| v.map(|v| v.to_string()).unwrap_or_default()));
            wtr.write_record(&record)?;
        }

        let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
        Ok(String::from_utf8(bytes)?)
    }
}

/// One ticker pair in the long CSV layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PairExport {
    /// Row ticker.
    pub row: String,

    /// Column ticker.
    pub column: String,

    /// Correlation, empty when undefined.
    pub correlation: Option<f64>,

    /// Overlapping observations.
    pub observations: usize,

    /// Hex display colour.
    pub colour: String,
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the format is not
    /// supported for this data.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

impl Exporter for MatrixExport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => self.to_wide_csv(),
            ExportFormat::LongCsv => self.pairs().export_to_string(ExportFormat::Csv),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
            ExportFormat::Html => Ok(crate::html::render_html(self, "Correlation heatmap")),
        }
    }
}

impl Exporter for Vec<PairExport> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv | ExportFormat::LongCsv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                for record in self {
                    wtr.serialize(record)?;
                }
                let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
                Ok(String::from_utf8(bytes)?)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
            ExportFormat::Html => Err(ExportError::InvalidFormat(
                "pair lists cannot be rendered as HTML".to_string(),
            )),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Csv => "csv",
            Self::LongCsv => "long-csv",
            Self::Json => "json",
            Self::PrettyJson => "pretty-json",
            Self::Html => "html",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use correlheat_analysis::{AnalysisConfig, PriceHistory, PricePoint, analyze};
    use rstest::rstest;

    fn series(start_day: u32, prices: &[f64]) -> Vec<PricePoint> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                PricePoint::new(
                    NaiveDate::from_ymd_opt(2024, 1, start_day + i as u32).unwrap(),
                    p,
                )
            })
            .collect()
    }

    fn sample() -> MatrixExport {
        let history = PriceHistory::new()
            .with_series("AAA", series(1, &[100.0, 102.0, 101.0, 104.0]))
            .unwrap()
            .with_series("BBB", series(1, &[50.0, 51.5, 50.2, 52.0]))
            .unwrap()
            .with_series("LATE", series(4, &[10.0, 11.0]))
            .unwrap();
        let analysis = analyze(&history, &["AAA", "BBB", "LATE"], &AnalysisConfig::default()).unwrap();
        MatrixExport::from_analysis(&analysis)
    }

    #[test]
    fn test_snapshot_shape() {
        let export = sample();
        assert_eq!(export.tickers, vec!["AAA", "BBB", "LATE"]);
        assert_eq!(export.correlations.len(), 3);
        assert_eq!(export.correlations[0][0], Some(1.0));
        assert_eq!(export.correlations[0][2], None);
        assert_eq!(export.observations[0][2], 0);
        assert_eq!(export.colours[0][0], "#b2182b");
        assert_eq!(export.colours[0][2], "#a0a0a0");
    }

    #[test]
    fn test_wide_csv() {
        let csv = sample().export_to_string(ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "ticker,AAA,BBB,LATE");
        assert!(lines[1].starts_with("AAA,1,"));
        assert!(lines[1].ends_with(','), "missing cell should be empty: {}", lines[1]);
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_long_csv() {
        let csv = sample().export_to_string(ExportFormat::LongCsv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "row,column,correlation,observations,colour");
        // 3 diagonal + 3 off-diagonal pairs
        assert_eq!(lines.len(), 7);
        assert!(lines.contains(&"AAA,LATE,,0,#a0a0a0"));
    }

    #[test]
    fn test_json_uses_null_for_missing() {
        let json = sample().export_to_string(ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["return_kind"], "log");
        assert!(value["correlations"][0][2].is_null());
        assert_eq!(value["correlations"][1][1], 1.0);
    }

    #[test]
    fn test_pretty_json() {
        let json = sample().export_to_string(ExportFormat::PrettyJson).unwrap();
        assert!(json.contains("\"tickers\""));
        assert!(json.contains("  ")); // Indentation indicates pretty format
    }

    #[rstest]
    #[case("csv", ExportFormat::Csv)]
    #[case(" CSV ", ExportFormat::Csv)]
    #[case("long-csv", ExportFormat::LongCsv)]
    #[case("pairs", ExportFormat::LongCsv)]
    #[case("json", ExportFormat::Json)]
    #[case("pretty_json", ExportFormat::PrettyJson)]
    #[case("html", ExportFormat::Html)]
    fn test_format_parsing(#[case] input: &str, #[case] expected: ExportFormat) {
        let format: ExportFormat = input.parse().unwrap();
        assert_eq!(format, expected);
        assert_eq!(format.to_string().parse::<ExportFormat>().unwrap(), expected);
    }

    #[rstest]
    #[case("xlsx")]
    #[case("")]
    fn test_format_parsing_rejects_unknown(#[case] input: &str) {
        assert!(matches!(
            input.parse::<ExportFormat>(),
            Err(ExportError::InvalidFormat(_))
        ));
    }

    #[rstest]
    #[case(ExportFormat::Csv, "csv")]
    #[case(ExportFormat::LongCsv, "csv")]
    #[case(ExportFormat::PrettyJson, "json")]
    #[case(ExportFormat::Html, "html")]
    fn test_format_extension(#[case] format: ExportFormat, #[case] extension: &str) {
        assert_eq!(format.extension(), extension);
    }

    #[test]
    fn test_pairs_reject_html() {
        assert!(sample().pairs().export_to_string(ExportFormat::Html).is_err());
    }
}
