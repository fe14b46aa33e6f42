//! Turning an analysis into the output format chosen on the command line.

use clap::ValueEnum;
use correlheat::AnalysisRequest;
use correlheat_analysis::CorrelationAnalysis;
use correlheat_output::{
    CorrelationReport, ExportFormat, Exporter, ReportBuilder, ReportError, TableStyle,
    render_legend, render_table, status_message,
};
use std::error::Error;
use std::path::Path;

/// Output formats accepted by `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Aligned terminal table with status line and legend
    Text,
    /// JSON report
    Json,
    /// Square CSV matrix
    Csv,
    /// One CSV row per ticker pair
    LongCsv,
    /// Standalone HTML heatmap
    Html,
}

impl OutputFormat {
    /// Matching export format; `None` for the terminal table.
    pub(crate) const fn export_format(self) -> Option<ExportFormat> {
        match self {
            Self::Text => None,
            Self::Json => Some(ExportFormat::PrettyJson),
            Self::Csv => Some(ExportFormat::Csv),
            Self::LongCsv => Some(ExportFormat::LongCsv),
            Self::Html => Some(ExportFormat::Html),
        }
    }
}

/// Collect `analysis` and the request metadata into a report.
pub(crate) fn build_report(
    analysis: &CorrelationAnalysis,
    request: &AnalysisRequest,
) -> Result<CorrelationReport, ReportError> {
    ReportBuilder::new()
        .title(format!("Correlation heatmap: {}", request.basket))
        .period(request.range.start(), request.range.end())
        .status(status_message(&analysis.matrix))
        .analysis(analysis)
        .build()
}

/// Render `analysis` for `request`. `colour` only affects text output.
pub(crate) fn render(
    analysis: &CorrelationAnalysis,
    request: &AnalysisRequest,
    format: OutputFormat,
    colour: bool,
) -> Result<String, Box<dyn Error>> {
    match format.export_format() {
        Some(export) => Ok(build_report(analysis, request)?.export_to_string(export)?),
        None => Ok(render_text(
            analysis,
            request,
            status_message(&analysis.matrix),
            colour,
        )),
    }
}

/// Write `analysis` to `path`. Text output is written without colours.
pub(crate) fn write(
    analysis: &CorrelationAnalysis,
    request: &AnalysisRequest,
    format: OutputFormat,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    match format.export_format() {
        Some(export) => build_report(analysis, request)?.export_to_file(path, export)?,
        None => std::fs::write(path, render(analysis, request, format, false)?)?,
    }
    Ok(())
}

fn render_text(
    analysis: &CorrelationAnalysis,
    request: &AnalysisRequest,
    status: Option<String>,
    colour: bool,
) -> String {
    let mut out = format!(
        "Daily {} returns, {} to {}\n\n",
        analysis.return_kind,
        request.range.start(),
        request.range.end()
    );
    out.push_str(&render_table(
        &analysis.matrix,
        TableStyle {
            colour,
            ..TableStyle::default()
        },
    ));
    out.push('\n');

    if let Some(status) = status {
        out.push_str(&status);
        out.push('\n');
    }
    if !analysis.dropped.is_empty() {
        out.push_str(&format!(
            "No usable price data: {}\n",
            analysis.dropped.join(", ")
        ));
    }
    out.push_str(&render_legend(colour));
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use correlheat::Basket;
    use correlheat_analysis::{AnalysisConfig, PriceHistory, PricePoint, ReturnKind, analyze};
    use correlheat_data::DateRange;
    use rstest::rstest;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, day).unwrap()
    }

    fn fixture() -> (CorrelationAnalysis, AnalysisRequest) {
        let points = |prices: &[f64]| -> Vec<PricePoint> {
            prices
                .iter()
                .enumerate()
                .map(|(i, &p)| PricePoint::new(date(i as u32 + 1), p))
                .collect()
        };
        let history = PriceHistory::new()
            .with_series("AAPL", points(&[220.0, 223.0, 221.0, 226.0]))
            .unwrap()
            .with_series("MSFT", points(&[450.0, 455.0, 452.0, 461.0]))
            .unwrap();
        let request = AnalysisRequest::new(
            Basket::parse("AAPL MSFT NVDA").unwrap(),
            DateRange::new(date(1), date(31)).unwrap(),
            AnalysisConfig::new(ReturnKind::Log),
        );
        let analysis = analyze(&history, request.basket.tickers(), &request.config).unwrap();
        (analysis, request)
    }

    #[test]
    fn test_text_output() {
        let (analysis, request) = fixture();
        let text = render(&analysis, &request, OutputFormat::Text, false).unwrap();

        assert!(text.starts_with("Daily log returns, 2024-07-01 to 2024-07-31"));
        assert!(text.contains("Computed correlations using 3 overlapping daily returns."));
        assert!(text.contains("No usable price data: NVDA"));
        assert!(text.contains("Legend:"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn test_json_output() {
        let (analysis, request) = fixture();
        let json = render(&analysis, &request, OutputFormat::Json, true).unwrap();

        assert!(json.contains("\"title\": \"Correlation heatmap: AAPL, MSFT, NVDA\""));
        assert!(json.contains("\"period_end\": \"2024-07-31\""));
    }

    #[test]
    fn test_write_to_file() {
        let (analysis, request) = fixture();
        let path = std::env::temp_dir().join(format!("correlheat-bin-{}.html", std::process::id()));

        write(&analysis, &request, OutputFormat::Html, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(written.contains("<title>Correlation heatmap: AAPL, MSFT, NVDA</title>"));
    }

    #[rstest]
    #[case(OutputFormat::Text, None)]
    #[case(OutputFormat::Json, Some(ExportFormat::PrettyJson))]
    #[case(OutputFormat::LongCsv, Some(ExportFormat::LongCsv))]
    fn test_export_format_mapping(
        #[case] format: OutputFormat,
        #[case] expected: Option<ExportFormat>,
    ) {
        assert_eq!(format.export_format(), expected);
    }

    #[rstest]
    #[case(OutputFormat::Csv, "ticker,AAPL,MSFT")]
    #[case(OutputFormat::LongCsv, "row,column,correlation,observations,colour")]
    #[case(OutputFormat::Html, "<!DOCTYPE html>")]
    fn test_file_formats(#[case] format: OutputFormat, #[case] first_line: &str) {
        let (analysis, request) = fixture();
        let out = render(&analysis, &request, format, true).unwrap();
        assert_eq!(out.lines().next(), Some(first_line));
    }
}
