//! Terminal rendering.

use correlheat_analysis::{CorrelationMatrix, Rgb, legend_stops};
use std::fmt::Write;

const RESET: &str = "\x1b[0m";

/// Options for [`render_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableStyle {
    /// Paint cells with 24-bit ANSI background colours.
    pub colour: bool,
    /// Decimal places for correlation values.
    pub precision: usize,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            colour: true,
            precision: 2,
        }
    }
}

/// Render the matrix as an aligned text table.
///
/// Undefined cells print as `n/a`.
pub fn render_table(matrix: &CorrelationMatrix, style: TableStyle) -> String {
    let mut output = String::new();
    let tickers = matrix.tickers();

    let label_width = tickers.iter().map(String::len).max().unwrap_or(0).max(6);
    // Room for "-1.00" at the chosen precision, or the ticker itself.
    let cell_width = tickers
        .iter()
        .map(String::len)
        .max()
        .unwrap_or(0)
        .max(style.precision + 3)
        .max(4);

    let _ = write!(output, "{:<label_width$}", "");
    for ticker in tickers {
        let _ = write!(output, " {ticker:>cell_width$}");
    }
    output.push('\n');
    output.push_str(&"-".repeat(label_width + tickers.len() * (cell_width + 1)));
    output.push('\n');

    for (i, ticker) in tickers.iter().enumerate() {
        let _ = write!(output, "{ticker:<label_width$}");
        for j in 0..tickers.len() {
            let text = matrix
                .value(i, j)
                .map_or_else(|| "n/a".to_string(), |v| format!("{v:.prec$}", prec = style.precision));
            output.push(' ');
            if style.colour {
                output.push_str(&paint(matrix.colour(i, j), &format!("{text:>cell_width$}")));
            } else {
                let _ = write!(output, "{text:>cell_width$}");
            }
        }
        output.push('\n');
    }

    output
}

/// Summary line describing how many overlapping returns were used.
///
/// `None` when the matrix has fewer than two tickers.
pub fn status_message(matrix: &CorrelationMatrix) -> Option<String> {
    let (lo, hi) = matrix.overlap_range()?;
    let span = if lo == hi {
        lo.to_string()
    } else {
        format!("{lo}–{hi}")
    };

    let mut message = format!("Computed correlations using {span} overlapping daily returns.");
    match matrix.undefined_pairs() {
        0 => {}
        1 => message.push_str(" 1 pair had insufficient data."),
        n => {
            let _ = write!(message, " {n} pairs had insufficient data.");
        }
    }
    Some(message)
}

/// Render the colour legend as a single line.
pub fn render_legend(colour: bool) -> String {
    let mut output = String::from("Legend:");

    for stop in legend_stops() {
        let label = format!(" {:+.1} ", stop.value);
        output.push(' ');
        if colour {
            output.push_str(&paint(stop.colour, &label));
        } else {
            let _ = write!(output, "{label}{}", stop.colour);
        }
    }

    output.push(' ');
    if colour {
        output.push_str(&paint(Rgb::MISSING, " n/a "));
    } else {
        let _ = write!(output, " n/a {}", Rgb::MISSING);
    }
    output
}

fn paint(background: Rgb, text: &str) -> String {
    let (fr, fg, fb) = if background.luminance() < 140.0 {
        (255, 255, 255)
    } else {
        (0, 0, 0)
    };
    format!(
        "\x1b[48;2;{};{};{}m\x1b[38;2;{fr};{fg};{fb}m{text}{RESET}",
        background.r, background.g, background.b
    )
}
