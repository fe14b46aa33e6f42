//! Standalone HTML heatmap.

use crate::export::MatrixExport;
use correlheat_analysis::{Rgb, legend_stops};
use std::fmt::Write;

/// Render a self-contained HTML page with the matrix as a coloured table
/// and a legend underneath.
pub fn render_html(export: &MatrixExport, title: &str) -> String {
    let mut out = String::new();
    let title = escape(title);

    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("<meta charset=\"utf-8\">\n");
    let _ = writeln!(out, "<title>{title}</title>");
    out.push_str(concat!(
        "<style>\n",
        "body { font-family: sans-serif; margin: 2rem; }\n",
        "table { border-collapse: collapse; }\n",
        "th, td { padding: 0.4rem 0.7rem; text-align: center; }\n",
        "td { font-variant-numeric: tabular-nums; }\n",
        ".legend td { width: 4rem; }\n",
        "</style>\n",
    ));
    out.push_str("</head>\n<body>\n");
    let _ = writeln!(out, "<h1>{title}</h1>");
    let _ = writeln!(
        out,
        "<p>Daily {} returns across {} tickers.</p>",
        export.return_kind,
        export.tickers.len()
    );

    out.push_str("<table class=\"matrix\">\n<thead>\n<tr><th></th>");
    for ticker in &export.tickers {
        let _ = write!(out, "<th>{}</th>", escape(ticker));
    }
    out.push_str("</tr>\n</thead>\n<tbody>\n");

    for (i, ticker) in export.tickers.iter().enumerate() {
        let _ = write!(out, "<tr><th>{}</th>", escape(ticker));
        for j in 0..export.tickers.len() {
            let colour = &export.colours[i][j];
            let text = export.correlations[i][j].map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"));
            let _ = write!(
                out,
                "<td style=\"background-color: {colour}; color: {};\" title=\"{} observations\">{text}</td>",
                text_colour_for_hex(colour),
                export.observations[i][j],
            );
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n");

    out.push_str("<table class=\"legend\">\n<tr>");
    for stop in legend_stops() {
        let _ = write!(
            out,
            "<td style=\"background-color: {}; color: {};\">{:+.1}</td>",
            stop.colour.to_hex(),
            text_colour(stop.colour),
            stop.value
        );
    }
    let _ = write!(
        out,
        "<td style=\"background-color: {}; color: {};\">n/a</td>",
        Rgb::MISSING.to_hex(),
        text_colour(Rgb::MISSING)
    );
    out.push_str("</tr>\n</table>\n");

    if !export.dropped.is_empty() {
        let dropped: Vec<String> = export.dropped.iter().map(|t| escape(t)).collect();
        let _ = writeln!(out, "<p>No usable price data: {}</p>", dropped.join(", "));
    }

    out.push_str("</body>\n</html>\n");
    out
}

fn text_colour(colour: Rgb) -> &'static str {
    if colour.luminance() < 140.0 { "#ffffff" } else { "#000000" }
}

fn text_colour_for_hex(hex: &str) -> &'static str {
    parse_hex(hex).map_or("#000000", text_colour)
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(digits.get(range)?, 16).ok();
    Some(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
