//! Correlheat CLI binary.
//!
//! Fetches daily closes for a basket of tickers and prints their
//! correlation matrix as a coloured table, JSON, CSV or HTML.

mod render;

use chrono::Local;
use clap::{Parser, Subcommand};
use correlheat::{AnalysisRequest, Basket, parse_date, run_request};
use correlheat_analysis::ReturnKind;
use correlheat_data::{FetchConfig, YahooQuoteProvider};
use correlheat_output::render_legend;
use indicatif::{ProgressBar, ProgressStyle};
use render::{OutputFormat, render, write};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;
use std::time::Duration as StdDuration;
use tracing::info;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

#[derive(Parser)]
#[command(name = "correlheat")]
#[command(about = "Correlation heatmaps for baskets of equities", long_about = None)]
#[command(version)]
struct Cli {
    /// Log progress details to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Correlate daily returns for a basket of tickers
    Analyze {
        /// Ticker symbols, separated by spaces or commas (default: AAPL MSFT GOOGL NVDA)
        tickers: Vec<String>,

        /// First date, YYYY-MM-DD (default: one year before the end date)
        #[arg(long)]
        start: Option<String>,

        /// Last date, YYYY-MM-DD (default: today)
        #[arg(long)]
        end: Option<String>,

        /// Return definition: log, pct or percentage
        #[arg(long = "return-type", default_value = "log")]
        return_type: ReturnKind,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Disable ANSI colours in text output
        #[arg(long = "no-colour", alias = "no-color")]
        no_colour: bool,
    },

    /// Print the colour legend
    Legend {
        /// Disable ANSI colours
        #[arg(long = "no-colour", alias = "no-color")]
        no_colour: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Analyze {
            tickers,
            start,
            end,
            return_type,
            format,
            output,
            no_colour,
        } => {
            let basket = if tickers.is_empty() {
                Basket::default()
            } else {
                Basket::parse(&tickers.join(" "))?
            };
            let start = start.as_deref().map(|s| parse_date(s, "start")).transpose()?;
            let end = end.as_deref().map(|s| parse_date(s, "end")).transpose()?;

            let config = FetchConfig::default();
            let request = AnalysisRequest::resolve(
                basket,
                start,
                end,
                Local::now().date_naive(),
                return_type,
                &config,
            )?;

            let colour = !no_colour && output.is_none() && std::io::stdout().is_terminal();
            analyze_basket(&request, &config, format, output, colour).await?;
        }
        Commands::Legend { no_colour } => {
            let colour = !no_colour && std::io::stdout().is_terminal();
            println!("{}", render_legend(colour));
        }
    }

    Ok(())
}

async fn analyze_basket(
    request: &AnalysisRequest,
    config: &FetchConfig,
    format: OutputFormat,
    output: Option<PathBuf>,
    colour: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let provider = YahooQuoteProvider::with_config(config)?;

    let pb = ProgressBar::new(request.basket.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(StdDuration::from_millis(100));
    pb.set_message("Fetching daily closes...");

    let analysis = match run_request(&provider, request, |symbol| {
        pb.set_message(format!("Fetched {symbol}"));
        pb.inc(1);
    })
    .await
    {
        Ok(analysis) => {
            pb.finish_and_clear();
            analysis
        }
        Err(e) => {
            pb.finish_with_message("Failed!");
            return Err(e.into());
        }
    };

    match output {
        Some(path) => {
            write(&analysis, request, format, &path)?;
            info!(path = %path.display(), "wrote output");
            eprintln!("Wrote {}", path.display());
        }
        None => print!("{}", render(&analysis, request, format, colour)?),
    }

    Ok(())
}

// Logs go to stderr so stdout carries only the rendered result.
fn init_logging(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init()
}
