//! CLI entry point for the quiz insights tool.
//!
//! Fetches the current-quiz, submission and historical-quiz datasets, cleans
//! them, prints descriptive reports and renders distribution charts.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use quiz_insights::config::{
    DEFAULT_CURRENT_QUIZ_URL, DEFAULT_HISTORICAL_QUIZ_URL, DEFAULT_SUBMISSIONS_URL, Endpoints,
};
use quiz_insights::fetch::{BasicClient, retrieve_all};
use quiz_insights::pipeline::{self, CORRECT_OPTION, SELECTED_OPTION, Tables};
use quiz_insights::plots::{
    self, DEFAULT_BINS, LogRenderer, SvgRenderer, plan_distribution_charts, plan_group_charts,
};
use quiz_insights::report::{self, RunSummary};
use quiz_insights::stats::performance_breakdowns;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "quiz_insights")]
#[command(about = "Clean and describe quiz performance datasets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Current quiz dataset (URL or file path)
    #[arg(long = "current", env = "QUIZ_CURRENT_URL", default_value = DEFAULT_CURRENT_QUIZ_URL)]
    current_quiz: String,

    /// Submission dataset (URL or file path)
    #[arg(long, env = "QUIZ_SUBMISSIONS_URL", default_value = DEFAULT_SUBMISSIONS_URL)]
    submissions: String,

    /// Historical quiz dataset (URL or file path)
    #[arg(long = "historical", env = "QUIZ_HISTORICAL_URL", default_value = DEFAULT_HISTORICAL_QUIZ_URL)]
    historical_quiz: String,
}

impl From<SourceArgs> for Endpoints {
    fn from(args: SourceArgs) -> Self {
        Endpoints {
            current_quiz: args.current_quiz,
            submissions: args.submissions,
            historical_quiz: args.historical_quiz,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, clean, report on and plot all three datasets
    Run {
        #[command(flatten)]
        sources: SourceArgs,

        /// Rows shown in each table preview
        #[arg(short = 'n', long, default_value_t = 5)]
        preview_rows: usize,

        /// Histogram bin count
        #[arg(short, long, default_value_t = DEFAULT_BINS)]
        bins: usize,

        /// Directory SVG charts are written to
        #[arg(short, long, default_value = "plots")]
        plots_dir: PathBuf,

        /// Log chart descriptions instead of drawing them
        #[arg(long, default_value_t = false)]
        no_plots: bool,

        /// Print a JSON run summary at the end
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Fetch and load the datasets, then print previews and missing counts
    Preview {
        #[command(flatten)]
        sources: SourceArgs,

        /// Rows shown in each table preview
        #[arg(short = 'n', long, default_value_t = 5)]
        preview_rows: usize,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/quiz_insights.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("quiz_insights.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            sources,
            preview_rows,
            bins,
            plots_dir,
            no_plots,
            json,
        } => {
            let plots_dir = (!no_plots).then_some(plots_dir);
            run(sources.into(), preview_rows, bins, plots_dir, json).await?;
        }
        Commands::Preview {
            sources,
            preview_rows,
        } => {
            let client = BasicClient::insecure()?;
            let raw = retrieve_all(&client, &sources.into()).await?;
            let tables = Tables::load(&raw)?;
            report::print_previews(&tables, preview_rows);
        }
    }

    Ok(())
}

/// Runs the whole pipeline: retrieve, load, clean, report, plot.
#[tracing::instrument(skip(endpoints))]
async fn run(
    endpoints: Endpoints,
    preview_rows: usize,
    bins: usize,
    plots_dir: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let client = BasicClient::insecure()?;
    let raw = retrieve_all(&client, &endpoints).await?;
    let loaded = Tables::load(&raw)?;
    info!(
        current_quiz_rows = loaded.current_quiz.row_count(),
        submission_rows = loaded.submissions.row_count(),
        historical_quiz_rows = loaded.historical_quiz.row_count(),
        "Datasets loaded"
    );
    report::print_previews(&loaded, preview_rows);

    let cleaned = pipeline::clean(loaded.clone());

    match report::render_correctness_preview(&cleaned.current_quiz, preview_rows) {
        Some(preview) => println!("{preview}"),
        None => println!(
            "Error: '{SELECTED_OPTION}' or '{CORRECT_OPTION}' column does not exist"
        ),
    }

    let mut charts = plan_distribution_charts(&cleaned.historical_quiz, bins);

    report::print_schemas(&cleaned);
    let breakdowns = performance_breakdowns(&cleaned.historical_quiz);
    for (title, aggregation) in &breakdowns {
        println!("{}", report::render_aggregation(title, aggregation));
    }
    charts.extend(plan_group_charts(&breakdowns));

    let rendered = match plots_dir {
        Some(dir) => plots::render_all(&mut SvgRenderer::new(dir)?, &charts),
        None => plots::render_all(&mut LogRenderer, &charts),
    };
    info!(planned = charts.len(), rendered = rendered.len(), "Charts rendered");

    let summary = RunSummary::new(&endpoints, &loaded, &cleaned).with_charts(rendered);
    if json {
        report::print_json(&summary)?;
    }

    Ok(())
}
