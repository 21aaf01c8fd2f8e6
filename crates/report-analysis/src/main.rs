//! CLI entry point for the statistical analysis engine.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use report_analysis::{
    AnalysisConfig, AnalysisConfigBuilder, AnalysisResult, Analyzer, ColumnSummary, Computable,
    Dataset, TrendOutcome,
};
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Statistical analysis of tabular datasets",
    long_about = "Profiles a CSV file and reports descriptive statistics, data quality,\n\
                  correlations, outliers and trends as JSON.\n\n\
                  EXAMPLES:\n  \
                  # Human-readable summary\n  \
                  report-analysis -i sales.csv\n\n  \
                  # Full result as JSON on stdout\n  \
                  report-analysis -i sales.csv --json | jq .key_findings\n\n  \
                  # Config file with a CLI override, result written to a file\n  \
                  report-analysis -i sales.csv --config analysis.json --trend-axis month -o result.json"
)]
struct Args {
    /// Path to the CSV file to analyze
    #[arg(short, long)]
    input: PathBuf,

    /// JSON configuration file; missing fields take their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Minimum |r| for a strong correlation (0.0 - 1.0)
    #[arg(long)]
    correlation_threshold: Option<f64>,

    /// Outlier detection method (supported: iqr)
    #[arg(long)]
    outlier_method: Option<String>,

    /// Disable trend fitting
    #[arg(long)]
    no_trend: bool,

    /// Column used as the trend axis (defaults to the first temporal column)
    #[arg(long)]
    trend_axis: Option<String>,

    /// Column to fit against the trend axis (repeatable)
    #[arg(long = "trend-column")]
    trend_columns: Vec<String>,

    /// Minimum number of rows required to run the analysis
    #[arg(long)]
    min_rows: Option<usize>,

    /// Write the JSON result to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of a human-readable summary
    ///
    /// Disables all logs so stdout only contains the result.
    #[arg(long)]
    json: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    if !args.input.exists() {
        return Err(anyhow!("Input file not found: {}", args.input.display()));
    }

    let config = build_config(&args)?;

    info!("Loading dataset from: {}", args.input.display());
    let df = load_csv(&args.input)?;
    info!("Dataset loaded successfully: {:?}", df.shape());

    let analyzer = Analyzer::builder().config(config).build()?;
    let result = analyzer.analyze(&Dataset::new(df)).map_err(|e| {
        error!("Analysis failed: {}", e);
        anyhow!("Analysis failed: {}", e)
    })?;

    let json = if args.pretty || args.output.is_none() {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };

    if let Some(path) = &args.output {
        std::fs::write(path, &json)
            .with_context(|| format!("Failed to write result to {}", path.display()))?;
        info!("Result written to: {}", path.display());
    }

    if args.json {
        println!("{}", json);
    } else {
        print_summary(&result, &args.input);
    }

    Ok(())
}

/// Load the configuration file (if any) and apply CLI overrides.
fn build_config(args: &Args) -> Result<AnalysisConfig> {
    let base = match &args.config {
        Some(path) => AnalysisConfig::from_json_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => AnalysisConfig::default(),
    };

    let mut builder = AnalysisConfigBuilder::from_config(base);
    if let Some(threshold) = args.correlation_threshold {
        builder = builder.correlation_threshold(threshold);
    }
    if let Some(method) = &args.outlier_method {
        builder = builder.outlier_method_name(method);
    }
    if args.no_trend {
        builder = builder.trend_analysis(false);
    }
    if let Some(axis) = &args.trend_axis {
        builder = builder.trend_axis(axis);
    }
    for column in &args.trend_columns {
        builder = builder.trend_column(column);
    }
    if let Some(rows) = args.min_rows {
        builder = builder.min_rows(rows);
    }

    Ok(builder.build()?)
}

fn load_csv(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
        .with_context(|| format!("Failed to parse CSV file {}", path.display()))?;
    Ok(df)
}

/// Print a human-readable summary of the result.
///
/// Uses `println!` on purpose: this is the primary output, independent of
/// the log level.
fn print_summary(result: &AnalysisResult, input: &Path) {
    let meta = &result.metadata;
    println!("\n{}", "=".repeat(80));
    println!("ANALYSIS SUMMARY: {}", input.display());
    println!("{}\n", "=".repeat(80));

    println!("COLUMNS");
    println!("{}", "-".repeat(40));
    println!(
        "{:<24} {:<12} {:<10} {}",
        "Column", "Type", "Missing %", "Summary"
    );
    println!("{}", "-".repeat(70));
    for column in &result.columns {
        println!(
            "{:<24} {:<12} {:<10.1} {}",
            truncate_str(&column.name, 23),
            column.semantic_type.as_str(),
            column.missing_percentage,
            summary_line(&column.summary)
        );
    }
    println!();

    println!("DATA QUALITY");
    println!("{}", "-".repeat(40));
    let quality = &result.quality.overall;
    println!("  Rows: {}  Columns: {}", meta.row_count, meta.column_count);
    println!(
        "  Completeness: {:.1}%  Uniqueness: {:.1}%  Score: {:.2}",
        quality.completeness * 100.0,
        quality.uniqueness * 100.0,
        quality.score
    );
    println!("  Duplicate rows: {}", quality.duplicate_rows);
    if let Some(caveat) = &quality.caveat {
        println!("  WARNING: {}", caveat);
    }
    println!();

    if let TrendOutcome::Skipped { reason } = &result.trends {
        println!("TRENDS");
        println!("{}", "-".repeat(40));
        println!("  Skipped: {}", reason);
        println!();
    }

    println!("KEY FINDINGS");
    println!("{}", "-".repeat(40));
    for finding in &result.key_findings {
        println!("  - {}", finding);
    }
    println!();

    if !result.recommendations.is_empty() {
        println!("RECOMMENDATIONS");
        println!("{}", "-".repeat(40));
        for recommendation in &result.recommendations {
            println!("  - {}", recommendation);
        }
        println!();
    }
}

fn summary_line(summary: &ColumnSummary) -> String {
    match summary {
        ColumnSummary::Numeric(Computable::Value(stats)) => format!(
            "mean {:.2}, median {:.2}, std {:.2}, range [{:.2}, {:.2}]",
            stats.mean, stats.median, stats.std_dev, stats.min, stats.max
        ),
        ColumnSummary::Categorical(cat) => {
            let top = cat
                .top_values
                .first()
                .map(|v| format!(", top '{}' ({})", v.value, v.count))
                .unwrap_or_default();
            format!("{} distinct{}", cat.distinct_count, top)
        }
        ColumnSummary::Temporal(Computable::Value(range)) => format!(
            "{} to {} ({:?})",
            range.start.date(),
            range.end.date(),
            range.granularity
        ),
        ColumnSummary::Numeric(Computable::NotComputable { code, .. })
        | ColumnSummary::Temporal(Computable::NotComputable { code, .. }) => {
            format!("not computable ({})", code)
        }
        ColumnSummary::Unknown => "no values".to_string(),
    }
}

fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
