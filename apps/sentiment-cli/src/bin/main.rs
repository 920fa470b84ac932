use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Local, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use sentiment_analysis::{aggregate, compare, AggregateOptions, DefaultScorer, Filters, MetricsSummary, SummaryStats};
use sentiment_core::config::{Config, Settings};
use sentiment_core::data_processor::{parse_lines, parse_timestamp, read_lossy, DataProcessor, SkippedItem};
use sentiment_core::types::{AnalysisBatch, Granularity, Label, SentimentRecord, TextInput};
use sentiment_export::{default_file_name, export_records, export_summary, import_records, ExportFormat};

/// Inputs scored between progress bar ticks.
const PROGRESS_CHUNK: usize = 256;

#[derive(Parser)]
#[command(name = "sentiment", version, about = "Lexicon-based sentiment analysis for short texts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score texts given on the command line
    Analyze {
        #[arg(required = true)]
        texts: Vec<String>,
        #[command(flatten)]
        meta: InputMeta,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Score every non-empty line of a text file
    Batch {
        file: PathBuf,
        #[command(flatten)]
        meta: InputMeta,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Score .csv and .txt files, descending into directories
    Files {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Source for rows without one (default: the file name)
        #[arg(long)]
        source: Option<String>,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Compare the metrics of two exported batches
    Compare { a: PathBuf, b: PathBuf },
}

#[derive(Args)]
struct InputMeta {
    #[arg(long)]
    source: Option<String>,
    /// Timestamp applied to every input (RFC 3339 or YYYY-MM-DD)
    #[arg(long, value_parser = parse_timestamp_arg)]
    date: Option<DateTime<Utc>>,
}

#[derive(Args)]
struct ViewArgs {
    /// Only these labels, comma separated
    #[arg(long, value_delimiter = ',')]
    labels: Vec<Label>,
    /// Only these sources, comma separated
    #[arg(long, value_delimiter = ',')]
    sources: Vec<String>,
    #[arg(long, value_parser = parse_timestamp_arg)]
    from: Option<DateTime<Utc>>,
    /// Inclusive; a bare date covers the whole day
    #[arg(long, value_parser = parse_range_end)]
    to: Option<DateTime<Utc>>,
    /// day, week or month
    #[arg(long)]
    granularity: Option<Granularity>,
    /// Write the filtered records to PATH (.csv or .json); a directory gets a timestamped file name
    #[arg(long)]
    export: Option<PathBuf>,
    /// Write the Metric,Value summary table to PATH
    #[arg(long)]
    summary_csv: Option<PathBuf>,
    /// Print the summary as JSON instead of a report
    #[arg(long)]
    json: bool,
}

fn parse_timestamp_arg(raw: &str) -> Result<DateTime<Utc>, String> { parse_timestamp(raw).map_err(|e| e.to_string()) }

fn parse_range_end(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(day) = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        if let Some(end) = day.and_hms_nano_opt(23, 59, 59, 999_999_999) {
            return Ok(end.and_utc());
        }
    }
    parse_timestamp_arg(raw)
}

impl ViewArgs {
    fn filters(&self) -> anyhow::Result<Filters> {
        let mut filters = Filters::none();
        if !self.labels.is_empty() { filters = filters.with_labels(self.labels.iter().copied()); }
        if !self.sources.is_empty() { filters = filters.with_sources(self.sources.iter().cloned()); }
        match (self.from, self.to) {
            (None, None) => {}
            (from, to) => {
                let start = from.unwrap_or(DateTime::<Utc>::MIN_UTC);
                let end = to.unwrap_or(DateTime::<Utc>::MAX_UTC);
                anyhow::ensure!(start <= end, "--from {} is after --to {}", start, end);
                filters = filters.with_date_range(start, end);
            }
        }
        Ok(filters)
    }

    fn options(&self, settings: &Settings) -> AggregateOptions {
        let mut options = AggregateOptions::from(&settings.aggregate);
        if let Some(g) = self.granularity { options.granularity = g; }
        options
    }
}

fn apply_meta(mut inputs: Vec<TextInput>, meta: &InputMeta) -> Vec<TextInput> {
    for input in &mut inputs {
        if let Some(source) = &meta.source { input.source = Some(source.clone()); }
        if let Some(date) = meta.date { input.timestamp = Some(date); }
    }
    inputs
}

/// One input per non-empty line; invalid UTF-8 is replaced rather than fatal.
fn batch_inputs(file: &Path, meta: &InputMeta) -> anyhow::Result<Vec<TextInput>> {
    let content = read_lossy(file).with_context(|| format!("reading {}", file.display()))?;
    let report = parse_lines(&content, meta.source.as_deref());
    if report.inputs.is_empty() { warn!(file = %file.display(), "no non-empty lines"); }
    Ok(apply_meta(report.inputs, meta))
}

fn score_with_progress(scorer: &DefaultScorer, inputs: &[TextInput]) -> Vec<SentimentRecord> {
    if inputs.len() <= PROGRESS_CHUNK { return scorer.score_all(inputs); }
    let pb = ProgressBar::new(inputs.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} texts ({percent}%)") {
        pb.set_style(style.progress_chars("#>-"));
    }
    let mut records = Vec::with_capacity(inputs.len());
    for chunk in inputs.chunks(PROGRESS_CHUNK) {
        records.extend(scorer.score_all(chunk));
        pb.inc(chunk.len() as u64);
    }
    pb.finish_and_clear();
    records
}

fn report_skipped(skipped: &[SkippedItem]) {
    if skipped.is_empty() { return; }
    println!("⚠️  {} item(s) skipped:", skipped.len());
    for item in skipped {
        match item.line {
            Some(line) => println!("   {}:{} {}", item.origin, line, item.reason),
            None => println!("   {} {}", item.origin, item.reason),
        }
    }
}

fn print_report(batch: &AnalysisBatch, stats: &SummaryStats) {
    let m = &stats.metrics;
    println!("📊 Sentiment summary\n===================");
    println!("Analyzed: {}   Shown: {}", batch.len(), m.total);
    for (label, count) in &stats.label_counts {
        let pct = if m.total == 0 { 0.0 } else { *count as f64 / m.total as f64 * 100.0 };
        println!("  {:<9} {:>5}  ({:.1}%)", label.as_str(), count, pct);
    }
    println!("Average confidence {:.3}  polarity {:.3}  subjectivity {:.3}", m.avg_confidence, m.avg_polarity, m.avg_subjectivity);

    if !stats.keywords.is_empty() {
        let top: Vec<String> = stats.keywords.iter().take(10).map(|k| format!("{} ({})", k.word, k.weight)).collect();
        println!("\n🔑 Top keywords: {}", top.join(", "));
    }
    if stats.sources.len() > 1 {
        println!("\n🗂  By source:");
        for (source, counts) in &stats.sources {
            let parts: Vec<String> = counts.iter().map(|(l, c)| format!("{}={}", l, c)).collect();
            println!("  {}: {}", source, parts.join(" "));
        }
    }
    if !stats.trend.is_empty() {
        println!("\n📈 Trend:");
        for bucket in &stats.trend {
            let parts: Vec<String> = bucket.counts.iter().map(|(l, c)| format!("{}={}", l, c)).collect();
            println!("  {}  {}", bucket.start, parts.join(" "));
        }
    }
    if batch.len() <= 20 {
        println!("\n📝 Records:");
        for (i, r) in batch.iter().enumerate() {
            println!("  {}. [{}] {:.2}  {}", i + 1, r.label, r.polarity, r.text);
            println!("     {}", r.explanation);
        }
    }
}

fn run(inputs: Vec<TextInput>, settings: &Settings, view: &ViewArgs) -> anyhow::Result<()> {
    let filters = view.filters()?;
    let scorer = DefaultScorer::from_settings(settings);
    let batch = AnalysisBatch::from(score_with_progress(&scorer, &inputs));
    let stats = aggregate(&batch, &filters, &view.options(settings));

    if view.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print_report(&batch, &stats);
    }

    if let Some(target) = &view.export {
        let path = if target.is_dir() { target.join(default_file_name(ExportFormat::Csv, Local::now().naive_local())) } else { target.clone() };
        let shown: Vec<SentimentRecord> = batch.iter().filter(|r| filters.matches(r)).cloned().collect();
        export_records(&shown, &path).with_context(|| format!("exporting to {}", path.display()))?;
        println!("💾 Exported {} records to {}", shown.len(), path.display());
    }
    if let Some(path) = &view.summary_csv {
        export_summary(&stats.metrics, path).with_context(|| format!("writing summary to {}", path.display()))?;
        println!("💾 Summary written to {}", path.display());
    }
    Ok(())
}

fn run_compare(a: &Path, b: &Path) -> anyhow::Result<()> {
    let left = import_records(a).with_context(|| format!("reading {}", a.display()))?;
    let right = import_records(b).with_context(|| format!("reading {}", b.display()))?;
    let deltas = compare(&MetricsSummary::from_records(&left), &MetricsSummary::from_records(&right));
    println!("⚖️  {} vs {}\n", a.display(), b.display());
    println!("  {:<22} {:>12} {:>12} {:>12}", "Metric", "A", "B", "B - A");
    for d in deltas {
        println!("  {:<22} {:>12.3} {:>12.3} {:>+12.3}", d.metric, d.a, d.b, d.delta);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;

    match cli.command {
        Commands::Analyze { texts, meta, view } => {
            let inputs = apply_meta(texts.into_iter().map(TextInput::new).collect(), &meta);
            run(inputs, &settings, &view)
        }
        Commands::Batch { file, meta, view } => {
            let inputs = batch_inputs(&file, &meta)?;
            run(inputs, &settings, &view)
        }
        Commands::Files { paths, source, view } => {
            let processor = match source {
                Some(s) => DataProcessor::new().with_default_source(s),
                None => DataProcessor::new(),
            };
            let report = processor.process_paths(&paths);
            report_skipped(&report.skipped);
            anyhow::ensure!(!report.inputs.is_empty(), "no texts found in the given paths");
            run(report.inputs, &settings, &view)
        }
        Commands::Compare { a, b } => run_compare(&a, &b),
    }
}
