use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use afdb_eval::batch::{record_id_for, BatchDriver, FailurePolicy, ReportFormat};
use afdb_eval::config::AppConfig;
use afdb_eval::evaluation::LabelConvention;
use afdb_eval::records::WfdbStore;
use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::level_filters::LevelFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    match cli.execute() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("afdb_eval error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        LevelFilter::ERROR
    } else {
        match verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(
    name = "afdb_eval",
    about = "Window-level sensitivity/specificity of model output against AFDB annotations"
)]
struct Cli {
    /// JSON configuration file (defaults to ./afdb_eval.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn execute(self) -> Result<ExitCode> {
        let base = match &self.config {
            Some(path) => AppConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => AppConfig::load(),
        };

        match self.command {
            Command::Batch(args) => batch_command(base, args),
            Command::Single(args) => single_command(base, args),
            Command::List(args) => list_command(base, args),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate every result file in the predictions directory.
    Batch(BatchArgs),
    /// Evaluate one record against one prediction file.
    Single(SingleArgs),
    /// List the result files a batch would evaluate.
    List(ListArgs),
}

#[derive(Args, Debug, Clone)]
struct BatchArgs {
    #[command(flatten)]
    paths: PathArgs,
    #[command(flatten)]
    eval: EvalArgs,
    /// Keep evaluating after a file fails; exit 2 if any failed.
    #[arg(long, default_value_t = false)]
    keep_going: bool,
}

#[derive(Args, Debug, Clone)]
struct SingleArgs {
    /// Prediction result file to evaluate
    #[arg(long)]
    predictions: PathBuf,
    /// Record identifier (defaults to the file name prefix)
    #[arg(long)]
    record: Option<String>,
    /// Directory holding record headers and annotations
    #[arg(long)]
    ground_truth_root: Option<PathBuf>,
    /// Annotation file extension
    #[arg(long)]
    annotator: Option<String>,
    #[command(flatten)]
    eval: EvalArgs,
}

#[derive(Args, Debug, Clone)]
struct ListArgs {
    #[command(flatten)]
    paths: PathArgs,
}

#[derive(Args, Debug, Clone)]
struct PathArgs {
    /// Directory holding record headers and annotations
    #[arg(long)]
    ground_truth_root: Option<PathBuf>,
    /// Directory scanned for prediction result files
    #[arg(long)]
    predictions_dir: Option<PathBuf>,
    /// Substring selecting result files
    #[arg(long)]
    marker: Option<String>,
    /// Annotation file extension
    #[arg(long)]
    annotator: Option<String>,
    /// Leading file-name characters forming the record id
    #[arg(long)]
    record_id_len: Option<usize>,
}

#[derive(Args, Debug, Clone)]
struct EvalArgs {
    /// Raw samples scanned per window
    #[arg(long)]
    window_cap: Option<usize>,
    /// Assignment of mismatched windows to FP/FN
    #[arg(long, value_enum)]
    convention: Option<ConventionArg>,
    /// Subtracted from every prediction label
    #[arg(long, allow_negative_numbers = true)]
    label_offset: Option<i64>,
    /// Output format for per-record results
    #[arg(long, value_enum)]
    format: Option<FormatArg>,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum ConventionArg {
    Reference,
    Standard,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum FormatArg {
    Table,
    Json,
}

impl PathArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(root) = &self.ground_truth_root {
            config.paths.ground_truth_root = root.clone();
        }
        if let Some(dir) = &self.predictions_dir {
            config.paths.predictions_dir = dir.clone();
        }
        if let Some(marker) = &self.marker {
            config.paths.filename_marker = marker.clone();
        }
        if let Some(annotator) = &self.annotator {
            config.paths.annotator = annotator.clone();
        }
        if let Some(len) = self.record_id_len {
            config.paths.record_id_len = len;
        }
    }
}

impl EvalArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(cap) = self.window_cap {
            config.evaluation.window_cap = cap;
        }
        if let Some(convention) = self.convention {
            config.evaluation.convention = match convention {
                ConventionArg::Reference => LabelConvention::Reference,
                ConventionArg::Standard => LabelConvention::Standard,
            };
        }
        if let Some(offset) = self.label_offset {
            config.evaluation.label_offset = offset;
        }
        if let Some(format) = self.format {
            config.batch.format = match format {
                FormatArg::Table => ReportFormat::Table,
                FormatArg::Json => ReportFormat::Json,
            };
        }
    }
}

fn store_for(config: &AppConfig) -> WfdbStore {
    WfdbStore::new(&config.paths.ground_truth_root).with_annotator(&config.paths.annotator)
}

fn batch_command(mut config: AppConfig, args: BatchArgs) -> Result<ExitCode> {
    args.paths.apply(&mut config);
    args.eval.apply(&mut config);
    if args.keep_going {
        config.batch.failure_policy = FailurePolicy::Continue;
    }
    config.validate()?;

    let driver = BatchDriver::new(store_for(&config), &config);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = driver.run(&mut out)?;
    out.flush()?;

    tracing::info!(
        evaluated = summary.reports.len(),
        failed = summary.failures.len(),
        "batch complete"
    );

    if summary.has_failures() {
        for failure in &summary.failures {
            eprintln!("{}: {}", failure.file_name, failure.error);
        }
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}

fn single_command(mut config: AppConfig, args: SingleArgs) -> Result<ExitCode> {
    if let Some(root) = &args.ground_truth_root {
        config.paths.ground_truth_root = root.clone();
    }
    if let Some(annotator) = &args.annotator {
        config.paths.annotator = annotator.clone();
    }
    args.eval.apply(&mut config);
    config.validate()?;

    let record_id = match args.record {
        Some(record) => record,
        None => {
            let file_name = args
                .predictions
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| {
                    anyhow!(
                        "cannot derive a record id from {}; pass --record",
                        args.predictions.display()
                    )
                })?;
            record_id_for(file_name, config.paths.record_id_len)
        }
    };

    let driver = BatchDriver::new(store_for(&config), &config);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    driver.run_single(&record_id, &args.predictions, &mut out)?;
    out.flush()?;
    Ok(ExitCode::SUCCESS)
}

fn list_command(mut config: AppConfig, args: ListArgs) -> Result<ExitCode> {
    args.paths.apply(&mut config);
    config.validate()?;

    let driver = BatchDriver::new(store_for(&config), &config);
    let files = driver.discover()?;
    if files.is_empty() {
        println!(
            "No result files matching '{}' under {}",
            config.paths.filename_marker,
            config.paths.predictions_dir.display()
        );
        return Ok(ExitCode::SUCCESS);
    }

    for file in files {
        println!("{} -> {}", file.file_name, file.record_id);
    }
    Ok(ExitCode::SUCCESS)
}
