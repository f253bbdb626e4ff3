use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use grovemetrics::report::{self, RankKey};
use grovemetrics::{Config, Dataset, IdentityFilter, ModelId, Table, export, metrics};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "grovemetrics",
    about = "Object-detection evaluation reports for orchard imagery",
    arg_required_else_help = true
)]
struct Cli {
    /// Disable color
    #[arg(long = "no-color", global = true)]
    no_color: bool,

    /// Additional model ids to exclude (on top of the configured set)
    #[arg(long = "exclude", global = true, value_name = "ID")]
    exclude: Vec<ModelId>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List discovered models
    Models(DirArgs),
    /// Per-model metric summaries under the given filters
    Summary(SummaryArgs),
    /// Best-scoring images across all models
    TopImages(TopImagesArgs),
    /// Export the filtered merged table as CSV
    Export(ExportArgs),
}

#[derive(Args, Clone)]
struct DirArgs {
    /// Directory containing eval_model_<N>_Sheet1.csv files
    #[arg(value_name = "DATA_DIR")]
    dir: PathBuf,
}

#[derive(Args, Clone, Default)]
struct FilterArgs {
    /// Keep only rows from this year
    #[arg(long)]
    year: Option<String>,

    /// Keep only rows from this domaine
    #[arg(long)]
    domaine: Option<String>,

    /// Keep only rows with this rootstock
    #[arg(long = "porte-greffe")]
    porte_greffe: Option<String>,

    /// Keep only rows from this parcel
    #[arg(long)]
    parcelle: Option<String>,
}

impl FilterArgs {
    fn to_filter(&self) -> IdentityFilter {
        IdentityFilter {
            year: self.year.clone(),
            domaine: self.domaine.clone(),
            porte_greffe: self.porte_greffe.clone(),
            parcelle: self.parcelle.clone(),
        }
    }
}

#[derive(Args, Clone)]
struct SummaryArgs {
    #[command(flatten)]
    dir: DirArgs,

    #[command(flatten)]
    filter: FilterArgs,

    /// Sort order for the summary table
    #[arg(long, value_enum, default_value_t = SortKey::F1)]
    sort: SortKey,

    /// Output JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Args, Clone)]
struct TopImagesArgs {
    #[command(flatten)]
    dir: DirArgs,

    #[command(flatten)]
    filter: FilterArgs,

    /// Number of images to show
    #[arg(long, default_value_t = 5)]
    limit: usize,

    /// Output JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Args, Clone)]
struct ExportArgs {
    #[command(flatten)]
    dir: DirArgs,

    #[command(flatten)]
    filter: FilterArgs,

    /// Output file (stdout when omitted)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SortKey {
    F1,
    Precision,
    Recall,
    Tp,
    Fp,
    Fn,
}

impl From<SortKey> for RankKey {
    fn from(key: SortKey) -> Self {
        match key {
            SortKey::F1 => RankKey::F1,
            SortKey::Precision => RankKey::AvgPrecision,
            SortKey::Recall => RankKey::AvgRecall,
            SortKey::Tp => RankKey::TotalTp,
            SortKey::Fp => RankKey::TotalFp,
            SortKey::Fn => RankKey::TotalFn,
        }
    }
}

fn load_dataset(dir: &DirArgs, exclude: &[ModelId]) -> anyhow::Result<Dataset> {
    let config = Config::load().with_excluded(exclude.iter().copied());
    grovemetrics::load::load_dir(&dir.dir, &config)
        .with_context(|| format!("loading evaluation data from {}", dir.dir.display()))
}

fn pct(v: f64) -> String {
    format!("{:.2}%", v * 100.0)
}

fn run_models(args: DirArgs, exclude: &[ModelId]) -> anyhow::Result<()> {
    let dataset = load_dataset(&args, exclude)?;
    for model in &dataset.models {
        println!("Model {model}");
    }
    Ok(())
}

fn run_summary(args: SummaryArgs, exclude: &[ModelId]) -> anyhow::Result<()> {
    let dataset = load_dataset(&args.dir, exclude)?;
    let filtered = args.filter.to_filter().apply(&dataset.table);
    let summaries = metrics::summarize(&filtered, &dataset.models, &dataset.columns);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    let ranked = report::rank_by(&summaries, args.sort.into());
    let header = format!(
        "{:<10} {:>8} {:>10} {:>8} {:>8} {:>8} {:>8}",
        "model", "f1", "precision", "recall", "tp", "fp", "fn"
    );
    println!("{}", header.bold().cyan());
    for s in &ranked {
        println!(
            "{:<10} {:>8} {:>10} {:>8} {:>8} {:>8} {:>8}",
            s.label(),
            pct(s.f1),
            pct(s.avg_precision),
            pct(s.avg_recall),
            s.total_tp,
            s.total_fp,
            s.total_fn
        );
    }
    if let Some(best) = report::winner(&summaries) {
        println!();
        println!(
            "Winning model: {} (F1 {})",
            best.label().green().bold(),
            pct(best.f1)
        );
    }
    if filtered.is_empty() {
        println!();
        println!("{}", "No rows match the current filters.".yellow());
    }
    Ok(())
}

fn run_top_images(args: TopImagesArgs, exclude: &[ModelId]) -> anyhow::Result<()> {
    let dataset = load_dataset(&args.dir, exclude)?;
    let filtered = args.filter.to_filter().apply(&dataset.table);
    let top = report::top_images(&filtered, &dataset.models, args.limit);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&table_to_json(&top))?);
        return Ok(());
    }

    println!("{}", "Top images by average precision:".bold().cyan());
    for i in 0..top.n_rows() {
        let name = top
            .value(i, "filename")
            .map(|v| v.render())
            .unwrap_or_default();
        let p = top.value(i, "avg_precision").and_then(|v| v.as_f64());
        let r = top.value(i, "avg_recall").and_then(|v| v.as_f64());
        println!(
            "  {:<40} precision {:>8}  recall {:>8}",
            name,
            pct(p.unwrap_or(0.0)),
            pct(r.unwrap_or(0.0))
        );
    }
    Ok(())
}

fn run_export(args: ExportArgs, exclude: &[ModelId]) -> anyhow::Result<()> {
    let dataset = load_dataset(&args.dir, exclude)?;
    let filtered = args.filter.to_filter().apply(&dataset.table);
    match &args.output {
        Some(path) => {
            export::write_file(&filtered, path)
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!("Wrote {} rows to {}", filtered.n_rows(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            export::write(&filtered, &mut stdout).context("writing CSV to stdout")?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn table_to_json(table: &Table) -> serde_json::Value {
    let rows: Vec<serde_json::Value> = table
        .rows()
        .iter()
        .map(|row| {
            let obj: serde_json::Map<String, serde_json::Value> = table
                .columns()
                .iter()
                .zip(row)
                .map(|(col, v)| {
                    let jv = match v {
                        grovemetrics::Value::Null => serde_json::Value::Null,
                        grovemetrics::Value::Int(i) => (*i).into(),
                        grovemetrics::Value::Float(f) => serde_json::json!(f),
                        grovemetrics::Value::Str(s) => s.clone().into(),
                    };
                    (col.clone(), jv)
                })
                .collect();
            serde_json::Value::Object(obj)
        })
        .collect();
    serde_json::Value::Array(rows)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if cli.no_color || std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Models(args) => run_models(args, &cli.exclude),
        Commands::Summary(args) => run_summary(args, &cli.exclude),
        Commands::TopImages(args) => run_top_images(args, &cli.exclude),
        Commands::Export(args) => run_export(args, &cli.exclude),
    }
}
