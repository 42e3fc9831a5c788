use std::path::PathBuf;

use anyhow::{Context, Result};
use arrow::util::pretty::pretty_format_batches;
use clap::Parser;
use log::info;

use tickframe::{load_file, LoadOptions, Pattern};

/// Load a tagged container (or CSV) and print its schema and first rows.
#[derive(Debug, Parser)]
#[command(name = "tickframe", version)]
struct Args {
    /// `.parquet` / `.pq` container or `.csv` file
    path: PathBuf,

    /// Column to use as the row index
    #[arg(long)]
    index: Option<String>,

    /// Keep the index column as a data column too
    #[arg(long)]
    keep_index: bool,

    /// Regex of fixed-point price columns
    #[arg(long)]
    prices: Option<String>,

    /// Regex of columns to load (default: all)
    #[arg(long)]
    include: Option<String>,

    /// Regex of columns to skip (default: none)
    #[arg(long)]
    exclude: Option<String>,

    /// CSV only: regex of date/time columns
    #[arg(long)]
    timestamps: Option<String>,

    /// Number of rows to print
    #[arg(long, default_value_t = 10)]
    rows: usize,
}

fn pattern_or(arg: Option<&str>, default: Pattern) -> Result<Pattern> {
    match arg {
        Some(p) => Pattern::new(p).with_context(|| format!("compiling pattern '{p}'")),
        None => Ok(default),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut options = LoadOptions::new()
        .prices(pattern_or(args.prices.as_deref(), Pattern::Never)?)
        .include(pattern_or(args.include.as_deref(), Pattern::Always)?)
        .exclude(pattern_or(args.exclude.as_deref(), Pattern::Never)?)
        .timestamps(pattern_or(args.timestamps.as_deref(), Pattern::Never)?);
    if let Some(index) = &args.index {
        options = options.index(index);
    }
    if args.keep_index {
        options = options.keep_index_column();
    }

    let table = load_file(&args.path, &options)
        .with_context(|| format!("loading {}", args.path.display()))?;
    info!(
        "loaded {} columns x {} rows",
        table.column_count(),
        table.row_count()
    );

    for (name, column) in table.columns() {
        println!("{name}: {}", column.tag());
    }
    if let (Some(name), Some(index)) = (table.index_name(), table.index()) {
        println!("index {name}: {}", index.tag());
    }

    let batch = table.to_record_batch().context("converting to Arrow")?;
    let head = batch.slice(0, args.rows.min(batch.num_rows()));
    println!("{}", pretty_format_batches(&[head]).context("formatting rows")?);
    Ok(())
}
