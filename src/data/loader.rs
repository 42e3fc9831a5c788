use std::path::Path;

use arrow::datatypes::{Float32Type, Float64Type, Int32Type, Int64Type};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{debug, trace};
use rayon::prelude::*;

use super::container::{Container, Dataset};
use super::encoding::{
    decode_prices, EncodingTag, MISSING_CODE, NAT, NA_INT32, NA_INT64,
};
use super::filter::{ColumnFilter, Pattern};
use super::model::{CategoricalColumn, Column, Table, TimestampColumn};
use crate::error::{LoadError, Result};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// How [`load_table`] selects and decodes columns.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Column to use as the row index; always loaded when present.
    pub index_column: Option<String>,
    /// Remove the index column from the data columns once it is the index.
    pub drop_index_column: bool,
    /// Columns decoded as fixed-point prices (forced to `float64`).
    pub prices: Pattern,
    pub include: Pattern,
    pub exclude: Pattern,
    /// CSV only: columns parsed as date/time values.
    pub timestamps: Pattern,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            index_column: None,
            drop_index_column: true,
            prices: Pattern::Never,
            include: Pattern::Always,
            exclude: Pattern::Never,
            timestamps: Pattern::Never,
        }
    }
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(mut self, column: impl Into<String>) -> Self {
        self.index_column = Some(column.into());
        self
    }

    pub fn keep_index_column(mut self) -> Self {
        self.drop_index_column = false;
        self
    }

    pub fn prices(mut self, pattern: impl Into<Pattern>) -> Self {
        self.prices = pattern.into();
        self
    }

    pub fn include(mut self, pattern: impl Into<Pattern>) -> Self {
        self.include = pattern.into();
        self
    }

    pub fn exclude(mut self, pattern: impl Into<Pattern>) -> Self {
        self.exclude = pattern.into();
        self
    }

    pub fn timestamps(mut self, pattern: impl Into<Pattern>) -> Self {
        self.timestamps = pattern.into();
        self
    }

    fn column_filter(&self) -> ColumnFilter<'_> {
        ColumnFilter {
            index: self.index_column.as_deref(),
            include: &self.include,
            exclude: &self.exclude,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a table from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` / `.pq` – tagged columnar container, see [`load_table`]
/// * `.csv`             – header row plus values, see [`load_csv_table`]
///
/// Column selection and price decoding apply to containers only; the index
/// column applies to both.
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_table(path, options),
        "csv" => {
            let mut table = load_csv_table(path, &options.timestamps)?;
            if let Some(index) = &options.index_column {
                table.set_index(index, options.drop_index_column)?;
            }
            Ok(table)
        }
        other => Err(LoadError::UnsupportedExtension(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Container loader
// ---------------------------------------------------------------------------

/// What pass 2 needs to know about a column allocated in pass 1.
struct ColumnPlan<'a> {
    dataset: Dataset<'a>,
    is_price: bool,
}

/// Load the selected columns of a tagged container into a [`Table`].
///
/// Pass 1 allocates every selected column (category and timestamp columns
/// are read right away), the table is assembled from those buffers, and
/// pass 2 reads numeric data straight into the table's columns.
pub fn load_table(path: &Path, options: &LoadOptions) -> Result<Table> {
    let container = Container::open(path)?;
    let filter = options.column_filter();
    let row_count = container.row_count();

    let mut plans = Vec::new();
    let mut columns = Vec::new();

    for dataset in container.datasets() {
        let name = dataset.name();
        if !filter.is_selected(name) {
            trace!("skipping column '{name}'");
            continue;
        }

        let stored = dataset.encoding_tag()?;
        let is_price = options.prices.matches(name);
        let tag = if is_price {
            EncodingTag::Float64
        } else {
            stored
        };
        trace!("column '{name}': stored {stored}, decoded as {tag}, price={is_price}");

        columns.push((name.to_string(), tag.allocate(&container, dataset, row_count)?));
        plans.push(ColumnPlan { dataset, is_price });
    }

    debug!(
        "allocated {} columns x {row_count} rows from {}",
        columns.len(),
        container.path().display()
    );

    let mut table = Table::from_columns(columns);

    table
        .columns_mut()
        .par_iter_mut()
        .zip(plans.par_iter())
        .try_for_each(|((_, column), plan)| fill(&container, plan, column))?;

    debug!("filled {} columns", table.column_count());

    if let Some(index) = &options.index_column {
        table.set_index(index, options.drop_index_column)?;
    }
    Ok(table)
}

impl EncodingTag {
    /// Pass 1: create the column for this tag.
    ///
    /// Category and timestamp columns are read here; numeric columns come
    /// back allocated but unfilled.
    pub fn allocate(
        self,
        container: &Container,
        dataset: Dataset<'_>,
        row_count: usize,
    ) -> Result<Column> {
        let column = match self {
            EncodingTag::Category => {
                let labels = dataset.labels()?;
                let mut codes = vec![0i32; row_count];
                container.read_into::<Int32Type>(dataset, &mut codes, MISSING_CODE)?;
                Column::Category(CategoricalColumn::from_codes(codes, labels))
            }
            EncodingTag::Timestamp => {
                // stored as plain i64; the nanosecond meaning is applied without conversion
                let mut raw = vec![0i64; row_count];
                container.read_into::<Int64Type>(dataset, &mut raw, NAT)?;
                Column::Timestamp(TimestampColumn::from_nanos(raw))
            }
            EncodingTag::Int64 => Column::Int64(vec![0; row_count]),
            EncodingTag::Float64 => Column::Float64(vec![0.0; row_count]),
            EncodingTag::Int32 => Column::Int32(vec![0; row_count]),
            EncodingTag::Float32 => Column::Float32(vec![0.0; row_count]),
        };
        Ok(column)
    }
}

/// Pass 2: read numeric data into the buffer allocated in pass 1.
fn fill(container: &Container, plan: &ColumnPlan<'_>, column: &mut Column) -> Result<()> {
    match column {
        Column::Category(_) | Column::Timestamp(_) => Ok(()),
        Column::Int64(buf) => container.read_into::<Int64Type>(plan.dataset, buf, NA_INT64),
        Column::Int32(buf) => container.read_into::<Int32Type>(plan.dataset, buf, NA_INT32),
        Column::Float32(buf) => container.read_into::<Float32Type>(plan.dataset, buf, f32::NAN),
        Column::Float64(buf) => {
            container.read_into::<Float64Type>(plan.dataset, buf, f64::NAN)?;
            if plan.is_price {
                decode_prices(buf);
            }
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per row.
///
/// Columns whose name matches `timestamps` are parsed as date/time values.
/// The rest are typed by content: integers, then floats (blank → NaN), and
/// anything else becomes a categorical column.
pub fn load_csv_table(path: &Path, timestamps: &Pattern) -> Result<Table> {
    let csv_error = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(csv_error)?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let is_timestamp: Vec<bool> = headers.iter().map(|h| timestamps.matches(h)).collect();

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for result in reader.records() {
        let record = result.map_err(csv_error)?;
        for (col_idx, values) in cells.iter_mut().enumerate() {
            values.push(record.get(col_idx).unwrap_or("").to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .zip(is_timestamp)
        .map(|((name, values), is_ts)| {
            let column = if is_ts {
                parse_timestamp_column(&name, &values)?
            } else {
                guess_column_type(&values)
            };
            Ok((name, column))
        })
        .collect::<Result<Vec<_>>>()?;

    debug!("read {} CSV columns from {}", columns.len(), path.display());
    Ok(Table::from_columns(columns))
}

fn parse_timestamp_column(name: &str, values: &[String]) -> Result<Column> {
    let nanos = values
        .iter()
        .enumerate()
        .map(|(row, s)| {
            let s = s.trim();
            if s.is_empty() {
                return Ok(NAT);
            }
            parse_timestamp_nanos(s).ok_or_else(|| LoadError::BadTimestamp {
                column: name.to_string(),
                row,
                value: s.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Column::Timestamp(TimestampColumn::from_nanos(nanos)))
}

fn parse_timestamp_nanos(s: &str) -> Option<i64> {
    const DATETIME_FORMATS: [&str; 3] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.timestamp_nanos_opt();
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return dt.and_utc().timestamp_nanos_opt();
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .and_then(|dt| dt.and_utc().timestamp_nanos_opt())
}

fn guess_column_type(values: &[String]) -> Column {
    let trimmed: Vec<&str> = values.iter().map(|s| s.trim()).collect();

    if let Some(ints) = trimmed
        .iter()
        .map(|s| s.parse::<i64>().ok())
        .collect::<Option<Vec<_>>>()
    {
        return Column::Int64(ints);
    }

    let floats = trimmed
        .iter()
        .map(|s| {
            if s.is_empty() {
                Some(f64::NAN)
            } else {
                s.parse::<f64>().ok()
            }
        })
        .collect::<Option<Vec<_>>>();
    if let Some(floats) = floats {
        return Column::Float64(floats);
    }

    let mut labels: Vec<String> = Vec::new();
    let codes = trimmed
        .iter()
        .map(|s| {
            if s.is_empty() {
                return MISSING_CODE;
            }
            let pos = match labels.iter().position(|l| l == s) {
                Some(pos) => pos,
                None => {
                    labels.push(s.to_string());
                    labels.len() - 1
                }
            };
            pos as i32
        })
        .collect();
    Column::Category(CategoricalColumn::from_codes(codes, labels))
}
