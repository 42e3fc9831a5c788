use std::sync::Arc;

use arrow::array::{
    ArrayRef, DictionaryArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
    TimestampNanosecondArray,
};
use arrow::datatypes::{DataType, Field, Int32Type, Schema, TimeUnit};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};

use super::encoding::{EncodingTag, MISSING_CODE, NAT};
use crate::error::{LoadError, Result};

// ---------------------------------------------------------------------------
// CategoricalColumn – integer codes into an ordered label list
// ---------------------------------------------------------------------------

/// Codes are always a valid label index or [`MISSING_CODE`].
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalColumn {
    codes: Vec<i32>,
    labels: Arc<[String]>,
}

impl CategoricalColumn {
    /// Build from raw codes; anything outside `0..labels.len()` becomes missing.
    pub fn from_codes(mut codes: Vec<i32>, labels: impl Into<Arc<[String]>>) -> Self {
        let labels = labels.into();
        let n_labels = labels.len();
        for code in codes.iter_mut() {
            if *code < 0 || *code as usize >= n_labels {
                *code = MISSING_CODE;
            }
        }
        CategoricalColumn { codes, labels }
    }

    pub fn codes(&self) -> &[i32] {
        &self.codes
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Label at row `i`, `None` for a missing category.
    pub fn value(&self, i: usize) -> Option<&str> {
        let code = *self.codes.get(i)?;
        if code == MISSING_CODE {
            None
        } else {
            Some(self.labels[code as usize].as_str())
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        (0..self.codes.len()).map(|i| self.value(i))
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// TimestampColumn – nanoseconds since the Unix epoch
// ---------------------------------------------------------------------------

/// The raw 64-bit values are kept bit-for-bit; only their meaning changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampColumn {
    nanos: Vec<i64>,
}

impl TimestampColumn {
    pub fn from_nanos(nanos: Vec<i64>) -> Self {
        TimestampColumn { nanos }
    }

    pub fn nanos(&self) -> &[i64] {
        &self.nanos
    }

    /// Instant at row `i`, `None` for NaT.
    pub fn value(&self, i: usize) -> Option<DateTime<Utc>> {
        let n = *self.nanos.get(i)?;
        if n == NAT {
            None
        } else {
            Some(DateTime::from_timestamp_nanos(n))
        }
    }

    pub fn len(&self) -> usize {
        self.nanos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nanos.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Column – one typed, fully materialized column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Category(CategoricalColumn),
    Timestamp(TimestampColumn),
    Int64(Vec<i64>),
    Float64(Vec<f64>),
    Int32(Vec<i32>),
    Float32(Vec<f32>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Category(c) => c.len(),
            Column::Timestamp(t) => t.len(),
            Column::Int64(v) => v.len(),
            Column::Float64(v) => v.len(),
            Column::Int32(v) => v.len(),
            Column::Float32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The logical type this column was decoded as.
    pub fn tag(&self) -> EncodingTag {
        match self {
            Column::Category(_) => EncodingTag::Category,
            Column::Timestamp(_) => EncodingTag::Timestamp,
            Column::Int64(_) => EncodingTag::Int64,
            Column::Float64(_) => EncodingTag::Float64,
            Column::Int32(_) => EncodingTag::Int32,
            Column::Float32(_) => EncodingTag::Float32,
        }
    }

    pub fn as_category(&self) -> Option<&CategoricalColumn> {
        match self {
            Column::Category(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<&TimestampColumn> {
        match self {
            Column::Timestamp(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_int64(&self) -> Option<&[i64]> {
        match self {
            Column::Int64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_float64(&self) -> Option<&[f64]> {
        match self {
            Column::Float64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int32(&self) -> Option<&[i32]> {
        match self {
            Column::Int32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_float32(&self) -> Option<&[f32]> {
        match self {
            Column::Float32(v) => Some(v),
            _ => None,
        }
    }

    /// Arrow type produced by [`Column::to_arrow`].
    pub fn arrow_type(&self) -> DataType {
        match self {
            Column::Category(_) => {
                DataType::Dictionary(Box::new(DataType::Int32), Box::new(DataType::Utf8))
            }
            Column::Timestamp(_) => DataType::Timestamp(TimeUnit::Nanosecond, None),
            Column::Int64(_) => DataType::Int64,
            Column::Float64(_) => DataType::Float64,
            Column::Int32(_) => DataType::Int32,
            Column::Float32(_) => DataType::Float32,
        }
    }

    /// Copy into an Arrow array. Missing categories and NaT become nulls.
    pub fn to_arrow(&self) -> std::result::Result<ArrayRef, ArrowError> {
        let array: ArrayRef = match self {
            Column::Category(c) => {
                let keys: Int32Array = c
                    .codes()
                    .iter()
                    .map(|&code| (code != MISSING_CODE).then_some(code))
                    .collect();
                let values = StringArray::from_iter_values(c.labels().iter());
                Arc::new(DictionaryArray::<Int32Type>::try_new(keys, Arc::new(values))?)
            }
            Column::Timestamp(t) => Arc::new(
                t.nanos()
                    .iter()
                    .map(|&n| (n != NAT).then_some(n))
                    .collect::<TimestampNanosecondArray>(),
            ),
            Column::Int64(v) => Arc::new(Int64Array::from(v.clone())),
            Column::Float64(v) => Arc::new(Float64Array::from(v.clone())),
            Column::Int32(v) => Arc::new(Int32Array::from(v.clone())),
            Column::Float32(v) => Arc::new(Float32Array::from(v.clone())),
        };
        Ok(array)
    }
}

// ---------------------------------------------------------------------------
// Table – named columns of equal length, optionally indexed by one of them
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    row_count: usize,
    columns: Vec<(String, Column)>,
    index: Option<(String, Column)>,
}

impl Table {
    /// Assemble a table from already-built columns, taking ownership of them.
    pub fn from_columns(columns: Vec<(String, Column)>) -> Self {
        let row_count = columns.first().map(|(_, c)| c.len()).unwrap_or(0);
        debug_assert!(columns.iter().all(|(_, c)| c.len() == row_count));
        Table {
            row_count,
            columns,
            index: None,
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Data column names in container order (excludes a dropped index).
    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    pub fn columns(&self) -> &[(String, Column)] {
        &self.columns
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [(String, Column)] {
        &mut self.columns
    }

    pub fn index(&self) -> Option<&Column> {
        self.index.as_ref().map(|(_, c)| c)
    }

    pub fn index_name(&self) -> Option<&str> {
        self.index.as_ref().map(|(n, _)| n.as_str())
    }

    /// Use column `name` as the row index, removing it from the data columns
    /// when `drop` is set. Replaces any previous index.
    pub fn set_index(&mut self, name: &str, drop: bool) -> Result<()> {
        let pos = self
            .columns
            .iter()
            .position(|(n, _)| n == name)
            .ok_or_else(|| LoadError::MissingIndex(name.to_string()))?;

        let entry = if drop {
            self.columns.remove(pos)
        } else {
            self.columns[pos].clone()
        };
        self.index = Some(entry);
        Ok(())
    }

    /// Copy into an Arrow record batch. A dropped index is emitted as the
    /// first column so no data is lost.
    pub fn to_record_batch(&self) -> std::result::Result<RecordBatch, ArrowError> {
        let mut fields = Vec::with_capacity(self.columns.len() + 1);
        let mut arrays = Vec::with_capacity(self.columns.len() + 1);

        if let Some((name, column)) = &self.index {
            if self.column(name).is_none() {
                fields.push(Field::new(name, column.arrow_type(), true));
                arrays.push(column.to_arrow()?);
            }
        }
        for (name, column) in &self.columns {
            fields.push(Field::new(name, column.arrow_type(), true));
            arrays.push(column.to_arrow()?);
        }

        RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
    }
}
