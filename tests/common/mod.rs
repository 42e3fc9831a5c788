//! Test fixtures: write small tagged containers with `ArrowWriter`.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Int32Array};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;

use tickframe::data::encoding::{EncodingTag, ENCODING_TAG_ATTR, LABELS_ATTR};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Default)]
pub struct ContainerBuilder {
    fields: Vec<Field>,
    columns: Vec<ArrayRef>,
    row_group_size: Option<usize>,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column with arbitrary field metadata.
    pub fn raw(mut self, name: &str, metadata: &[(&str, &str)], array: ArrayRef) -> Self {
        let metadata: HashMap<String, String> = metadata
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.fields
            .push(Field::new(name, array.data_type().clone(), true).with_metadata(metadata));
        self.columns.push(array);
        self
    }

    pub fn column(self, name: &str, tag: EncodingTag, array: ArrayRef) -> Self {
        let ordinal = (tag as u8).to_string();
        self.raw(name, &[(ENCODING_TAG_ATTR, ordinal.as_str())], array)
    }

    pub fn category(self, name: &str, labels: &[&str], codes: Vec<i32>) -> Self {
        let ordinal = (EncodingTag::Category as u8).to_string();
        let labels = serde_json::json!([labels]).to_string();
        self.raw(
            name,
            &[(ENCODING_TAG_ATTR, ordinal.as_str()), (LABELS_ATTR, labels.as_str())],
            Arc::new(Int32Array::from(codes)),
        )
    }

    pub fn row_group_size(mut self, rows: usize) -> Self {
        self.row_group_size = Some(rows);
        self
    }

    pub fn write(self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let schema = Arc::new(Schema::new(self.fields));
        let batch = RecordBatch::try_new(schema.clone(), self.columns)?;
        let props = self
            .row_group_size
            .map(|rows| WriterProperties::builder().set_max_row_group_size(rows).build());

        let file = std::fs::File::create(path)?;
        let mut writer = ArrowWriter::try_new(file, schema, props)?;
        writer.write(&batch)?;
        writer.close()?;
        Ok(())
    }
}
