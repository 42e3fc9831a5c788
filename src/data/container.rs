use std::path::{Path, PathBuf};

use arrow::array::{Array, AsArray};
use arrow::compute::{cast_with_options, CastOptions};
use arrow::datatypes::{ArrowPrimitiveType, Field};
use bytes::Bytes;
use parquet::arrow::arrow_reader::{
    ArrowReaderMetadata, ArrowReaderOptions, ParquetRecordBatchReaderBuilder,
};
use parquet::arrow::ProjectionMask;

use super::encoding::{EncodingTag, ENCODING_TAG_ATTR, LABELS_ATTR};
use crate::error::{LoadError, Result};

// ---------------------------------------------------------------------------
// Container: read-only view of a Parquet file as named, tagged datasets
// ---------------------------------------------------------------------------

/// A container read fully into memory.
///
/// The file is closed as soon as its bytes are loaded; every column reader
/// works on its own cheap clone of the shared buffer, so reads can run on
/// several threads at once.
pub struct Container {
    path: PathBuf,
    data: Bytes,
    metadata: ArrowReaderMetadata,
}

/// One named dataset (top-level column) of a container.
#[derive(Debug, Clone, Copy)]
pub struct Dataset<'a> {
    position: usize,
    field: &'a Field,
}

impl Container {
    pub fn open(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .map(Bytes::from)
            .map_err(|source| LoadError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        let metadata = ArrowReaderMetadata::load(&data, ArrowReaderOptions::default())
            .map_err(|source| LoadError::Container {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Container {
            path: path.to_path_buf(),
            data,
            metadata,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Datasets in schema order.
    pub fn datasets(&self) -> impl Iterator<Item = Dataset<'_>> + '_ {
        self.metadata
            .schema()
            .fields()
            .iter()
            .enumerate()
            .map(|(position, field)| Dataset {
                position,
                field: field.as_ref(),
            })
    }

    /// Physical length shared by every dataset.
    pub fn row_count(&self) -> usize {
        self.metadata.metadata().file_metadata().num_rows().max(0) as usize
    }

    /// Read the whole dataset into `out`, converting to `T` on the way.
    ///
    /// Null slots are written as `missing`. `out.len()` must equal the
    /// dataset's length exactly.
    pub fn read_into<T: ArrowPrimitiveType>(
        &self,
        dataset: Dataset<'_>,
        out: &mut [T::Native],
        missing: T::Native,
    ) -> Result<()> {
        let column = dataset.name();
        let mask = ProjectionMask::roots(
            self.metadata.metadata().file_metadata().schema_descr(),
            [dataset.position],
        );
        let reader =
            ParquetRecordBatchReaderBuilder::new_with_metadata(self.data.clone(), self.metadata.clone())
                .with_projection(mask)
                .build()
                .map_err(|source| LoadError::Container {
                    path: self.path.clone(),
                    source,
                })?;

        let options = CastOptions {
            safe: false,
            ..Default::default()
        };
        let mut offset = 0;
        for batch in reader {
            let batch = batch.map_err(|source| LoadError::Read {
                column: column.to_string(),
                source,
            })?;
            let array = cast_with_options(batch.column(0), &T::DATA_TYPE, &options).map_err(
                |source| LoadError::Decode {
                    column: column.to_string(),
                    source,
                },
            )?;
            let values = array.as_primitive::<T>();

            let end = offset + values.len();
            if end > out.len() {
                return Err(LoadError::RowCount {
                    column: column.to_string(),
                    expected: out.len(),
                    found: end,
                });
            }
            for (slot, v) in out[offset..end].iter_mut().zip(values.iter()) {
                *slot = v.unwrap_or(missing);
            }
            offset = end;
        }

        if offset != out.len() {
            return Err(LoadError::RowCount {
                column: column.to_string(),
                expected: out.len(),
                found: offset,
            });
        }
        Ok(())
    }
}

impl<'a> Dataset<'a> {
    pub fn name(&self) -> &'a str {
        self.field.name()
    }

    /// Stored encoding tag (`vr_at`).
    pub fn encoding_tag(&self) -> Result<EncodingTag> {
        let raw = self
            .field
            .metadata()
            .get(ENCODING_TAG_ATTR)
            .ok_or_else(|| LoadError::MissingAttribute {
                column: self.name().to_string(),
                attribute: ENCODING_TAG_ATTR,
            })?;
        let ordinal: i64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
            LoadError::MalformedAttribute {
                column: self.name().to_string(),
                attribute: ENCODING_TAG_ATTR,
                reason: e.to_string(),
            }
        })?;
        EncodingTag::try_from(ordinal).map_err(|tag| LoadError::UnknownTag {
            column: self.name().to_string(),
            tag,
        })
    }

    /// Category labels (`vr_labels`): element 0 of a JSON array of lists.
    pub fn labels(&self) -> Result<Vec<String>> {
        let raw = self
            .field
            .metadata()
            .get(LABELS_ATTR)
            .ok_or_else(|| LoadError::MissingAttribute {
                column: self.name().to_string(),
                attribute: LABELS_ATTR,
            })?;
        let malformed = |reason: String| LoadError::MalformedAttribute {
            column: self.name().to_string(),
            attribute: LABELS_ATTR,
            reason,
        };
        let wrapped: Vec<Vec<String>> =
            serde_json::from_str(raw).map_err(|e| malformed(e.to_string()))?;
        wrapped
            .into_iter()
            .next()
            .ok_or_else(|| malformed("empty attribute".to_string()))
    }
}
