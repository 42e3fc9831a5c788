//! Load tagged columnar time-series containers into typed in-memory tables.

pub mod data;
pub mod dates;
pub mod error;

pub use data::encoding::{EncodingTag, NA_PRICE, PRICE_SCALE};
pub use data::filter::Pattern;
pub use data::loader::{load_csv_table, load_file, load_table, LoadOptions};
pub use data::model::{CategoricalColumn, Column, Table, TimestampColumn};
pub use error::{ErrorKind, LoadError};
