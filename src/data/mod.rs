/// Data layer: container access, column decoding, and table assembly.
///
/// Architecture:
/// ```text
///  .parquet (tagged datasets)        .csv
///        │                             │
///        ▼                             │
///   ┌───────────┐                      │
///   │ container  │  datasets, vr_at / vr_labels, read_into
///   └───────────┘                      │
///        │                             │
///        ▼                             ▼
///   ┌──────────┐   pass 1: allocate (category/timestamp read eagerly)
///   │  loader   │   pass 2: fill numeric buffers in place, price decode
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  named typed columns, optional row index
///   └──────────┘
/// ```
///
/// `filter` decides which columns are loaded; `encoding` holds the tag enum
/// and the missing-value sentinels.

pub mod container;
pub mod encoding;
pub mod filter;
pub mod loader;
pub mod model;
