/// Data layer: core types, loading, classification and export.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table (typed columns)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  schema   │  Table → numeric / categorical column groups
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  name + Table + groups, read-only for the session
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  Table → CSV bytes for download
///   └──────────┘
/// ```

pub mod dataset;
pub mod export;
pub mod loader;
pub mod model;
pub mod schema;
