/// Data layer: core types, loading, normalisation and filtering.
///
/// Architecture:
/// ```text
///  .geojson / .shp / .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → GeoRecordSet
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ GeoRecordSet  │  Vec<GeoRecord>, column layout
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ geometry  │  polygon coercion per CoercionPolicy
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  status == value → new GeoRecordSet
///   └──────────┘
/// ```

pub mod filter;
pub mod geometry;
pub mod loader;
pub mod model;
