use std::path::PathBuf;

/// Everything that can go wrong between opening a vector file and handing
/// back a filtered record set.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),
    #[error("invalid shapefile: {0}")]
    Shapefile(#[from] shapefile::Error),
    #[error("invalid dBase table: {0}")]
    Dbase(#[from] shapefile::dbase::Error),
    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: invalid WKT geometry: {message}")]
    Wkt { row: usize, message: String },
    #[error("row {row}: invalid WKB geometry: {source}")]
    Wkb {
        row: usize,
        #[source]
        source: geozero::error::GeozeroError,
    },
    #[error("invalid parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("invalid arrow data: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("row {row}: invalid geometry: {message}")]
    InvalidGeometry { row: usize, message: String },
    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
    #[error("the data should have '{0}' column")]
    MissingColumn(String),
    #[error("row {row}: cannot coerce {kind} geometry into a polygon")]
    Coercion { row: usize, kind: &'static str },
}
