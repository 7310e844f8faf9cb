use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, AsArray, BinaryArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    LargeBinaryArray,
};
use arrow::datatypes::DataType;
use geo::Geometry;
use geojson::{Feature, GeoJson};
use geozero::{wkb::Wkb, ToGeo};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use shapefile::dbase::FieldValue;
use wkt::TryFromWkt;

use super::model::{AttributeValue, GeoRecord, GeoRecordSet, GEOMETRY_COLUMN};
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a vector dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.geojson` / `.json` – FeatureCollection, Feature or bare Geometry
/// * `.shp`               – ESRI Shapefile with its `.dbf` attribute table
/// * `.csv`               – header row, WKT in a `geometry` column
/// * `.parquet` / `.pq`   – GeoParquet, WKB in a `geometry` column
pub fn load_file(path: &Path) -> Result<GeoRecordSet, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let set = match ext.as_str() {
        "geojson" | "json" => load_geojson(path),
        "shp" => load_shapefile(path),
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }?;

    log::info!(
        "Loaded {} records with columns {:?} from {}",
        set.len(),
        set.column_names(),
        path.display()
    );
    Ok(set)
}

/// Keeps attribute column names in first-seen order.
#[derive(Default)]
struct ColumnIndex {
    names: Vec<String>,
}

impl ColumnIndex {
    fn observe<'a>(&mut self, keys: impl IntoIterator<Item = &'a String>) {
        for key in keys {
            if !self.names.iter().any(|n| n == key) {
                self.names.push(key.clone());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// GeoJSON loader
// ---------------------------------------------------------------------------

/// Accepts any GeoJSON object:
///
/// ```json
/// {
///   "type": "FeatureCollection",
///   "features": [
///     { "type": "Feature",
///       "geometry": { "type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]] },
///       "properties": { "status": "empty", "parcel": 12 } }
///   ]
/// }
/// ```
///
/// A bare Geometry becomes a single record without attributes.
fn load_geojson(path: &Path) -> Result<GeoRecordSet, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let geojson: GeoJson = text.parse()?;

    let features = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(g) => {
            let geometry = Geometry::<f64>::try_from(g)?;
            let record = GeoRecord::new(Some(geometry), BTreeMap::new());
            return Ok(GeoRecordSet::new(vec![record], Vec::new(), true));
        }
    };

    let mut columns = ColumnIndex::default();
    let records = features
        .into_iter()
        .map(|feature| {
            if let Some(properties) = &feature.properties {
                columns.observe(properties.keys());
            }
            feature_to_record(feature)
        })
        .collect::<Result<Vec<_>, LoadError>>()?;

    Ok(GeoRecordSet::new(records, columns.names, true))
}

fn feature_to_record(feature: Feature) -> Result<GeoRecord, LoadError> {
    let geometry = feature
        .geometry
        .map(Geometry::<f64>::try_from)
        .transpose()?;

    let attributes = feature
        .properties
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| (key, json_to_attribute(&value)))
        .collect();

    Ok(GeoRecord::new(geometry, attributes))
}

fn json_to_attribute(val: &JsonValue) -> AttributeValue {
    match val {
        JsonValue::String(s) => AttributeValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                AttributeValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                AttributeValue::Float(f)
            } else {
                AttributeValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => AttributeValue::Bool(*b),
        JsonValue::Null => AttributeValue::Null,
        other => AttributeValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Shapefile loader
// ---------------------------------------------------------------------------

/// Reads the `.shp` geometry together with the `.dbf` table that sits next
/// to it. Columns follow the field order of the dBase header.
fn load_shapefile(path: &Path) -> Result<GeoRecordSet, LoadError> {
    let table = shapefile::dbase::Reader::from_path(path.with_extension("dbf"))?;
    let column_names: Vec<String> = table
        .fields()
        .iter()
        .map(|field| field.name().to_string())
        .collect();

    let rows = shapefile::read(path)?;
    let mut records = Vec::with_capacity(rows.len());

    for (row, (shape, record)) in rows.into_iter().enumerate() {
        let geometry = match shape {
            shapefile::Shape::NullShape => None,
            shape => Some(Geometry::<f64>::try_from(shape).map_err(|e| {
                LoadError::InvalidGeometry {
                    row,
                    message: e.to_string(),
                }
            })?),
        };

        let attributes: BTreeMap<String, AttributeValue> = record
            .into_iter()
            .map(|(name, value)| (name, field_to_attribute(value)))
            .collect();
        records.push(GeoRecord::new(geometry, attributes));
    }

    Ok(GeoRecordSet::new(records, column_names, true))
}

fn field_to_attribute(value: FieldValue) -> AttributeValue {
    match value {
        FieldValue::Character(Some(s)) => AttributeValue::String(s.trim_end().to_string()),
        FieldValue::Numeric(Some(n)) => AttributeValue::Float(n),
        FieldValue::Float(Some(f)) => AttributeValue::Float(f as f64),
        FieldValue::Double(d) => AttributeValue::Float(d),
        FieldValue::Currency(c) => AttributeValue::Float(c),
        FieldValue::Integer(i) => AttributeValue::Integer(i as i64),
        FieldValue::Logical(Some(b)) => AttributeValue::Bool(b),
        FieldValue::Date(Some(d)) => AttributeValue::String(format!(
            "{:04}-{:02}-{:02}",
            d.year(),
            d.month(),
            d.day()
        )),
        FieldValue::Character(None)
        | FieldValue::Numeric(None)
        | FieldValue::Float(None)
        | FieldValue::Logical(None)
        | FieldValue::Date(None) => AttributeValue::Null,
        other => AttributeValue::String(format!("{other:?}")),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout:  header row with column names.
/// The `geometry` column holds WKT, e.g. `"POLYGON ((0 0, 1 0, 1 1, 0 0))"`;
/// an empty cell is a null geometry. All other columns are attributes.
fn load_csv(path: &Path) -> Result<GeoRecordSet, LoadError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let geometry_idx = headers.iter().position(|h| h == GEOMETRY_COLUMN);
    let column_names: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != geometry_idx)
        .map(|(_, h)| h.clone())
        .collect();

    let mut records = Vec::new();

    for (row, result) in reader.records().enumerate() {
        let record = result?;

        let geometry = match geometry_idx.and_then(|i| record.get(i)).map(str::trim) {
            None | Some("") => None,
            Some(wkt_str) => Some(Geometry::<f64>::try_from_wkt_str(wkt_str).map_err(|e| {
                LoadError::Wkt {
                    row,
                    message: e.to_string(),
                }
            })?),
        };

        let attributes = record
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != geometry_idx)
            .map(|(i, value)| (headers[i].clone(), guess_attribute_type(value)))
            .collect();

        records.push(GeoRecord::new(geometry, attributes));
    }

    Ok(GeoRecordSet::new(records, column_names, geometry_idx.is_some()))
}

fn guess_attribute_type(s: &str) -> AttributeValue {
    if s.is_empty() {
        return AttributeValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return AttributeValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return AttributeValue::Float(f);
    }
    if s == "true" || s == "false" {
        return AttributeValue::Bool(s == "true");
    }
    AttributeValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// GeoParquet loader
// ---------------------------------------------------------------------------

/// Load a GeoParquet file.
///
/// Expected schema:
/// - `geometry`: Binary or LargeBinary holding WKB (nullable)
/// - Any other columns are attributes (strings, ints, floats, bools)
fn load_parquet(path: &Path) -> Result<GeoRecordSet, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let schema = builder.schema().clone();
    let geometry_idx = schema.index_of(GEOMETRY_COLUMN).ok();
    let attr_cols: Vec<(usize, String)> = schema
        .fields()
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != geometry_idx)
        .map(|(i, f)| (i, f.name().clone()))
        .collect();

    let reader = builder.build()?;
    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;

        for row in 0..batch.num_rows() {
            let geometry = match geometry_idx {
                Some(idx) => extract_wkb(batch.column(idx), row, records.len())?,
                None => None,
            };

            let attributes = attr_cols
                .iter()
                .map(|(col_idx, col_name)| {
                    (col_name.clone(), extract_attribute(batch.column(*col_idx), row))
                })
                .collect();

            records.push(GeoRecord::new(geometry, attributes));
        }
    }

    let column_names = attr_cols.into_iter().map(|(_, name)| name).collect();
    Ok(GeoRecordSet::new(records, column_names, geometry_idx.is_some()))
}

// -- Parquet / Arrow helpers --

/// Decode the WKB cell at `row`; `record` is the absolute record number.
fn extract_wkb(
    col: &Arc<dyn Array>,
    row: usize,
    record: usize,
) -> Result<Option<Geometry<f64>>, LoadError> {
    if col.is_null(row) {
        return Ok(None);
    }
    let bytes = if let Some(arr) = col.as_any().downcast_ref::<BinaryArray>() {
        arr.value(row)
    } else if let Some(arr) = col.as_any().downcast_ref::<LargeBinaryArray>() {
        arr.value(row)
    } else {
        return Err(LoadError::InvalidGeometry {
            row: record,
            message: format!("geometry column has type {:?}, expected WKB binary", col.data_type()),
        });
    };

    Wkb(bytes.to_vec())
        .to_geo()
        .map(Some)
        .map_err(|source| LoadError::Wkb {
            row: record,
            source,
        })
}

/// Extract a single attribute value from an Arrow column at a given row.
fn extract_attribute(col: &Arc<dyn Array>, row: usize) -> AttributeValue {
    if col.is_null(row) {
        return AttributeValue::Null;
    }
    let any = col.as_any();
    match col.data_type() {
        DataType::Utf8 => AttributeValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => {
            AttributeValue::String(col.as_string::<i64>().value(row).to_string())
        }
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| AttributeValue::Integer(a.value(row) as i64))
            .unwrap_or(AttributeValue::Null),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| AttributeValue::Integer(a.value(row)))
            .unwrap_or(AttributeValue::Null),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| AttributeValue::Float(a.value(row) as f64))
            .unwrap_or(AttributeValue::Null),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| AttributeValue::Float(a.value(row)))
            .unwrap_or(AttributeValue::Null),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map(|a| AttributeValue::Bool(a.value(row)))
            .unwrap_or(AttributeValue::Null),
        _ => AttributeValue::String(
            arrow::util::display::array_value_to_string(col, row)
                .unwrap_or_else(|_| format!("{:?}", col.data_type())),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use geo::polygon;

    use arrow::array::{ArrayRef, BinaryBuilder, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    fn write_fixture(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        tmp.write_all(contents.as_bytes()).unwrap();
        tmp.flush().unwrap();
        tmp
    }

    const LOTS_GEOJSON: &str = r#"{
      "type": "FeatureCollection",
      "features": [
        { "type": "Feature",
          "geometry": { "type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]] },
          "properties": { "status": "empty", "parcel": 1 } },
        { "type": "Feature",
          "geometry": null,
          "properties": { "status": "occupied", "area": 12.5, "parcel": 2 } }
      ]
    }"#;

    #[test]
    fn test_load_geojson_feature_collection() {
        let tmp = write_fixture(".geojson", LOTS_GEOJSON);
        let set = load_file(tmp.path()).unwrap();

        assert_eq!(set.len(), 2);
        assert!(set.has_column(GEOMETRY_COLUMN));
        assert_eq!(set.column_names(), ["status", "parcel", "area"]);

        let first = &set.records()[0];
        assert!(matches!(first.geometry, Some(Geometry::Polygon(_))));
        assert_eq!(first.attribute("parcel"), &AttributeValue::Integer(1));

        let second = &set.records()[1];
        assert!(second.geometry.is_none());
        assert_eq!(second.attribute("area"), &AttributeValue::Float(12.5));
    }

    #[test]
    fn test_load_geojson_bare_geometry() {
        let tmp = write_fixture(".json", r#"{ "type": "Point", "coordinates": [3.0, 4.0] }"#);
        let set = load_file(tmp.path()).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.column_names().is_empty());
        assert!(matches!(set.records()[0].geometry, Some(Geometry::Point(_))));
    }

    #[test]
    fn test_malformed_geojson_is_an_error() {
        let tmp = write_fixture(".geojson", "{ not json");
        assert!(matches!(load_file(tmp.path()), Err(LoadError::GeoJson(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_file(Path::new("/nonexistent/lots.geojson")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_unsupported_extension() {
        let tmp = write_fixture(".gpkg", "");
        match load_file(tmp.path()) {
            Err(LoadError::UnsupportedFormat(ext)) => assert_eq!(ext, "gpkg"),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
    }

    #[test]
    fn test_load_csv_with_wkt() {
        let tmp = write_fixture(
            ".csv",
            "parcel,status,geometry\n\
             1,empty,\"POLYGON ((0 0, 1 0, 1 1, 0 0))\"\n\
             2,occupied,\n\
             3,,POINT (2 3)\n",
        );
        let set = load_file(tmp.path()).unwrap();

        assert_eq!(set.len(), 3);
        assert!(set.has_column(GEOMETRY_COLUMN));
        assert_eq!(set.column_names(), ["parcel", "status"]);
        assert!(matches!(set.records()[0].geometry, Some(Geometry::Polygon(_))));
        assert!(set.records()[1].geometry.is_none());
        assert!(set.records()[2].attribute("status").is_null());
        assert_eq!(set.records()[2].attribute("parcel"), &AttributeValue::Integer(3));
    }

    #[test]
    fn test_csv_without_geometry_column() {
        let tmp = write_fixture(".csv", "parcel,status\n1,empty\n");
        let set = load_file(tmp.path()).unwrap();
        assert!(!set.has_column(GEOMETRY_COLUMN));
        assert!(set.has_column("status"));
    }

    #[test]
    fn test_csv_bad_wkt_reports_row() {
        let tmp = write_fixture(".csv", "status,geometry\nempty,POLYGON ((0 0\n");
        assert!(matches!(load_file(tmp.path()), Err(LoadError::Wkt { row: 0, .. })));
    }

    #[test]
    fn test_guess_attribute_type() {
        assert_eq!(guess_attribute_type(""), AttributeValue::Null);
        assert_eq!(guess_attribute_type("42"), AttributeValue::Integer(42));
        assert_eq!(guess_attribute_type("4.5"), AttributeValue::Float(4.5));
        assert_eq!(guess_attribute_type("true"), AttributeValue::Bool(true));
        assert_eq!(
            guess_attribute_type("empty"),
            AttributeValue::String("empty".to_string())
        );
    }

    #[test]
    fn test_load_geoparquet() {
        let square = Geometry::Polygon(geo::polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 0.0),
        ]);
        let mut wkb_bytes = Vec::new();
        let options = wkb::writer::WriteOptions {
            endianness: wkb::Endianness::LittleEndian,
        };
        wkb::writer::write_geometry(&mut wkb_bytes, &square, &options).unwrap();

        let mut geometry = BinaryBuilder::new();
        geometry.append_value(&wkb_bytes);
        geometry.append_null();
        let status = StringArray::from(vec![Some("empty"), None]);

        let schema = Arc::new(Schema::new(vec![
            Field::new("status", DataType::Utf8, true),
            Field::new(GEOMETRY_COLUMN, DataType::Binary, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![Arc::new(status) as ArrayRef, Arc::new(geometry.finish())],
        )
        .unwrap();

        let tmp = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(tmp.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let set = load_file(tmp.path()).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.column_names(), ["status"]);
        assert_eq!(set.records()[0].geometry, Some(square));
        assert!(set.records()[1].geometry.is_none());
        assert!(set.records()[1].attribute("status").is_null());
    }

    #[test]
    fn test_load_shapefile() {
        use shapefile::dbase::{Record, TableWriterBuilder};
        use shapefile::{Point, Polygon, PolygonRing};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lots.shp");

        let table = TableWriterBuilder::new()
            .add_character_field("zeta".try_into().unwrap(), 8)
            .add_character_field("status".try_into().unwrap(), 16)
            .add_character_field("alpha".try_into().unwrap(), 8);
        let mut writer = shapefile::Writer::from_path(&path, table).unwrap();

        for (x, status) in [(0.0, "empty"), (2.0, "occupied")] {
            let polygon = Polygon::new(PolygonRing::Outer(vec![
                Point::new(x, 0.0),
                Point::new(x, 1.0),
                Point::new(x + 1.0, 1.0),
                Point::new(x + 1.0, 0.0),
                Point::new(x, 0.0),
            ]));
            let mut record = Record::default();
            record.insert("zeta".to_string(), FieldValue::Character(Some("z".to_string())));
            record.insert(
                "status".to_string(),
                FieldValue::Character(Some(status.to_string())),
            );
            record.insert("alpha".to_string(), FieldValue::Character(Some("a".to_string())));
            writer.write_shape_and_record(&polygon, &record).unwrap();
        }
        drop(writer);

        let set = load_file(&path).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.column_names(), ["zeta", "status", "alpha"]);
        assert_eq!(set.records()[0].attribute("status").as_str(), Some("empty"));
        assert!(set.records()[1].geometry.is_some());
    }
}
