use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use geo::{BoundingRect, Geometry, Rect};
use wkt::ToWkt;

/// Name of the column holding each record's geometry.
pub const GEOMETRY_COLUMN: &str = "geometry";

// ---------------------------------------------------------------------------
// AttributeValue – a single cell in an attribute column
// ---------------------------------------------------------------------------

/// A dynamically-typed attribute value as found in vector file properties.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::String(s) => write!(f, "{s}"),
            AttributeValue::Integer(i) => write!(f, "{i}"),
            AttributeValue::Float(v) => write!(f, "{v}"),
            AttributeValue::Bool(b) => write!(f, "{b}"),
            AttributeValue::Null => write!(f, "None"),
        }
    }
}

impl AttributeValue {
    /// The string payload, if this is a `String` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }
}

// ---------------------------------------------------------------------------
// GeoRecord – one feature / row
// ---------------------------------------------------------------------------

/// A single feature: an optional geometry plus its named attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoRecord {
    /// `None` when the source stored a null geometry.
    pub geometry: Option<Geometry<f64>>,
    /// Attribute columns: column_name → value.
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl GeoRecord {
    pub fn new(geometry: Option<Geometry<f64>>, attributes: BTreeMap<String, AttributeValue>) -> Self {
        Self {
            geometry,
            attributes,
        }
    }

    /// Attribute lookup; a missing column reads as `Null`.
    pub fn attribute(&self, column: &str) -> &AttributeValue {
        self.attributes.get(column).unwrap_or(&AttributeValue::Null)
    }

    /// WKT rendering of the geometry, `None` for a null geometry.
    pub fn geometry_wkt(&self) -> String {
        match &self.geometry {
            Some(g) => g.wkt_string(),
            None => "None".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// GeoRecordSet – the complete loaded dataset
// ---------------------------------------------------------------------------

/// An ordered set of records with the column layout of the file they came
/// from. Read-only once built; filtering produces a new set.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoRecordSet {
    records: Vec<GeoRecord>,
    /// Attribute column names in source order (excludes `geometry`).
    column_names: Vec<String>,
    /// Whether the source carried a geometry column at all.
    has_geometry_column: bool,
}

impl GeoRecordSet {
    pub fn new(records: Vec<GeoRecord>, column_names: Vec<String>, has_geometry_column: bool) -> Self {
        GeoRecordSet {
            records,
            column_names,
            has_geometry_column,
        }
    }

    /// A new set with the same column layout holding `records`.
    pub fn with_records(&self, records: Vec<GeoRecord>) -> Self {
        GeoRecordSet {
            records,
            column_names: self.column_names.clone(),
            has_geometry_column: self.has_geometry_column,
        }
    }

    pub fn records(&self) -> &[GeoRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<GeoRecord> {
        self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GeoRecord> {
        self.records.iter()
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn has_column(&self, name: &str) -> bool {
        if name == GEOMETRY_COLUMN {
            self.has_geometry_column
        } else {
            self.column_names.iter().any(|c| c == name)
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the set holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Bounding rectangle over every non-null geometry.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.records
            .iter()
            .filter_map(|r| r.geometry.as_ref()?.bounding_rect())
            .reduce(|a, b| {
                Rect::new(
                    geo::coord! { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                    geo::coord! { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
                )
            })
    }

    /// Render the set as an arrow batch of string columns, one row per
    /// record, for printing.
    fn to_display_batch(&self) -> Result<RecordBatch, arrow::error::ArrowError> {
        let mut fields = vec![Field::new("", DataType::Utf8, false)];
        let mut columns: Vec<ArrayRef> = vec![Arc::new(StringArray::from_iter_values(
            (0..self.records.len()).map(|i| i.to_string()),
        ))];

        for col in &self.column_names {
            fields.push(Field::new(col, DataType::Utf8, false));
            columns.push(Arc::new(StringArray::from_iter_values(
                self.records.iter().map(|r| r.attribute(col).to_string()),
            )));
        }

        if self.has_geometry_column {
            fields.push(Field::new(GEOMETRY_COLUMN, DataType::Utf8, false));
            columns.push(Arc::new(StringArray::from_iter_values(
                self.records.iter().map(GeoRecord::geometry_wkt),
            )));
        }

        RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)
    }
}

impl fmt::Display for GeoRecordSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n_columns = self.column_names.len() + usize::from(self.has_geometry_column);
        if self.records.is_empty() {
            writeln!(f, "Empty GeoRecordSet")?;
            let mut columns: Vec<&str> = self.column_names.iter().map(String::as_str).collect();
            if self.has_geometry_column {
                columns.push(GEOMETRY_COLUMN);
            }
            writeln!(f, "Columns: [{}]", columns.join(", "))?;
        } else {
            let batch = self.to_display_batch().map_err(|_| fmt::Error)?;
            let table = pretty_format_batches(&[batch]).map_err(|_| fmt::Error)?;
            writeln!(f, "{table}")?;
        }
        write!(f, "[{} rows x {} columns]", self.records.len(), n_columns)
    }
}
