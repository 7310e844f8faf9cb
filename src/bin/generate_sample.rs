use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, BinaryBuilder, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use geo::{polygon, Geometry};
use geojson::{Feature, FeatureCollection, GeoJson, JsonObject};
use parquet::arrow::ArrowWriter;
use serde::Serialize;

const STATUSES: [&str; 3] = ["empty", "occupied", "under_construction"];
const SEED: u64 = 42;
const GEOJSON_OUTPUT: &str = "sample_lots.geojson";
const PARQUET_OUTPUT: &str = "sample_lots.parquet";

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// One generated parcel.
struct Lot {
    id: i64,
    status: &'static str,
    area: f64,
    geometry: Option<Geometry<f64>>,
}

/// The `geo` metadata key GeoParquet readers look for.
#[derive(Serialize)]
struct GeoParquetMetadata {
    version: &'static str,
    primary_column: &'static str,
    columns: HashMap<&'static str, GeoParquetColumn>,
}

#[derive(Serialize)]
struct GeoParquetColumn {
    encoding: &'static str,
    geometry_types: Vec<&'static str>,
}

/// A block of 6 x 4 parcels of jittered width; the last one has no geometry.
fn generate_lots(rng: &mut SimpleRng) -> Vec<Lot> {
    let mut lots = Vec::new();
    let mut id = 0;
    for row in 0..4 {
        let mut x = 0.0;
        let y = row as f64 * 12.0;
        for _ in 0..6 {
            let width = 8.0 + rng.next_f64() * 6.0;
            let depth = 10.0;
            let geometry = Geometry::Polygon(polygon![
                (x: x, y: y),
                (x: x + width, y: y),
                (x: x + width, y: y + depth),
                (x: x, y: y + depth),
                (x: x, y: y),
            ]);
            lots.push(Lot {
                id,
                status: rng.pick(&STATUSES),
                area: width * depth,
                geometry: Some(geometry),
            });
            x += width + 1.0;
            id += 1;
        }
    }
    lots.push(Lot {
        id,
        status: "empty",
        area: 0.0,
        geometry: None,
    });
    lots
}

fn write_geojson(lots: &[Lot], output_path: &Path) -> Result<()> {
    let features = lots
        .iter()
        .map(|lot| {
            let mut properties = JsonObject::new();
            properties.insert("id".to_string(), lot.id.into());
            properties.insert("status".to_string(), lot.status.into());
            properties.insert("area".to_string(), lot.area.into());
            Feature {
                bbox: None,
                geometry: lot.geometry.as_ref().map(geojson::Geometry::from),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    let collection = GeoJson::FeatureCollection(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    });
    std::fs::write(output_path, collection.to_string())
        .with_context(|| format!("writing {}", output_path.display()))
}

fn write_geoparquet(lots: &[Lot], output_path: &Path) -> Result<()> {
    let options = wkb::writer::WriteOptions {
        endianness: wkb::Endianness::LittleEndian,
    };
    let mut geometry = BinaryBuilder::new();
    for lot in lots {
        match &lot.geometry {
            Some(g) => {
                let mut bytes = Vec::new();
                wkb::writer::write_geometry(&mut bytes, g, &options)
                    .with_context(|| format!("encoding lot {} as WKB", lot.id))?;
                geometry.append_value(&bytes);
            }
            None => geometry.append_null(),
        }
    }

    let metadata = GeoParquetMetadata {
        version: "1.1.0",
        primary_column: "geometry",
        columns: HashMap::from([(
            "geometry",
            GeoParquetColumn {
                encoding: "WKB",
                geometry_types: vec!["Polygon"],
            },
        )]),
    };
    let schema = Arc::new(
        Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("status", DataType::Utf8, false),
            Field::new("area", DataType::Float64, false),
            Field::new("geometry", DataType::Binary, true),
        ])
        .with_metadata(HashMap::from([(
            "geo".to_string(),
            serde_json::to_string(&metadata)?,
        )])),
    );

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from_iter_values(lots.iter().map(|l| l.id))) as ArrayRef,
            Arc::new(StringArray::from_iter_values(lots.iter().map(|l| l.status))),
            Arc::new(Float64Array::from_iter_values(lots.iter().map(|l| l.area))),
            Arc::new(geometry.finish()),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(output_path)
        .with_context(|| format!("creating {}", output_path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(SEED);
    let lots = generate_lots(&mut rng);
    let n_empty = lots.iter().filter(|l| l.status == "empty").count();

    write_geojson(&lots, Path::new(GEOJSON_OUTPUT))?;
    write_geoparquet(&lots, Path::new(PARQUET_OUTPUT))?;

    println!(
        "Wrote {} lots ({n_empty} empty) to {GEOJSON_OUTPUT} and {PARQUET_OUTPUT}",
        lots.len()
    );
    Ok(())
}
