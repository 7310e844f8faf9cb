use clap::ValueEnum;
use geo::{Geometry, HasDimensions, LineString, Polygon};

use super::model::GeoRecordSet;
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Polygon coercion
// ---------------------------------------------------------------------------

/// How non-null geometries are normalised before filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CoercionPolicy {
    /// Keep every geometry as loaded.
    Off,
    /// Turn polygon-like shapes into polygons and leave the rest alone.
    #[default]
    Polygonal,
    /// Like `polygonal`, but any shape that is not polygon-like is an error.
    Strict,
}

/// Short geometry type name used in messages.
pub fn kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// A closed ring needs at least four coordinates (first == last).
fn is_ring(ls: &LineString<f64>) -> bool {
    ls.0.len() >= 4 && ls.is_closed()
}

/// Whether `geometry` already describes an area bounded by rings.
pub fn is_polygon_like(geometry: &Geometry<f64>) -> bool {
    match geometry {
        Geometry::Polygon(_)
        | Geometry::MultiPolygon(_)
        | Geometry::Rect(_)
        | Geometry::Triangle(_) => true,
        Geometry::LineString(ls) => is_ring(ls),
        _ => false,
    }
}

/// Polygon form of a polygon-like geometry. Anything else comes back
/// unchanged in `Err`.
fn to_polygon(geometry: Geometry<f64>) -> Result<Geometry<f64>, Geometry<f64>> {
    match geometry {
        Geometry::Polygon(p) => Ok(Geometry::Polygon(p)),
        Geometry::Rect(r) => Ok(Geometry::Polygon(r.to_polygon())),
        Geometry::Triangle(t) => Ok(Geometry::Polygon(t.to_polygon())),
        Geometry::LineString(ls) if is_ring(&ls) => Ok(Geometry::Polygon(Polygon::new(ls, vec![]))),
        Geometry::MultiPolygon(mut mp) if mp.0.len() == 1 => {
            Ok(Geometry::Polygon(mp.0.remove(0)))
        }
        // Several members are kept together: still polygon-like.
        Geometry::MultiPolygon(mp) => Ok(Geometry::MultiPolygon(mp)),
        other => Err(other),
    }
}

/// Coerce a single geometry under `policy`. `row` is only used for errors.
///
/// Except under [`CoercionPolicy::Off`], an empty geometry (e.g.
/// `POLYGON EMPTY`) becomes a null geometry.
pub fn coerce(
    geometry: Option<Geometry<f64>>,
    policy: CoercionPolicy,
    row: usize,
) -> Result<Option<Geometry<f64>>, LoadError> {
    let Some(geometry) = geometry else {
        return Ok(None);
    };
    if policy == CoercionPolicy::Off {
        return Ok(Some(geometry));
    }
    if geometry.is_empty() {
        log::debug!("row {row}: empty {} geometry treated as null", kind(&geometry));
        return Ok(None);
    }
    match to_polygon(geometry) {
        Ok(polygon) => Ok(Some(polygon)),
        Err(other) if policy == CoercionPolicy::Strict => Err(LoadError::Coercion {
            row,
            kind: kind(&other),
        }),
        Err(other) => {
            log::debug!("row {row}: leaving {} geometry as is", kind(&other));
            Ok(Some(other))
        }
    }
}

/// Apply [`coerce`] to every record, producing a new set.
pub fn coerce_all(set: GeoRecordSet, policy: CoercionPolicy) -> Result<GeoRecordSet, LoadError> {
    if policy == CoercionPolicy::Off {
        return Ok(set);
    }
    let layout = set.with_records(Vec::new());
    let records = set
        .into_records()
        .into_iter()
        .enumerate()
        .map(|(row, mut record)| {
            record.geometry = coerce(record.geometry.take(), policy, row)?;
            Ok(record)
        })
        .collect::<Result<Vec<_>, LoadError>>()?;
    Ok(layout.with_records(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, polygon, Coord, MultiPolygon, Point, Rect};

    fn unit_square() -> Polygon<f64> {
        polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
            (x: 0.0, y: 0.0),
        ]
    }

    #[test]
    fn test_polygon_is_identity() {
        for policy in [CoercionPolicy::Off, CoercionPolicy::Polygonal, CoercionPolicy::Strict] {
            let g = Geometry::Polygon(unit_square());
            let out = coerce(Some(g.clone()), policy, 0).unwrap();
            assert_eq!(out, Some(g));
        }
    }

    #[test]
    fn test_null_stays_null() {
        for policy in [CoercionPolicy::Off, CoercionPolicy::Polygonal, CoercionPolicy::Strict] {
            assert_eq!(coerce(None, policy, 3).unwrap(), None);
        }
    }

    #[test]
    fn test_empty_geometry_becomes_null() {
        let empty = Geometry::Polygon(Polygon::new(LineString::new(vec![]), vec![]));
        for policy in [CoercionPolicy::Polygonal, CoercionPolicy::Strict] {
            assert_eq!(coerce(Some(empty.clone()), policy, 0).unwrap(), None);
        }
        let kept = coerce(Some(empty.clone()), CoercionPolicy::Off, 0).unwrap();
        assert_eq!(kept, Some(empty));
    }

    #[test]
    fn test_closed_ring_becomes_polygon() {
        let ring = line_string![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
            (x: 0.0, y: 0.0),
        ];
        let out = coerce(Some(Geometry::LineString(ring)), CoercionPolicy::Polygonal, 0).unwrap();
        assert_eq!(out, Some(Geometry::Polygon(unit_square())));
    }

    #[test]
    fn test_open_line_left_alone_by_polygonal() {
        let line = Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 4.0, y: 2.0)]);
        let out = coerce(Some(line.clone()), CoercionPolicy::Polygonal, 0).unwrap();
        assert_eq!(out, Some(line));
    }

    #[test]
    fn test_point_rejected_by_strict() {
        let point = Geometry::Point(Point::new(1.0, 2.0));
        let err = coerce(Some(point.clone()), CoercionPolicy::Strict, 7).unwrap_err();
        assert!(matches!(err, LoadError::Coercion { row: 7, kind: "Point" }));

        let out = coerce(Some(point.clone()), CoercionPolicy::Polygonal, 7).unwrap();
        assert_eq!(out, Some(point));
    }

    #[test]
    fn test_single_member_multipolygon_unwrapped() {
        let mp = Geometry::MultiPolygon(MultiPolygon(vec![unit_square()]));
        let out = coerce(Some(mp), CoercionPolicy::Strict, 0).unwrap();
        assert_eq!(out, Some(Geometry::Polygon(unit_square())));
    }

    #[test]
    fn test_rect_becomes_polygon() {
        let rect = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 2.0, y: 1.0 });
        let out = coerce(Some(Geometry::Rect(rect)), CoercionPolicy::Polygonal, 0).unwrap();
        assert_eq!(out, Some(Geometry::Polygon(rect.to_polygon())));
    }

    #[test]
    fn test_polygon_like_detection() {
        assert!(is_polygon_like(&Geometry::Polygon(unit_square())));
        assert!(!is_polygon_like(&Geometry::Point(Point::new(0.0, 0.0))));
        assert!(!is_polygon_like(&Geometry::LineString(line_string![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 0.0, y: 0.0),
        ])));
    }
}
