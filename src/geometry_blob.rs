use crate::error::{Result, SpatialError};
use geo_traits::to_geo::ToGeoGeometry;
use geo_types::{Geometry, GeometryCollection, LineString, Polygon};
use wkb::reader::Wkb;

const HEADER_LEN: usize = 8;

/// Strip the binary header and envelope bytes to access raw WKB.
///
/// The header is `GP`, a version byte, a flags byte and the SRS id. The layout
/// follows the GeoPackage binary geometry encoding.
// cf. https://www.geopackage.org/spec140/index.html#gpb_format
pub(crate) fn blob_to_wkb(b: &[u8]) -> Result<Wkb<'_>> {
    if b.len() < HEADER_LEN {
        return Err(SpatialError::InvalidGeometryBlob(format!(
            "got {} bytes, expected at least {HEADER_LEN}",
            b.len()
        )));
    }
    if &b[0..2] != b"GP" {
        return Err(SpatialError::InvalidGeometryBlob(
            "missing GP magic".to_string(),
        ));
    }

    let flags = b[3];
    let envelope_size: usize = match flags & 0b00001110 {
        0b00000000 => 0,  // no envelope
        0b00000010 => 32, // [minx, maxx, miny, maxy]
        0b00000100 => 48, // [minx, maxx, miny, maxy, minz, maxz]
        0b00000110 => 48, // [minx, maxx, miny, maxy, minm, maxm]
        0b00001000 => 64, // [minx, maxx, miny, maxy, minz, maxz, minm, maxm]
        _ => {
            return Err(SpatialError::InvalidGeometryBlob(format!(
                "invalid flags: {flags:#04x}"
            )));
        }
    };
    let offset = HEADER_LEN + envelope_size;
    if b.len() <= offset {
        return Err(SpatialError::InvalidGeometryBlob(format!(
            "got {} bytes, envelope requires {offset}",
            b.len()
        )));
    }

    Ok(Wkb::try_new(&b[offset..])?)
}

/// SRS id stored in the blob header.
pub(crate) fn blob_srs_id(b: &[u8]) -> Result<i32> {
    if b.len() < HEADER_LEN {
        return Err(SpatialError::InvalidGeometryBlob(format!(
            "got {} bytes, expected at least {HEADER_LEN}",
            b.len()
        )));
    }
    let bytes = [b[4], b[5], b[6], b[7]];
    if b[3] & 0b00000001 == 1 {
        Ok(i32::from_le_bytes(bytes))
    } else {
        Ok(i32::from_be_bytes(bytes))
    }
}

/// Decode an engine-native geometry value.
pub(crate) fn decode_geometry(b: &[u8]) -> Result<Geometry<f64>> {
    let wkb = blob_to_wkb(b)?;
    wkb.try_to_geometry().ok_or_else(|| {
        SpatialError::InvalidGeometryBlob("empty point cannot be represented".to_string())
    })
}

/// Encode a geometry as an engine-native geometry value.
pub(crate) fn encode_geometry(geom: &Geometry<f64>, srs_id: i32) -> Result<Vec<u8>> {
    let geom = normalize(geom.clone());
    let mut wkb = Vec::new();
    wkb::writer::write_geometry(&mut wkb, &geom, &Default::default())?;

    let mut blob = Vec::with_capacity(wkb.len() + HEADER_LEN);
    blob.extend_from_slice(&[
        0x47u8, // magic
        0x50u8, // magic
        0x00u8, // version
        0x01u8, // flags (little endian SRS ID, no envelope)
    ]);
    blob.extend_from_slice(&srs_id.to_le_bytes());
    blob.extend_from_slice(&wkb);

    Ok(blob)
}

/// Replace the `geo_types`-only variants with their OGC equivalents so every
/// geometry has a WKB, WKT and GeoJSON form.
pub(crate) fn normalize(geom: Geometry<f64>) -> Geometry<f64> {
    match geom {
        Geometry::Line(line) => Geometry::LineString(LineString::from(vec![line.start, line.end])),
        Geometry::Rect(rect) => Geometry::Polygon(rect.to_polygon()),
        Geometry::Triangle(triangle) => Geometry::Polygon(triangle.to_polygon()),
        Geometry::GeometryCollection(collection) => {
            Geometry::GeometryCollection(GeometryCollection::from(
                collection.0.into_iter().map(normalize).collect::<Vec<_>>(),
            ))
        }
        other => other,
    }
}

/// Areal geometries as polygons, for the overlay operations.
pub(crate) fn polygons(geom: &Geometry<f64>) -> Option<Vec<Polygon<f64>>> {
    match geom {
        Geometry::Polygon(p) => Some(vec![p.clone()]),
        Geometry::MultiPolygon(mp) => Some(mp.0.clone()),
        Geometry::Rect(r) => Some(vec![r.to_polygon()]),
        Geometry::Triangle(t) => Some(vec![t.to_polygon()]),
        _ => None,
    }
}

pub(crate) fn geometry_type_name(geom: &Geometry<f64>) -> &'static str {
    match geom {
        Geometry::Point(_) => "POINT",
        Geometry::Line(_) | Geometry::LineString(_) => "LINESTRING",
        Geometry::Polygon(_) | Geometry::Rect(_) | Geometry::Triangle(_) => "POLYGON",
        Geometry::MultiPoint(_) => "MULTIPOINT",
        Geometry::MultiLineString(_) => "MULTILINESTRING",
        Geometry::MultiPolygon(_) => "MULTIPOLYGON",
        Geometry::GeometryCollection(_) => "GEOMETRYCOLLECTION",
    }
}
