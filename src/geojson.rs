use crate::geometry_blob::normalize;
use geo_types::{Coord, Geometry, LineString, Polygon};
use serde_json::{Value, json};

/// Render a geometry as a GeoJSON geometry object.
pub(crate) fn geometry_to_geojson(geom: &Geometry<f64>) -> Value {
    match normalize(geom.clone()) {
        Geometry::Point(p) => json!({
            "type": "Point",
            "coordinates": position(&p.0),
        }),
        Geometry::LineString(line) => json!({
            "type": "LineString",
            "coordinates": positions(&line),
        }),
        Geometry::Polygon(poly) => json!({
            "type": "Polygon",
            "coordinates": rings(&poly),
        }),
        Geometry::MultiPoint(mp) => json!({
            "type": "MultiPoint",
            "coordinates": mp.0.iter().map(|p| position(&p.0)).collect::<Vec<_>>(),
        }),
        Geometry::MultiLineString(mls) => json!({
            "type": "MultiLineString",
            "coordinates": mls.0.iter().map(positions).collect::<Vec<_>>(),
        }),
        Geometry::MultiPolygon(mp) => json!({
            "type": "MultiPolygon",
            "coordinates": mp.0.iter().map(rings).collect::<Vec<_>>(),
        }),
        Geometry::GeometryCollection(collection) => json!({
            "type": "GeometryCollection",
            "geometries": collection.0.iter().map(geometry_to_geojson).collect::<Vec<_>>(),
        }),
        // `normalize` leaves none of these behind.
        Geometry::Line(_) | Geometry::Rect(_) | Geometry::Triangle(_) => Value::Null,
    }
}

fn position(c: &Coord<f64>) -> Value {
    json!([c.x, c.y])
}

fn positions(line: &LineString<f64>) -> Vec<Value> {
    line.0.iter().map(position).collect()
}

fn rings(poly: &Polygon<f64>) -> Vec<Vec<Value>> {
    std::iter::once(poly.exterior())
        .chain(poly.interiors())
        .map(positions)
        .collect()
}
