use crate::error::{Result, SpatialError};
use crate::geojson::geometry_to_geojson;
use crate::geometry_blob::{
    blob_srs_id, decode_geometry, encode_geometry, geometry_type_name, normalize, polygons,
};
use geo::{
    Area, BooleanOps, BoundingRect, Buffer, Centroid, ConvexHull, CoordsIter, Distance, Euclidean,
    Length, Relate, Validation,
};
use geo_types::{Coord, Geometry, LineString, MultiPolygon, Point, Polygon, Rect, coord};
use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::types::{ToSql, Type, ValueRef};
use rusqlite::{Connection, Error};
use wkt::{ToWkt, TryFromWkt};

/// Register all spatial SQL functions in the provided connection.
///
/// Registering again replaces the previous definitions, so calling this more
/// than once on the same connection is harmless.
///
/// Example:
/// ```no_run
/// use rusqlite::Connection;
/// use spatial_client::register_spatial_functions;
///
/// let conn = Connection::open_in_memory()?;
/// register_spatial_functions(&conn)?;
/// let wkt: String = conn.query_row("SELECT ST_AsText(ST_Point(1, 2))", [], |row| row.get(0))?;
/// assert_eq!(wkt, "POINT(1 2)");
/// # Ok::<(), spatial_client::SpatialError>(())
/// ```
pub fn register_spatial_functions(conn: &Connection) -> Result<()> {
    // constructors
    register_st_point(conn)?;
    register_st_geom_from_text(conn)?;
    register_st_makeline(conn)?;
    register_st_makepolygon(conn)?;
    register_st_make_envelope(conn)?;

    // accessors
    register_unary(conn, "ST_X", |g| point_of(g, "ST_X").map(|p| p.x()))?;
    register_unary(conn, "ST_Y", |g| point_of(g, "ST_Y").map(|p| p.y()))?;
    register_unary(conn, "ST_Area", |g| Ok(g.unsigned_area()))?;
    register_unary(conn, "ST_Length", |g| Ok(euclidean_length(g)))?;
    register_unary(conn, "ST_NPoints", |g| Ok(g.coords_count() as i64))?;
    register_unary(conn, "ST_IsValid", |g| Ok(g.is_valid()))?;
    register_unary(conn, "ST_IsEmpty", |g| Ok(g.bounding_rect().is_none()))?;
    register_unary(conn, "ST_GeometryType", |g| {
        Ok(geometry_type_name(g).to_string())
    })?;
    register_unary_optional(conn, "ST_Centroid", |g| match g.centroid() {
        Some(c) => encode_geometry(&Geometry::Point(c), 0).map(Some),
        None => Ok(None),
    })?;
    register_st_srid(conn)?;
    register_st_minx(conn)?;
    register_st_miny(conn)?;
    register_st_maxx(conn)?;
    register_st_maxy(conn)?;

    // relationships
    register_binary(conn, "ST_Intersects", |a, b| Ok(a.relate(b).is_intersects()))?;
    register_binary(conn, "ST_Contains", |a, b| Ok(a.relate(b).is_contains()))?;
    register_binary(conn, "ST_Within", |a, b| Ok(a.relate(b).is_within()))?;
    register_binary(conn, "ST_Distance", |a, b| Ok(Euclidean.distance(a, b)))?;

    // operations
    register_binary(conn, "ST_Intersection", |a, b| {
        let (a, b) = areal_pair(a, b, "ST_Intersection")?;
        encode_geometry(&collapse(a.intersection(&b)), 0)
    })?;
    register_binary(conn, "ST_Union", |a, b| {
        let (a, b) = areal_pair(a, b, "ST_Union")?;
        encode_geometry(&collapse(a.union(&b)), 0)
    })?;
    register_st_buffer(conn)?;
    register_unary(conn, "ST_ConvexHull", |g| {
        encode_geometry(&hull_geometry(g.convex_hull()), 0)
    })?;

    // export
    register_unary(conn, "ST_AsText", |g| Ok(normalize(g.clone()).wkt_string()))?;
    register_unary(conn, "ST_AsGeoJSON", |g| {
        Ok(serde_json::to_string(&geometry_to_geojson(g))?)
    })?;

    Ok(())
}

pub(crate) fn register_st_point(conn: &Connection) -> Result<()> {
    conn.create_scalar_function("ST_Point", 2, FunctionFlags::SQLITE_DETERMINISTIC, |ctx| {
        let x = number_arg(ctx, 0)?;
        let y = number_arg(ctx, 1)?;
        Ok(encode_geometry(&Geometry::Point(Point::new(x, y)), 0)?)
    })?;
    Ok(())
}

pub(crate) fn register_st_geom_from_text(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        "ST_GeomFromText",
        1,
        FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let wkt = match ctx.get_raw(0) {
                ValueRef::Null => return Ok(None),
                ValueRef::Text(text) => std::str::from_utf8(text)
                    .map_err(|err| Error::UserFunctionError(Box::new(err)))?,
                _ => return Err(Error::InvalidFunctionParameterType(0, Type::Text)),
            };
            let geom = parse_wkt(wkt)?;
            Ok(Some(encode_geometry(&geom, 0)?))
        },
    )?;
    Ok(())
}

pub(crate) fn register_st_makeline(conn: &Connection) -> Result<()> {
    // -1: any number of arguments, so that too few points reach the error below
    // instead of failing to resolve the function.
    conn.create_scalar_function("ST_MakeLine", -1, FunctionFlags::SQLITE_DETERMINISTIC, |ctx| {
        let mut coords = Vec::with_capacity(ctx.len());
        for idx in 0..ctx.len() {
            let geom = match geometry_arg(ctx, idx)? {
                Some(geom) => geom,
                None => return Ok(None),
            };
            coords.push(point_of(&geom, "ST_MakeLine")?.0);
        }
        if coords.len() < 2 {
            return Err(SpatialError::InvalidConstruction(format!(
                "a line needs at least 2 points, got {}",
                coords.len()
            ))
            .into());
        }
        let line = Geometry::LineString(LineString::new(coords));
        Ok(Some(encode_geometry(&line, 0)?))
    })?;
    Ok(())
}

pub(crate) fn register_st_makepolygon(conn: &Connection) -> Result<()> {
    register_unary(conn, "ST_MakePolygon", |g| {
        let ring = match g {
            Geometry::LineString(ring) => ring,
            other => {
                return Err(SpatialError::UnsupportedGeometry {
                    operation: "ST_MakePolygon",
                    geometry_type: geometry_type_name(other),
                });
            }
        };
        if ring.0.len() < 4 {
            return Err(SpatialError::InvalidConstruction(format!(
                "a polygon ring needs at least 4 positions, got {}",
                ring.0.len()
            )));
        }
        if !ring.is_closed() {
            return Err(SpatialError::InvalidConstruction(
                "polygon ring is not closed".to_string(),
            ));
        }
        let polygon = geo_types::Polygon::new(ring.clone(), vec![]);
        encode_geometry(&Geometry::Polygon(polygon), 0)
    })
}

pub(crate) fn register_st_make_envelope(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        "ST_MakeEnvelope",
        4,
        FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let rect = Rect::new(
                coord! { x: number_arg(ctx, 0)?, y: number_arg(ctx, 1)? },
                coord! { x: number_arg(ctx, 2)?, y: number_arg(ctx, 3)? },
            );
            Ok(encode_geometry(&Geometry::Polygon(rect.to_polygon()), 0)?)
        },
    )?;
    Ok(())
}

pub(crate) fn register_st_buffer(conn: &Connection) -> Result<()> {
    conn.create_scalar_function("ST_Buffer", 2, FunctionFlags::SQLITE_DETERMINISTIC, |ctx| {
        let geom = match geometry_arg(ctx, 0)? {
            Some(geom) => geom,
            None => return Ok(None),
        };
        let distance = number_arg(ctx, 1)?;
        let buffered = collapse(normalize(geom).buffer(distance));
        Ok(Some(encode_geometry(&buffered, 0)?))
    })?;
    Ok(())
}

pub(crate) fn register_st_srid(conn: &Connection) -> Result<()> {
    conn.create_scalar_function("ST_SRID", 1, FunctionFlags::SQLITE_DETERMINISTIC, |ctx| {
        match ctx.get_raw(0) {
            ValueRef::Null => Ok(None),
            ValueRef::Blob(blob) => Ok(Some(blob_srs_id(blob)?)),
            ValueRef::Text(_) => Ok(Some(0)),
            _ => Err(Error::InvalidFunctionParameterType(0, Type::Blob)),
        }
    })?;
    Ok(())
}

pub(crate) fn register_st_minx(conn: &Connection) -> Result<()> {
    register_bounds_component(conn, "ST_MinX", |b| b.min().x)
}

pub(crate) fn register_st_miny(conn: &Connection) -> Result<()> {
    register_bounds_component(conn, "ST_MinY", |b| b.min().y)
}

pub(crate) fn register_st_maxx(conn: &Connection) -> Result<()> {
    register_bounds_component(conn, "ST_MaxX", |b| b.max().x)
}

pub(crate) fn register_st_maxy(conn: &Connection) -> Result<()> {
    register_bounds_component(conn, "ST_MaxY", |b| b.max().y)
}

fn register_bounds_component<F>(conn: &Connection, name: &str, f: F) -> Result<()>
where
    F: Fn(Rect<f64>) -> f64 + Copy + Send + Sync + 'static,
{
    register_unary_optional(conn, name, move |g| Ok(g.bounding_rect().map(f)))
}

fn register_unary<T, F>(conn: &Connection, name: &str, f: F) -> Result<()>
where
    T: ToSql,
    F: Fn(&Geometry<f64>) -> Result<T> + Copy + Send + Sync + 'static,
{
    register_unary_optional(conn, name, move |g| f(g).map(Some))
}

fn register_unary_optional<T, F>(conn: &Connection, name: &str, f: F) -> Result<()>
where
    T: ToSql,
    F: Fn(&Geometry<f64>) -> Result<Option<T>> + Copy + Send + Sync + 'static,
{
    conn.create_scalar_function(name, 1, FunctionFlags::SQLITE_DETERMINISTIC, move |ctx| {
        let geom = match geometry_arg(ctx, 0)? {
            Some(geom) => geom,
            None => return Ok(None),
        };
        Ok(f(&geom)?)
    })?;
    Ok(())
}

fn register_binary<T, F>(conn: &Connection, name: &str, f: F) -> Result<()>
where
    T: ToSql,
    F: Fn(&Geometry<f64>, &Geometry<f64>) -> Result<T> + Copy + Send + Sync + 'static,
{
    conn.create_scalar_function(name, 2, FunctionFlags::SQLITE_DETERMINISTIC, move |ctx| {
        let (a, b) = match (geometry_arg(ctx, 0)?, geometry_arg(ctx, 1)?) {
            (Some(a), Some(b)) => (a, b),
            _ => return Ok(None),
        };
        Ok(Some(f(&a, &b)?))
    })?;
    Ok(())
}

/// Read a geometry argument: an engine-native blob or WKT text.
fn geometry_arg(
    ctx: &Context<'_>,
    idx: usize,
) -> std::result::Result<Option<Geometry<f64>>, Error> {
    match ctx.get_raw(idx) {
        ValueRef::Null => Ok(None),
        ValueRef::Blob(blob) => Ok(Some(decode_geometry(blob)?)),
        ValueRef::Text(text) => {
            let wkt = std::str::from_utf8(text)
                .map_err(|err| Error::UserFunctionError(Box::new(err)))?;
            Ok(Some(parse_wkt(wkt)?))
        }
        _ => Err(Error::InvalidFunctionParameterType(idx, Type::Blob)),
    }
}

fn number_arg(ctx: &Context<'_>, idx: usize) -> std::result::Result<f64, Error> {
    match ctx.get_raw(idx) {
        ValueRef::Integer(i) => Ok(i as f64),
        ValueRef::Real(f) => Ok(f),
        _ => Err(Error::InvalidFunctionParameterType(idx, Type::Real)),
    }
}

/// `POINT EMPTY` has no `geo_types::Point` form and parses to an empty multipoint.
pub(crate) fn parse_wkt(wkt: &str) -> Result<Geometry<f64>> {
    Geometry::try_from_wkt_str(wkt).map_err(|err| SpatialError::Wkt(err.to_string()))
}

fn point_of(geom: &Geometry<f64>, operation: &'static str) -> Result<Point<f64>> {
    match geom {
        Geometry::Point(p) => Ok(*p),
        other => Err(SpatialError::UnsupportedGeometry {
            operation,
            geometry_type: geometry_type_name(other),
        }),
    }
}

fn areal_pair(
    a: &Geometry<f64>,
    b: &Geometry<f64>,
    operation: &'static str,
) -> Result<(MultiPolygon<f64>, MultiPolygon<f64>)> {
    let as_multi = |g: &Geometry<f64>| {
        polygons(g)
            .map(MultiPolygon::new)
            .ok_or(SpatialError::UnsupportedGeometry {
                operation,
                geometry_type: geometry_type_name(g),
            })
    };
    Ok((as_multi(a)?, as_multi(b)?))
}

/// A one-member multipolygon reads better as a plain polygon.
fn collapse(mut mp: MultiPolygon<f64>) -> Geometry<f64> {
    if mp.0.len() == 1 {
        Geometry::Polygon(mp.0.remove(0))
    } else {
        Geometry::MultiPolygon(mp)
    }
}

/// Hulls of fewer than 3 distinct, non-collinear vertices degrade to a point
/// or a segment.
fn hull_geometry(hull: Polygon<f64>) -> Geometry<f64> {
    let mut coords = hull.exterior().0.clone();
    coords.dedup();
    if coords.len() > 1 && coords.first() == coords.last() {
        coords.pop();
    }
    if coords.len() >= 3 && hull.unsigned_area() > 0.0 {
        return Geometry::Polygon(hull);
    }
    let by_xy = |a: &&Coord<f64>, b: &&Coord<f64>| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y));
    match (coords.iter().min_by(by_xy), coords.iter().max_by(by_xy)) {
        (Some(lo), Some(hi)) if lo == hi => Geometry::Point(Point(*lo)),
        (Some(lo), Some(hi)) => Geometry::LineString(LineString::new(vec![*lo, *hi])),
        _ => Geometry::Polygon(hull),
    }
}

// OGC length: only lineal parts count, so polygons have length 0.
fn euclidean_length(geom: &Geometry<f64>) -> f64 {
    match geom {
        Geometry::Line(line) => Euclidean.length(line),
        Geometry::LineString(line) => Euclidean.length(line),
        Geometry::MultiLineString(mls) => Euclidean.length(mls),
        Geometry::GeometryCollection(collection) => {
            collection.0.iter().map(euclidean_length).sum()
        }
        _ => 0.0,
    }
}
