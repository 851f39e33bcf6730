// SQL text for every facade operation. Caller-supplied text only ever reaches
// a statement through `quote_literal` or `quote_identifier`.

use crate::types::{Geom, Point2D};

/// Probe run after the spatial functions are registered.
pub(crate) const SQL_SPATIAL_PROBE: &str = "SELECT ST_AsText(ST_Point(0, 0))";
pub(crate) const SPATIAL_PROBE_EXPECTED: &str = "POINT";

/// Neutralize text for use inside a single-quoted SQL literal.
///
/// Single quotes are doubled and NUL characters are dropped. SQLite gives
/// backslashes no meaning inside string literals, so they pass through.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '\'' => out.push_str("''"),
            '\0' => {}
            c => out.push(c),
        }
    }
    out
}

pub(crate) fn quote_literal(s: &str) -> String {
    format!("'{}'", escape(s))
}

pub(crate) fn quote_identifier(s: &str) -> String {
    let escaped: String = s.chars().filter(|c| *c != '\0').collect();
    format!(r#""{}""#, escaped.replace('"', r#""""#))
}

/// Render a double so SQLite reads it back as the same REAL.
///
/// Non-finite values have no SQL literal and become `NULL`, which the
/// constructors reject.
pub(crate) fn sql_number(v: f64) -> String {
    if v.is_finite() {
        format!("{v:?}")
    } else {
        "NULL".to_string()
    }
}

pub(crate) fn sql_select(expr: &str) -> String {
    format!("SELECT {expr}")
}

fn as_text(expr: &str) -> String {
    sql_select(&format!("ST_AsText({expr})"))
}

fn unary(func: &str, geom: &Geom) -> String {
    sql_select(&format!("{func}({})", geom.to_sql()))
}

fn binary(func: &str, a: &Geom, b: &Geom) -> String {
    sql_select(&format!("{func}({}, {})", a.to_sql(), b.to_sql()))
}

pub(crate) fn sql_point(x: f64, y: f64) -> String {
    as_text(&format!("ST_Point({}, {})", sql_number(x), sql_number(y)))
}

pub(crate) fn sql_geom_from_text(wkt: &str) -> String {
    as_text(&Geom::wkt(wkt).to_sql())
}

fn make_line_expr(points: &[Point2D]) -> String {
    let args = points
        .iter()
        .map(|p| Geom::from(*p).to_sql())
        .collect::<Vec<String>>()
        .join(", ");
    format!("ST_MakeLine({args})")
}

pub(crate) fn sql_makeline(points: &[Point2D]) -> String {
    as_text(&make_line_expr(points))
}

pub(crate) fn sql_makepolygon(ring: &[Point2D]) -> String {
    as_text(&format!("ST_MakePolygon({})", make_line_expr(ring)))
}

pub(crate) fn sql_make_envelope(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> String {
    as_text(&format!(
        "ST_MakeEnvelope({}, {}, {}, {})",
        sql_number(min_x),
        sql_number(min_y),
        sql_number(max_x),
        sql_number(max_y)
    ))
}

pub(crate) fn sql_x(geom: &Geom) -> String {
    unary("ST_X", geom)
}

pub(crate) fn sql_y(geom: &Geom) -> String {
    unary("ST_Y", geom)
}

pub(crate) fn sql_area(geom: &Geom) -> String {
    unary("ST_Area", geom)
}

pub(crate) fn sql_length(geom: &Geom) -> String {
    unary("ST_Length", geom)
}

pub(crate) fn sql_npoints(geom: &Geom) -> String {
    unary("ST_NPoints", geom)
}

pub(crate) fn sql_isvalid(geom: &Geom) -> String {
    unary("ST_IsValid", geom)
}

pub(crate) fn sql_geometry_type(geom: &Geom) -> String {
    unary("ST_GeometryType", geom)
}

pub(crate) fn sql_centroid(geom: &Geom) -> String {
    format!(
        "SELECT ST_X(c), ST_Y(c) FROM (SELECT ST_Centroid({}) AS c)",
        geom.to_sql()
    )
}

pub(crate) fn sql_extent(geom: &Geom) -> String {
    format!(
        "SELECT ST_MinX(g), ST_MinY(g), ST_MaxX(g), ST_MaxY(g) FROM (SELECT {} AS g)",
        geom.to_sql()
    )
}

pub(crate) fn sql_intersects(a: &Geom, b: &Geom) -> String {
    binary("ST_Intersects", a, b)
}

pub(crate) fn sql_contains(a: &Geom, b: &Geom) -> String {
    binary("ST_Contains", a, b)
}

pub(crate) fn sql_within(a: &Geom, b: &Geom) -> String {
    binary("ST_Within", a, b)
}

pub(crate) fn sql_distance(a: &Geom, b: &Geom) -> String {
    binary("ST_Distance", a, b)
}

pub(crate) fn sql_intersection(a: &Geom, b: &Geom) -> String {
    as_text(&format!("ST_Intersection({}, {})", a.to_sql(), b.to_sql()))
}

pub(crate) fn sql_union(a: &Geom, b: &Geom) -> String {
    as_text(&format!("ST_Union({}, {})", a.to_sql(), b.to_sql()))
}

pub(crate) fn sql_buffer(geom: &Geom, distance: f64) -> String {
    as_text(&format!(
        "ST_Buffer({}, {})",
        geom.to_sql(),
        sql_number(distance)
    ))
}

pub(crate) fn sql_convexhull(geom: &Geom) -> String {
    as_text(&format!("ST_ConvexHull({})", geom.to_sql()))
}

pub(crate) fn sql_asgeojson(geom: &Geom) -> String {
    unary("ST_AsGeoJSON", geom)
}

pub(crate) fn sql_select_countries(table: &str) -> String {
    format!(
        "SELECT UPPER(cca2), name, ST_AsGeoJSON(geom), ST_Area(geom) FROM {} ORDER BY name",
        quote_identifier(table)
    )
}
