use crate::conversions::{value_to_bool, value_to_f64, value_to_i64, value_to_string};
use crate::error::{Result, SpatialError};
use crate::spatial_sql::{
    SPATIAL_PROBE_EXPECTED, SQL_SPATIAL_PROBE, sql_area, sql_asgeojson, sql_buffer, sql_centroid,
    sql_contains, sql_convexhull, sql_distance, sql_extent, sql_geom_from_text,
    sql_geometry_type, sql_intersection, sql_intersects, sql_isvalid, sql_length,
    sql_make_envelope, sql_makeline, sql_makepolygon, sql_npoints, sql_point, sql_union,
    sql_within, sql_x, sql_y,
};
use crate::sql_functions::register_spatial_functions;
use crate::types::{BoundingBox, Geom, Point2D};
use rusqlite::OpenFlags;
use rusqlite::types::Value;
use std::path::Path;

/// Geometry query facade over one SQLite connection.
///
/// Every operation renders one SQL statement, runs it on the owned connection
/// and converts the first cell of the result. The connection lives exactly as
/// long as the client and is closed on drop.
///
/// The client is `Send` but not `Sync`: share it between threads only behind
/// external synchronization, or open one client per thread.
///
/// ```no_run
/// use spatial_client::{Point2D, SpatialClient};
///
/// let client = SpatialClient::open_in_memory()?;
/// let square = client.st_make_envelope(0.0, 0.0, 2.0, 2.0);
/// assert_eq!(client.st_area(&square), 4.0);
/// assert!(client.st_contains(&square, Point2D::new(1.0, 1.0)));
/// # Ok::<(), spatial_client::SpatialError>(())
/// ```
#[derive(Debug)]
pub struct SpatialClient {
    conn: rusqlite::Connection,
}

impl SpatialClient {
    /// Open a transient in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = rusqlite::Connection::open_in_memory()?;
        Ok(Self::with_connection(conn))
    }

    /// Open, or create, a database file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = rusqlite::Connection::open(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), "opened database");
        Ok(Self::with_connection(conn))
    }

    /// Open an existing database file without write access.
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn =
            rusqlite::Connection::open_with_flags(path.as_ref(), OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        tracing::debug!(path = %path.as_ref().display(), "opened database read-only");
        Ok(Self::with_connection(conn))
    }

    fn with_connection(conn: rusqlite::Connection) -> Self {
        let client = Self { conn };
        // A client without spatial functions still runs plain SQL.
        client.init_spatial();
        client
    }

    /// Install and load the spatial functions. Returns `false` if either step
    /// fails. Safe to call repeatedly.
    pub fn init_spatial(&self) -> bool {
        match self.try_init_spatial() {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(%err, "spatial extension unavailable");
                false
            }
        }
    }

    /// Fallible version of [`init_spatial`](Self::init_spatial).
    pub fn try_init_spatial(&self) -> Result<()> {
        register_spatial_functions(&self.conn)
            .map_err(|err| SpatialError::ExtensionUnavailable(format!("install: {err}")))?;

        let probe = self
            .try_query_string(SQL_SPATIAL_PROBE)
            .map_err(|err| SpatialError::ExtensionUnavailable(format!("load: {err}")))?;
        if !probe.to_ascii_uppercase().starts_with(SPATIAL_PROBE_EXPECTED) {
            return Err(SpatialError::ExtensionUnavailable(format!(
                "load: unexpected probe result {probe:?}"
            )));
        }
        tracing::info!("spatial extension loaded");
        Ok(())
    }

    /// Run a statement and discard whatever it returns.
    pub fn query(&self, sql: &str) {
        if let Err(err) = self.try_execute(sql) {
            tracing::warn!(%err, sql, "query failed");
        }
    }

    /// Run a statement and report whether it succeeded.
    pub fn execute(&self, sql: &str) -> bool {
        match self.try_execute(sql) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(%err, sql, "execute failed");
                false
            }
        }
    }

    /// First cell as text, or `""` on any failure.
    pub fn query_string(&self, sql: &str) -> String {
        fallback(sql, self.try_query_string(sql))
    }

    /// First cell as a double, or `0.0` on any failure.
    pub fn query_double(&self, sql: &str) -> f64 {
        fallback(sql, self.try_query_double(sql))
    }

    /// First cell as a boolean, or `false` on any failure.
    pub fn query_bool(&self, sql: &str) -> bool {
        fallback(sql, self.try_query_bool(sql))
    }

    /// First cell as an integer, or `0` on any failure.
    pub fn query_int(&self, sql: &str) -> i64 {
        fallback(sql, self.try_query_int(sql))
    }

    /// Run one or more `;`-separated statements. Rows they return are ignored.
    pub fn try_execute(&self, sql: &str) -> Result<()> {
        tracing::debug!(sql, "run");
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// First row of the result, as owned values.
    pub fn try_query_row(&self, sql: &str) -> Result<Vec<Value>> {
        tracing::debug!(sql, "query row");
        let mut stmt = self.conn.prepare(sql)?;
        let column_count = stmt.column_count();
        let mut rows = stmt.query([])?;
        let row = rows.next()?.ok_or(SpatialError::EmptyResult)?;
        let values = (0..column_count)
            .map(|idx| owned_value(row, idx))
            .collect::<rusqlite::Result<Vec<Value>>>()?;
        Ok(values)
    }

    /// Every row of the result, as owned values.
    pub fn try_query_rows(&self, sql: &str) -> Result<Vec<Vec<Value>>> {
        tracing::debug!(sql, "query rows");
        let mut stmt = self.conn.prepare(sql)?;
        let column_count = stmt.column_count();
        let rows = stmt
            .query_map([], |row| {
                (0..column_count)
                    .map(|idx| owned_value(row, idx))
                    .collect::<rusqlite::Result<Vec<Value>>>()
            })?
            .collect::<std::result::Result<Vec<Vec<Value>>, _>>()?;
        Ok(rows)
    }

    /// Cell at row 0, column 0. The rest of the result is ignored.
    pub fn try_query_value(&self, sql: &str) -> Result<Value> {
        self.try_query_row(sql)?
            .into_iter()
            .next()
            .ok_or(SpatialError::MissingColumn { index: 0 })
    }

    pub fn try_query_string(&self, sql: &str) -> Result<String> {
        value_to_string(&self.try_query_value(sql)?)
    }

    pub fn try_query_double(&self, sql: &str) -> Result<f64> {
        value_to_f64(&self.try_query_value(sql)?)
    }

    pub fn try_query_bool(&self, sql: &str) -> Result<bool> {
        value_to_bool(&self.try_query_value(sql)?)
    }

    pub fn try_query_int(&self, sql: &str) -> Result<i64> {
        value_to_i64(&self.try_query_value(sql)?)
    }

    /// The first `N` cells of row 0 as doubles.
    fn try_query_doubles<const N: usize>(&self, sql: &str) -> Result<[f64; N]> {
        let row = self.try_query_row(sql)?;
        let mut out = [0.0; N];
        for (idx, slot) in out.iter_mut().enumerate() {
            let value = row.get(idx).ok_or(SpatialError::MissingColumn { index: idx })?;
            *slot = value_to_f64(value)?;
        }
        Ok(out)
    }

    /// WKT of the point `(x, y)`.
    pub fn st_point(&self, x: f64, y: f64) -> String {
        self.query_string(&sql_point(x, y))
    }

    /// Parse caller-supplied WKT and return the engine's WKT for it.
    ///
    /// Points cannot be empty in the engine, so `POINT EMPTY` comes back as
    /// `MULTIPOINT EMPTY`.
    pub fn st_geom_from_text(&self, wkt: &str) -> String {
        self.query_string(&sql_geom_from_text(wkt))
    }

    /// Line through `points` in order. Fewer than two points yields `""`.
    pub fn st_makeline(&self, points: &[Point2D]) -> String {
        self.query_string(&sql_makeline(points))
    }

    /// Polygon from a closed ring. An open ring is not closed for the caller
    /// and yields `""`.
    pub fn st_makepolygon(&self, ring: &[Point2D]) -> String {
        self.query_string(&sql_makepolygon(ring))
    }

    pub fn st_make_envelope(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> String {
        self.query_string(&sql_make_envelope(min_x, min_y, max_x, max_y))
    }

    pub fn st_x(&self, geom: impl Into<Geom>) -> f64 {
        self.query_double(&sql_x(&geom.into()))
    }

    pub fn st_y(&self, geom: impl Into<Geom>) -> f64 {
        self.query_double(&sql_y(&geom.into()))
    }

    pub fn st_area(&self, geom: impl Into<Geom>) -> f64 {
        self.query_double(&sql_area(&geom.into()))
    }

    pub fn st_length(&self, geom: impl Into<Geom>) -> f64 {
        self.query_double(&sql_length(&geom.into()))
    }

    /// Vertex count, closing vertices of rings included.
    pub fn st_npoints(&self, geom: impl Into<Geom>) -> i64 {
        self.query_int(&sql_npoints(&geom.into()))
    }

    pub fn st_isvalid(&self, geom: impl Into<Geom>) -> bool {
        self.query_bool(&sql_isvalid(&geom.into()))
    }

    /// `POINT`, `LINESTRING`, `POLYGON`, ... or `""` on failure.
    pub fn st_geometry_type(&self, geom: impl Into<Geom>) -> String {
        self.query_string(&sql_geometry_type(&geom.into()))
    }

    /// Centroid in one round trip. Falls back to the origin.
    pub fn st_centroid(&self, geom: impl Into<Geom>) -> Point2D {
        let sql = sql_centroid(&geom.into());
        let [x, y] = fallback(&sql, self.try_query_doubles::<2>(&sql));
        Point2D::new(x, y)
    }

    /// Envelope bounds in one round trip. Falls back to an all-zero box.
    pub fn st_extent(&self, geom: impl Into<Geom>) -> BoundingBox {
        let sql = sql_extent(&geom.into());
        let [min_x, min_y, max_x, max_y] = fallback(&sql, self.try_query_doubles::<4>(&sql));
        BoundingBox::new(min_x, min_y, max_x, max_y)
    }

    pub fn st_intersects(&self, a: impl Into<Geom>, b: impl Into<Geom>) -> bool {
        self.query_bool(&sql_intersects(&a.into(), &b.into()))
    }

    /// Whether `a` contains `b`.
    pub fn st_contains(&self, a: impl Into<Geom>, b: impl Into<Geom>) -> bool {
        self.query_bool(&sql_contains(&a.into(), &b.into()))
    }

    /// Whether `a` lies within `b`.
    pub fn st_within(&self, a: impl Into<Geom>, b: impl Into<Geom>) -> bool {
        self.query_bool(&sql_within(&a.into(), &b.into()))
    }

    pub fn st_distance(&self, a: impl Into<Geom>, b: impl Into<Geom>) -> f64 {
        self.query_double(&sql_distance(&a.into(), &b.into()))
    }

    /// Overlay of two areal geometries, as WKT.
    pub fn st_intersection(&self, a: impl Into<Geom>, b: impl Into<Geom>) -> String {
        self.query_string(&sql_intersection(&a.into(), &b.into()))
    }

    /// Overlay of two areal geometries, as WKT.
    pub fn st_union(&self, a: impl Into<Geom>, b: impl Into<Geom>) -> String {
        self.query_string(&sql_union(&a.into(), &b.into()))
    }

    /// Negative distances shrink areal geometries.
    pub fn st_buffer(&self, geom: impl Into<Geom>, distance: f64) -> String {
        self.query_string(&sql_buffer(&geom.into(), distance))
    }

    pub fn st_convexhull(&self, geom: impl Into<Geom>) -> String {
        self.query_string(&sql_convexhull(&geom.into()))
    }

    pub fn st_asgeojson(&self, geom: impl Into<Geom>) -> String {
        self.query_string(&sql_asgeojson(&geom.into()))
    }
}

/// Copy cell `idx` out of the row. Text that is not UTF-8 is a conversion error.
fn owned_value(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Value> {
    let value = row.get_ref(idx)?;
    Value::try_from(value).map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(idx, value.data_type(), Box::new(err))
    })
}

/// Absorb a failed typed query into the target type's zero value.
fn fallback<T: Default>(sql: &str, result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(%err, sql, "query failed, using default value");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SpatialClient;
    use crate::Result;
    use crate::error::SpatialError;
    use crate::spatial_sql::escape;
    use crate::types::{BoundingBox, Geom, Point2D};

    const TOLERANCE: f64 = 1e-9;

    fn square() -> Vec<Point2D> {
        vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(4.0, 0.0),
            Point2D::new(4.0, 4.0),
            Point2D::new(0.0, 4.0),
            Point2D::new(0.0, 0.0),
        ]
    }

    #[test]
    fn init_spatial_is_idempotent() -> Result<()> {
        let client = SpatialClient::open_in_memory()?;
        let first = client.init_spatial();
        let second = client.init_spatial();
        assert!(first);
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn point_round_trips_through_accessors() -> Result<()> {
        let client = SpatialClient::open_in_memory()?;
        for (x, y) in [(0.0, 0.0), (1.5, -2.25), (-179.999, 89.5), (1e-7, 12345.678)] {
            let point = client.st_point(x, y);
            assert!((client.st_x(&point) - x).abs() < TOLERANCE, "x of {point}");
            assert!((client.st_y(&point) - y).abs() < TOLERANCE, "y of {point}");
        }
        Ok(())
    }

    #[test]
    fn wkt_round_trips_to_geojson() -> Result<()> {
        let client = SpatialClient::open_in_memory()?;
        let p = Point2D::new(3.25, -7.5);
        let geom = client.st_geom_from_text(&p.to_wkt());
        let geojson: serde_json::Value = serde_json::from_str(&client.st_asgeojson(&geom))?;

        assert_eq!(geojson["type"], "Point");
        let x = geojson["coordinates"][0].as_f64().unwrap_or(f64::NAN);
        let y = geojson["coordinates"][1].as_f64().unwrap_or(f64::NAN);
        assert!((x - p.x).abs() < TOLERANCE);
        assert!((y - p.y).abs() < TOLERANCE);
        Ok(())
    }

    #[test]
    fn makeline_with_too_few_points_falls_back() -> Result<()> {
        let client = SpatialClient::open_in_memory()?;
        assert_eq!(client.st_makeline(&[]), "");
        assert_eq!(client.st_makeline(&[Point2D::new(1.0, 1.0)]), "");

        let line = client.st_makeline(&[Point2D::new(0.0, 0.0), Point2D::new(3.0, 4.0)]);
        assert!(line.starts_with("LINESTRING"));
        assert!((client.st_length(&line) - 5.0).abs() < TOLERANCE);
        assert_eq!(client.st_npoints(&line), 2);
        Ok(())
    }

    #[test]
    fn makepolygon_does_not_close_rings() -> Result<()> {
        let client = SpatialClient::open_in_memory()?;
        let mut ring = square();
        ring.pop();
        assert_eq!(client.st_makepolygon(&ring), "");

        let polygon = client.st_makepolygon(&square());
        assert_eq!(client.st_geometry_type(&polygon), "POLYGON");
        assert!((client.st_area(&polygon) - 16.0).abs() < TOLERANCE);
        assert!(client.st_isvalid(&polygon));
        assert_eq!(client.st_npoints(&polygon), 5);
        Ok(())
    }

    #[test]
    fn envelope_area_and_extent() -> Result<()> {
        let client = SpatialClient::open_in_memory()?;
        let envelope = client.st_make_envelope(0.0, 0.0, 10.0, 5.0);
        assert!((client.st_area(&envelope) - 50.0).abs() < TOLERANCE);
        assert_eq!(client.st_extent(&envelope), BoundingBox::new(0.0, 0.0, 10.0, 5.0));
        Ok(())
    }

    #[test]
    fn centroid_of_square() -> Result<()> {
        let client = SpatialClient::open_in_memory()?;
        let polygon = client.st_makepolygon(&square());
        let centroid = client.st_centroid(&polygon);
        assert!((centroid.x - 2.0).abs() < TOLERANCE);
        assert!((centroid.y - 2.0).abs() < TOLERANCE);
        Ok(())
    }

    #[test]
    fn predicates_agree_with_each_other() -> Result<()> {
        let client = SpatialClient::open_in_memory()?;
        let big = client.st_make_envelope(0.0, 0.0, 10.0, 10.0);
        let small = client.st_make_envelope(2.0, 2.0, 3.0, 3.0);
        let far = client.st_make_envelope(20.0, 20.0, 21.0, 21.0);
        let line = "LINESTRING(-1 5, 11 5)".to_string();

        for (a, b) in [(&big, &small), (&small, &far), (&big, &line)] {
            assert_eq!(client.st_intersects(a, b), client.st_intersects(b, a));
        }
        assert!(client.st_intersects(&big, &small));
        assert!(!client.st_intersects(&small, &far));
        assert!(client.st_contains(&big, &small));
        assert!(client.st_within(&small, &big));
        assert_eq!(client.st_contains(&small, &big), client.st_within(&big, &small));
        assert!(client.st_contains(&big, Point2D::new(5.0, 5.0)));
        Ok(())
    }

    #[test]
    fn distance_between_disjoint_boxes() -> Result<()> {
        let client = SpatialClient::open_in_memory()?;
        let a = client.st_make_envelope(0.0, 0.0, 1.0, 1.0);
        let b = client.st_make_envelope(4.0, 0.0, 5.0, 1.0);
        assert!((client.st_distance(&a, &b) - 3.0).abs() < TOLERANCE);
        assert_eq!(client.st_distance(&a, &a), 0.0);
        Ok(())
    }

    #[test]
    fn overlay_operations() -> Result<()> {
        let client = SpatialClient::open_in_memory()?;
        let a = client.st_make_envelope(0.0, 0.0, 2.0, 2.0);
        let b = client.st_make_envelope(1.0, 1.0, 3.0, 3.0);

        let intersection = client.st_intersection(&a, &b);
        assert!((client.st_area(&intersection) - 1.0).abs() < 1e-6);

        let union = client.st_union(&a, &b);
        assert!((client.st_area(&union) - 7.0).abs() < 1e-6);

        // Non-areal operands are rejected by the engine.
        assert_eq!(client.st_union(Point2D::new(0.0, 0.0), &a), "");
        Ok(())
    }

    #[test]
    fn buffer_and_convex_hull() -> Result<()> {
        let client = SpatialClient::open_in_memory()?;
        let point = client.st_point(0.0, 0.0);
        let disc = client.st_buffer(&point, 1.0);
        let area = client.st_area(&disc);
        // A polygonal approximation of a unit disc.
        assert!(area > 3.0 && area < 3.2, "area {area}");

        let hull = client.st_convexhull("MULTIPOINT((0 0), (2 0), (1 1), (2 2), (0 2))");
        assert!((client.st_area(&hull) - 4.0).abs() < TOLERANCE);
        Ok(())
    }

    #[test]
    fn quoted_wkt_cannot_break_out_of_the_literal() -> Result<()> {
        let client = SpatialClient::open_in_memory()?;
        // Unescaped, this would close the literal and evaluate `ST_X(...) + 40`.
        let payload = "POINT(1 2)')) + 40 + (('";
        assert_ne!(client.st_x(payload), 41.0);

        let sql = format!("SELECT '{}'", escape(payload));
        assert_eq!(client.query_string(&sql), payload);
        let sql = format!("SELECT '{}'", escape("O'Brien"));
        assert_eq!(client.query_string(&sql), "O'Brien");
        Ok(())
    }

    #[test]
    fn execute_runs_every_statement_of_a_script() -> Result<()> {
        let client = SpatialClient::open_in_memory()?;
        assert!(client.execute("CREATE TABLE a (x INTEGER); INSERT INTO a VALUES (1)"));
        client.query("INSERT INTO a VALUES (2); INSERT INTO a VALUES (3);");
        assert_eq!(client.query_int("SELECT COUNT(*) FROM a"), 3);

        assert!(!client.execute("INSERT INTO a VALUES (4); INSERT INTO missing VALUES (5)"));
        assert_eq!(client.query_int("SELECT MAX(x) FROM a"), 4);
        Ok(())
    }

    #[test]
    fn non_utf8_text_is_a_conversion_error() -> Result<()> {
        let client = SpatialClient::open_in_memory()?;
        let sql = "SELECT CAST(x'ff' AS TEXT)";
        assert!(matches!(
            client.try_query_string(sql),
            Err(SpatialError::Sql(rusqlite::Error::FromSqlConversionFailure(0, _, _)))
        ));
        assert_eq!(client.query_string(sql), "");
        Ok(())
    }

    #[test]
    fn degenerate_convex_hulls() -> Result<()> {
        let client = SpatialClient::open_in_memory()?;
        assert_eq!(client.st_convexhull("POINT(1 1)"), "POINT(1 1)");
        assert_eq!(client.st_convexhull("MULTIPOINT((1 1), (1 1))"), "POINT(1 1)");

        let segment = client.st_convexhull("MULTIPOINT((0 0), (1 1), (2 2))");
        assert_eq!(client.st_geometry_type(&segment), "LINESTRING");
        assert_eq!(client.st_npoints(&segment), 2);
        assert!((client.st_length(&segment) - 8.0_f64.sqrt()).abs() < TOLERANCE);
        assert!(client.st_isvalid(&segment));
        Ok(())
    }

    #[test]
    fn empty_point_reads_back_as_empty_multipoint() -> Result<()> {
        let client = SpatialClient::open_in_memory()?;
        let empty = client.st_geom_from_text("POINT EMPTY");
        assert_eq!(empty, "MULTIPOINT EMPTY");
        assert_eq!(client.st_npoints(&empty), 0);
        assert!(client.query_bool("SELECT ST_IsEmpty(ST_GeomFromText('POINT EMPTY'))"));
        Ok(())
    }

    #[test]
    fn fallbacks_for_failed_queries() -> Result<()> {
        let client = SpatialClient::open_in_memory()?;
        assert_eq!(client.query_double("SELECT NULL"), 0.0);
        assert_eq!(client.query_double("SELECT 'abc'"), 0.0);
        assert_eq!(client.query_string("SELEC nonsense"), "");
        assert!(!client.query_bool("SELECT 1 WHERE 0"));
        assert_eq!(client.query_int("SELECT * FROM missing_table"), 0);
        assert!(!client.execute("NOT SQL"));

        assert!(matches!(
            client.try_query_double("SELECT NULL"),
            Err(SpatialError::NullValue)
        ));
        assert!(matches!(
            client.try_query_int("SELECT 1 WHERE 0"),
            Err(SpatialError::EmptyResult)
        ));
        assert!(matches!(
            client.try_query_string("SELEC nonsense"),
            Err(SpatialError::Sql(_))
        ));
        Ok(())
    }

    #[test]
    fn invalid_geometry_falls_back() -> Result<()> {
        let client = SpatialClient::open_in_memory()?;
        assert_eq!(client.st_geom_from_text("NOT WKT"), "");
        assert_eq!(client.st_x("LINESTRING(0 0, 1 1)"), 0.0);
        assert_eq!(client.st_extent("NOT WKT"), BoundingBox::default());
        assert_eq!(client.st_centroid("NOT WKT"), Point2D::default());
        Ok(())
    }

    #[test]
    fn execute_and_query_tables() -> Result<()> {
        let client = SpatialClient::open_in_memory()?;
        assert!(client.execute("CREATE TABLE shapes (name TEXT, geom BLOB)"));
        assert!(client.execute(
            "INSERT INTO shapes VALUES ('box', ST_MakeEnvelope(0, 0, 3, 2))"
        ));
        client.query("INSERT INTO shapes VALUES ('dot', ST_Point(1, 1))");

        assert_eq!(client.query_int("SELECT COUNT(*) FROM shapes"), 2);
        let boxed = Geom::expr("(SELECT geom FROM shapes WHERE name = 'box')");
        assert!((client.st_area(&boxed) - 6.0).abs() < TOLERANCE);
        assert_eq!(
            client.query_string("SELECT geom FROM shapes WHERE name = 'dot'"),
            "POINT(1 1)"
        );
        Ok(())
    }

    #[test]
    fn file_database_persists() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("shapes.db");
        {
            let client = SpatialClient::open(&path)?;
            assert!(client.execute("CREATE TABLE t (v REAL)"));
            assert!(client.execute("INSERT INTO t VALUES (2.5)"));
        }
        let client = SpatialClient::open_read_only(&path)?;
        assert_eq!(client.query_double("SELECT v FROM t"), 2.5);
        assert!(!client.execute("INSERT INTO t VALUES (1.0)"));
        Ok(())
    }

    #[test]
    fn unopenable_path_is_an_error() {
        let result = SpatialClient::open("/nonexistent-dir/sub/world.db");
        assert!(matches!(result, Err(SpatialError::Sql(_))));
    }
}
