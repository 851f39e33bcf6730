use crate::spatial_sql::{quote_literal, sql_number};
use std::fmt;

/// A planar `(x, y)` coordinate pair.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Render as `POINT(x y)`.
    pub fn to_wkt(&self) -> String {
        format!("POINT({} {})", self.x, self.y)
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle.
///
/// Bounds are not checked on construction; an inverted box has a negative or
/// meaningless area and contains nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn area(&self) -> f64 {
        (self.max_x - self.min_x) * (self.max_y - self.min_y)
    }

    /// Inclusive on every edge.
    pub fn contains(&self, point: &Point2D) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }
}

/// A geometry operand as it is embedded into generated SQL.
///
/// Keeping the tag next to the text means a WKT string is quoted exactly once
/// and a trusted SQL expression is never quoted at all.
#[derive(Clone, Debug, PartialEq)]
pub enum Geom {
    /// Well-known text, embedded as `ST_GeomFromText('<escaped>')`.
    Wkt(String),
    /// A trusted SQL expression (a column name, a nested `ST_*` call).
    /// Embedded verbatim, so it must never carry caller-supplied text.
    Expr(String),
}

impl Geom {
    pub fn wkt(wkt: impl Into<String>) -> Self {
        Self::Wkt(wkt.into())
    }

    pub fn expr(expr: impl Into<String>) -> Self {
        Self::Expr(expr.into())
    }

    /// The SQL expression that evaluates to this geometry.
    pub fn to_sql(&self) -> String {
        match self {
            Self::Wkt(wkt) => format!("ST_GeomFromText({})", quote_literal(wkt)),
            Self::Expr(expr) => expr.clone(),
        }
    }
}

impl fmt::Display for Geom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

impl From<&str> for Geom {
    fn from(value: &str) -> Self {
        Self::Wkt(value.to_string())
    }
}

impl From<String> for Geom {
    fn from(value: String) -> Self {
        Self::Wkt(value)
    }
}

impl From<&String> for Geom {
    fn from(value: &String) -> Self {
        Self::Wkt(value.clone())
    }
}

impl From<&Geom> for Geom {
    fn from(value: &Geom) -> Self {
        value.clone()
    }
}

impl From<Point2D> for Geom {
    fn from(p: Point2D) -> Self {
        Self::Expr(format!("ST_Point({}, {})", sql_number(p.x), sql_number(p.y)))
    }
}

impl From<BoundingBox> for Geom {
    fn from(b: BoundingBox) -> Self {
        Self::Expr(format!(
            "ST_MakeEnvelope({}, {}, {}, {})",
            sql_number(b.min_x),
            sql_number(b.min_y),
            sql_number(b.max_x),
            sql_number(b.max_y)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::{BoundingBox, Geom, Point2D};

    #[test]
    fn bounding_box_area_and_containment() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 5.0);
        assert_eq!(bbox.area(), 50.0);
        assert!(bbox.contains(&Point2D::new(5.0, 2.0)));
        assert!(bbox.contains(&Point2D::new(10.0, 5.0)));
        assert!(!bbox.contains(&Point2D::new(11.0, 2.0)));
        assert!(!bbox.contains(&Point2D::new(5.0, -0.1)));
    }

    #[test]
    fn point_renders_wkt() {
        assert_eq!(Point2D::new(1.0, -2.5).to_wkt(), "POINT(1 -2.5)");
    }

    #[test]
    fn wkt_operand_is_quoted_once() {
        let geom = Geom::from("POINT(1 2)");
        assert_eq!(geom.to_sql(), "ST_GeomFromText('POINT(1 2)')");

        let nested = Geom::from(&geom);
        assert_eq!(nested, geom);
    }

    #[test]
    fn expression_operand_is_verbatim() {
        assert_eq!(Geom::expr("geom").to_sql(), "geom");
        assert_eq!(
            Geom::from(Point2D::new(1.0, 2.0)).to_sql(),
            "ST_Point(1.0, 2.0)"
        );
    }
}
