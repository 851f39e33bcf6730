use std::error::Error;
use std::fmt;

/// Crate error type for spatial queries.
#[derive(Debug)]
pub enum SpatialError {
    /// Wraps errors returned by `rusqlite`, including errors raised by the
    /// registered spatial functions.
    Sql(rusqlite::Error),
    /// Wraps errors returned by the `wkb` crate.
    Wkb(wkb::error::WkbError),
    /// WKT text could not be parsed into a geometry.
    Wkt(String),
    /// GeoJSON text could not be parsed or produced.
    GeoJson(String),
    /// Installing or loading the spatial functions failed.
    ExtensionUnavailable(String),
    /// The query produced no row.
    EmptyResult,
    /// The query produced a row without columns, or fewer columns than requested.
    MissingColumn { index: usize },
    /// The first cell of the result was `NULL`.
    NullValue,
    /// Dynamic value type did not match the expected conversion target.
    ValueTypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },
    /// Numeric conversion failed because the value is out of range.
    ValueOutOfRange { target: &'static str },
    /// Engine-native geometry blob has an invalid header.
    InvalidGeometryBlob(String),
    /// The geometry kind is not accepted by the operation.
    UnsupportedGeometry {
        operation: &'static str,
        geometry_type: &'static str,
    },
    /// A constructor received too few or inconsistent vertices.
    InvalidConstruction(String),
}

impl fmt::Display for SpatialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sql(err) => write!(f, "{err}"),
            Self::Wkb(err) => write!(f, "{err}"),
            Self::Wkt(err) => write!(f, "invalid wkt: {err}"),
            Self::GeoJson(err) => write!(f, "invalid geojson: {err}"),
            Self::ExtensionUnavailable(reason) => {
                write!(f, "spatial extension unavailable: {reason}")
            }
            Self::EmptyResult => write!(f, "query returned no rows"),
            Self::MissingColumn { index } => write!(f, "query result has no column {index}"),
            Self::NullValue => write!(f, "query returned NULL"),
            Self::ValueTypeMismatch { expected, actual } => {
                write!(f, "expected {expected}, got {actual}")
            }
            Self::ValueOutOfRange { target } => {
                write!(f, "value out of range for {target}")
            }
            Self::InvalidGeometryBlob(reason) => write!(f, "invalid geometry blob: {reason}"),
            Self::UnsupportedGeometry {
                operation,
                geometry_type,
            } => write!(f, "{operation} does not support {geometry_type} geometries"),
            Self::InvalidConstruction(reason) => write!(f, "invalid geometry: {reason}"),
        }
    }
}

impl Error for SpatialError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sql(err) => Some(err),
            Self::Wkb(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for SpatialError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Sql(err)
    }
}

impl From<wkb::error::WkbError> for SpatialError {
    fn from(err: wkb::error::WkbError) -> Self {
        Self::Wkb(err)
    }
}

impl From<serde_json::Error> for SpatialError {
    fn from(err: serde_json::Error) -> Self {
        Self::GeoJson(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SpatialError>;

impl From<SpatialError> for rusqlite::Error {
    fn from(value: SpatialError) -> Self {
        match value {
            SpatialError::Sql(err) => err,
            other => rusqlite::Error::UserFunctionError(Box::new(other)),
        }
    }
}
