// Coercion of a dynamically typed result cell into the facade's return types.
// Every function reports why a cell does not fit; the caller decides whether
// to fall back to a default.

use crate::error::{Result, SpatialError};
use crate::geometry_blob::decode_geometry;
use rusqlite::types::Value;
use wkt::ToWkt;

#[inline]
pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NULL",
        Value::Integer(_) => "INTEGER",
        Value::Real(_) => "REAL",
        Value::Text(_) => "TEXT",
        Value::Blob(_) => "BLOB",
    }
}

#[inline]
pub(crate) fn value_to_f64(value: &Value) -> Result<f64> {
    match value {
        Value::Null => Err(SpatialError::NullValue),
        Value::Real(v) => Ok(*v),
        Value::Integer(v) => Ok(*v as f64),
        Value::Text(s) => s.trim().parse().map_err(|_| SpatialError::ValueTypeMismatch {
            expected: "DOUBLE",
            actual: "TEXT",
        }),
        other => Err(SpatialError::ValueTypeMismatch {
            expected: "DOUBLE",
            actual: value_type_name(other),
        }),
    }
}

#[inline]
pub(crate) fn value_to_i64(value: &Value) -> Result<i64> {
    match value {
        Value::Null => Err(SpatialError::NullValue),
        Value::Integer(v) => Ok(*v),
        Value::Real(v) if v.is_finite() && v.fract() == 0.0 => {
            if *v >= i64::MIN as f64 && *v < i64::MAX as f64 {
                Ok(*v as i64)
            } else {
                Err(SpatialError::ValueOutOfRange { target: "INTEGER" })
            }
        }
        Value::Text(s) => s.trim().parse().map_err(|_| SpatialError::ValueTypeMismatch {
            expected: "INTEGER",
            actual: "TEXT",
        }),
        other => Err(SpatialError::ValueTypeMismatch {
            expected: "INTEGER",
            actual: value_type_name(other),
        }),
    }
}

#[inline]
pub(crate) fn value_to_bool(value: &Value) -> Result<bool> {
    match value {
        Value::Null => Err(SpatialError::NullValue),
        Value::Integer(v) => Ok(*v != 0),
        Value::Real(v) => Ok(*v != 0.0),
        Value::Text(s) => {
            let s = s.trim();
            if s.eq_ignore_ascii_case("true") || s == "1" {
                Ok(true)
            } else if s.eq_ignore_ascii_case("false") || s == "0" {
                Ok(false)
            } else {
                Err(SpatialError::ValueTypeMismatch {
                    expected: "BOOLEAN",
                    actual: "TEXT",
                })
            }
        }
        Value::Blob(_) => Err(SpatialError::ValueTypeMismatch {
            expected: "BOOLEAN",
            actual: "BLOB",
        }),
    }
}

/// Text form of a cell. A geometry blob renders as WKT.
pub(crate) fn value_to_string(value: &Value) -> Result<String> {
    match value {
        Value::Null => Err(SpatialError::NullValue),
        Value::Text(s) => Ok(s.clone()),
        Value::Integer(v) => Ok(v.to_string()),
        Value::Real(v) => Ok(v.to_string()),
        Value::Blob(blob) => Ok(decode_geometry(blob)?.wkt_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_accept_numbers_and_numeric_text() -> Result<()> {
        assert_eq!(value_to_f64(&Value::Real(1.5))?, 1.5);
        assert_eq!(value_to_f64(&Value::Integer(3))?, 3.0);
        assert_eq!(value_to_f64(&Value::Text(" 2.25 ".to_string()))?, 2.25);
        assert!(matches!(
            value_to_f64(&Value::Text("abc".to_string())),
            Err(SpatialError::ValueTypeMismatch { .. })
        ));
        assert!(matches!(
            value_to_f64(&Value::Null),
            Err(SpatialError::NullValue)
        ));
        Ok(())
    }

    #[test]
    fn integers_reject_fractions_and_overflow() -> Result<()> {
        assert_eq!(value_to_i64(&Value::Real(4.0))?, 4);
        assert!(value_to_i64(&Value::Real(4.5)).is_err());
        assert!(matches!(
            value_to_i64(&Value::Real(1e300)),
            Err(SpatialError::ValueOutOfRange { .. })
        ));
        Ok(())
    }

    #[test]
    fn booleans_follow_sqlite_truthiness() -> Result<()> {
        assert!(value_to_bool(&Value::Integer(1))?);
        assert!(!value_to_bool(&Value::Integer(0))?);
        assert!(value_to_bool(&Value::Text("TRUE".to_string()))?);
        assert!(value_to_bool(&Value::Text("maybe".to_string())).is_err());
        Ok(())
    }

    #[test]
    fn strings_render_scalars() -> Result<()> {
        assert_eq!(value_to_string(&Value::Integer(7))?, "7");
        assert_eq!(value_to_string(&Value::Text("x".to_string()))?, "x");
        assert!(value_to_string(&Value::Blob(vec![1, 2, 3])).is_err());
        Ok(())
    }
}
