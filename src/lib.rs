//! Typed geometry queries over SQLite, built on top of rusqlite.
//!
//! ## Overview
//!
//! - `SpatialClient` owns one SQLite connection and turns geometry operations
//!   into SQL calls of spatial functions.
//! - `register_spatial_functions` installs those functions (`ST_Point`,
//!   `ST_Area`, `ST_Intersects`, `ST_AsGeoJSON`, ...) on any connection.
//! - `Point2D` and `BoundingBox` are the typed values that come back.
//! - `Geom` tags a geometry operand as WKT text or as a trusted SQL expression.
//!
//! `SpatialClient` supports two open modes plus a read-only one:
//!
//! - `SpatialClient::open_in_memory()`: a transient in-memory database.
//! - `SpatialClient::open(path)`: open or create a database file.
//! - `SpatialClient::open_read_only(path)`: open an existing file without write access.
//!
//! Opening activates the spatial functions right away.
//!
//! ## Short usage
//!
//! ```no_run
//! use spatial_client::{Point2D, SpatialClient};
//!
//! let client = SpatialClient::open_in_memory()?;
//! let point = client.st_point(1.0, 2.0);
//! assert_eq!(point, "POINT(1 2)");
//!
//! let line = client.st_makeline(&[Point2D::new(0.0, 0.0), Point2D::new(3.0, 4.0)]);
//! assert_eq!(client.st_length(&line), 5.0);
//!
//! let envelope = client.st_make_envelope(0.0, 0.0, 10.0, 5.0);
//! let bbox = client.st_extent(&envelope);
//! assert_eq!(bbox.area(), 50.0);
//! assert!(bbox.contains(&Point2D::new(5.0, 2.0)));
//!
//! let geojson = client.st_asgeojson(&envelope);
//! println!("{geojson}");
//! # Ok::<(), spatial_client::SpatialError>(())
//! ```
//!
//! ## Failures
//!
//! Geometry operations and the `query_*` primitives never fail loudly: an
//! engine error, a `NULL` cell or an empty result becomes the zero value of
//! the return type (`""`, `0.0`, `false`, `0`) and is logged with `tracing`.
//! When a legitimate zero has to be told apart from a failure, use the
//! `try_query_*` primitives, which return `Result`:
//!
//! ```no_run
//! use spatial_client::{SpatialClient, SpatialError};
//!
//! let client = SpatialClient::open_in_memory()?;
//! assert_eq!(client.query_double("SELECT NULL"), 0.0);
//! assert!(matches!(
//!     client.try_query_double("SELECT NULL"),
//!     Err(SpatialError::NullValue)
//! ));
//! # Ok::<(), spatial_client::SpatialError>(())
//! ```
//!
//! Geometry operands given as `&str`/`String` are WKT and are escaped before
//! they are embedded. Column references and nested expressions go through
//! `Geom::expr`, which is embedded verbatim:
//!
//! ```no_run
//! use spatial_client::{Geom, SpatialClient};
//!
//! let client = SpatialClient::open_in_memory()?;
//! client.try_execute("CREATE TABLE shapes (geom BLOB)")?;
//! client.try_execute("INSERT INTO shapes VALUES (ST_MakeEnvelope(0, 0, 2, 2))")?;
//! let area = client.st_area(Geom::expr("(SELECT geom FROM shapes LIMIT 1)"));
//! assert_eq!(area, 4.0);
//! # Ok::<(), spatial_client::SpatialError>(())
//! ```
mod client;
mod conversions;
mod error;
mod geojson;
mod geometry_blob;
mod spatial_sql;
mod sql_functions;
mod types;

pub mod countries;

pub use client::SpatialClient;
pub use error::{Result, SpatialError};
pub use spatial_sql::escape;
pub use sql_functions::register_spatial_functions;
pub use types::{BoundingBox, Geom, Point2D};

// Re-export the dynamic cell type returned by `try_query_row(s)`.
pub use rusqlite::types::Value;
