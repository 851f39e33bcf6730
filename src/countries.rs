//! Country polygons prepared for a web map.
//!
//! The map layer only consumes precomputed values: a GeoJSON geometry and an
//! area per country, read once at startup through a [`SpatialClient`].
//! [`AppContext`] bundles the configuration and the loaded data so nothing is
//! held in process-wide state.

use crate::client::SpatialClient;
use crate::conversions::{value_to_f64, value_to_string};
use crate::error::Result;
use crate::spatial_sql::sql_select_countries;
use serde_json::{Map, Value, json};
use std::path::PathBuf;

/// Area class boundaries and fill colors, lowest first. An area belongs to the
/// last class whose lower bound it reaches.
pub const AREA_LEGEND: [(f64, &str); 7] = [
    (0.0, "#ffffcc"),
    (100.0, "#c7e9b4"),
    (1000.0, "#7fcdbb"),
    (5000.0, "#41b6c4"),
    (10000.0, "#1d91c0"),
    (50000.0, "#225ea8"),
    (100000.0, "#0c2c84"),
];

/// Where the country data lives.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    /// Table with `cca2`, `name` and `geom` columns.
    pub countries_table: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("world.db"),
            countries_table: "countries".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Country {
    /// Upper-cased ISO 3166-1 alpha-2 code.
    pub code: String,
    pub name: String,
    /// GeoJSON geometry object, as text.
    pub geojson: String,
    pub area: f64,
}

/// Configuration plus the data loaded from it.
#[derive(Debug)]
pub struct AppContext {
    pub config: AppConfig,
    pub countries: Vec<Country>,
}

impl AppContext {
    /// Open the configured database and load every country.
    ///
    /// Fails when the database cannot be opened, the spatial functions cannot
    /// be activated or the table cannot be read; callers treat this as a
    /// startup abort.
    pub fn load(config: AppConfig) -> Result<Self> {
        let client = SpatialClient::open(&config.db_path)?;
        client.try_init_spatial()?;
        let countries = load_countries(&client, &config.countries_table)?;
        tracing::info!(
            path = %config.db_path.display(),
            countries = countries.len(),
            "loaded countries"
        );
        Ok(Self { config, countries })
    }

    pub fn feature_collection(&self) -> Result<Value> {
        feature_collection(&self.countries)
    }
}

/// Read the countries table in name order.
///
/// Rows without a code or a geometry are skipped. A non-numeric area becomes 0.
pub fn load_countries(client: &SpatialClient, table: &str) -> Result<Vec<Country>> {
    let rows = client.try_query_rows(&sql_select_countries(table))?;
    let mut countries = Vec::with_capacity(rows.len());
    for row in rows {
        let cell = |idx: usize| row.get(idx).and_then(|v| value_to_string(v).ok());
        let code = cell(0).unwrap_or_default();
        let geojson = cell(2).unwrap_or_default();
        if code.is_empty() || geojson.is_empty() {
            tracing::debug!(code = %code, "skipping country without code or geometry");
            continue;
        }
        let area = row
            .get(3)
            .and_then(|v| value_to_f64(v).ok())
            .unwrap_or_default();
        countries.push(Country {
            code,
            name: cell(1).unwrap_or_default(),
            geojson,
            area,
        });
    }
    Ok(countries)
}

/// GeoJSON `FeatureCollection` with one feature per country and properties
/// `cca2`, `name` and `area`.
pub fn feature_collection(countries: &[Country]) -> Result<Value> {
    let features = countries
        .iter()
        .map(|country| -> Result<Value> {
            let geometry: Value = serde_json::from_str(&country.geojson)?;
            let mut properties = Map::new();
            properties.insert("cca2".to_string(), json!(country.code));
            properties.insert("name".to_string(), json!(country.name));
            properties.insert("area".to_string(), json!(country.area));
            Ok(json!({
                "type": "Feature",
                "properties": properties,
                "geometry": geometry,
            }))
        })
        .collect::<Result<Vec<Value>>>()?;

    Ok(json!({
        "type": "FeatureCollection",
        "features": features,
    }))
}

/// Fill color of the legend class `area` falls into.
pub fn area_color(area: f64) -> &'static str {
    AREA_LEGEND
        .iter()
        .rev()
        .find(|(lower, _)| area >= *lower)
        .map(|(_, color)| *color)
        .unwrap_or(AREA_LEGEND[0].1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpatialError;

    fn seeded_client() -> Result<SpatialClient> {
        let client = SpatialClient::open_in_memory()?;
        client.try_execute("CREATE TABLE countries (cca2 TEXT, name TEXT, geom BLOB)")?;
        for sql in [
            "INSERT INTO countries VALUES ('fr', 'France', ST_MakeEnvelope(0, 0, 10, 10))",
            "INSERT INTO countries VALUES ('be', 'Belgium', ST_MakeEnvelope(10, 10, 12, 11))",
            "INSERT INTO countries VALUES ('', 'Nowhere', ST_MakeEnvelope(0, 0, 1, 1))",
            "INSERT INTO countries VALUES ('xx', 'Null Island', NULL)",
            "INSERT INTO countries VALUES ('ci', 'Côte d''Ivoire', 'POINT(5 5)')",
        ] {
            client.try_execute(sql)?;
        }
        Ok(client)
    }

    #[test]
    fn loads_in_name_order_and_skips_incomplete_rows() -> Result<()> {
        let client = seeded_client()?;
        let countries = load_countries(&client, "countries")?;

        let names: Vec<&str> = countries.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Belgium", "Côte d'Ivoire", "France"]);
        assert_eq!(countries[0].code, "BE");
        assert_eq!(countries[0].area, 2.0);
        assert_eq!(countries[1].area, 0.0);
        assert_eq!(countries[2].area, 100.0);
        Ok(())
    }

    #[test]
    fn missing_table_is_an_error() -> Result<()> {
        let client = SpatialClient::open_in_memory()?;
        assert!(matches!(
            load_countries(&client, "countries"),
            Err(SpatialError::Sql(_))
        ));
        Ok(())
    }

    #[test]
    fn builds_one_feature_per_country() -> Result<()> {
        let client = seeded_client()?;
        let countries = load_countries(&client, "countries")?;
        let collection = feature_collection(&countries)?;

        assert_eq!(collection["type"], "FeatureCollection");
        let features = collection["features"].as_array().cloned().unwrap_or_default();
        assert_eq!(features.len(), 3);
        assert_eq!(features[0]["properties"]["cca2"], "BE");
        assert_eq!(features[1]["properties"]["name"], "Côte d'Ivoire");
        assert_eq!(features[1]["geometry"]["type"], "Point");
        assert_eq!(features[2]["geometry"]["type"], "Polygon");
        Ok(())
    }

    #[test]
    fn invalid_geojson_is_rejected() {
        let country = Country {
            code: "ZZ".to_string(),
            name: "Broken".to_string(),
            geojson: "{not json".to_string(),
            area: 1.0,
        };
        assert!(matches!(
            feature_collection(&[country]),
            Err(SpatialError::GeoJson(_))
        ));
    }

    #[test]
    fn context_loads_from_file() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let config = AppConfig {
            db_path: dir.path().join("world.db"),
            countries_table: "land".to_string(),
        };
        {
            let client = SpatialClient::open(&config.db_path)?;
            client.try_execute("CREATE TABLE land (cca2 TEXT, name TEXT, geom BLOB)")?;
            client.try_execute(
                "INSERT INTO land VALUES ('de', 'Germany', ST_MakeEnvelope(0, 0, 3, 3))",
            )?;
        }

        let context = AppContext::load(config)?;
        assert_eq!(context.countries.len(), 1);
        assert_eq!(context.countries[0].area, 9.0);
        assert_eq!(
            context.feature_collection()?["features"][0]["properties"]["cca2"],
            "DE"
        );
        Ok(())
    }

    #[test]
    fn legend_classes() {
        assert_eq!(area_color(-1.0), "#ffffcc");
        assert_eq!(area_color(50.0), "#ffffcc");
        assert_eq!(area_color(100.0), "#c7e9b4");
        assert_eq!(area_color(7500.0), "#41b6c4");
        assert_eq!(area_color(2_000_000.0), "#0c2c84");
    }
}
