//! ZIP code bootstrap: ZIP -> "lat,lon" (NDFD XML) -> grid point (api.weather.gov JSON).

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    constants::{ALERTS_BY_ZONE_URL, GRID_POINTS_URL, ZIP_LOOKUP_URL},
    error::{Result, WeatherError},
    transport::Transport,
};

static ZIP_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{5}$").expect("valid ZIP pattern"));

/// True when `zip` is exactly five ASCII digits.
pub fn is_valid_zip(zip: &str) -> bool {
    ZIP_CODE.is_match(zip)
}

pub fn validate_zip(zip: &str) -> Result<()> {
    if is_valid_zip(zip) {
        Ok(())
    } else {
        Err(WeatherError::InvalidInput(format!(
            "ZIP code '{zip}' must be exactly 5 digits"
        )))
    }
}

/// Stable forecast/alerts endpoints for one ZIP code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub zip_code: String,
    pub city: String,
    pub state: String,
    pub forecast_url: String,
    pub alerts_url: String,
}

impl Location {
    /// A location is only usable for the ZIP code it was resolved for.
    pub fn is_usable_for(&self, zip: &str) -> bool {
        self.zip_code == zip && !self.forecast_url.is_empty() && !self.alerts_url.is_empty()
    }
}

/// Base URLs for the two lookups plus the alerts endpoint.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub zip_lookup: String,
    pub grid_points: String,
    pub alerts_by_zone: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            zip_lookup: ZIP_LOOKUP_URL.to_string(),
            grid_points: GRID_POINTS_URL.to_string(),
            alerts_by_zone: ALERTS_BY_ZONE_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Dwml {
    #[serde(rename = "latLonList")]
    lat_lon_list: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PointsResponse {
    properties: PointsProperties,
}

#[derive(Debug, Deserialize)]
struct PointsProperties {
    forecast: String,
    county: String,
    #[serde(rename = "relativeLocation")]
    relative_location: RelativeLocation,
}

#[derive(Debug, Deserialize)]
struct RelativeLocation {
    properties: RelativeLocationProperties,
}

#[derive(Debug, Deserialize)]
struct RelativeLocationProperties {
    city: String,
    state: String,
}

pub struct LocationResolver<'a, T: Transport + ?Sized> {
    transport: &'a T,
    endpoints: Endpoints,
}

impl<'a, T: Transport + ?Sized> LocationResolver<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self::with_endpoints(transport, Endpoints::default())
    }

    pub fn with_endpoints(transport: &'a T, endpoints: Endpoints) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    pub async fn resolve(&self, zip: &str) -> Result<Location> {
        validate_zip(zip)?;
        debug!(zip, "Resolving location");

        let xml = self
            .transport
            .fetch(&format!("{}{}", self.endpoints.zip_lookup, zip))
            .await?;
        let lat_lon = parse_lat_lon(zip, &xml)?;
        debug!(zip, lat_lon = %lat_lon, "ZIP code mapped to coordinates");

        let json = self
            .transport
            .fetch(&format!("{}{}", self.endpoints.grid_points, lat_lon))
            .await?;
        let location = self.parse_grid_point(zip, &json)?;

        info!(
            zip,
            city = %location.city,
            state = %location.state,
            forecast = %location.forecast_url,
            alerts = %location.alerts_url,
            "Location resolved"
        );
        Ok(location)
    }

    fn parse_grid_point(&self, zip: &str, json: &str) -> Result<Location> {
        let points: PointsResponse = serde_json::from_str(json)
            .map_err(|e| WeatherError::location(zip, format!("bad grid point response: {e}")))?;
        let props = points.properties;

        let Some(zone) = zone_id(&props.county) else {
            let message = format!("no zone in county '{}'", props.county);
            return Err(WeatherError::location(zip, message));
        };

        Ok(Location {
            zip_code: zip.to_string(),
            city: props.relative_location.properties.city,
            state: props.relative_location.properties.state,
            forecast_url: props.forecast,
            alerts_url: format!("{}{}", self.endpoints.alerts_by_zone, zone),
        })
    }
}

fn parse_lat_lon(zip: &str, xml: &str) -> Result<String> {
    let doc: Dwml = quick_xml::de::from_str(xml)
        .map_err(|e| WeatherError::location(zip, format!("bad coordinate lookup response: {e}")))?;

    match doc.lat_lon_list.map(|s| s.trim().to_string()) {
        Some(lat_lon) if !lat_lon.is_empty() && lat_lon.contains(',') => Ok(lat_lon),
        _ => Err(WeatherError::location(zip, "no coordinates in lookup")),
    }
}

/// Last path segment of a zone URL, e.g. `.../zones/county/PAC041` -> `PAC041`.
fn zone_id(county: &str) -> Option<&str> {
    county.rsplit('/').next().filter(|s| !s.is_empty())
}
