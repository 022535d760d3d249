use chrono::{DateTime, Local, NaiveDateTime};
use serde::Deserialize;

use crate::error::{Result, WeatherError};

/// One named forecast entry, e.g. "Tonight".
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPeriod {
    pub name: String,
    pub detailed_forecast: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertEntry {
    pub event: String,
    pub headline: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct ForecastDocument {
    properties: ForecastProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ForecastProperties {
    generated_at: Option<String>,
    update_time: Option<String>,
    periods: Vec<ForecastPeriod>,
}

#[derive(Debug, Deserialize)]
struct AlertDocument {
    features: Vec<AlertFeature>,
}

#[derive(Debug, Deserialize)]
struct AlertFeature {
    properties: AlertProperties,
}

#[derive(Debug, Deserialize)]
struct AlertProperties {
    event: String,
    headline: Option<String>,
    description: Option<String>,
}

/// Parsed forecast and alerts for a single poll cycle.
#[derive(Debug, Clone)]
pub struct WeatherSnapshot {
    generated_at: Option<String>,
    update_time: Option<String>,
    periods: Vec<ForecastPeriod>,
    alerts: Vec<AlertEntry>,
}

impl WeatherSnapshot {
    pub fn parse(forecast_body: &str, alerts_body: &str) -> Result<Self> {
        let forecast: ForecastDocument = serde_json::from_str(forecast_body)
            .map_err(|e| WeatherError::malformed("forecast", e.to_string()))?;
        let alerts: AlertDocument = serde_json::from_str(alerts_body)
            .map_err(|e| WeatherError::malformed("alerts", e.to_string()))?;

        let alerts = alerts
            .features
            .into_iter()
            .map(|f| AlertEntry {
                event: f.properties.event,
                headline: f.properties.headline.unwrap_or_default(),
                description: f.properties.description.unwrap_or_default(),
            })
            .collect();

        Ok(Self {
            generated_at: forecast.properties.generated_at,
            update_time: forecast.properties.update_time,
            periods: forecast.properties.periods,
            alerts,
        })
    }

    /// When the forecast was generated, in local time.
    pub fn generated_at(&self) -> Result<DateTime<Local>> {
        parse_utc_timestamp("generatedAt", self.generated_at.as_deref())
    }

    /// When the forecast data was last updated, in local time.
    pub fn updated_at(&self) -> Result<DateTime<Local>> {
        parse_utc_timestamp("updateTime", self.update_time.as_deref())
    }

    pub fn period_count(&self) -> usize {
        self.periods.len()
    }

    pub fn forecast_period(&self, index: usize) -> Result<&ForecastPeriod> {
        self.periods
            .get(index)
            .ok_or(WeatherError::IndexOutOfRange {
                index,
                available: self.periods.len(),
            })
    }

    pub fn alerts(&self) -> &[AlertEntry] {
        &self.alerts
    }
}

// Whole seconds only: the first 19 characters ("YYYY-MM-DDTHH:MM:SS") are read as UTC.
fn parse_utc_timestamp(field: &'static str, raw: Option<&str>) -> Result<DateTime<Local>> {
    let malformed = |message: String| WeatherError::malformed("forecast", message);

    let raw = raw.ok_or_else(|| malformed(format!("missing {field}")))?;
    let head = raw
        .get(..19)
        .ok_or_else(|| malformed(format!("{field} too short: '{raw}'")))?;

    let naive = NaiveDateTime::parse_from_str(head, "%Y-%m-%dT%H:%M:%S")
        .map_err(|e| malformed(format!("{field} '{raw}': {e}")))?;

    Ok(naive.and_utc().with_timezone(&Local))
}
