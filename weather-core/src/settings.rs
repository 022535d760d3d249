use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    config::EffectiveConfig,
    constants::SETTINGS_FILE_NAME,
    error::{Result, WeatherError},
    location::Location,
};

/// On-disk shape of `settings.json`. Every key is optional on load.
///
/// Example:
/// {"zipCode":"17055","delay":90,"retry":5,"periods":7,
///  "forecastAPI":"https://api.weather.gov/gridpoints/CTP/85,50/forecast",
///  "alertsAPI":"https://api.weather.gov/alerts/active/zone/PAC041",
///  "city":"Mechanicsburg","state":"PA"}
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub zip_code: Option<String>,
    pub delay: Option<u32>,
    pub retry: Option<u32>,
    pub periods: Option<u32>,
    #[serde(rename = "forecastAPI")]
    pub forecast_api: Option<String>,
    #[serde(rename = "alertsAPI")]
    pub alerts_api: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

impl Settings {
    pub fn from_parts(config: &EffectiveConfig, location: &Location) -> Self {
        Self {
            zip_code: Some(config.zip_code.clone()),
            delay: Some(config.refresh_delay_minutes),
            retry: Some(config.retry_delay_minutes),
            periods: Some(config.forecast_periods),
            forecast_api: Some(location.forecast_url.clone()),
            alerts_api: Some(location.alerts_url.clone()),
            city: Some(location.city.clone()),
            state: Some(location.state.clone()),
        }
    }

    /// The cached location, if the file holds a ZIP code and both endpoints.
    pub fn location(&self) -> Option<Location> {
        let location = Location {
            zip_code: self.zip_code.clone()?,
            city: self.city.clone().unwrap_or_default(),
            state: self.state.clone().unwrap_or_default(),
            forecast_url: self.forecast_api.clone()?,
            alerts_url: self.alerts_api.clone()?,
        };
        location
            .is_usable_for(&location.zip_code)
            .then_some(location)
    }
}

/// Loads and saves [`Settings`] at a fixed path.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `settings.json` in the directory holding the running executable.
    pub fn beside_executable() -> Result<Self> {
        let exe = std::env::current_exe().map_err(|source| WeatherError::Io {
            path: PathBuf::from("<current executable>"),
            source,
        })?;
        let dir = exe.parent().unwrap_or_else(|| Path::new("."));
        Ok(Self::at(dir.join(SETTINGS_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when no file exists yet; a file that cannot be parsed is an error.
    pub fn load(&self) -> Result<Option<Settings>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No settings file");
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path).map_err(io_error(&self.path))?;
        let settings = serde_json::from_str(&contents).map_err(|e| self.corrupt(e))?;

        Ok(Some(settings))
    }

    /// Overwrites the whole file. The new contents are written and synced to a
    /// sibling temp file first, then renamed into place.
    pub fn save(&self, config: &EffectiveConfig, location: &Location) -> Result<()> {
        let settings = Settings::from_parts(config, location);
        let json = serde_json::to_string_pretty(&settings)
            .map_err(|e| self.corrupt(e))?;

        let tmp = self.path.with_extension("json.tmp");
        let mut file = File::create(&tmp).map_err(io_error(&tmp))?;
        file.write_all(json.as_bytes()).map_err(io_error(&tmp))?;
        file.sync_all().map_err(io_error(&tmp))?;
        drop(file);
        fs::rename(&tmp, &self.path).map_err(io_error(&self.path))?;

        info!(path = %self.path.display(), zip = %config.zip_code, "Settings saved");
        Ok(())
    }

    fn corrupt(&self, err: serde_json::Error) -> WeatherError {
        WeatherError::SettingsCorrupt {
            path: self.path.clone(),
            message: err.to_string(),
        }
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> WeatherError {
    let path = path.to_path_buf();
    move |source| WeatherError::Io { path, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CliOverrides, Defaults, resolve};
    use crate::error::ErrorKind;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, SettingsStore) {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::at(dir.path().join(SETTINGS_FILE_NAME));
        (dir, store)
    }

    fn sample() -> (EffectiveConfig, Location) {
        let config = EffectiveConfig {
            zip_code: "17055".into(),
            refresh_delay_minutes: 60,
            retry_delay_minutes: 10,
            forecast_periods: 4,
            word_wrap: true,
        };
        let location = Location {
            zip_code: "17055".into(),
            city: "Mechanicsburg".into(),
            state: "PA".into(),
            forecast_url: "https://api.weather.gov/gridpoints/CTP/85,50/forecast".into(),
            alerts_url: "https://api.weather.gov/alerts/active/zone/PAC041".into(),
        };
        (config, location)
    }

    #[test]
    fn missing_file_loads_as_absent() {
        let (_dir, store) = store();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let (_dir, store) = store();
        fs::write(store.path(), "{\"zipCode\": ").unwrap();

        let err = store.load().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SettingsCorrupt);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn wrong_value_type_is_corrupt() {
        let (_dir, store) = store();
        let negative = r#"{"zipCode":"17055","delay":-3}"#;
        fs::write(store.path(), negative).unwrap();

        let err = store.load().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SettingsCorrupt);
    }

    #[test]
    fn save_writes_documented_keys() {
        let (_dir, store) = store();
        let (config, location) = sample();
        store.save(&config, &location).unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(raw["zipCode"], "17055");
        assert_eq!(raw["delay"], 60);
        assert_eq!(raw["retry"], 10);
        assert_eq!(raw["periods"], 4);
        assert_eq!(raw["forecastAPI"], location.forecast_url.as_str());
        assert_eq!(raw["alertsAPI"], location.alerts_url.as_str());
        assert_eq!(raw["city"], "Mechanicsburg");
        assert_eq!(raw["state"], "PA");
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn save_overwrites_previous_contents() {
        let (_dir, store) = store();
        let (config, location) = sample();
        store.save(&config, &location).unwrap();

        let moved = EffectiveConfig {
            zip_code: "10001".into(),
            ..config
        };
        let ny = Location {
            zip_code: "10001".into(),
            city: "New York".into(),
            ..location
        };
        store.save(&moved, &ny).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.zip_code.as_deref(), Some("10001"));
        assert_eq!(loaded.city.as_deref(), Some("New York"));
    }

    #[test]
    fn save_into_missing_directory_reports_temp_path() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::at(dir.path().join("gone").join(SETTINGS_FILE_NAME));
        let (config, location) = sample();

        let err = store.save(&config, &location).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("settings.json.tmp"), "{err}");
        assert!(!store.path().exists());
    }

    #[test]
    fn save_leaves_no_temp_file_and_replaces_atomically() {
        let (_dir, store) = store();
        let (config, location) = sample();
        fs::write(store.path(), "stale").unwrap();

        store.save(&config, &location).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, Settings::from_parts(&config, &location));
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn partial_file_loads_what_is_present() {
        let (_dir, store) = store();
        let partial = r#"{"zipCode":"17055","delay":45}"#;
        fs::write(store.path(), partial).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.zip_code.as_deref(), Some("17055"));
        assert_eq!(loaded.delay, Some(45));
        assert_eq!(loaded.retry, None);
        assert_eq!(loaded.location(), None);
    }

    proptest! {
        #[test]
        fn save_then_load_round_trips(
            zip in "[0-9]{5}",
            delay in 1u32..10_000,
            retry in 1u32..10_000,
            periods in 1u32..14,
            city in "[A-Za-z .'-]{0,24}",
            state in "[A-Z]{2}",
            office in "[A-Z]{3}",
            zone in "[A-Z]{2}[CZ][0-9]{3}",
        ) {
            let (_dir, store) = store();
            let config = EffectiveConfig {
                zip_code: zip.clone(),
                refresh_delay_minutes: delay,
                retry_delay_minutes: retry,
                forecast_periods: periods,
                word_wrap: true,
            };
            let location = Location {
                zip_code: zip,
                city,
                state,
                forecast_url: format!("https://api.weather.gov/gridpoints/{office}/1,2/forecast"),
                alerts_url: format!("https://api.weather.gov/alerts/active/zone/{zone}"),
            };

            store.save(&config, &location).unwrap();
            let loaded = store.load().unwrap().unwrap();

            prop_assert_eq!(&loaded, &Settings::from_parts(&config, &location));
            prop_assert_eq!(loaded.location(), Some(location.clone()));

            let resolved = resolve(
                &CliOverrides::default(),
                Some(&loaded),
                &Defaults::default(),
                || -> Result<String> { panic!("saved ZIP code must be used") },
            )
            .unwrap();
            prop_assert_eq!(resolved.config, config);
            prop_assert_eq!(resolved.location, Some(location));
        }
    }
}
