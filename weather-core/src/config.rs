//! Three-tier configuration merge: command line > settings file > compiled defaults.

use std::time::Duration;

use tracing::{debug, warn};

use crate::{
    constants::{
        DEFAULT_FORECAST_PERIODS, DEFAULT_REFRESH_DELAY_MINUTES, DEFAULT_RETRY_DELAY_MINUTES,
        UNSET_ZIP_CODE,
    },
    error::{Result, WeatherError},
    location::{Location, is_valid_zip, validate_zip},
    settings::Settings,
};

/// Configuration the poll loop runs with. Never mutated after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub zip_code: String,
    pub refresh_delay_minutes: u32,
    pub retry_delay_minutes: u32,
    pub forecast_periods: u32,
    pub word_wrap: bool,
}

impl EffectiveConfig {
    pub fn refresh_delay(&self) -> Duration {
        Duration::from_secs(u64::from(self.refresh_delay_minutes) * 60)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(u64::from(self.retry_delay_minutes) * 60)
    }

    pub fn validate(&self) -> Result<()> {
        validate_zip(&self.zip_code)?;
        for (name, value) in [
            ("refresh delay", self.refresh_delay_minutes),
            ("retry delay", self.retry_delay_minutes),
            ("forecast period count", self.forecast_periods),
        ] {
            if value == 0 {
                let message = format!("{name} must be greater than zero");
                return Err(WeatherError::InvalidInput(message));
            }
        }
        Ok(())
    }
}

/// Compiled-in fallback values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    pub refresh_delay_minutes: u32,
    pub retry_delay_minutes: u32,
    pub forecast_periods: u32,
    pub word_wrap: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            refresh_delay_minutes: DEFAULT_REFRESH_DELAY_MINUTES,
            retry_delay_minutes: DEFAULT_RETRY_DELAY_MINUTES,
            forecast_periods: DEFAULT_FORECAST_PERIODS,
            word_wrap: true,
        }
    }
}

/// Values explicitly supplied on the command line. `None` means "not given".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub zip_code: Option<String>,
    pub refresh_delay_minutes: Option<u32>,
    pub retry_delay_minutes: Option<u32>,
    pub forecast_periods: Option<u32>,
    pub word_wrap: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub config: EffectiveConfig,
    /// Cached location carried over from the settings file, if still valid for the ZIP.
    pub location: Option<Location>,
    /// One line per setting that differs from its compiled default.
    pub notices: Vec<String>,
}

impl Resolution {
    pub fn needs_location_refresh(&self) -> bool {
        self.location.is_none()
    }
}

/// Merges the three tiers. `prompt` is called repeatedly until it yields a
/// valid ZIP code, and only when neither the command line nor the settings
/// file supplies one.
pub fn resolve<P>(
    cli: &CliOverrides,
    persisted: Option<&Settings>,
    defaults: &Defaults,
    mut prompt: P,
) -> Result<Resolution>
where
    P: FnMut() -> Result<String>,
{
    let mut refresh = defaults.refresh_delay_minutes;
    let mut retry = defaults.retry_delay_minutes;
    let mut periods = defaults.forecast_periods;

    if let Some(saved) = persisted {
        overlay(&mut refresh, saved.delay);
        overlay(&mut retry, saved.retry);
        overlay(&mut periods, saved.periods);
    }

    let saved_zip = persisted
        .and_then(|s| s.zip_code.as_deref())
        .filter(|z| is_valid_zip(z));
    let zip_code = match cli.zip_code.as_deref().filter(|z| *z != UNSET_ZIP_CODE) {
        Some(zip) => {
            validate_zip(zip)?;
            zip.to_string()
        }
        None => match saved_zip {
            Some(zip) => zip.to_string(),
            None => prompt_for_zip(&mut prompt)?,
        },
    };

    let location = persisted
        .and_then(Settings::location)
        .filter(|location| location.is_usable_for(&zip_code));
    if location.is_none() {
        debug!(zip = %zip_code, "No cached location for ZIP code");
    }

    overlay(&mut refresh, cli.refresh_delay_minutes);
    overlay(&mut retry, cli.retry_delay_minutes);
    overlay(&mut periods, cli.forecast_periods);

    let config = EffectiveConfig {
        zip_code,
        refresh_delay_minutes: refresh,
        retry_delay_minutes: retry,
        forecast_periods: periods,
        word_wrap: cli.word_wrap.unwrap_or(defaults.word_wrap),
    };
    config.validate()?;

    let mut notices = Vec::new();
    if refresh != defaults.refresh_delay_minutes {
        notices.push(format!("Refresh delay: {refresh} minutes"));
    }
    if retry != defaults.retry_delay_minutes {
        notices.push(format!("Retry delay: {retry} minutes"));
    }

    Ok(Resolution {
        config,
        location,
        notices,
    })
}

// Zero is never a usable duration or count, so it never overrides a lower tier.
fn overlay(slot: &mut u32, value: Option<u32>) {
    if let Some(v) = value.filter(|v| *v > 0) {
        *slot = v;
    }
}

fn prompt_for_zip<P>(prompt: &mut P) -> Result<String>
where
    P: FnMut() -> Result<String>,
{
    loop {
        let input = prompt()?;
        let input = input.trim();
        if is_valid_zip(input) {
            return Ok(input.to_string());
        }
        warn!(input, "Rejected ZIP code, asking again");
    }
}
