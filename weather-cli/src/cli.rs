use std::{io, time::Duration};

use anyhow::Context;
use clap::{ArgAction, Parser};
use weather_alerts_core::{
    CliOverrides, Endpoints, HttpTransport, PollLoop, SettingsStore, TokioSleeper, WeatherError,
    bootstrap, constants::DEFAULT_HTTP_TIMEOUT_SECS,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weather-alerts",
    version,
    about = "Periodically prints the NWS forecast and active alerts for a US ZIP code"
)]
pub struct Cli {
    /// US ZIP code for the weather forecast.
    #[arg(value_name = "ZIP")]
    pub zip: Option<String>,

    /// US ZIP code for the weather forecast (same as the positional argument).
    #[arg(short = 'z', long = "zipcode", value_name = "ZIP")]
    pub zipcode: Option<String>,

    /// Number of forecast periods to display.
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub periods: Option<u32>,

    /// Word wrap output.
    #[arg(short, long, default_value_t = true, action = ArgAction::Set)]
    pub wordwrap: bool,

    /// Refresh delay in minutes [default: 90].
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub delay: Option<u32>,

    /// Error retry delay in minutes [default: 5].
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub retry: Option<u32>,

    /// HTTP request timeout in seconds.
    #[arg(short, long, default_value_t = DEFAULT_HTTP_TIMEOUT_SECS)]
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,
}

impl Cli {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            zip_code: self.zipcode.clone().or_else(|| self.zip.clone()),
            refresh_delay_minutes: self.delay,
            retry_delay_minutes: self.retry,
            forecast_periods: self.periods,
            word_wrap: Some(self.wordwrap),
        }
    }

    /// Resolves settings and location, then polls until the process is killed.
    pub async fn run(self) -> anyhow::Result<()> {
        let transport = HttpTransport::new(Duration::from_secs(self.timeout))
            .context("Failed to set up HTTP client")?;
        let store = SettingsStore::beside_executable()?;

        let startup = bootstrap(
            &self.overrides(),
            &store,
            &transport,
            Endpoints::default(),
            prompt_zip,
        )
        .await
        .context("Startup failed")?;

        for notice in &startup.notices {
            println!("{notice}");
        }
        println!(
            "Forecast for {}, {} ({})\n",
            startup.location.city, startup.location.state, startup.config.zip_code
        );

        let mut poll = PollLoop::new(
            &transport,
            TokioSleeper,
            io::stdout(),
            startup.config,
            startup.location,
        );
        match poll.run().await.context("Polling stopped")? {}
    }
}

fn prompt_zip() -> weather_alerts_core::Result<String> {
    inquire::Text::new("ZIP code:")
        .with_help_message("5-digit US ZIP code")
        .prompt()
        .map_err(|e| WeatherError::Prompt(e.to_string()))
}
