//! Fetch -> parse -> render -> sleep, forever.

use std::{convert::Infallible, fmt::Debug, io::Write, path::PathBuf, time::Duration};

use async_trait::async_trait;
use chrono::Local;
use tracing::{debug, warn};

use crate::{
    config::EffectiveConfig,
    error::{ErrorKind, Result, WeatherError},
    location::Location,
    render::{Renderer, format_timestamp},
    snapshot::WeatherSnapshot,
    transport::Transport,
};

/// The loop's only suspension point.
#[async_trait]
pub trait Sleeper: Send + Sync + Debug {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Output was printed; slept for the refresh delay.
    Rendered,
    /// A recoverable error was reported; slept for the retry delay.
    Failed(ErrorKind),
}

pub struct PollLoop<'a, T: Transport + ?Sized, S: Sleeper, W: Write> {
    transport: &'a T,
    sleeper: S,
    out: W,
    config: EffectiveConfig,
    location: Location,
    renderer: Renderer,
}

impl<'a, T: Transport + ?Sized, S: Sleeper, W: Write> PollLoop<'a, T, S, W> {
    pub fn new(
        transport: &'a T,
        sleeper: S,
        out: W,
        config: EffectiveConfig,
        location: Location,
    ) -> Self {
        let renderer = Renderer::new(config.word_wrap);
        Self {
            transport,
            sleeper,
            out,
            config,
            location,
            renderer,
        }
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    /// Runs until the process is killed. Only returns on an error that is
    /// not a recoverable network or data failure.
    pub async fn run(&mut self) -> Result<Infallible> {
        loop {
            self.tick().await?;
        }
    }

    /// One cycle, including the sleep that follows it.
    pub async fn tick(&mut self) -> Result<CycleOutcome> {
        let run_line = format!("Run: \t\t{}\n", format_timestamp(&Local::now()));
        self.emit(&run_line)?;

        match self.cycle().await {
            Ok(text) => {
                self.emit(&format!("{text}---\n"))?;
                debug!(minutes = self.config.refresh_delay_minutes, "Cycle complete");
                self.sleeper.sleep(self.config.refresh_delay()).await;
                Ok(CycleOutcome::Rendered)
            }
            Err(err) if err.is_recoverable() => {
                let minutes = self.config.retry_delay_minutes;
                warn!(error = %err, minutes, "Cycle failed, will retry");
                self.emit(&format!("{}\n", diagnostic(&err)))?;
                self.sleeper.sleep(self.config.retry_delay()).await;
                Ok(CycleOutcome::Failed(err.kind()))
            }
            Err(err) => Err(err),
        }
    }

    async fn cycle(&self) -> Result<String> {
        let forecast = self.transport.fetch(&self.location.forecast_url).await?;
        let alerts = self.transport.fetch(&self.location.alerts_url).await?;
        let snapshot = WeatherSnapshot::parse(&forecast, &alerts)?;
        let periods = self.config.forecast_periods as usize;
        self.renderer.snapshot(&snapshot, periods)
    }

    fn emit(&mut self, text: &str) -> Result<()> {
        self.out
            .write_all(text.as_bytes())
            .and_then(|()| self.out.flush())
            .map_err(|source| WeatherError::Io {
                path: PathBuf::from("<output>"),
                source,
            })
    }
}

fn diagnostic(err: &WeatherError) -> String {
    match err.kind() {
        ErrorKind::Transport => format!("Network error: {err}"),
        ErrorKind::MalformedResponse | ErrorKind::IndexOutOfRange => format!("Data error: {err}"),
        _ => format!("Error: {err}"),
    }
}
