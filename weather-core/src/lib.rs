//! Core library for the `weather-alerts` terminal client.
//!
//! This crate defines:
//! - ZIP code -> forecast/alerts endpoint bootstrap (`location`)
//! - Settings persistence next to the executable (`settings`)
//! - Command line / settings / default merge (`config`)
//! - Forecast and alert document parsing (`snapshot`) and text output (`render`)
//! - The fetch/render/sleep loop with retry on recoverable failures (`poll`)
//!
//! It is used by `weather-alerts`, but the pieces are usable on their own.

pub mod config;
pub mod constants;
pub mod error;
pub mod location;
pub mod poll;
pub mod render;
pub mod settings;
pub mod snapshot;
pub mod startup;
pub mod transport;

pub use config::{CliOverrides, Defaults, EffectiveConfig, Resolution};
pub use error::{ErrorKind, Result, WeatherError};
pub use location::{Endpoints, Location, LocationResolver};
pub use poll::{CycleOutcome, PollLoop, Sleeper, TokioSleeper};
pub use render::Renderer;
pub use settings::{Settings, SettingsStore};
pub use snapshot::{AlertEntry, ForecastPeriod, WeatherSnapshot};
pub use startup::{Startup, bootstrap};
pub use transport::{HttpTransport, Transport};
