//! Resolve configuration, bootstrap the location when needed, persist the result.

use tracing::info;

use crate::{
    config::{self, CliOverrides, Defaults, EffectiveConfig},
    error::Result,
    location::{Endpoints, Location, LocationResolver},
    settings::SettingsStore,
    transport::Transport,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Startup {
    pub config: EffectiveConfig,
    pub location: Location,
    pub notices: Vec<String>,
    /// Whether the two-call location lookup ran on this start.
    pub resolved_location: bool,
}

pub async fn bootstrap<T, P>(
    overrides: &CliOverrides,
    store: &SettingsStore,
    transport: &T,
    endpoints: Endpoints,
    prompt: P,
) -> Result<Startup>
where
    T: Transport + ?Sized,
    P: FnMut() -> Result<String>,
{
    let persisted = store.load()?;
    let defaults = Defaults::default();
    let resolution = config::resolve(overrides, persisted.as_ref(), &defaults, prompt)?;

    let resolved_location = resolution.needs_location_refresh();
    let location = match resolution.location {
        Some(location) => location,
        None => {
            info!(zip = %resolution.config.zip_code, "Looking up forecast and alert endpoints");
            LocationResolver::with_endpoints(transport, endpoints)
                .resolve(&resolution.config.zip_code)
                .await?
        }
    };

    store.save(&resolution.config, &location)?;

    Ok(Startup {
        config: resolution.config,
        location,
        notices: resolution.notices,
        resolved_location,
    })
}
