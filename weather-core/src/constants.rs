/// User agent sent with every request; api.weather.gov rejects anonymous clients.
pub const USER_AGENT: &str = concat!("weather-alerts/", env!("CARGO_PKG_VERSION"));

/// NDFD lookup that maps a ZIP code to a "lat,lon" pair (XML response).
pub const ZIP_LOOKUP_URL: &str = concat!(
    "https://graphical.weather.gov/xml/sample_products/browser_interface/",
    "ndfdXMLclient.php?listZipCodeList=",
);

/// Grid point lookup, suffixed with "lat,lon".
pub const GRID_POINTS_URL: &str = "https://api.weather.gov/points/";

/// Active alerts, suffixed with a zone id such as `PAC041`.
pub const ALERTS_BY_ZONE_URL: &str = "https://api.weather.gov/alerts/active/zone/";

/// Postal code placeholder meaning "not supplied on the command line".
pub const UNSET_ZIP_CODE: &str = "00000";

pub const DEFAULT_REFRESH_DELAY_MINUTES: u32 = 90;
pub const DEFAULT_RETRY_DELAY_MINUTES: u32 = 5;
pub const DEFAULT_FORECAST_PERIODS: u32 = 7;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_WRAP_WIDTH: usize = 80;

pub const SETTINGS_FILE_NAME: &str = "settings.json";
