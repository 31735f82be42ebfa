pub mod config;
pub mod error;
pub mod forecast;
pub mod geocoding;
pub mod locator;
pub mod logging;
pub mod model;
pub mod presenter;
pub mod providers;
pub mod resolver;
pub mod session;
pub mod status;
pub mod units;
pub mod weather_code;
