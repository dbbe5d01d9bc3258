//! Shared data model and configuration for the outlet map client.

mod app_config;
mod config;
pub mod outlet;
pub mod services;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, parse_base_url};
pub use outlet::{CatchmentPoint, LatLng, Outlet, OutletId};
pub use services::{google_maps_url, service_icon};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
