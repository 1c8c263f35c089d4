mod app_config;
mod app_error;
mod nearby_app;

pub use app_config::AppConfig;
pub use app_error::AppError;
pub use nearby_app::{NearbyApp, NearbyOperation};
