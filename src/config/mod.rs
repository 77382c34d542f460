/// Database configuration and connection management
pub mod database;

/// Authentication and business settings from config.toml
pub mod settings;

pub use settings::{AppConfig, AuthSettings, BusinessSettings, load_app_configuration};
