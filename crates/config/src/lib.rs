// Configuration loading

pub mod settings;

pub use settings::{OutputSettings, Settings, SettingsError};
