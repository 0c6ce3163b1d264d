// Configuration loading

pub mod settings;

pub use settings::{ConfigError, DataSource, PressSettings, Settings, SourceSettings};
