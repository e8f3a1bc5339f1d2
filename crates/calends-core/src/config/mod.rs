use anyhow::Result;
use config::{Config, ConfigBuilder, FileFormat, builder::DefaultState};
use serde::Deserialize;

use crate::error::{CoreError, CoreResult};

/// Largest year the recurrence engine will expand into.
pub const DEFAULT_MAX_YEAR: i32 = 9999;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub recurrence: RecurrenceConfig,
    pub logging: LoggingConfig,
}

/// How recurrence sets decide that two occurrences are the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchModeSetting {
    /// Compare the literal calendar and clock fields.
    WallTime,
    /// Compare the UTC instants.
    Absolute,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecurrenceConfig {
    pub match_mode: MatchModeSetting,
    pub max_year: i32,
}

impl Default for RecurrenceConfig {
    fn default() -> Self {
        Self {
            match_mode: MatchModeSetting::Absolute,
            max_year: DEFAULT_MAX_YEAR,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

fn with_defaults() -> Result<ConfigBuilder<DefaultState>> {
    Ok(Config::builder()
        .set_default("recurrence.match_mode", "absolute")?
        .set_default("recurrence.max_year", DEFAULT_MAX_YEAR)?
        .set_default("logging.level", "info")?)
}

impl Settings {
    /// ## Summary
    /// Loads configuration from environment variables and an optional `calends.toml`.
    /// Environment variables (`CALENDS_RECURRENCE__MATCH_MODE`, ...) take precedence.
    ///
    /// ## Errors
    /// Returns an error if building the configuration, deserializing it, or
    /// validating it fails.
    pub fn load() -> Result<Self> {
        let settings = with_defaults()?
            // TOML file
            .add_source(config::File::with_name("calends.toml").required(false))
            // Env
            .add_source(
                config::Environment::with_prefix("CALENDS")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;
        Ok(settings)
    }

    /// ## Summary
    /// Builds settings from TOML text layered over the defaults.
    ///
    /// ## Errors
    /// Returns an error if the TOML is malformed or the values are invalid.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let settings = with_defaults()?
            .add_source(config::File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;
        Ok(settings)
    }

    /// ## Summary
    /// Checks values that deserialize fine but make no sense for the engine.
    ///
    /// ## Errors
    /// Returns `CoreError::ConfigError` if `max_year` is outside `1..=9999`,
    /// and `CoreError::ValidationError` if the log level is empty.
    pub fn validate(&self) -> CoreResult<()> {
        if !(1..=DEFAULT_MAX_YEAR).contains(&self.recurrence.max_year) {
            return Err(CoreError::ConfigError(format!(
                "recurrence.max_year must be within 1..={DEFAULT_MAX_YEAR}, got {}",
                self.recurrence.max_year
            )));
        }
        if self.logging.level.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "logging.level must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
