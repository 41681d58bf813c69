//! The `config` module loads broker and logging settings.
//!
//! Sources are layered: an optional `.env` file, an optional
//! `config/default` file, then `FANOUT_`-prefixed environment variables
//! using `__` as the section separator (`FANOUT_BROKER__CHANNEL_CAPACITY=4`,
//! `FANOUT_LOG__LEVEL=debug`).
//! Anything left unspecified falls back to `Settings::default()`.

mod settings;

use config::{Config, ConfigError, Environment, File};

use settings::PartialSettings;

pub use settings::{BrokerSettings, LogSettings, MIN_ID_BYTES, Settings};

/// Loads the configuration from the default file and environment variables
/// and merges it with default values.
pub fn load_config() -> Result<Settings, ConfigError> {
    // A missing .env is the normal case
    let _ = dotenvy::dotenv();

    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            Environment::with_prefix("FANOUT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    Ok(partial.merge_with_defaults())
}

#[cfg(test)]
mod tests;
