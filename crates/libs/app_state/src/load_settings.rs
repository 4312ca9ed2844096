use crate::{AppConstants, AppSettings, RawSettings};
use color_eyre::eyre::Result;
use std::path::Path;
use std::sync::LazyLock;

fn load_raw_settings() -> Result<RawSettings> {
    // Need to load from dotenv to get it to overwrite the db url from env.
    dotenv::from_path(".env").ok();
    let config_path = Path::new("config/settings.yaml").canonicalize()?;

    let builder = config::Config::builder()
        .add_source(config::File::from(config_path))
        .add_source(
            config::Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        );

    Ok(builder.build()?.try_deserialize::<RawSettings>()?)
}

pub fn load_app_settings() -> Result<AppSettings> {
    Ok(load_raw_settings()?.into())
}

fn load_app_constants() -> Result<AppConstants> {
    Ok(load_raw_settings()?.into())
}

/// Immutable global settings, initialized on first access.
pub static SETTINGS: LazyLock<AppSettings> =
    LazyLock::new(|| load_app_settings().expect("Cannot load app settings."));

pub static CONSTANTS: LazyLock<AppConstants> =
    LazyLock::new(|| load_app_constants().expect("Cannot load app settings."));

#[must_use]
pub fn settings() -> &'static AppSettings {
    &SETTINGS
}

#[must_use]
pub fn constants() -> &'static AppConstants {
    &CONSTANTS
}
