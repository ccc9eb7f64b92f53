use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, ConfigError, Environment};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub image_folder: String,
    pub jwt_secret: String,
    /// Lifetime of issued bearer tokens.
    pub token_ttl_hours: i64,
    /// Prefix for generated attachment URLs. Empty means URLs are relative to the API host.
    pub public_url: String,
}

fn with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("image_folder", "runtime/images")?
        .set_default("token_ttl_hours", 24)?
        .set_default("public_url", "")
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        with_defaults()?
            .add_source(Environment::default())
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_optional_keys() {
        let settings: Settings = with_defaults()
            .unwrap()
            .set_override("database_url", "brewhub.sqlite")
            .unwrap()
            .set_override("jwt_secret", "secret")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.image_folder, "runtime/images");
        assert_eq!(settings.token_ttl_hours, 24);
        assert_eq!(settings.public_url, "");
    }

    #[test]
    fn required_keys_have_no_default() {
        let built = with_defaults().unwrap().build().unwrap();
        assert!(built.try_deserialize::<Settings>().is_err());
    }
}
