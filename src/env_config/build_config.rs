use super::errors::ConfigError;
use super::models::app_config::AppConfig;
use super::models::app_env::Env;
use std::fs;

const CONFIG_DIR: &str = "config";

impl AppConfig {
    /// Loads `config/{env}.toml`
    pub fn new(env: &Env) -> Result<AppConfig, ConfigError> {
        let path = format!("{}/{}.toml", CONFIG_DIR, env);

        let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;

        toml::from_str(&raw).map_err(|source| ConfigError::Parse { path, source })
    }
}
