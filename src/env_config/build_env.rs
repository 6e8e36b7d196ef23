use super::errors::ConfigError;
use super::models::app_env::{AppEnv, Env};
use std::env;
use std::str::FromStr;

const DEFAULT_POSTGRES_PORT: u16 = 5432;

impl AppEnv {
    pub fn new() -> Result<AppEnv, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the environment from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<AppEnv, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| lookup(name).ok_or_else(|| ConfigError::MissingVar(name.to_string()));
        let optional = |name: &str| lookup(name).unwrap_or_default();

        let env_name = required("ENV")?;
        let env = Env::from_str(&env_name).map_err(|_| ConfigError::InvalidVar {
            name: "ENV".to_string(),
            value: env_name.clone(),
        })?;

        Ok(AppEnv {
            env,
            server_port: parse_port("SERVER_PORT", &required("SERVER_PORT")?)?,
            server_address: required("SERVER_ADDRESS")?,
            bot_token: required("BOT_TOKEN")?,
            currency_api_token: required("CUR_TOKEN")?,
            webhook_secret: optional("TG_SECRET"),
            admin_chat_ids: split_admin_ids(&optional("ADMIN_ID")),
            postgres_host: required("POSTGRES_HOST")?,
            postgres_port: match lookup("POSTGRES_PORT") {
                Some(port) => parse_port("POSTGRES_PORT", &port)?,
                None => DEFAULT_POSTGRES_PORT,
            },
            postgres_user: required("POSTGRES_USER")?,
            postgres_password: required("POSTGRES_PASSWORD")?,
            postgres_database: required("POSTGRES_DATABASE")?,
        })
    }
}

fn parse_port(name: &str, value: &str) -> Result<u16, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidVar {
        name: name.to_string(),
        value: value.to_string(),
    })
}

/// Splits "123, 456,,@channel,123" into ["123", "456", "@channel"], keeping the
/// first occurrence of each id.
pub fn split_admin_ids(raw: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for id in raw.split(',').map(str::trim).filter(|id| !id.is_empty()) {
        if !ids.iter().any(|known| known == id) {
            ids.push(id.to_string());
        }
    }
    ids
}
