use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Env {
    Local,
    Dev,
    Prod,
}

impl FromStr for Env {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Env::Local),
            "dev" => Ok(Env::Dev),
            "prod" => Ok(Env::Prod),
            other => Err(format!("Unknown environment: {}", other)),
        }
    }
}

impl fmt::Display for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Env::Local => write!(f, "local"),
            Env::Dev => write!(f, "dev"),
            Env::Prod => write!(f, "prod"),
        }
    }
}

/// Process environment: server binding, secrets and database credentials.
pub struct AppEnv {
    pub env: Env,
    pub server_port: u16,
    pub server_address: String,

    pub bot_token: String,
    pub currency_api_token: String,
    /// Webhook path secret; empty disables the check
    pub webhook_secret: String,
    /// Broadcast recipients, already split from the comma separated ADMIN_ID
    pub admin_chat_ids: Vec<String>,

    pub postgres_host: String,
    pub postgres_port: u16,
    pub postgres_user: String,
    pub postgres_password: String,
    pub postgres_database: String,
}

impl AppEnv {
    pub fn is_local(&self) -> bool {
        self.env == Env::Local
    }
}

// Secrets never reach the logs, even in local debug dumps.
impl fmt::Debug for AppEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppEnv")
            .field("env", &self.env)
            .field("server_port", &self.server_port)
            .field("server_address", &self.server_address)
            .field("bot_token", &"***")
            .field("currency_api_token", &"***")
            .field("webhook_secret", &"***")
            .field("admin_chat_ids", &self.admin_chat_ids)
            .field("postgres_host", &self.postgres_host)
            .field("postgres_port", &self.postgres_port)
            .field("postgres_user", &self.postgres_user)
            .field("postgres_password", &"***")
            .field("postgres_database", &self.postgres_database)
            .finish()
    }
}
