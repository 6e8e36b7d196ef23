use crate::env_config::models::app_setting::AppSettings;
use sqlx::{
    Pool, Postgres,
    postgres::{PgConnectOptions, PgPoolOptions},
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Owns the PostgreSQL pool for the lifetime of the process.
///
/// Opened once in `main` through [`PostgresConnection::new`], shared by
/// reference through `PostgresService`, and drained with
/// [`PostgresConnection::close`] after the HTTP server stops.
#[derive(Clone)]
pub struct PostgresConnection {
    pool: Pool<Postgres>,
}

impl PostgresConnection {
    pub async fn new(settings: Arc<AppSettings>) -> Result<Self, sqlx::Error> {
        info!("Initializing PostgreSQL connection...");

        let env = &settings.app_env;
        let pg_config = &settings.app_config.postgres;

        let connect_options = PgConnectOptions::new()
            .host(&env.postgres_host)
            .port(env.postgres_port)
            .username(&env.postgres_user)
            .password(&env.postgres_password)
            .database(&env.postgres_database);

        let pool = PgPoolOptions::new()
            .max_connections(pg_config.max_connections)
            .min_connections(pg_config.min_connections)
            .max_lifetime(Duration::from_secs(pg_config.max_lifetime))
            .idle_timeout(Duration::from_secs(pg_config.idle_timeout))
            .acquire_timeout(Duration::from_secs(pg_config.timeout))
            .connect_with(connect_options)
            .await?;

        // Test connection
        debug!("Executing test query on PostgreSQL");
        match sqlx::query("SELECT 1").execute(&pool).await {
            Ok(_) => info!("PostgreSQL connection successful"),
            Err(e) => {
                error!("Failed to connect to PostgreSQL: {}", e);
                return Err(e);
            }
        }

        info!("Applying database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Wraps an existing pool, e.g. one provisioned by `#[sqlx::test]`.
    #[cfg(all(test, feature = "integ_test"))]
    pub fn from_pool(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub fn get_pool(&self) -> &Pool<Postgres> {
        &self.pool
    }

    pub async fn close(&self) {
        info!("Closing PostgreSQL connection pool");
        self.pool.close().await;
    }
}
