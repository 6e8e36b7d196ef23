use crate::db::postgres::connection::PostgresConnection;
use crate::db::postgres::repository::{
    fx_rate_repository::{StructFxRateRepository, TraitFxRateRepository},
    health_check_repository::{StructHealthCheckRepository, TraitHealthCheckRepository},
    user_repository::{StructUserRepository, TraitUserRepository},
};
use crate::env_config::models::app_setting::AppSettings;
use std::sync::Arc;
use tracing::{error, info};

pub struct PostgresService {
    // Connection
    pub connection: Arc<PostgresConnection>,

    // Repositories
    pub repository_health_check: Arc<dyn TraitHealthCheckRepository + Send + Sync>,
    pub repository_fx_rate: Arc<dyn TraitFxRateRepository + Send + Sync>,
    pub repository_user: Arc<dyn TraitUserRepository + Send + Sync>,
}

impl PostgresService {
    pub async fn new(settings: &Arc<AppSettings>) -> Result<Self, sqlx::Error> {
        info!("Initializing PostgreSQL service components");

        let postgres_connection = match PostgresConnection::new(settings.clone()).await {
            Ok(conn) => {
                info!("PostgreSQL connection established successfully");
                Arc::new(conn)
            }
            Err(e) => {
                error!("Failed to establish PostgreSQL connection: {}", e);
                return Err(e);
            }
        };

        info!("Initializing repositories");

        let health_check_repository = Arc::new(StructHealthCheckRepository::new(
            postgres_connection.clone(),
        )) as Arc<dyn TraitHealthCheckRepository + Send + Sync>;

        let fx_rate_repository = Arc::new(StructFxRateRepository::new(
            postgres_connection.clone(),
        )) as Arc<dyn TraitFxRateRepository + Send + Sync>;

        let user_repository = Arc::new(StructUserRepository::new(postgres_connection.clone()))
            as Arc<dyn TraitUserRepository + Send + Sync>;

        info!("PostgreSQL service initialized successfully");
        Ok(Self {
            connection: postgres_connection,
            repository_health_check: health_check_repository,
            repository_fx_rate: fx_rate_repository,
            repository_user: user_repository,
        })
    }
}
