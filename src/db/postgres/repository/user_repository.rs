use crate::db::postgres::connection::PostgresConnection;
use crate::db::postgres::models::user::NewUser;
use async_trait::async_trait;
use sqlx::Error as SqlxError;
use std::sync::Arc;
use tracing::{debug, error};

#[async_trait]
pub trait TraitUserRepository {
    /// Creates the user unless one with the same `tg_id` exists.
    /// Returns `true` when a new row was inserted.
    async fn register(&self, user: &NewUser) -> Result<bool, SqlxError>;
}

pub struct StructUserRepository {
    connection: Arc<PostgresConnection>,
}

impl StructUserRepository {
    pub fn new(connection: Arc<PostgresConnection>) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl TraitUserRepository for StructUserRepository {
    async fn register(&self, user: &NewUser) -> Result<bool, SqlxError> {
        let pool = self.connection.get_pool();

        debug!("Registering user tg_id: {}", user.tg_id);

        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO users (tg_id, username, first_name, last_name)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (tg_id) DO NOTHING",
        )
        .bind(user.tg_id)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .execute(&mut *tx)
        .await;

        let pg_result = match result {
            Ok(pg_result) => pg_result,
            Err(e) => {
                error!("Error registering user tg_id {}: {}", user.tg_id, e);
                return Err(e);
            }
        };

        tx.commit().await?;

        let created = pg_result.rows_affected() > 0;
        if created {
            debug!("Created user tg_id: {}", user.tg_id);
        } else {
            debug!("User tg_id {} already registered", user.tg_id);
        }

        Ok(created)
    }
}
