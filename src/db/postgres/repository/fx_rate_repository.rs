// File: src/db/postgres/repository/fx_rate_repository.rs
use crate::db::postgres::connection::PostgresConnection;
use crate::db::postgres::errors::StoreError;
use crate::db::postgres::models::fx_rate::NewFxRate;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[async_trait]
pub trait TraitFxRateRepository {
    /// Inserts all rows in a single transaction and returns the number written.
    ///
    /// Either every row is committed or none is. A row that collides with
    /// `uq_fx_snapshot` rolls the whole batch back and yields
    /// [`StoreError::DuplicateSnapshot`].
    async fn insert_snapshot(&self, rows: &[NewFxRate]) -> Result<u64, StoreError>;
}

pub struct StructFxRateRepository {
    connection: Arc<PostgresConnection>,
}

impl StructFxRateRepository {
    pub fn new(connection: Arc<PostgresConnection>) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl TraitFxRateRepository for StructFxRateRepository {
    async fn insert_snapshot(&self, rows: &[NewFxRate]) -> Result<u64, StoreError> {
        let pool = self.connection.get_pool();
        let mut tx = pool.begin().await?;
        let mut written = 0;

        for row in rows {
            debug!("Inserting fx rate {}/{} = {} as of {}", row.base, row.quote, row.rate, row.as_of);

            let result = sqlx::query(
                "INSERT INTO fx_rates (base, quote, rate, as_of)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(&row.base)
            .bind(&row.quote)
            .bind(row.rate)
            .bind(row.as_of)
            .execute(&mut *tx)
            .await;

            match result {
                Ok(pg_result) => written += pg_result.rows_affected(),
                Err(e) => {
                    if let Err(rollback_err) = tx.rollback().await {
                        warn!("Rollback of fx snapshot {} failed: {}", row.as_of, rollback_err);
                    }
                    return Err(classify_insert_error(e, row));
                }
            }
        }

        tx.commit().await?;
        info!("Committed {} fx rate rows", written);

        Ok(written)
    }
}

fn classify_insert_error(err: sqlx::Error, row: &NewFxRate) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            debug!("Snapshot {}/{} as of {} already exists", row.base, row.quote, row.as_of);
            return StoreError::DuplicateSnapshot { as_of: row.as_of };
        }
    }

    error!("Error inserting fx rate {}/{} as of {}: {}", row.base, row.quote, row.as_of, err);
    StoreError::Database(err)
}
