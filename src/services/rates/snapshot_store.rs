// File: src/services/rates/snapshot_store.rs
use super::models::{BASE_CURRENCY, QuoteSet};
use crate::db::postgres::errors::StoreError;
use crate::db::postgres::models::fx_rate::NewFxRate;
use crate::db::postgres::repository::fx_rate_repository::TraitFxRateRepository;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PersistOutcome {
    pub written: u64,
    pub skipped: u64,
}

/// Writes one quote set as a complete (USD, EUR, RUB) snapshot.
pub struct SnapshotStore {
    repository: Arc<dyn TraitFxRateRepository + Send + Sync>,
}

impl SnapshotStore {
    pub fn new(repository: Arc<dyn TraitFxRateRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Persists the snapshot atomically.
    ///
    /// A snapshot already stored for the same `as_of` is reported as skipped,
    /// so repeated runs before the upstream timestamp moves are harmless.
    pub async fn persist(&self, quote: &QuoteSet) -> Result<PersistOutcome, StoreError> {
        let rows = snapshot_rows(quote);
        let total = rows.len() as u64;

        match self.repository.insert_snapshot(&rows).await {
            Ok(written) => {
                info!("Stored snapshot as of {}: {} rows written", quote.as_of, written);
                Ok(PersistOutcome {
                    written,
                    skipped: total.saturating_sub(written),
                })
            }
            Err(StoreError::DuplicateSnapshot { as_of }) => {
                info!("Snapshot as of {} already stored, skipping {} rows", as_of, total);
                Ok(PersistOutcome {
                    written: 0,
                    skipped: total,
                })
            }
            Err(e) => {
                error!("Failed to store snapshot as of {}: {}", quote.as_of, e);
                Err(e)
            }
        }
    }
}

fn snapshot_rows(quote: &QuoteSet) -> Vec<NewFxRate> {
    quote
        .rates
        .iter()
        .map(|(currency, rate)| NewFxRate {
            base: BASE_CURRENCY.to_string(),
            quote: currency.code().to_string(),
            rate,
            as_of: quote.as_of,
        })
        .collect()
}


#[cfg(all(test, feature = "integ_test"))]
mod integ_tests {
    use super::*;
    use crate::db::postgres::connection::PostgresConnection;
    use crate::db::postgres::repository::fx_rate_repository::StructFxRateRepository;
    use crate::test_support::sample_quote_set;
    use sqlx::PgPool;

    fn store(pool: &PgPool) -> SnapshotStore {
        let connection = Arc::new(PostgresConnection::from_pool(pool.clone()));
        SnapshotStore::new(Arc::new(StructFxRateRepository::new(connection)))
    }

    async fn rows_for(pool: &PgPool, quote: &QuoteSet) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM fx_rates WHERE as_of = $1")
            .bind(quote.as_of)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_persist_twice_keeps_one_snapshot(pool: PgPool) {
        let store = store(&pool);
        let quote = sample_quote_set(Some(43000.0));

        let first = store.persist(&quote).await.unwrap();
        let second = store.persist(&quote).await.unwrap();

        assert_eq!(first, PersistOutcome { written: 3, skipped: 0 });
        assert_eq!(second, PersistOutcome { written: 0, skipped: 3 });
        assert_eq!(rows_for(&pool, &quote).await, 3);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_racing_writer_conflict_leaves_no_partial_rows(pool: PgPool) {
        let quote = sample_quote_set(None);

        // Another writer already stored EUR for this timestamp.
        sqlx::query("INSERT INTO fx_rates (base, quote, rate, as_of) VALUES ('KZT', 'EUR', 500.0, $1)")
            .bind(quote.as_of)
            .execute(&pool)
            .await
            .unwrap();
        assert_eq!(rows_for(&pool, &quote).await, 1);

        let outcome = store(&pool).persist(&quote).await.unwrap();

        assert_eq!(outcome, PersistOutcome { written: 0, skipped: 3 });
        assert_eq!(rows_for(&pool, &quote).await, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_failed_insert_rolls_back_whole_snapshot(pool: PgPool) {
        let mut quote = sample_quote_set(None);
        // Violates CHECK (rate > 0) on the second insert.
        quote.rates.eur = -1.0;

        let result = store(&pool).persist(&quote).await;

        assert!(matches!(result, Err(StoreError::Database(_))));
        assert_eq!(rows_for(&pool, &quote).await, 0);
    }
}
