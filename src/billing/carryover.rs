use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tracing::info;

use super::error::BillingError;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Durable record of cycles burned but never acknowledged by billing.
#[derive(Clone)]
pub struct CarryoverStore {
    pool: SqlitePool,
}

impl CarryoverStore {
    /// Opens (creating if needed) the store at `database_url` and migrates it.
    pub async fn connect(database_url: &str) -> Result<Self, BillingError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await?;

        MIGRATOR.run(&pool).await?;

        Ok(Self { pool })
    }

    /// Sum of all unreported amounts.
    pub async fn total(&self) -> Result<u64, BillingError> {
        let total: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(amount), 0) FROM failed_burned_cycles")
            .fetch_one(&self.pool)
            .await?;
        Ok(total.max(0) as u64)
    }

    pub async fn record(&self, amount: u64) -> Result<(), BillingError> {
        if amount == 0 {
            return Ok(());
        }

        sqlx::query("INSERT INTO failed_burned_cycles (amount) VALUES (?)")
            .bind(amount as i64)
            .execute(&self.pool)
            .await?;

        info!("Persisted {} unreported cycles for the next startup", amount);
        Ok(())
    }

    /// Deletes every record. Only call once billing has accepted the total.
    pub async fn clear(&self) -> Result<u64, BillingError> {
        let result = sqlx::query("DELETE FROM failed_burned_cycles")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
