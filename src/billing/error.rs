use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("billing request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("billing authority answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("billing authority did not answer within {0:?}")]
    Timeout(Duration),

    #[error("carryover store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("carryover store migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}
