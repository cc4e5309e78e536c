use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, info};

use super::error::BillingError;
use crate::shared::models::{ShutdownRequest, StartupPayload, StartupRequest};

/// The remote authority that grants and settles cycles.
#[async_trait]
pub trait BillingAuthority: Send + Sync {
    /// Reports cycles left over from earlier runs and fetches this run's grant.
    async fn startup(&self, failed_burned_cycles: u64) -> Result<StartupPayload, BillingError>;

    /// Reports the cycles burned by this run.
    async fn shutdown(&self, burned_cycles: u64) -> Result<(), BillingError>;
}

pub struct BillingClient {
    client: Client,
    base_url: String,
    instance_id: String,
}

impl BillingClient {
    pub fn new(base_url: &str, instance_id: &str, timeout: Duration) -> Result<Self, BillingError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            instance_id: instance_id.to_string(),
        })
    }

    fn url(&self, action: &str) -> String {
        format!("{}/{}/{}", self.base_url, action, self.instance_id)
    }

    async fn error_for(response: reqwest::Response) -> BillingError {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        BillingError::Status { status, body }
    }
}

#[async_trait]
impl BillingAuthority for BillingClient {
    async fn startup(&self, failed_burned_cycles: u64) -> Result<StartupPayload, BillingError> {
        let url = self.url("startup");
        debug!("Posting startup to: {}", url);

        let response = self
            .client
            .post(&url)
            .json(&StartupRequest {
                failed_burned_cycles_total_amount: failed_burned_cycles,
            })
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let payload = response.json::<StartupPayload>().await?;
                info!(
                    "Startup accepted: {} cycles granted, {} services in catalog",
                    payload.cycles,
                    payload.service_configs.len()
                );
                Ok(payload)
            }
            _ => Err(Self::error_for(response).await),
        }
    }

    async fn shutdown(&self, burned_cycles: u64) -> Result<(), BillingError> {
        let url = self.url("shutdown");
        debug!("Posting shutdown to: {}", url);

        let response = self
            .client
            .post(&url)
            .json(&ShutdownRequest {
                burned_cycles_amount: burned_cycles,
            })
            .send()
            .await?;

        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => {
                info!("Shutdown report accepted: {} cycles", burned_cycles);
                Ok(())
            }
            _ => Err(Self::error_for(response).await),
        }
    }
}
