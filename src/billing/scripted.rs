//! Billing authority double with scripted failures, for tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::client::BillingAuthority;
use super::error::BillingError;
use crate::shared::models::StartupPayload;

#[derive(Default)]
pub struct ScriptedBilling {
    pub fail_startup: bool,
    pub fail_shutdown: bool,
    pub hang_shutdown: bool,
    pub startup_calls: Mutex<Vec<u64>>,
    pub shutdown_calls: Mutex<Vec<u64>>,
}

impl ScriptedBilling {
    pub fn startup_calls(&self) -> Vec<u64> {
        self.startup_calls.lock().unwrap().clone()
    }

    pub fn shutdown_calls(&self) -> Vec<u64> {
        self.shutdown_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BillingAuthority for ScriptedBilling {
    async fn startup(&self, failed_burned_cycles: u64) -> Result<StartupPayload, BillingError> {
        self.startup_calls.lock().unwrap().push(failed_burned_cycles);
        if self.fail_startup {
            return Err(BillingError::Status { status: 503, body: "down".to_string() });
        }
        Ok(StartupPayload {
            instance_memory: 4096,
            owner_id: 1,
            cycles: 3600,
            service_configs: HashMap::new(),
            services: vec![],
        })
    }

    async fn shutdown(&self, burned_cycles: u64) -> Result<(), BillingError> {
        self.shutdown_calls.lock().unwrap().push(burned_cycles);
        if self.hang_shutdown {
            std::future::pending::<()>().await;
        }
        if self.fail_shutdown {
            return Err(BillingError::Status { status: 502, body: "bad gateway".to_string() });
        }
        Ok(())
    }
}
