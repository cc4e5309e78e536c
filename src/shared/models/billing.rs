use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::catalog::{Catalog, Plan, ServiceDefinition};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupRequest {
    pub failed_burned_cycles_total_amount: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShutdownRequest {
    pub burned_cycles_amount: u64,
}

/// Service assigned to this instance by the billing authority.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedService {
    pub id: u64,
    pub name_id: String,
}

/// Answer to the startup RPC: the budget and everything needed to serve.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupPayload {
    /// Total plan memory in MB.
    pub instance_memory: i64,
    pub owner_id: u64,
    /// Granted cycles for this run.
    pub cycles: u64,
    #[serde(default)]
    pub service_configs: HashMap<String, ServiceDefinition>,
    #[serde(default)]
    pub services: Vec<AssignedService>,
}

impl StartupPayload {
    pub fn plan(&self) -> Plan {
        Plan {
            memory_mb: self.instance_memory,
        }
    }

    pub fn catalog(&self) -> Catalog {
        Catalog::new(self.service_configs.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_request_uses_wire_names() {
        let body = serde_json::to_value(StartupRequest {
            failed_burned_cycles_total_amount: 42,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"failedBurnedCyclesTotalAmount": 42}));

        let body = serde_json::to_value(ShutdownRequest {
            burned_cycles_amount: 7,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"burnedCyclesAmount": 7}));
    }

    #[test]
    fn startup_payload_tolerates_missing_catalog() {
        let payload: StartupPayload = serde_json::from_value(serde_json::json!({
            "instanceMemory": 4096,
            "ownerId": 3,
            "cycles": 3600
        }))
        .unwrap();
        assert_eq!(payload.plan().memory_mb, 4096);
        assert!(payload.catalog().is_empty());
    }
}
