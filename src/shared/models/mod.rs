pub mod billing;
pub mod catalog;

use std::sync::Arc;

use crate::billing::CycleLedger;
use crate::service::ServiceController;

pub use billing::{ShutdownRequest, StartupPayload, StartupRequest};
pub use catalog::{Catalog, EnvSpec, Plan, PortSpec, RuntimeConfig, ServiceDefinition, VolumeSpec};

/// Shared by every request handler.
pub struct AppState {
    pub controller: Arc<ServiceController>,
    pub ledger: Arc<CycleLedger>,
    /// Only this user may drive the instance.
    pub owner_id: u64,
}
