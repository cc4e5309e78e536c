use futures::TryStreamExt;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::error::{ControllerError, StrategyError};
use super::strategy::ServiceStrategy;
use super::validator;
use crate::docker::{format_env, ContainerRuntime, ContainerView, CreateSpec, RuntimeError};
use crate::shared::models::{Catalog, Plan, RuntimeConfig, ServiceDefinition};

/// Name of the single container this agent manages.
pub const SERVICE_CONTAINER_NAME: &str = "main";

#[derive(Debug, Clone)]
struct BoundService {
    definition: ServiceDefinition,
    strategy: ServiceStrategy,
}

/// Owns the managed container and the strategy bound to it.
///
/// Lifecycle mutations hold the write half of `bound`, so a create and a
/// delete can never interleave their "does it exist" checks. Reads share
/// the read half.
pub struct ServiceController {
    runtime: Arc<dyn ContainerRuntime>,
    catalog: Catalog,
    plan: Plan,
    bound: RwLock<Option<BoundService>>,
}

impl ServiceController {
    /// Inspects any pre-existing container and rebinds its strategy.
    pub async fn init(
        runtime: Arc<dyn ContainerRuntime>,
        catalog: Catalog,
        plan: Plan,
    ) -> Result<Self, ControllerError> {
        let bound = match runtime.inspect(SERVICE_CONTAINER_NAME).await {
            Ok(view) => rebind(&catalog, &view)?,
            Err(RuntimeError::NotFound(_)) => {
                info!("No existing service container, waiting for create");
                None
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            runtime,
            catalog,
            plan,
            bound: RwLock::new(bound),
        })
    }

    /// Service id currently bound, if any.
    #[cfg(test)]
    pub async fn bound_service(&self) -> Option<String> {
        self.bound.read().await.as_ref().map(|b| b.definition.name.clone())
    }

    fn resolve(&self, service_id: &str) -> Result<(&ServiceDefinition, ServiceStrategy), ControllerError> {
        let definition = self
            .catalog
            .get(service_id)
            .ok_or_else(|| ControllerError::UnknownService(service_id.to_string()))?;
        let strategy = ServiceStrategy::for_service(service_id)?;
        Ok((definition, strategy))
    }

    pub fn validate_config(
        &self,
        service_id: &str,
        overrides: &HashMap<String, String>,
    ) -> Result<RuntimeConfig, ControllerError> {
        let (definition, strategy) = self.resolve(service_id)?;
        Ok(validator::validate(definition, strategy, &self.plan, overrides)?)
    }

    pub async fn create_service(
        &self,
        service_id: &str,
        overrides: &HashMap<String, String>,
    ) -> Result<String, ControllerError> {
        let mut bound = self.bound.write().await;

        match self.runtime.inspect(SERVICE_CONTAINER_NAME).await {
            Ok(_) => return Err(ControllerError::Conflict),
            Err(RuntimeError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }

        let (definition, strategy) = self.resolve(service_id)?;
        let config = validator::validate(definition, strategy, &self.plan, overrides)?;

        if !self.runtime.image_exists(&definition.image).await? {
            self.runtime.pull_image(&definition.image).await?;
        }

        let spec = CreateSpec {
            name: SERVICE_CONTAINER_NAME.to_string(),
            image: definition.image.clone(),
            env: format_env(&config),
            ports: definition.ports.clone(),
            volumes: definition.volumes.clone(),
        };

        let id = self.runtime.create(spec).await.map_err(|e| match e {
            RuntimeError::Conflict(_) => ControllerError::Conflict,
            other => other.into(),
        })?;

        info!("Provisioned {} container {}", service_id, id);
        *bound = Some(BoundService {
            definition: definition.clone(),
            strategy,
        });
        Ok(id)
    }

    pub async fn start(&self) -> Result<(), ControllerError> {
        let _guard = self.bound.write().await;
        self.runtime.start(SERVICE_CONTAINER_NAME).await?;
        Ok(())
    }

    pub async fn stop(&self) -> Result<(), ControllerError> {
        let _guard = self.bound.write().await;
        self.runtime.stop(SERVICE_CONTAINER_NAME).await?;
        Ok(())
    }

    /// Removes the container; its volumes stay on the host.
    pub async fn delete(&self) -> Result<(), ControllerError> {
        let mut bound = self.bound.write().await;
        self.runtime.remove(SERVICE_CONTAINER_NAME).await?;
        *bound = None;
        info!("Removed service container");
        Ok(())
    }

    pub async fn inspect(&self) -> Result<ContainerView, ControllerError> {
        let _guard = self.bound.read().await;
        Ok(self.runtime.inspect(SERVICE_CONTAINER_NAME).await?)
    }

    pub async fn state(&self) -> Result<String, ControllerError> {
        Ok(self.inspect().await?.status)
    }

    /// Non-empty console lines, oldest first.
    pub async fn console(&self) -> Result<Vec<String>, ControllerError> {
        let _guard = self.bound.read().await;
        let lines: Vec<String> = self.runtime.logs(SERVICE_CONTAINER_NAME).try_collect().await?;
        Ok(lines
            .into_iter()
            .map(|line| line.trim_end().to_string())
            .filter(|line| !line.is_empty())
            .collect())
    }

    #[cfg(test)]
    pub async fn format_game_command(&self, command: &str) -> Result<String, ControllerError> {
        let bound = self.bound.read().await;
        let service = bound.as_ref().ok_or(ControllerError::UnboundStrategy)?;
        Ok(service.strategy.format_command(command)?)
    }

    /// Formats `command` for the bound game and runs it inside the container.
    pub async fn run_command(&self, command: &str) -> Result<Vec<String>, ControllerError> {
        let bound = self.bound.read().await;
        let service = bound.as_ref().ok_or(ControllerError::UnboundStrategy)?;
        let formatted = service.strategy.format_command(command)?;

        let argv = vec!["/bin/bash".to_string(), "-c".to_string(), formatted];
        let output = self.runtime.exec(SERVICE_CONTAINER_NAME, argv).await?;

        let mut lines: Vec<String> = output.split('\n').map(str::to_string).collect();
        if lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        Ok(lines)
    }

    /// The live container's values for the keys the bound service declares.
    pub async fn env(&self) -> Result<HashMap<String, String>, ControllerError> {
        let bound = self.bound.read().await;
        let view = self.runtime.inspect(SERVICE_CONTAINER_NAME).await?;
        let service = bound.as_ref().ok_or(ControllerError::UnboundStrategy)?;

        Ok(view
            .env
            .into_iter()
            .filter(|(key, _)| service.definition.declares(key))
            .collect())
    }
}

fn rebind(catalog: &Catalog, view: &ContainerView) -> Result<Option<BoundService>, ControllerError> {
    let matches = catalog.find_by_image(&view.image);

    let (service_id, definition) = match matches.as_slice() {
        [] => {
            warn!(
                "Existing container image {} matches no catalog entry, commands disabled until it is recreated",
                view.image
            );
            return Ok(None);
        }
        [single] => *single,
        several => {
            let ids: Vec<&str> = several.iter().map(|(id, _)| *id).collect();
            error!("Image {} is shared by catalog entries {:?}", view.image, ids);
            return Err(ControllerError::Catalog(format!(
                "image {} is declared by more than one service: {}",
                view.image,
                ids.join(", ")
            )));
        }
    };

    let strategy = ServiceStrategy::for_service(service_id).map_err(|e| match e {
        StrategyError::Unregistered(id) => {
            ControllerError::Catalog(format!("catalog service {id} has no registered strategy"))
        }
        other => other.into(),
    })?;

    info!("Bound existing container {} to {}", view.id, strategy);
    Ok(Some(BoundService {
        definition: definition.clone(),
        strategy,
    }))
}
