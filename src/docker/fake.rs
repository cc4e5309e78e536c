//! In-memory runtime used by controller and HTTP tests.

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::container::{parse_env, ContainerView, CreateSpec, PortBinding, VolumeBinding};
use super::{ContainerRuntime, RuntimeError};

#[derive(Default)]
pub struct FakeRuntime {
    containers: Mutex<HashMap<String, ContainerView>>,
    images: Mutex<HashSet<String>>,
    pulls: Mutex<Vec<String>>,
    execs: Mutex<Vec<Vec<String>>>,
    exec_output: Mutex<String>,
    log_lines: Mutex<Vec<String>>,
    unavailable: Mutex<bool>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(self, image: &str) -> Self {
        self.images.lock().unwrap().insert(image.to_string());
        self
    }

    pub fn with_container(self, name: &str, image: &str, env: &[&str]) -> Self {
        let env: Vec<String> = env.iter().map(|e| e.to_string()).collect();
        self.containers.lock().unwrap().insert(
            name.to_string(),
            ContainerView {
                id: format!("{name}-id"),
                image: image.to_string(),
                running: false,
                name: name.to_string(),
                status: "created".to_string(),
                env: parse_env(&env),
                ports: vec![],
                volumes: vec![],
            },
        );
        self
    }

    pub fn set_exec_output(&self, output: &str) {
        *self.exec_output.lock().unwrap() = output.to_string();
    }

    pub fn set_logs(&self, lines: &[&str]) {
        *self.log_lines.lock().unwrap() = lines.iter().map(|l| l.to_string()).collect();
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap() = unavailable;
    }

    pub fn pulls(&self) -> Vec<String> {
        self.pulls.lock().unwrap().clone()
    }

    pub fn execs(&self) -> Vec<Vec<String>> {
        self.execs.lock().unwrap().clone()
    }

    pub fn container(&self, name: &str) -> Option<ContainerView> {
        self.containers.lock().unwrap().get(name).cloned()
    }

    fn check_available(&self) -> Result<(), RuntimeError> {
        if *self.unavailable.lock().unwrap() {
            return Err(RuntimeError::Transient("daemon unreachable".to_string()));
        }
        Ok(())
    }

    fn update<F>(&self, id: &str, f: F) -> Result<(), RuntimeError>
    where
        F: FnOnce(&mut ContainerView),
    {
        self.check_available()?;
        let mut containers = self.containers.lock().unwrap();
        let container = containers
            .get_mut(id)
            .ok_or_else(|| RuntimeError::NotFound(id.to_string()))?;
        f(container);
        Ok(())
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn inspect(&self, id: &str) -> Result<ContainerView, RuntimeError> {
        self.check_available()?;
        self.container(id)
            .ok_or_else(|| RuntimeError::NotFound(id.to_string()))
    }

    async fn image_exists(&self, image: &str) -> Result<bool, RuntimeError> {
        self.check_available()?;
        Ok(self.images.lock().unwrap().contains(image))
    }

    async fn pull_image(&self, image: &str) -> Result<(), RuntimeError> {
        self.check_available()?;
        self.pulls.lock().unwrap().push(image.to_string());
        self.images.lock().unwrap().insert(image.to_string());
        Ok(())
    }

    async fn create(&self, spec: CreateSpec) -> Result<String, RuntimeError> {
        self.check_available()?;
        // Give concurrent callers a chance to interleave.
        tokio::task::yield_now().await;

        let mut containers = self.containers.lock().unwrap();
        if containers.contains_key(&spec.name) {
            return Err(RuntimeError::Conflict(format!("name {} is in use", spec.name)));
        }

        let id = format!("{}-id", spec.name);
        containers.insert(
            spec.name.clone(),
            ContainerView {
                id: id.clone(),
                image: spec.image,
                running: false,
                name: spec.name,
                status: "created".to_string(),
                env: parse_env(&spec.env),
                ports: spec
                    .ports
                    .iter()
                    .map(|p| PortBinding {
                        container_port: p.container_port.to_string(),
                        host_port: p.host_port.to_string(),
                        protocol: p.protocol.clone(),
                    })
                    .collect(),
                volumes: spec
                    .volumes
                    .iter()
                    .map(|v| VolumeBinding {
                        host_path: v.host_path.clone(),
                        container_path: v.container_path.clone(),
                    })
                    .collect(),
            },
        );
        Ok(id)
    }

    async fn start(&self, id: &str) -> Result<(), RuntimeError> {
        self.update(id, |c| {
            c.running = true;
            c.status = "running".to_string();
        })
    }

    async fn stop(&self, id: &str) -> Result<(), RuntimeError> {
        self.update(id, |c| {
            c.running = false;
            c.status = "exited".to_string();
        })
    }

    async fn remove(&self, id: &str) -> Result<(), RuntimeError> {
        self.check_available()?;
        self.containers
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RuntimeError::NotFound(id.to_string()))
    }

    async fn exec(&self, id: &str, argv: Vec<String>) -> Result<String, RuntimeError> {
        self.inspect(id).await?;
        self.execs.lock().unwrap().push(argv);
        Ok(self.exec_output.lock().unwrap().clone())
    }

    fn logs(&self, id: &str) -> BoxStream<'static, Result<String, RuntimeError>> {
        if let Err(e) = self.check_available() {
            return stream::iter(vec![Err(e)]).boxed();
        }
        if self.container(id).is_none() {
            return stream::iter(vec![Err(RuntimeError::NotFound(id.to_string()))]).boxed();
        }
        let lines: Vec<Result<String, RuntimeError>> =
            self.log_lines.lock().unwrap().iter().cloned().map(Ok).collect();
        stream::iter(lines).boxed()
    }
}
