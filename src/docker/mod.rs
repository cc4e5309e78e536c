mod client;
mod container;
mod error;
pub mod frame;

#[cfg(test)]
pub mod fake;

pub use client::{DockerClient, DockerConfig};
pub use container::{format_env, ContainerView, CreateSpec};
pub use error::RuntimeError;

use async_trait::async_trait;
use futures::stream::BoxStream;

/// Lifecycle operations on the container runtime.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    async fn inspect(&self, id: &str) -> Result<ContainerView, RuntimeError>;

    async fn image_exists(&self, image: &str) -> Result<bool, RuntimeError>;

    async fn pull_image(&self, image: &str) -> Result<(), RuntimeError>;

    /// Returns the new container id. Fails with `Conflict` when the name is taken.
    async fn create(&self, spec: CreateSpec) -> Result<String, RuntimeError>;

    async fn start(&self, id: &str) -> Result<(), RuntimeError>;

    async fn stop(&self, id: &str) -> Result<(), RuntimeError>;

    /// Removes the container. Volumes are kept.
    async fn remove(&self, id: &str) -> Result<(), RuntimeError>;

    /// Runs `argv` inside the container and returns combined stdout/stderr.
    async fn exec(&self, id: &str, argv: Vec<String>) -> Result<String, RuntimeError>;

    /// Log lines from the container, oldest first. The stream ends once the
    /// runtime has nothing more to send; call again to restart it.
    fn logs(&self, id: &str) -> BoxStream<'static, Result<String, RuntimeError>>;
}
