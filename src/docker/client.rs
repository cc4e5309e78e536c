use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, InspectContainerOptions, LogsOptions, RemoveContainerOptions,
    StartContainerOptions, StopContainerOptions,
};
use bollard::exec::{CreateExecOptions, StartExecResults};
use bollard::image::CreateImageOptions;
use bollard::models::HostConfig;
use bollard::{Docker, API_DEFAULT_VERSION};
use futures::stream::{self, BoxStream, StreamExt};
use tracing::{debug, info, warn};

use super::container::{format_binds, format_port_map, ContainerView, CreateSpec};
use super::error::{is_not_modified, RuntimeError};
use super::frame::{chunk_text, LineBuffer};
use super::ContainerRuntime;

const SOCKET_TIMEOUT_SECS: u64 = 120;
const STOP_TIMEOUT_SECS: i64 = 10;

#[derive(Debug, Clone, Default)]
pub struct DockerConfig {
    pub socket_path: Option<String>,
}

pub struct DockerClient {
    docker: Docker,
}

impl DockerClient {
    pub async fn connect(config: DockerConfig) -> Result<Self, RuntimeError> {
        let docker = match config.socket_path {
            Some(socket) => Docker::connect_with_socket(&socket, SOCKET_TIMEOUT_SECS, &API_DEFAULT_VERSION)?,
            None => Docker::connect_with_socket_defaults()?,
        };

        let version = docker.version().await?;
        info!("Connected to Docker daemon version: {}", version.version.unwrap_or_default());

        Ok(Self { docker })
    }
}

#[async_trait]
impl ContainerRuntime for DockerClient {
    async fn inspect(&self, id: &str) -> Result<ContainerView, RuntimeError> {
        let info = self
            .docker
            .inspect_container(id, None::<InspectContainerOptions>)
            .await?;
        Ok(ContainerView::from(info))
    }

    async fn image_exists(&self, image: &str) -> Result<bool, RuntimeError> {
        match self.docker.inspect_image(image).await {
            Ok(_) => Ok(true),
            Err(e) => match RuntimeError::from(e) {
                RuntimeError::NotFound(_) => Ok(false),
                other => Err(other),
            },
        }
    }

    async fn pull_image(&self, image: &str) -> Result<(), RuntimeError> {
        info!("Pulling Docker image: {}", image);

        let options = CreateImageOptions {
            from_image: image,
            ..Default::default()
        };
        let mut progress = self.docker.create_image(Some(options), None, None);

        while let Some(update) = progress.next().await {
            let update = update?;
            if let Some(status) = update.status {
                debug!("Pull status: {}", status);
            }
        }

        info!("Successfully pulled image: {}", image);
        Ok(())
    }

    async fn create(&self, spec: CreateSpec) -> Result<String, RuntimeError> {
        let options = CreateContainerOptions {
            name: spec.name.clone(),
            platform: None,
        };

        let config = Config {
            image: Some(spec.image.clone()),
            env: Some(spec.env),
            host_config: Some(HostConfig {
                port_bindings: Some(format_port_map(&spec.ports)),
                binds: Some(format_binds(&spec.volumes)),
                ..Default::default()
            }),
            ..Default::default()
        };

        let response = self.docker.create_container(Some(options), config).await?;
        for warning in &response.warnings {
            warn!("Docker warning while creating {}: {}", spec.name, warning);
        }

        info!("Created container {} ({}) with ID: {}", spec.name, spec.image, response.id);
        Ok(response.id)
    }

    async fn start(&self, id: &str) -> Result<(), RuntimeError> {
        match self
            .docker
            .start_container(id, None::<StartContainerOptions<String>>)
            .await
        {
            Err(e) if !is_not_modified(&e) => return Err(e.into()),
            _ => {}
        }
        info!("Started container: {}", id);
        Ok(())
    }

    async fn stop(&self, id: &str) -> Result<(), RuntimeError> {
        let options = StopContainerOptions { t: STOP_TIMEOUT_SECS };
        match self.docker.stop_container(id, Some(options)).await {
            Err(e) if !is_not_modified(&e) => return Err(e.into()),
            _ => {}
        }
        info!("Stopped container: {}", id);
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), RuntimeError> {
        let options = RemoveContainerOptions {
            force: true,
            v: false,
            ..Default::default()
        };
        self.docker.remove_container(id, Some(options)).await?;
        info!("Removed container: {}", id);
        Ok(())
    }

    async fn exec(&self, id: &str, argv: Vec<String>) -> Result<String, RuntimeError> {
        let exec_config = CreateExecOptions {
            cmd: Some(argv),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            ..Default::default()
        };

        let exec = self.docker.create_exec(id, exec_config).await?;
        let mut captured = String::new();

        if let StartExecResults::Attached { mut output, .. } = self.docker.start_exec(&exec.id, None).await? {
            while let Some(chunk) = output.next().await {
                captured.push_str(&chunk_text(chunk?));
            }
        }

        Ok(captured)
    }

    fn logs(&self, id: &str) -> BoxStream<'static, Result<String, RuntimeError>> {
        let options = LogsOptions::<String> {
            stdout: true,
            stderr: true,
            tail: "all".to_string(),
            ..Default::default()
        };

        let raw = self.docker.logs(id, Some(options)).boxed();

        stream::unfold(Some((raw, LineBuffer::default())), |state| async move {
            let (mut raw, mut buffer) = state?;
            match raw.next().await {
                Some(Ok(chunk)) => {
                    let lines: Vec<Result<String, RuntimeError>> = buffer.push(&chunk_text(chunk)).into_iter().map(Ok).collect();
                    Some((lines, Some((raw, buffer))))
                }
                Some(Err(e)) => Some((vec![Err(RuntimeError::from(e))], None)),
                None => buffer.finish().map(|rest| (vec![Ok(rest)], None)),
            }
        })
        .flat_map(stream::iter)
        .boxed()
    }
}
