use bollard::models::{ContainerInspectResponse, PortMap};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::shared::models::{PortSpec, RuntimeConfig, VolumeSpec};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortBinding {
    pub container_port: String,
    pub host_port: String,
    pub protocol: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeBinding {
    pub host_path: String,
    pub container_path: String,
}

/// Read projection of the live container, rebuilt on every inspect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerView {
    pub id: String,
    /// Image reference the container was created from.
    pub image: String,
    pub running: bool,
    pub name: String,
    /// Runtime status word (`created`, `running`, `exited`, ...).
    pub status: String,
    pub env: HashMap<String, String>,
    pub ports: Vec<PortBinding>,
    pub volumes: Vec<VolumeBinding>,
}

impl From<ContainerInspectResponse> for ContainerView {
    fn from(info: ContainerInspectResponse) -> Self {
        let config = info.config.unwrap_or_default();
        let host_config = info.host_config.unwrap_or_default();
        let state = info.state.unwrap_or_default();

        Self {
            id: info.id.unwrap_or_default(),
            image: config.image.or(info.image).unwrap_or_default(),
            running: state.running.unwrap_or(false),
            name: info
                .name
                .map(|n| n.trim_start_matches('/').to_string())
                .unwrap_or_default(),
            status: state.status.map(|s| s.to_string()).unwrap_or_default(),
            env: parse_env(config.env.as_deref().unwrap_or_default()),
            ports: parse_ports(host_config.port_bindings.as_ref()),
            volumes: parse_binds(host_config.binds.as_deref().unwrap_or_default()),
        }
    }
}

/// What the controller asks the runtime to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSpec {
    pub name: String,
    pub image: String,
    pub env: Vec<String>,
    pub ports: Vec<PortSpec>,
    pub volumes: Vec<VolumeSpec>,
}

pub fn format_env(config: &RuntimeConfig) -> Vec<String> {
    config.iter().map(|(key, value)| format!("{key}={value}")).collect()
}

pub fn format_binds(volumes: &[VolumeSpec]) -> Vec<String> {
    volumes
        .iter()
        .map(|v| format!("{}:{}", v.host_path, v.container_path))
        .collect()
}

pub fn format_port_map(ports: &[PortSpec]) -> PortMap {
    let mut map: PortMap = HashMap::new();
    for port in ports {
        let key = format!("{}/{}", port.container_port, port.protocol);
        map.entry(key)
            .or_insert_with(|| Some(Vec::new()))
            .get_or_insert_with(Vec::new)
            .push(bollard::models::PortBinding {
                host_ip: None,
                host_port: Some(port.host_port.to_string()),
            });
    }
    map
}

/// `KEY=VALUE` list into a map. Values may themselves contain `=`.
pub fn parse_env(entries: &[String]) -> HashMap<String, String> {
    entries
        .iter()
        .filter_map(|entry| entry.split_once('='))
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

fn parse_binds(binds: &[String]) -> Vec<VolumeBinding> {
    binds
        .iter()
        .filter_map(|bind| {
            let mut parts = bind.split(':');
            let host = parts.next().filter(|p| !p.is_empty())?;
            let container = parts.next().filter(|p| !p.is_empty())?;
            Some(VolumeBinding {
                host_path: host.to_string(),
                container_path: container.to_string(),
            })
        })
        .collect()
}

fn parse_ports(ports: Option<&PortMap>) -> Vec<PortBinding> {
    let Some(ports) = ports else {
        return Vec::new();
    };

    let mut bindings: Vec<PortBinding> = ports
        .iter()
        .filter_map(|(key, binds)| {
            let host_port = binds.as_ref()?.first()?.host_port.clone()?;
            let (port, protocol) = key.split_once('/').unwrap_or((key.as_str(), "tcp"));
            Some(PortBinding {
                container_port: port.to_string(),
                host_port,
                protocol: protocol.to_string(),
            })
        })
        .collect();
    bindings.sort_by(|a, b| (&a.container_port, &a.protocol).cmp(&(&b.container_port, &b.protocol)));
    bindings
}
