use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use utoipa::ToSchema;

/// Resolved environment for the managed container, keyed by variable name.
///
/// A `BTreeMap` keeps the rendered `KEY=VALUE` list stable between runs.
pub type RuntimeConfig = BTreeMap<String, String>;

/// A game service as described by the billing authority's catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDefinition {
    /// Stable service identifier, e.g. `minecraft`.
    pub name: String,
    #[serde(default)]
    pub name_long: String,
    pub image: String,
    /// Minimum memory the workload needs, in MB.
    #[serde(rename = "minMem")]
    pub min_memory: i64,
    #[serde(rename = "recMem", default)]
    pub recommended_memory: i64,
    #[serde(default)]
    pub env: Vec<EnvSpec>,
    #[serde(default)]
    pub ports: Vec<PortSpec>,
    #[serde(default)]
    pub volumes: Vec<VolumeSpec>,
}

impl ServiceDefinition {
    pub fn declares(&self, key: &str) -> bool {
        self.env.iter().any(|spec| spec.key == key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnvSpec {
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub default: String,
    /// Allowed values. Empty means any value is accepted.
    #[serde(default, rename = "values")]
    pub allowed_values: Vec<EnvValue>,
    #[serde(default)]
    pub is_memory_variable: bool,
}

impl EnvSpec {
    pub fn accepts(&self, value: &str) -> bool {
        self.allowed_values.is_empty() || self.allowed_values.iter().any(|v| v.value == value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EnvValue {
    #[serde(default)]
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PortSpec {
    #[serde(rename = "container")]
    pub container_port: u16,
    #[serde(rename = "host")]
    pub host_port: u16,
    #[serde(default = "default_protocol")]
    pub protocol: String,
}

fn default_protocol() -> String {
    "tcp".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VolumeSpec {
    #[serde(rename = "host")]
    pub host_path: String,
    #[serde(rename = "destination")]
    pub container_path: String,
}

/// Hardware grant for this instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub memory_mb: i64,
}

/// Service catalog keyed by service identifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    services: HashMap<String, ServiceDefinition>,
}

impl Catalog {
    pub fn new(services: HashMap<String, ServiceDefinition>) -> Self {
        Self { services }
    }

    pub fn get(&self, service_id: &str) -> Option<&ServiceDefinition> {
        self.services.get(service_id)
    }

    /// All catalog entries whose image equals `image`, ignoring ASCII case.
    pub fn find_by_image(&self, image: &str) -> Vec<(&str, &ServiceDefinition)> {
        let mut matches: Vec<_> = self
            .services
            .iter()
            .filter(|(_, def)| def.image.eq_ignore_ascii_case(image))
            .map(|(id, def)| (id.as_str(), def))
            .collect();
        matches.sort_by(|a, b| a.0.cmp(b.0));
        matches
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl FromIterator<ServiceDefinition> for Catalog {
    fn from_iter<I: IntoIterator<Item = ServiceDefinition>>(iter: I) -> Self {
        Self {
            services: iter.into_iter().map(|def| (def.name.clone(), def)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_catalog_entry() {
        let json = serde_json::json!({
            "name": "minecraft",
            "nameLong": "Minecraft: Java Edition",
            "image": "itzg/minecraft-server",
            "minMem": 2048,
            "recMem": 4096,
            "env": [{
                "name": "Difficulty",
                "key": "DIFFICULTY",
                "required": true,
                "description": "",
                "default": "normal",
                "values": [{"name": "Easy", "value": "easy"}]
            }],
            "ports": [{"host": 25565, "container": 25565, "protocol": "tcp"}],
            "volumes": [{"host": "/srv/data", "destination": "/data"}]
        });

        let def: ServiceDefinition = serde_json::from_value(json).unwrap();
        assert_eq!(def.min_memory, 2048);
        assert_eq!(def.env[0].allowed_values[0].value, "easy");
        assert!(!def.env[0].is_memory_variable);
        assert_eq!(def.ports[0].container_port, 25565);
        assert_eq!(def.volumes[0].container_path, "/data");
    }

    #[test]
    fn empty_allowed_values_accept_anything() {
        let spec = EnvSpec {
            key: "MOTD".to_string(),
            name: String::new(),
            required: false,
            description: String::new(),
            default: String::new(),
            allowed_values: vec![],
            is_memory_variable: false,
        };
        assert!(spec.accepts("anything at all"));
    }

    #[test]
    fn image_lookup_ignores_case() {
        let catalog: Catalog = [ServiceDefinition {
            name: "valheim".to_string(),
            name_long: String::new(),
            image: "lloesche/Valheim-Server".to_string(),
            min_memory: 2048,
            recommended_memory: 0,
            env: vec![],
            ports: vec![],
            volumes: vec![],
        }]
        .into_iter()
        .collect();

        let found = catalog.find_by_image("lloesche/valheim-server");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, "valheim");
    }
}
