use std::fmt;

use super::error::StrategyError;
use crate::shared::models::{RuntimeConfig, ServiceDefinition};

/// Per-game behaviour. Adding a game means adding a variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceStrategy {
    Minecraft,
    Valheim,
}

impl ServiceStrategy {
    pub const ALL: [ServiceStrategy; 2] = [ServiceStrategy::Minecraft, ServiceStrategy::Valheim];

    /// Registry lookup by catalog service identifier.
    pub fn for_service(service_id: &str) -> Result<Self, StrategyError> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.service_id() == service_id)
            .ok_or_else(|| StrategyError::Unregistered(service_id.to_string()))
    }

    pub fn service_id(self) -> &'static str {
        match self {
            ServiceStrategy::Minecraft => "minecraft",
            ServiceStrategy::Valheim => "valheim",
        }
    }

    /// Game-specific settings that never come from the user.
    pub fn build_base_config(self, _definition: &ServiceDefinition, available_mb: i64) -> RuntimeConfig {
        let mut config = RuntimeConfig::new();
        match self {
            ServiceStrategy::Minecraft => {
                config.insert("MEMORY".to_string(), format!("{available_mb}M"));
                config.insert("EULA".to_string(), "TRUE".to_string());
            }
            ServiceStrategy::Valheim => {}
        }
        config
    }

    /// Wraps an operator command in the game's control-channel invocation.
    pub fn format_command(self, command: &str) -> Result<String, StrategyError> {
        match self {
            ServiceStrategy::Minecraft => Ok(format!("rcon-cli {command}")),
            ServiceStrategy::Valheim => Err(StrategyError::Unsupported(self.service_id())),
        }
    }
}

impl fmt::Display for ServiceStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.service_id())
    }
}
