use std::collections::HashMap;

use super::error::ValidationError;
use super::memory::{available_memory, label_matches, meets_minimum};
use super::strategy::ServiceStrategy;
use crate::shared::models::{EnvSpec, Plan, RuntimeConfig, ServiceDefinition};

/// Resolves the container environment for `definition` on `plan`.
///
/// Iteration is driven by the declared schema, so override keys the service
/// does not declare are ignored. Memory variables are derived from the plan
/// and cannot be overridden.
pub fn validate(
    definition: &ServiceDefinition,
    strategy: ServiceStrategy,
    plan: &Plan,
    overrides: &HashMap<String, String>,
) -> Result<RuntimeConfig, ValidationError> {
    let available = available_memory(plan.memory_mb);
    if !meets_minimum(available, definition.min_memory) {
        return Err(ValidationError::InsufficientMemory {
            required: definition.min_memory,
            available,
        });
    }

    let mut config = strategy.build_base_config(definition, available);

    for spec in &definition.env {
        if spec.is_memory_variable {
            let value = memory_value(spec, config.get(&spec.key), available)?;
            config.insert(spec.key.clone(), value);
            continue;
        }

        let value = match overrides.get(&spec.key) {
            Some(value) if spec.accepts(value) => value.clone(),
            Some(value) => {
                return Err(ValidationError::InvalidValue {
                    key: spec.key.clone(),
                    value: value.clone(),
                })
            }
            None if spec.required => return Err(ValidationError::MissingRequired(spec.key.clone())),
            None => spec.default.clone(),
        };
        config.insert(spec.key.clone(), value);
    }

    Ok(config)
}

/// Picks the value of a memory variable for `available_mb`.
///
/// A constrained spec must list a value for this much memory; the strategy's
/// own value is kept only when the spec allows it.
fn memory_value(spec: &EnvSpec, base: Option<&String>, available_mb: i64) -> Result<String, ValidationError> {
    if spec.allowed_values.is_empty() {
        return Ok(base.cloned().unwrap_or_else(|| format!("{available_mb}M")));
    }

    if let Some(base) = base.filter(|value| spec.accepts(value)) {
        return Ok(base.clone());
    }

    spec.allowed_values
        .iter()
        .find(|v| label_matches(&v.name, available_mb) || label_matches(&v.value, available_mb))
        .map(|v| v.value.clone())
        .ok_or_else(|| ValidationError::NoMemoryValue {
            key: spec.key.clone(),
            available: available_mb,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::catalog::EnvValue;
    use crate::shared::models::EnvSpec;

    fn spec(key: &str, required: bool, default: &str, allowed: &[&str]) -> EnvSpec {
        EnvSpec {
            key: key.to_string(),
            name: key.to_lowercase(),
            required,
            description: String::new(),
            default: default.to_string(),
            allowed_values: allowed
                .iter()
                .map(|v| EnvValue { name: v.to_string(), value: v.to_string() })
                .collect(),
            is_memory_variable: false,
        }
    }

    fn service(min_memory: i64, env: Vec<EnvSpec>) -> ServiceDefinition {
        ServiceDefinition {
            name: "valheim".to_string(),
            name_long: "Valheim".to_string(),
            image: "lloesche/valheim-server".to_string(),
            min_memory,
            recommended_memory: 0,
            env,
            ports: vec![],
            volumes: vec![],
        }
    }

    fn overrides(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    const PLAN: Plan = Plan { memory_mb: 4096 };

    #[test]
    fn memory_gate_matches_available_memory() {
        let ok = service(2048, vec![]);
        assert!(validate(&ok, ServiceStrategy::Valheim, &PLAN, &HashMap::new()).is_ok());

        let too_big = service(3200, vec![]);
        assert_eq!(
            validate(&too_big, ServiceStrategy::Valheim, &PLAN, &HashMap::new()),
            Err(ValidationError::InsufficientMemory { required: 3200, available: 3072 })
        );

        let exact = service(3072, vec![]);
        assert!(validate(&exact, ServiceStrategy::Valheim, &PLAN, &HashMap::new()).is_ok());
    }

    #[test]
    fn difficulty_scenarios() {
        let def = service(1024, vec![spec("DIFFICULTY", true, "", &["easy", "normal", "hard"])]);

        assert_eq!(
            validate(&def, ServiceStrategy::Valheim, &PLAN, &overrides(&[("DIFFICULTY", "extreme")])),
            Err(ValidationError::InvalidValue {
                key: "DIFFICULTY".to_string(),
                value: "extreme".to_string()
            })
        );
        assert_eq!(
            validate(&def, ServiceStrategy::Valheim, &PLAN, &HashMap::new()),
            Err(ValidationError::MissingRequired("DIFFICULTY".to_string()))
        );

        let config =
            validate(&def, ServiceStrategy::Valheim, &PLAN, &overrides(&[("DIFFICULTY", "hard")])).unwrap();
        assert_eq!(config.get("DIFFICULTY").map(String::as_str), Some("hard"));
    }

    #[test]
    fn output_has_exactly_the_declared_keys() {
        let def = service(
            1024,
            vec![
                spec("SERVER_NAME", false, "My server", &[]),
                spec("WORLD_NAME", false, "Dedicated", &[]),
                spec("PUBLIC", false, "1", &["0", "1"]),
            ],
        );
        let config = validate(
            &def,
            ServiceStrategy::Valheim,
            &PLAN,
            &overrides(&[("SERVER_NAME", "Vikings"), ("INJECTED", "x"), ("PATH", "/evil")]),
        )
        .unwrap();

        let keys: Vec<&str> = config.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["PUBLIC", "SERVER_NAME", "WORLD_NAME"]);
        assert_eq!(config["SERVER_NAME"], "Vikings");
        assert_eq!(config["WORLD_NAME"], "Dedicated");
        assert_eq!(config["PUBLIC"], "1");
    }

    #[test]
    fn empty_allowed_values_are_unconstrained() {
        let def = service(1024, vec![spec("PASSWORD", true, "", &[])]);
        let config =
            validate(&def, ServiceStrategy::Valheim, &PLAN, &overrides(&[("PASSWORD", "hunter2 !@#")])).unwrap();
        assert_eq!(config["PASSWORD"], "hunter2 !@#");
    }

    #[test]
    fn first_violation_in_declared_order_wins() {
        let def = service(
            1024,
            vec![spec("A", true, "", &[]), spec("B", false, "", &["x"])],
        );
        assert_eq!(
            validate(&def, ServiceStrategy::Valheim, &PLAN, &overrides(&[("B", "y")])),
            Err(ValidationError::MissingRequired("A".to_string()))
        );
    }

    #[test]
    fn strategy_defaults_are_merged() {
        let mut def = service(1024, vec![spec("DIFFICULTY", false, "normal", &[])]);
        def.name = "minecraft".to_string();

        let config = validate(&def, ServiceStrategy::Minecraft, &PLAN, &HashMap::new()).unwrap();
        assert_eq!(config["MEMORY"], "3072M");
        assert_eq!(config["EULA"], "TRUE");
        assert_eq!(config["DIFFICULTY"], "normal");
    }

    #[test]
    fn memory_variables_come_from_the_plan() {
        let mut memory = spec("HEAP", true, "1G", &[]);
        memory.is_memory_variable = true;
        let def = service(1024, vec![memory]);

        let config =
            validate(&def, ServiceStrategy::Valheim, &PLAN, &overrides(&[("HEAP", "64G")])).unwrap();
        assert_eq!(config["HEAP"], "3072M");
    }

    fn memory_spec(key: &str, allowed: &[(&str, &str)]) -> EnvSpec {
        let mut memory = spec(key, true, "", &[]);
        memory.is_memory_variable = true;
        memory.allowed_values = allowed
            .iter()
            .map(|(name, value)| EnvValue { name: name.to_string(), value: value.to_string() })
            .collect();
        memory
    }

    #[test]
    fn constrained_memory_variable_picks_the_listed_value() {
        let def = service(1024, vec![memory_spec("MEMORY_SIZE", &[("2 GB", "2G"), ("3 GB", "3G")])]);

        let config = validate(&def, ServiceStrategy::Valheim, &PLAN, &overrides(&[("MEMORY_SIZE", "2G")])).unwrap();
        assert_eq!(config["MEMORY_SIZE"], "3G");
        assert!(def.env[0].accepts(&config["MEMORY_SIZE"]));
    }

    #[test]
    fn constrained_memory_variable_without_a_match_is_rejected() {
        let def = service(1024, vec![memory_spec("MEMORY_SIZE", &[("1 GB", "1G"), ("2 GB", "2G")])]);

        assert_eq!(
            validate(&def, ServiceStrategy::Valheim, &PLAN, &HashMap::new()),
            Err(ValidationError::NoMemoryValue {
                key: "MEMORY_SIZE".to_string(),
                available: 3072
            })
        );
    }

    #[test]
    fn strategy_memory_must_be_allowed() {
        let mut def = service(1024, vec![memory_spec("MEMORY", &[("3 GB", "3G")])]);
        def.name = "minecraft".to_string();

        // The strategy would set 3072M, which the spec does not list.
        let config = validate(&def, ServiceStrategy::Minecraft, &PLAN, &HashMap::new()).unwrap();
        assert_eq!(config["MEMORY"], "3G");
    }
}
