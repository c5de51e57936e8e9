// SPDX-License-Identifier: MIT

//! YAML schema types for workflow definitions and action-type configuration
//!
//! Mappings are `IndexMap`s so that the order written in the files is the
//! order actions are compiled and fields are emitted.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Key of the action that acts as the global error handler
pub const ERROR_HANDLER: &str = "error_handler";

/// Top-level workflow definition
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WorkflowDefinition {
    pub name: String,
    /// Actions keyed by name
    #[serde(default)]
    pub actions: IndexMap<String, ActionDefinition>,
}

/// A single action in the workflow definition
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ActionDefinition {
    /// Action type, looked up in the configuration file
    #[serde(rename = "type")]
    pub action_type: String,
    /// Actions that must complete before this one starts
    #[serde(default)]
    pub dependencies: DependsOn,
    /// Placeholder values substituted into the action-type template
    #[serde(default, alias = "vars")]
    pub parameters: Option<IndexMap<String, serde_yaml::Value>>,
}

/// Dependency specification (single string or array)
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(untagged)]
pub enum DependsOn {
    #[default]
    None,
    Single(String),
    Multiple(Vec<String>),
}

impl DependsOn {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            DependsOn::None => vec![],
            DependsOn::Single(s) => vec![s.clone()],
            DependsOn::Multiple(v) => v.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            DependsOn::None => true,
            DependsOn::Single(_) => false,
            DependsOn::Multiple(v) => v.is_empty(),
        }
    }
}

/// Configuration file mapping each action type to its field template
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub action_types: IndexMap<String, IndexMap<String, serde_yaml::Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depends_on_deserialize_none() {
        let yaml = r#"
            type: shell
        "#;
        let action: ActionDefinition = serde_yaml::from_str(yaml).unwrap();
        assert!(action.dependencies.is_empty());
        assert!(action.parameters.is_none());
    }

    #[test]
    fn test_depends_on_deserialize_single() {
        let yaml = r#"
            type: shell
            dependencies: extract
        "#;
        let action: ActionDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(action.dependencies.to_vec(), vec!["extract".to_string()]);
    }

    #[test]
    fn test_depends_on_deserialize_multiple() {
        let yaml = r#"
            type: shell
            dependencies:
              - extract
              - lookup
        "#;
        let action: ActionDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            action.dependencies.to_vec(),
            vec!["extract".to_string(), "lookup".to_string()]
        );
    }

    #[test]
    fn test_vars_alias() {
        let yaml = r#"
            type: shell
            vars:
              script: run.sh
        "#;
        let action: ActionDefinition = serde_yaml::from_str(yaml).unwrap();
        let params = action.parameters.unwrap();
        assert_eq!(params.get("script").and_then(|v| v.as_str()), Some("run.sh"));
    }

    #[test]
    fn test_actions_keep_file_order() {
        let yaml = r#"
            name: ordered
            actions:
              zeta: { type: shell }
              alpha: { type: shell }
              mid: { type: shell }
        "#;
        let def: WorkflowDefinition = serde_yaml::from_str(yaml).unwrap();
        let names: Vec<&str> = def.actions.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_config_file_keeps_field_order() {
        let yaml = r#"
            action_types:
              shell:
                shell:
                  xmlns: "uri:oozie:shell-action:1.0"
                resource-manager: "{{ rm }}"
                exec: "{{ script }}"
        "#;
        let config: ConfigFile = serde_yaml::from_str(yaml).unwrap();
        let fields: Vec<&str> = config.action_types["shell"]
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(fields, vec!["shell", "resource-manager", "exec"]);
    }
}
