// SPDX-License-Identifier: MIT

//! Definition resolution - turns a workflow definition plus the action-type
//! configuration into fully resolved actions

use indexmap::{IndexMap, IndexSet};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_yaml::Value;
use std::collections::HashMap;

use super::action::{Action, ActionConfig, ConfigValue, ControlType};
use super::types::{ActionDefinition, ConfigFile, WorkflowDefinition, ERROR_HANDLER};
use crate::error::DefinitionError;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([^{}\s]+)\s*\}\}").expect("placeholder pattern is valid"));

/// Names the compiler synthesizes for fork/join pairs
static CONTROL_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(fork|join)-\d+$").expect("control name pattern is valid"));

/// A workflow ready for graph compilation
#[derive(Debug, Clone)]
pub struct Workflow {
    pub name: String,
    /// Ordinary actions, in definition order
    pub actions: Vec<Action>,
    /// Global error handler, kept out of the dependency graph
    pub error_handler: Option<Action>,
}

impl Workflow {
    pub fn build(def: &WorkflowDefinition, config: &ConfigFile) -> Result<Self, DefinitionError> {
        resolve(def, config)
    }
}

/// Resolve every action of `def` against the action types of `config`
pub fn resolve(def: &WorkflowDefinition, config: &ConfigFile) -> Result<Workflow, DefinitionError> {
    if def.name.trim().is_empty() {
        return Err(DefinitionError::EmptyWorkflowName);
    }
    if config.action_types.is_empty() {
        return Err(DefinitionError::NoActionTypes);
    }

    let mut actions = Vec::with_capacity(def.actions.len());
    let mut error_handler = None;

    for (name, action_def) in &def.actions {
        let action = compose_action(config, name, action_def)?;
        if name == ERROR_HANDLER {
            if !action.dependencies.is_empty() {
                log::warn!(
                    "Ignoring dependencies {:?} declared on the error handler",
                    action.dependencies
                );
            }
            error_handler = Some(Action {
                dependencies: IndexSet::new(),
                ..action
            });
        } else {
            actions.push(action);
        }
    }

    if actions.is_empty() {
        return Err(DefinitionError::NoActions(def.name.clone()));
    }
    if let Some(handler) = &error_handler {
        if let Some(action) = actions
            .iter()
            .find(|a| a.dependencies.contains(&handler.name))
        {
            return Err(DefinitionError::ErrorHandlerReferenced(action.name.clone()));
        }
    }

    log::debug!(
        "Resolved workflow '{}': {} actions, error handler: {}",
        def.name,
        actions.len(),
        error_handler.is_some()
    );
    Ok(Workflow {
        name: def.name.clone(),
        actions,
        error_handler,
    })
}

fn validate_name(name: &str) -> Result<(), DefinitionError> {
    if name.trim().is_empty() {
        return Err(DefinitionError::EmptyActionName);
    }
    if ControlType::from_action_type(name).is_some() || CONTROL_NAME.is_match(name) {
        return Err(DefinitionError::ReservedActionName(name.to_string()));
    }
    Ok(())
}

fn compose_action(
    config: &ConfigFile,
    name: &str,
    def: &ActionDefinition,
) -> Result<Action, DefinitionError> {
    validate_name(name)?;
    if ControlType::from_action_type(&def.action_type).is_some() {
        return Err(DefinitionError::ReservedActionType {
            action: name.to_string(),
            action_type: def.action_type.clone(),
        });
    }

    let template = config.action_types.get(&def.action_type).ok_or_else(|| {
        DefinitionError::UnknownActionType {
            action: name.to_string(),
            action_type: def.action_type.clone(),
        }
    })?;

    let mut parameters = HashMap::new();
    for (key, value) in def.parameters.iter().flatten() {
        let value = scalar_to_string(value).ok_or_else(|| DefinitionError::UnsupportedValue {
            action: name.to_string(),
            field: key.clone(),
        })?;
        parameters.insert(key.clone(), value);
    }

    let mut fields = ActionConfig::new();
    for (field, value) in template {
        let resolved = ValueResolver {
            action: name,
            field,
            parameters: &parameters,
        }
        .resolve(value)?;
        fields.insert(field.clone(), resolved);
    }

    Ok(Action::new(name, def.action_type.as_str())
        .with_dependencies(def.dependencies.to_vec())
        .with_config(fields))
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Converts one template field into a `ConfigValue`, filling placeholders
struct ValueResolver<'a> {
    action: &'a str,
    field: &'a str,
    parameters: &'a HashMap<String, String>,
}

impl ValueResolver<'_> {
    fn resolve(&self, value: &Value) -> Result<ConfigValue, DefinitionError> {
        match value {
            Value::Null => Ok(ConfigValue::Null),
            Value::Sequence(items) => items
                .iter()
                .map(|item| self.scalar(item))
                .collect::<Result<Vec<_>, _>>()
                .map(ConfigValue::List),
            Value::Mapping(map) => {
                let mut out = IndexMap::new();
                for (key, value) in map {
                    let key = scalar_to_string(key).ok_or_else(|| self.unsupported())?;
                    out.insert(self.interpolate(&key)?, self.resolve(value)?);
                }
                Ok(ConfigValue::Map(out))
            }
            Value::Tagged(tagged) => self.resolve(&tagged.value),
            other => self.scalar(other).map(ConfigValue::Scalar),
        }
    }

    fn scalar(&self, value: &Value) -> Result<String, DefinitionError> {
        let text = scalar_to_string(value).ok_or_else(|| self.unsupported())?;
        self.interpolate(&text)
    }

    fn interpolate(&self, text: &str) -> Result<String, DefinitionError> {
        interpolate(self.action, text, self.parameters)
    }

    fn unsupported(&self) -> DefinitionError {
        DefinitionError::UnsupportedValue {
            action: self.action.to_string(),
            field: self.field.to_string(),
        }
    }
}

/// Replace every `{{ key }}` in `text` with its parameter value.
///
/// Fails on the first placeholder with no matching parameter.
pub fn interpolate(
    action: &str,
    text: &str,
    parameters: &HashMap<String, String>,
) -> Result<String, DefinitionError> {
    let mut missing: Option<String> = None;
    let filled = PLACEHOLDER.replace_all(text, |caps: &Captures| {
        let key = &caps[1];
        match parameters.get(key) {
            Some(value) => value.clone(),
            None => {
                missing.get_or_insert_with(|| key.to_string());
                caps[0].to_string()
            }
        }
    });
    let filled = filled.into_owned();

    match missing {
        Some(placeholder) => Err(DefinitionError::UnresolvedPlaceholder {
            action: action.to_string(),
            placeholder,
        }),
        None => Ok(filled),
    }
}
