// SPDX-License-Identifier: MIT

//! Action values - the nodes of every workflow graph

use indexmap::{IndexMap, IndexSet};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Ordered mapping of target-schema field name to value
pub type ActionConfig = IndexMap<String, ConfigValue>;

/// A resolved configuration value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Null,
    Scalar(String),
    List(Vec<String>),
    Map(IndexMap<String, ConfigValue>),
}

impl ConfigValue {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            ConfigValue::Scalar(s) => Some(s),
            _ => None,
        }
    }
}

/// Reserved control node types synthesized by the compiler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlType {
    Start,
    End,
    Fork,
    Join,
}

impl ControlType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlType::Start => "start",
            ControlType::End => "end",
            ControlType::Fork => "fork",
            ControlType::Join => "join",
        }
    }

    pub fn from_action_type(action_type: &str) -> Option<Self> {
        match action_type {
            "start" => Some(ControlType::Start),
            "end" => Some(ControlType::End),
            "fork" => Some(ControlType::Fork),
            "join" => Some(ControlType::Join),
            _ => None,
        }
    }
}

/// A named unit of work.
///
/// Identity is the `name` alone: `PartialEq` and `Hash` ignore the type,
/// dependencies and config, so two actions with the same name are the same
/// graph node.
#[derive(Debug, Clone)]
pub struct Action {
    pub name: String,
    pub action_type: String,
    pub dependencies: IndexSet<String>,
    pub config: Option<ActionConfig>,
}

impl Action {
    pub fn new(name: impl Into<String>, action_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            action_type: action_type.into(),
            dependencies: IndexSet::new(),
            config: None,
        }
    }

    /// Create a synthesized control node
    pub fn control(kind: ControlType, name: impl Into<String>) -> Self {
        Self::new(name, kind.as_str())
    }

    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_config(mut self, config: ActionConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// The control type, or `None` for ordinary actions
    pub fn control_type(&self) -> Option<ControlType> {
        ControlType::from_action_type(&self.action_type)
    }

    pub fn is_control(&self) -> bool {
        self.control_type().is_some()
    }
}

impl PartialEq for Action {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Action {}

impl Hash for Action {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_action_equality_by_name() {
        let a1 = Action::new("extract", "spark");
        let a2 = Action::new("extract", "hive").with_dependencies(["other"]);
        let b = Action::new("load", "spark");

        assert_eq!(a1, a2);
        assert_ne!(a1, b);
    }

    #[test]
    fn test_action_hash_by_name() {
        let mut set = HashSet::new();
        set.insert(Action::new("extract", "spark"));
        set.insert(Action::new("extract", "shell"));
        set.insert(Action::new("load", "spark"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_control_type_round_trip() {
        let fork = Action::control(ControlType::Fork, "fork-0");
        assert_eq!(fork.action_type, "fork");
        assert_eq!(fork.control_type(), Some(ControlType::Fork));
        assert!(fork.is_control());
        assert!(!Action::new("extract", "spark").is_control());
    }

    #[test]
    fn test_dependencies_keep_declaration_order() {
        let action = Action::new("c", "shell").with_dependencies(["b", "a", "b"]);
        let deps: Vec<&str> = action.dependencies.iter().map(String::as_str).collect();
        assert_eq!(deps, vec!["b", "a"]);
    }
}
