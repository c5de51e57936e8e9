// SPDX-License-Identifier: MIT

//! Typed error handling for woozie-rs
//!
//! `WorkflowError` covers the structural compiler, `DefinitionError` covers
//! turning YAML definitions into actions, and `WoozieError` wraps both along
//! with the I/O, YAML and XML failures of the surrounding layers.

use std::collections::BTreeSet;
use thiserror::Error;

/// Top-level error type for woozie-rs
#[derive(Debug, Error)]
pub enum WoozieError {
    /// Configuration errors (missing paths, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Definition resolution errors
    #[error("Definition error: {0}")]
    Definition(#[from] DefinitionError),

    /// Graph compilation and emission errors
    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// XML writer errors
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    /// Generic error wrapper
    #[error("{0}")]
    Other(String),
}

/// Structural errors raised while compiling the dependency graph
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    /// The dependency graph is not a DAG
    #[error("Cyclic dependencies found between actions: {0:?}")]
    CyclicDependency(Vec<String>),

    /// An action depends on a name no action carries
    #[error("Missing action for dependencies: {0:?}")]
    MissingDependency(BTreeSet<String>),

    /// A segment cannot be spliced with a single transition
    #[error("Ambiguous transition while wiring {context}: expected one node, found {nodes:?}")]
    AmbiguousTransition { context: String, nodes: Vec<String> },

    /// The error handler would receive more than one incoming transition
    #[error("Multiple transitions found for error node: {0:?}")]
    MultipleErrorTargets(Vec<String>),

    /// start/end cannot be attached to a unique entry and exit
    #[error("Multiple transitions found for start/end nodes (entries: {entries:?}, exits: {exits:?})")]
    AmbiguousBoundary {
        entries: Vec<String>,
        exits: Vec<String>,
    },

    /// An action cannot be projected into markup
    #[error("Malformed configuration for action '{action}': {reason}")]
    MalformedConfig { action: String, reason: String },
}

/// Errors raised while resolving workflow and configuration files into actions
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("Workflow definition must have a non-empty name")]
    EmptyWorkflowName,

    #[error("Workflow '{0}' must define at least one action")]
    NoActions(String),

    #[error("Action names must be non-empty")]
    EmptyActionName,

    /// Name collides with a synthesized control node
    #[error("Action name '{0}' is reserved for control nodes")]
    ReservedActionName(String),

    #[error("Action '{action}' uses reserved control type '{action_type}'")]
    ReservedActionType { action: String, action_type: String },

    #[error("Action '{action}' has type '{action_type}' which is not in the configuration file")]
    UnknownActionType { action: String, action_type: String },

    #[error("Configuration file must define at least one action type")]
    NoActionTypes,

    #[error("Action '{action}' leaves placeholder '{{{{ {placeholder} }}}}' unresolved")]
    UnresolvedPlaceholder { action: String, placeholder: String },

    #[error("Action '{action}' has an unsupported value for field '{field}'")]
    UnsupportedValue { action: String, field: String },

    #[error("Action '{0}' depends on the error handler")]
    ErrorHandlerReferenced(String),
}

impl WoozieError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create from a generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

impl WorkflowError {
    pub fn ambiguous(context: impl Into<String>, nodes: Vec<String>) -> Self {
        Self::AmbiguousTransition {
            context: context.into(),
            nodes,
        }
    }

    pub fn malformed(action: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedConfig {
            action: action.into(),
            reason: reason.into(),
        }
    }
}

impl From<&str> for WoozieError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

impl From<String> for WoozieError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}
