// SPDX-License-Identifier: MIT

//! Workflow loader - YAML file loading and parsing
//!
//! This module handles loading workflow definitions and action-type
//! configuration files.

use super::types::{ConfigFile, WorkflowDefinition};
use crate::error::WoozieError;
use std::fs;
use std::path::Path;

/// Loads workflow definitions and configuration files from YAML
pub struct WorkflowLoader;

impl WorkflowLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a workflow definition from a YAML file
    pub fn load_workflow<P: AsRef<Path>>(&self, path: P) -> Result<WorkflowDefinition, WoozieError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            WoozieError::config(format!("Cannot read workflow file {}: {}", path.display(), e))
        })?;
        Self::parse_workflow(&content)
    }

    /// Load an action-type configuration from a YAML file
    pub fn load_config<P: AsRef<Path>>(&self, path: P) -> Result<ConfigFile, WoozieError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            WoozieError::config(format!("Cannot read configuration file {}: {}", path.display(), e))
        })?;
        Self::parse_config(&content)
    }

    /// Parse a workflow definition from a YAML string
    pub fn parse_workflow(content: &str) -> Result<WorkflowDefinition, WoozieError> {
        let def: WorkflowDefinition = serde_yaml::from_str(content)?;
        Ok(def)
    }

    /// Parse an action-type configuration from a YAML string
    pub fn parse_config(content: &str) -> Result<ConfigFile, WoozieError> {
        let config: ConfigFile = serde_yaml::from_str(content)?;
        Ok(config)
    }
}

impl Default for WorkflowLoader {
    fn default() -> Self {
        Self::new()
    }
}
