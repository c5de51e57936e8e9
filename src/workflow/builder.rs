// SPDX-License-Identifier: MIT

//! Workflow builder - orchestrates workflow compilation
//!
//! This module provides the high-level Builder that loads the workflow and
//! configuration files, resolves actions, compiles the control-flow graph and
//! writes the resulting documents.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::WoozieError;
use crate::workflow::emitter::emit_workflow;
use crate::workflow::graph::{build_control_flow, dot, CompiledGraph};
use crate::workflow::loader::WorkflowLoader;
use crate::workflow::resolver::{resolve, Workflow};
use crate::workflow::types::{ConfigFile, WorkflowDefinition};

/// File name of the emitted workflow document
pub const WORKFLOW_XML: &str = "workflow.xml";
/// DOT rendering of the declared dependency graph
pub const DEFINITION_DOT: &str = "workflow-definition.dot";
/// DOT rendering of the structured control-flow graph
pub const CONTROL_FLOW_DOT: &str = "workflow-graph.dot";

/// Result of compiling one workflow
#[derive(Debug, Clone)]
pub struct CompiledWorkflow {
    pub workflow: Workflow,
    pub graph: CompiledGraph,
    /// The `workflow-app` XML document
    pub document: String,
}

/// High-level builder for compiling workflows from YAML definitions
pub struct Builder {
    loader: WorkflowLoader,
}

impl Builder {
    pub fn new() -> Self {
        Self {
            loader: WorkflowLoader::new(),
        }
    }

    /// Compile a workflow from definition and configuration file paths
    pub fn compile_files(
        &self,
        workflow_path: impl AsRef<Path>,
        config_path: impl AsRef<Path>,
    ) -> Result<CompiledWorkflow, WoozieError> {
        let def = self.loader.load_workflow(workflow_path)?;
        let config = self.loader.load_config(config_path)?;
        self.compile(&def, &config)
    }

    /// Compile a parsed workflow definition against its configuration
    pub fn compile(
        &self,
        def: &WorkflowDefinition,
        config: &ConfigFile,
    ) -> Result<CompiledWorkflow, WoozieError> {
        let workflow = resolve(def, config)?;
        let graph = build_control_flow(&workflow)?;
        let document = emit_workflow(
            &workflow.name,
            &graph.control_flow,
            workflow.error_handler.as_ref(),
        )?;

        log::info!(
            "Compiled workflow '{}' ({} actions)",
            workflow.name,
            workflow.actions.len()
        );
        Ok(CompiledWorkflow {
            workflow,
            graph,
            document,
        })
    }

    /// Write the document, and optionally the DOT renderings, under `output_dir`.
    ///
    /// Returns the paths written.
    pub fn write_outputs(
        &self,
        compiled: &CompiledWorkflow,
        output_dir: impl AsRef<Path>,
        with_graphs: bool,
    ) -> Result<Vec<PathBuf>, WoozieError> {
        let output_dir = output_dir.as_ref();
        fs::create_dir_all(output_dir)?;

        let mut outputs = vec![(WORKFLOW_XML, compiled.document.clone())];
        if with_graphs {
            outputs.push((DEFINITION_DOT, dot::to_dot(&compiled.graph.dependencies)));
            outputs.push((CONTROL_FLOW_DOT, dot::to_dot(&compiled.graph.control_flow)));
        }

        let mut written = Vec::with_capacity(outputs.len());
        for (file_name, content) in outputs {
            let path = output_dir.join(file_name);
            fs::write(&path, content)?;
            log::info!("Wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DefinitionError;

    const WORKFLOW: &str = r#"
name: sample
actions:
  first:
    type: shell
    parameters: { script: first.sh }
  second:
    type: shell
    dependencies: first
    parameters: { script: second.sh }
"#;

    const CONFIG: &str = r#"
action_types:
  shell:
    shell:
      xmlns: "uri:oozie:shell-action:1.0"
    exec: "{{ script }}"
"#;

    fn compile() -> CompiledWorkflow {
        let def = WorkflowLoader::parse_workflow(WORKFLOW).unwrap();
        let config = WorkflowLoader::parse_config(CONFIG).unwrap();
        Builder::new().compile(&def, &config).unwrap()
    }

    #[test]
    fn test_compile_produces_document() {
        let compiled = compile();
        assert_eq!(compiled.workflow.name, "sample");
        assert_eq!(compiled.graph.control_flow.len(), 4);
        assert!(compiled.document.contains("<exec>second.sh</exec>"));
    }

    #[test]
    fn test_compile_surfaces_definition_errors() {
        let def = WorkflowLoader::parse_workflow(WORKFLOW).unwrap();
        let config =
            WorkflowLoader::parse_config("action_types:\n  email:\n    email: ~\n").unwrap();
        let err = Builder::new().compile(&def, &config).unwrap_err();
        assert!(matches!(
            err,
            WoozieError::Definition(DefinitionError::UnknownActionType { .. })
        ));
    }

    #[test]
    fn test_write_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("out");
        let builder = Builder::new();
        let compiled = compile();

        let written = builder.write_outputs(&compiled, &out, false).unwrap();
        assert_eq!(written, vec![out.join(WORKFLOW_XML)]);
        assert_eq!(fs::read_to_string(&written[0]).unwrap(), compiled.document);

        let written = builder.write_outputs(&compiled, &out, true).unwrap();
        assert_eq!(written.len(), 3);
        assert!(out.join(DEFINITION_DOT).exists());
        let dot = fs::read_to_string(out.join(CONTROL_FLOW_DOT)).unwrap();
        assert!(dot.contains("start"));
    }

    #[test]
    fn test_compile_files() {
        let dir = tempfile::tempdir().unwrap();
        let workflow_path = dir.path().join("workflow.yaml");
        let config_path = dir.path().join("config.yaml");
        fs::write(&workflow_path, WORKFLOW).unwrap();
        fs::write(&config_path, CONFIG).unwrap();

        let compiled = Builder::new()
            .compile_files(&workflow_path, &config_path)
            .unwrap();
        assert!(compiled.document.contains("<start to=\"first\"/>"));
    }
}
