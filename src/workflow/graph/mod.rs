// SPDX-License-Identifier: MIT

//! Dependency graph to structured control-flow graph
//!
//! Stages, in pipeline order:
//! - `assembler` builds the dependency graph and rejects cycles
//! - `components` splits it into weakly-connected islands
//! - `linearize` turns each island into forkless chains joined in sequence
//! - `sync` synthesizes fork/join pairs around sibling branches
//! - `finalize` composes the islands and attaches error/start/end wiring

pub mod assembler;
pub mod components;
pub mod dot;
pub mod finalize;
pub mod linearize;
pub mod sync;
pub mod types;

pub use finalize::{END, START};
pub use sync::ForkCounter;
pub use types::ActionGraph;

use crate::error::WorkflowError;
use crate::workflow::resolver::Workflow;

/// Both graphs produced for one workflow
#[derive(Debug, Clone)]
pub struct CompiledGraph {
    /// Raw dependency graph, as declared
    pub dependencies: ActionGraph,
    /// Structured graph using only start/end/fork/join/action nodes
    pub control_flow: ActionGraph,
}

/// Run the structural pipeline for one workflow.
///
/// Fork/join indices come from a counter owned by this call.
pub fn build_control_flow(workflow: &Workflow) -> Result<CompiledGraph, WorkflowError> {
    let dependencies = assembler::assemble(&workflow.actions)?;
    assembler::ensure_acyclic(&dependencies)?;

    let mut counter = ForkCounter::new();
    let structured = components::decompose(&dependencies)
        .into_iter()
        .map(|component| linearize::structure_component(component, &mut counter))
        .collect::<Result<Vec<_>, _>>()?;
    let control_flow =
        finalize::finalize(structured, workflow.error_handler.as_ref(), &mut counter)?;

    log::debug!(
        "Control flow for '{}': {} nodes, {} fork/join pair(s)",
        workflow.name,
        control_flow.len(),
        counter.issued()
    );
    Ok(CompiledGraph {
        dependencies,
        control_flow,
    })
}
