// SPDX-License-Identifier: MIT

//! Dependency graph assembly and the acyclicity gate

use std::collections::{BTreeSet, HashSet};

use super::types::ActionGraph;
use crate::error::WorkflowError;
use crate::workflow::action::Action;

/// Build the raw dependency graph, one `dependency -> action` edge per declared dependency.
///
/// Acyclicity is not checked here; run [`ensure_acyclic`] on the result.
pub fn assemble(actions: &[Action]) -> Result<ActionGraph, WorkflowError> {
    let names: HashSet<&str> = actions.iter().map(|a| a.name.as_str()).collect();

    let missing: BTreeSet<String> = actions
        .iter()
        .flat_map(|a| a.dependencies.iter())
        .filter(|dep| !names.contains(dep.as_str()))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(WorkflowError::MissingDependency(missing));
    }

    let mut graph = ActionGraph::new();
    for action in actions {
        graph.add_node(action.clone());
    }
    for action in actions {
        for dep in &action.dependencies {
            graph.add_edge(dep, &action.name);
        }
    }

    log::debug!(
        "Assembled dependency graph: {} actions, {} edges",
        graph.len(),
        graph.edge_count()
    );
    Ok(graph)
}

/// Reject graphs that are not DAGs
pub fn ensure_acyclic(graph: &ActionGraph) -> Result<(), WorkflowError> {
    graph
        .topological_order()
        .map(|_| ())
        .map_err(WorkflowError::CyclicDependency)
}
