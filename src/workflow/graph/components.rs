// SPDX-License-Identifier: MIT

//! Splits a dependency graph into independent islands

use super::types::ActionGraph;

/// Weakly-connected components of `graph`, each keeping its edge directions.
///
/// Components come out in the order their first action appears in the input.
pub fn decompose(graph: &ActionGraph) -> Vec<ActionGraph> {
    let components = graph.weakly_connected_components();
    log::debug!("Dependency graph has {} component(s)", components.len());
    components
}
