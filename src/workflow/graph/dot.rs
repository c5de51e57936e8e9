// SPDX-License-Identifier: MIT

//! Graphviz rendering of action graphs

use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use std::fmt;

use super::types::ActionGraph;

/// Node weight carrying the display label
struct ActionNode {
    name: String,
    action_type: String,
}

impl fmt::Display for ActionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name == self.action_type {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}\n{}", self.name, self.action_type)
        }
    }
}

fn to_petgraph(graph: &ActionGraph) -> DiGraph<ActionNode, &'static str> {
    let mut out = DiGraph::new();
    let mut index: HashMap<&str, NodeIndex> = HashMap::new();

    for action in graph.nodes() {
        let idx = out.add_node(ActionNode {
            name: action.name.clone(),
            action_type: action.action_type.clone(),
        });
        index.insert(action.name.as_str(), idx);
    }
    for (from, to) in graph.edges() {
        if let (Some(&a), Some(&b)) = (index.get(from), index.get(to)) {
            out.add_edge(a, b, "");
        }
    }
    out
}

/// Render the graph as a Graphviz DOT string
pub fn to_dot(graph: &ActionGraph) -> String {
    let graph = to_petgraph(graph);
    format!("{}", Dot::with_config(&graph, &[Config::EdgeNoLabel]))
}
