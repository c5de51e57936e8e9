// SPDX-License-Identifier: MIT

//! Forkless chain extraction and per-component structuring

use super::sync::{append_sequential, synchronize, ForkCounter};
use super::types::ActionGraph;
use crate::error::WorkflowError;

/// One maximal forkless chain starting at every current root.
///
/// A chain extends from `current` to `next` only when `next` is the sole
/// successor of `current` and `current` is the sole predecessor of `next`.
pub fn forkless_chains(graph: &ActionGraph) -> Vec<Vec<String>> {
    graph
        .entry_nodes()
        .into_iter()
        .map(|root| walk(graph, root))
        .collect()
}

fn walk(graph: &ActionGraph, root: &str) -> Vec<String> {
    let mut chain = vec![root.to_string()];
    let mut current = root;

    while graph.out_degree(current) == 1 {
        let Some(next) = graph.successors(current).next() else {
            break;
        };
        if graph.in_degree(next) != 1 {
            break;
        }
        chain.push(next.to_string());
        current = next;
    }

    chain
}

/// Chain as a standalone graph with consecutive edges
fn chain_graph(graph: &ActionGraph, chain: &[String]) -> ActionGraph {
    let mut segment = ActionGraph::new();
    for action in chain.iter().filter_map(|name| graph.node(name)) {
        segment.add_node(action.clone());
    }
    for pair in chain.windows(2) {
        segment.add_edge(&pair[0], &pair[1]);
    }
    segment
}

/// Turn one weakly-connected component into a structured sub-graph.
///
/// Each pass takes the forkless chains hanging off the current roots. A
/// single chain is appended in sequence; sibling chains are wrapped in a
/// fork/join pair first. Consumed nodes are removed and the loop repeats
/// until the component is empty.
pub fn structure_component(
    mut component: ActionGraph,
    counter: &mut ForkCounter,
) -> Result<ActionGraph, WorkflowError> {
    let mut structured = ActionGraph::new();

    while !component.is_empty() {
        let chains = forkless_chains(&component);
        if chains.is_empty() {
            return Err(WorkflowError::CyclicDependency(
                component.names().map(str::to_string).collect(),
            ));
        }
        log::debug!("Forkless pass: {:?}", chains);

        let mut segments: Vec<ActionGraph> = chains
            .iter()
            .map(|chain| chain_graph(&component, chain))
            .collect();
        let segment = if segments.len() > 1 {
            synchronize(segments, counter)?
        } else {
            segments.remove(0)
        };
        append_sequential(&mut structured, segment)?;

        for name in chains.iter().flatten() {
            component.remove_node(name);
        }
    }

    Ok(structured)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::action::Action;
    use crate::workflow::graph::assembler::assemble;

    fn make_action(name: &str, deps: &[&str]) -> Action {
        Action::new(name, "shell").with_dependencies(deps.iter().copied())
    }

    fn graph_of(actions: &[Action]) -> ActionGraph {
        assemble(actions).unwrap()
    }

    #[test]
    fn test_sequence_is_one_chain() {
        let graph = graph_of(&[
            make_action("a", &[]),
            make_action("b", &["a"]),
            make_action("c", &["b"]),
        ]);
        assert_eq!(forkless_chains(&graph), vec![vec!["a", "b", "c"]]);
    }

    #[test]
    fn test_walk_stops_at_fan_out() {
        let graph = graph_of(&[
            make_action("a", &[]),
            make_action("b", &["a"]),
            make_action("c", &["b"]),
            make_action("d", &["b"]),
        ]);
        assert_eq!(forkless_chains(&graph), vec![vec!["a", "b"]]);
    }

    #[test]
    fn test_walk_stops_before_fan_in() {
        let graph = graph_of(&[
            make_action("a", &[]),
            make_action("b", &[]),
            make_action("c", &["a", "b"]),
        ]);
        assert_eq!(forkless_chains(&graph), vec![vec!["a"], vec!["b"]]);
    }

    #[test]
    fn test_structure_sequence() {
        let graph = graph_of(&[make_action("a", &[]), make_action("b", &["a"])]);
        let mut counter = ForkCounter::new();
        let structured = structure_component(graph, &mut counter).unwrap();

        assert!(structured.has_edge("a", "b"));
        assert_eq!(structured.edge_count(), 1);
        assert_eq!(counter.issued(), 0);
    }

    #[test]
    fn test_structure_diamond() {
        let graph = graph_of(&[
            make_action("a", &[]),
            make_action("b", &["a"]),
            make_action("c", &["a"]),
            make_action("d", &["b", "c"]),
        ]);
        let mut counter = ForkCounter::new();
        let structured = structure_component(graph, &mut counter).unwrap();

        assert!(structured.has_edge("a", "fork-0"));
        assert!(structured.has_edge("fork-0", "b"));
        assert!(structured.has_edge("fork-0", "c"));
        assert!(structured.has_edge("b", "join-0"));
        assert!(structured.has_edge("c", "join-0"));
        assert!(structured.has_edge("join-0", "d"));
        assert_eq!(structured.entry_nodes(), vec!["a"]);
        assert_eq!(structured.exit_nodes(), vec!["d"]);
    }

    #[test]
    fn test_structure_keeps_chains_inside_branches() {
        // a -> (b -> c) and a -> d, all meeting at e
        let graph = graph_of(&[
            make_action("a", &[]),
            make_action("b", &["a"]),
            make_action("c", &["b"]),
            make_action("d", &["a"]),
            make_action("e", &["c", "d"]),
        ]);
        let mut counter = ForkCounter::new();
        let structured = structure_component(graph, &mut counter).unwrap();

        assert!(structured.has_edge("fork-0", "b"));
        assert!(structured.has_edge("b", "c"));
        assert!(structured.has_edge("c", "join-0"));
        assert!(structured.has_edge("d", "join-0"));
        assert!(structured.has_edge("join-0", "e"));
    }

    #[test]
    fn test_structure_never_drops_dependencies() {
        // b waits on a; c waits on both. a and x are roots.
        let graph = graph_of(&[
            make_action("a", &[]),
            make_action("x", &[]),
            make_action("b", &["a", "x"]),
            make_action("c", &["b", "x"]),
        ]);
        let mut counter = ForkCounter::new();
        let structured = structure_component(graph, &mut counter).unwrap();
        let order = structured.topological_order().unwrap();
        let pos = |n: &str| order.iter().position(|o| o == n).unwrap();

        assert!(pos("a") < pos("b"));
        assert!(pos("x") < pos("b"));
        assert!(pos("b") < pos("c"));
        assert_eq!(structured.entry_nodes(), vec!["fork-0"]);
        assert_eq!(structured.exit_nodes(), vec!["c"]);
    }
}
