// SPDX-License-Identifier: MIT

//! Composition of component sub-graphs and start/end/error wiring

use super::sync::{synchronize, ForkCounter};
use super::types::ActionGraph;
use crate::error::WorkflowError;
use crate::workflow::action::{Action, ControlType};

pub const START: &str = "start";
pub const END: &str = "end";

/// Compose structured components into the final control-flow graph.
///
/// Several components run as parallel top-level branches under one
/// fork/join pair. The error handler, when present, is spliced after the
/// composed exit so it always sits right before `end`.
pub fn finalize(
    components: Vec<ActionGraph>,
    error_handler: Option<&Action>,
    counter: &mut ForkCounter,
) -> Result<ActionGraph, WorkflowError> {
    let mut graph = if components.len() > 1 {
        synchronize(components, counter)?
    } else {
        components.into_iter().next().unwrap_or_default()
    };

    if let Some(handler) = error_handler {
        attach_error_handler(&mut graph, handler)?;
    }
    attach_start_end(&mut graph)?;
    Ok(graph)
}

fn attach_error_handler(graph: &mut ActionGraph, handler: &Action) -> Result<(), WorkflowError> {
    let exits: Vec<String> = graph.exit_nodes().into_iter().map(str::to_string).collect();
    if exits.len() != 1 {
        return Err(WorkflowError::MultipleErrorTargets(exits));
    }
    let exit = &exits[0];

    graph.add_node(handler.clone());
    graph.add_edge(exit, &handler.name);
    log::debug!("Error handler '{}' follows '{}'", handler.name, exit);
    Ok(())
}

fn attach_start_end(graph: &mut ActionGraph) -> Result<(), WorkflowError> {
    let entries: Vec<String> = graph.entry_nodes().into_iter().map(str::to_string).collect();
    let exits: Vec<String> = graph.exit_nodes().into_iter().map(str::to_string).collect();
    if entries.len() != 1 || exits.len() != 1 {
        return Err(WorkflowError::AmbiguousBoundary { entries, exits });
    }
    let (entry, exit) = (&entries[0], &exits[0]);

    graph.add_node(Action::control(ControlType::Start, START));
    graph.add_node(Action::control(ControlType::End, END));
    graph.add_edge(START, entry);
    graph.add_edge(exit, END);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(name: &str) -> ActionGraph {
        let mut graph = ActionGraph::new();
        graph.add_node(Action::new(name, "shell"));
        graph
    }

    #[test]
    fn test_single_component_gets_start_and_end() {
        let mut counter = ForkCounter::new();
        let graph = finalize(vec![single("a")], None, &mut counter).unwrap();

        assert!(graph.has_edge(START, "a"));
        assert!(graph.has_edge("a", END));
        assert_eq!(graph.entry_nodes(), vec![START]);
        assert_eq!(graph.exit_nodes(), vec![END]);
    }

    #[test]
    fn test_components_run_in_parallel() {
        let mut counter = ForkCounter::new();
        let graph = finalize(vec![single("a"), single("b")], None, &mut counter).unwrap();

        assert!(graph.has_edge(START, "fork-0"));
        assert!(graph.has_edge("fork-0", "a"));
        assert!(graph.has_edge("fork-0", "b"));
        assert!(graph.has_edge("join-0", END));
    }

    #[test]
    fn test_error_handler_precedes_end() {
        let mut counter = ForkCounter::new();
        let handler = Action::new("error_handler", "email");
        let graph = finalize(vec![single("a")], Some(&handler), &mut counter).unwrap();

        assert!(graph.has_edge("a", "error_handler"));
        assert!(graph.has_edge("error_handler", END));
        assert_eq!(graph.predecessors(END).collect::<Vec<_>>(), vec!["error_handler"]);
    }

    #[test]
    fn test_error_handler_needs_single_exit() {
        let mut counter = ForkCounter::new();
        let mut split = single("a");
        split.add_node(Action::new("b", "shell"));
        let handler = Action::new("error_handler", "email");

        let err = finalize(vec![split], Some(&handler), &mut counter).unwrap_err();
        assert_eq!(
            err,
            WorkflowError::MultipleErrorTargets(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_empty_workflow_has_no_boundary() {
        let mut counter = ForkCounter::new();
        let err = finalize(vec![], None, &mut counter).unwrap_err();
        assert_eq!(
            err,
            WorkflowError::AmbiguousBoundary {
                entries: vec![],
                exits: vec![]
            }
        );
    }
}
