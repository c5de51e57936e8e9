// SPDX-License-Identifier: MIT

//! Fork/join synthesis and sequential splicing of structured segments

use super::types::ActionGraph;
use crate::error::WorkflowError;
use crate::workflow::action::{Action, ControlType};

/// Source of fork/join indices for one compilation run
#[derive(Debug, Default)]
pub struct ForkCounter {
    next: usize,
}

impl ForkCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_index(&mut self) -> usize {
        let index = self.next;
        self.next += 1;
        index
    }

    /// Number of fork/join pairs issued so far
    pub fn issued(&self) -> usize {
        self.next
    }
}

/// Unique `(entry, exit)` of a segment
pub fn boundary(graph: &ActionGraph, context: &str) -> Result<(String, String), WorkflowError> {
    let entry = single(graph.entry_nodes(), || format!("entry of {}", context))?;
    let exit = single(graph.exit_nodes(), || format!("exit of {}", context))?;
    Ok((entry, exit))
}

fn single(nodes: Vec<&str>, context: impl FnOnce() -> String) -> Result<String, WorkflowError> {
    match nodes.as_slice() {
        [node] => Ok(node.to_string()),
        _ => Err(WorkflowError::ambiguous(
            context(),
            nodes.iter().map(|n| n.to_string()).collect(),
        )),
    }
}

/// Wrap parallel branches with a fresh `fork-i`/`join-i` pair.
///
/// Each branch must have exactly one entry and one exit. The returned
/// segment enters at `fork-i` and exits at `join-i`.
pub fn synchronize(
    branches: Vec<ActionGraph>,
    counter: &mut ForkCounter,
) -> Result<ActionGraph, WorkflowError> {
    if branches.len() < 2 {
        return Err(WorkflowError::ambiguous(
            "fork/join bundle with fewer than two branches",
            branches
                .iter()
                .flat_map(|b| b.names().map(str::to_string))
                .collect(),
        ));
    }

    let wiring = branches
        .iter()
        .map(|branch| boundary(branch, "parallel branch"))
        .collect::<Result<Vec<_>, _>>()?;

    let index = counter.next_index();
    let fork = format!("fork-{}", index);
    let join = format!("join-{}", index);

    let mut segment = ActionGraph::new();
    segment.add_node(Action::control(ControlType::Fork, fork.as_str()));
    for branch in branches {
        segment.compose(branch);
    }
    segment.add_node(Action::control(ControlType::Join, join.as_str()));

    for (entry, exit) in &wiring {
        segment.add_edge(&fork, entry);
        segment.add_edge(exit, &join);
    }

    log::debug!("Synthesized {} / {} over {} branches", fork, join, wiring.len());
    Ok(segment)
}

/// Append `segment` after the current unique exit of `structured`
pub fn append_sequential(
    structured: &mut ActionGraph,
    segment: ActionGraph,
) -> Result<(), WorkflowError> {
    if structured.is_empty() {
        structured.compose(segment);
        return Ok(());
    }

    let exit = single(structured.exit_nodes(), || {
        "exit of the structured graph".to_string()
    })?;
    let entry = single(segment.entry_nodes(), || "entry of the next segment".to_string())?;

    structured.compose(segment);
    structured.add_edge(&exit, &entry);
    Ok(())
}
