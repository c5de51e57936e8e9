// SPDX-License-Identifier: MIT

//! Adjacency-structure graph over actions
//!
//! Nodes are kept in an arena keyed by action name, with ordered successor
//! and predecessor sets per node. Every iteration follows insertion order so
//! that each pipeline stage is deterministic.

use indexmap::{IndexMap, IndexSet};
use std::collections::{HashSet, VecDeque};

use crate::workflow::action::Action;

/// Directed graph keyed by action name
#[derive(Debug, Clone, Default)]
pub struct ActionGraph {
    nodes: IndexMap<String, Action>,
    successors: IndexMap<String, IndexSet<String>>,
    predecessors: IndexMap<String, IndexSet<String>>,
}

impl ActionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. An existing node with the same name is kept.
    pub fn add_node(&mut self, action: Action) {
        if self.nodes.contains_key(&action.name) {
            return;
        }
        self.successors.insert(action.name.clone(), IndexSet::new());
        self.predecessors.insert(action.name.clone(), IndexSet::new());
        self.nodes.insert(action.name.clone(), action);
    }

    /// Add an edge between two existing nodes. Returns false if either is unknown.
    pub fn add_edge(&mut self, from: &str, to: &str) -> bool {
        if !self.contains(from) || !self.contains(to) {
            return false;
        }
        if let Some(succ) = self.successors.get_mut(from) {
            succ.insert(to.to_string());
        }
        if let Some(pred) = self.predecessors.get_mut(to) {
            pred.insert(from.to_string());
        }
        true
    }

    /// Remove a node together with every edge touching it
    pub fn remove_node(&mut self, name: &str) -> Option<Action> {
        let action = self.nodes.shift_remove(name)?;
        for succ in self.successors.shift_remove(name).unwrap_or_default() {
            if let Some(pred) = self.predecessors.get_mut(&succ) {
                pred.shift_remove(name);
            }
        }
        for pred in self.predecessors.shift_remove(name).unwrap_or_default() {
            if let Some(succ) = self.successors.get_mut(&pred) {
                succ.shift_remove(name);
            }
        }
        Some(action)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn node(&self, name: &str) -> Option<&Action> {
        self.nodes.get(name)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Action> {
        self.nodes.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.successors.values().map(IndexSet::len).sum()
    }

    /// All edges as `(from, to)` pairs, in insertion order
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.successors
            .iter()
            .flat_map(|(from, succ)| succ.iter().map(move |to| (from.as_str(), to.as_str())))
    }

    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        self.successors
            .get(from)
            .is_some_and(|succ| succ.contains(to))
    }

    pub fn successors(&self, name: &str) -> impl Iterator<Item = &str> {
        self.successors
            .get(name)
            .into_iter()
            .flat_map(|s| s.iter().map(String::as_str))
    }

    pub fn predecessors(&self, name: &str) -> impl Iterator<Item = &str> {
        self.predecessors
            .get(name)
            .into_iter()
            .flat_map(|s| s.iter().map(String::as_str))
    }

    pub fn in_degree(&self, name: &str) -> usize {
        self.predecessors.get(name).map_or(0, IndexSet::len)
    }

    pub fn out_degree(&self, name: &str) -> usize {
        self.successors.get(name).map_or(0, IndexSet::len)
    }

    /// Nodes with no incoming edge
    pub fn entry_nodes(&self) -> Vec<&str> {
        self.names().filter(|n| self.in_degree(n) == 0).collect()
    }

    /// Nodes with no outgoing edge
    pub fn exit_nodes(&self) -> Vec<&str> {
        self.names().filter(|n| self.out_degree(n) == 0).collect()
    }

    /// Copy of the graph restricted to `members`, keeping node order
    pub fn subgraph(&self, members: &HashSet<&str>) -> ActionGraph {
        let mut sub = ActionGraph::new();
        for action in self.nodes().filter(|a| members.contains(a.name.as_str())) {
            sub.add_node(action.clone());
        }
        for (from, to) in self.edges() {
            if members.contains(from) && members.contains(to) {
                sub.add_edge(from, to);
            }
        }
        sub
    }

    /// Merge another graph's nodes and edges into this one
    pub fn compose(&mut self, other: ActionGraph) {
        let edges: Vec<(String, String)> = other
            .edges()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();
        for (_, action) in other.nodes {
            self.add_node(action);
        }
        for (from, to) in edges {
            self.add_edge(&from, &to);
        }
    }

    /// Kahn's algorithm with a FIFO queue seeded in insertion order.
    ///
    /// On a cycle, returns the names that were never released.
    pub fn topological_order(&self) -> Result<Vec<String>, Vec<String>> {
        let mut remaining: IndexMap<&str, usize> =
            self.names().map(|n| (n, self.in_degree(n))).collect();
        let mut queue: VecDeque<&str> = remaining
            .iter()
            .filter(|(_, deg)| **deg == 0)
            .map(|(n, _)| *n)
            .collect();
        let mut order = Vec::with_capacity(self.len());

        while let Some(name) = queue.pop_front() {
            order.push(name.to_string());
            for succ in self.successors(name) {
                if let Some(deg) = remaining.get_mut(succ) {
                    *deg -= 1;
                    if *deg == 0 {
                        queue.push_back(succ);
                    }
                }
            }
        }

        if order.len() == self.len() {
            Ok(order)
        } else {
            let released: HashSet<&str> = order.iter().map(String::as_str).collect();
            Err(self
                .names()
                .filter(|n| !released.contains(n))
                .map(str::to_string)
                .collect())
        }
    }

    /// Weakly-connected components, ordered by their first node
    pub fn weakly_connected_components(&self) -> Vec<ActionGraph> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut components = Vec::new();

        for start in self.names() {
            if !seen.insert(start) {
                continue;
            }
            let mut members: HashSet<&str> = HashSet::from([start]);
            let mut queue = VecDeque::from([start]);
            while let Some(current) = queue.pop_front() {
                for next in self.successors(current).chain(self.predecessors(current)) {
                    if seen.insert(next) {
                        members.insert(next);
                        queue.push_back(next);
                    }
                }
            }
            components.push(self.subgraph(&members));
        }

        components
    }
}
