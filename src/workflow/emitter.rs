// SPDX-License-Identifier: MIT

//! Oozie `workflow-app` markup emission
//!
//! Walks the structured control-flow graph in topological order and writes
//! one element per node. Ordinary actions route failures to the error-routing
//! node, the element right before `end`.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::action::{Action, ConfigValue, ControlType};
use super::graph::{ActionGraph, END};
use crate::error::{WoozieError, WorkflowError};

/// Namespace of the emitted `workflow-app` element
pub const WORKFLOW_NAMESPACE: &str = "uri:oozie:workflow:1.0";

const CONFIGURATION: &str = "configuration";

/// Serializes a structured control-flow graph
pub struct Emitter<'a> {
    graph: &'a ActionGraph,
    error_handler: Option<&'a str>,
    writer: Writer<Vec<u8>>,
}

impl<'a> Emitter<'a> {
    pub fn new(graph: &'a ActionGraph, error_handler: Option<&'a str>) -> Self {
        Self {
            graph,
            error_handler,
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    /// Emit the full document for workflow `name`
    pub fn emit(mut self, name: &str) -> Result<String, WoozieError> {
        let graph = self.graph;
        let order = graph
            .topological_order()
            .map_err(WorkflowError::CyclicDependency)?;
        let error_node = error_routing_node(&order)?;

        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        let mut root = BytesStart::new("workflow-app");
        root.push_attribute(("name", name));
        root.push_attribute(("xmlns", WORKFLOW_NAMESPACE));
        self.writer.write_event(Event::Start(root))?;

        for node_name in &order {
            let Some(node) = graph.node(node_name) else {
                continue;
            };
            match node.control_type() {
                Some(ControlType::Start) => {
                    let to = self.successor(node)?;
                    self.empty("start", &[("to", to)])?;
                }
                Some(ControlType::End) => self.empty("end", &[("name", node.name.as_str())])?,
                Some(ControlType::Fork) => self.fork(node)?,
                Some(ControlType::Join) => {
                    let to = self.successor(node)?;
                    self.empty("join", &[("name", node.name.as_str()), ("to", to)])?;
                }
                None => self.action(node, error_node)?,
            }
        }

        self.writer
            .write_event(Event::End(BytesEnd::new("workflow-app")))?;
        String::from_utf8(self.writer.into_inner()).map_err(|e| WoozieError::other(e.to_string()))
    }

    fn successor(&self, node: &Action) -> Result<&'a str, WorkflowError> {
        let graph: &'a ActionGraph = self.graph;
        graph
            .successors(&node.name)
            .next()
            .ok_or_else(|| WorkflowError::malformed(&node.name, "no outgoing transition"))
    }

    fn empty(&mut self, tag: &str, attributes: &[(&str, &str)]) -> Result<(), WoozieError> {
        let mut element = BytesStart::new(tag);
        for attribute in attributes {
            element.push_attribute(*attribute);
        }
        self.writer.write_event(Event::Empty(element))?;
        Ok(())
    }

    fn text(&mut self, tag: &str, text: &str) -> Result<(), WoozieError> {
        self.writer.write_event(Event::Start(BytesStart::new(tag)))?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        self.writer.write_event(Event::End(BytesEnd::new(tag)))?;
        Ok(())
    }

    fn fork(&mut self, node: &Action) -> Result<(), WoozieError> {
        let mut element = BytesStart::new("fork");
        element.push_attribute(("name", node.name.as_str()));
        self.writer.write_event(Event::Start(element))?;
        let graph = self.graph;
        for target in graph.successors(&node.name) {
            self.empty("path", &[("start", target)])?;
        }
        self.writer.write_event(Event::End(BytesEnd::new("fork")))?;
        Ok(())
    }

    fn action(&mut self, node: &Action, error_node: &str) -> Result<(), WoozieError> {
        let next = self.successor(node)?;
        let fields = node
            .config
            .as_ref()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| WorkflowError::malformed(&node.name, "no configuration payload"))?;

        let mut element = BytesStart::new("action");
        element.push_attribute(("name", node.name.as_str()));
        self.writer.write_event(Event::Start(element))?;

        let mut entries = fields.iter();
        if let Some((tag, attributes)) = entries.next() {
            let mut payload = BytesStart::new(tag.as_str());
            match attributes {
                ConfigValue::Null => {}
                ConfigValue::Map(map) => {
                    for (key, value) in map {
                        let value = value.as_scalar().ok_or_else(|| {
                            WorkflowError::malformed(
                                &node.name,
                                format!("attribute '{}' of <{}> is not a scalar", key, tag),
                            )
                        })?;
                        payload.push_attribute((key.as_str(), value));
                    }
                }
                _ => {
                    return Err(WorkflowError::malformed(
                        &node.name,
                        format!("first field '{}' must be an attribute mapping", tag),
                    )
                    .into())
                }
            }
            self.writer.write_event(Event::Start(payload))?;
            for (field, value) in entries {
                self.field(&node.name, field, value)?;
            }
            self.writer.write_event(Event::End(BytesEnd::new(tag.as_str())))?;
        }

        self.empty("ok", &[("to", next)])?;
        if self.error_handler != Some(node.name.as_str()) {
            // Without a handler the last action would otherwise fail into itself
            let target = if error_node == node.name { END } else { error_node };
            self.empty("error", &[("to", target)])?;
        }

        self.writer.write_event(Event::End(BytesEnd::new("action")))?;
        Ok(())
    }

    fn field(&mut self, action: &str, field: &str, value: &ConfigValue) -> Result<(), WoozieError> {
        match value {
            ConfigValue::List(items) => {
                for item in items {
                    self.text(field, item)?;
                }
            }
            ConfigValue::Map(map) if field == CONFIGURATION => {
                let properties = match map.get("properties") {
                    Some(ConfigValue::Map(properties)) => properties,
                    _ => map,
                };
                self.writer
                    .write_event(Event::Start(BytesStart::new(CONFIGURATION)))?;
                for (name, value) in properties {
                    let value = value.as_scalar().ok_or_else(|| {
                        WorkflowError::malformed(
                            action,
                            format!("property '{}' is not a scalar", name),
                        )
                    })?;
                    self.writer
                        .write_event(Event::Start(BytesStart::new("property")))?;
                    self.text("name", name)?;
                    self.text("value", value)?;
                    self.writer
                        .write_event(Event::End(BytesEnd::new("property")))?;
                }
                self.writer
                    .write_event(Event::End(BytesEnd::new(CONFIGURATION)))?;
            }
            ConfigValue::Map(_) => {
                return Err(WorkflowError::malformed(
                    action,
                    format!("nested mapping only allowed under '{}', found '{}'", CONFIGURATION, field),
                )
                .into())
            }
            ConfigValue::Scalar(text) => self.text(field, text)?,
            ConfigValue::Null => self.empty(field, &[])?,
        }
        Ok(())
    }
}

/// The node right before `end` in `order`
fn error_routing_node(order: &[String]) -> Result<&str, WorkflowError> {
    match order {
        [.., penultimate, last] if last == END => Ok(penultimate.as_str()),
        _ => Err(WorkflowError::AmbiguousBoundary {
            entries: order.first().cloned().into_iter().collect(),
            exits: order.last().cloned().into_iter().collect(),
        }),
    }
}

/// Emit the `workflow-app` document for a finalized control-flow graph
pub fn emit_workflow(
    name: &str,
    graph: &ActionGraph,
    error_handler: Option<&Action>,
) -> Result<String, WoozieError> {
    Emitter::new(graph, error_handler.map(|a| a.name.as_str())).emit(name)
}
