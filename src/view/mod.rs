//! Disposable node/edge snapshot of a diagram.
//!
//! [`GraphView`] is built from owned copies of ids and labels, so layout,
//! rendering or graph-algorithm code can reshape it freely without touching
//! the [`DiagramGraph`] it came from.

use std::fmt;

use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;

use crate::graph::DiagramGraph;
use crate::model::NodeKind;

/// A flow node in the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewNode {
    pub id: String,
    /// Node name, or the id for unnamed nodes.
    pub label: String,
    pub kind: NodeKind,
}

impl fmt::Display for ViewNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// A sequence flow in the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewEdge {
    pub id: String,
    /// Flow name, empty when unnamed.
    pub label: String,
}

impl fmt::Display for ViewEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Directed graph of flow nodes and sequence flows.
#[derive(Debug, Clone, Default)]
pub struct GraphView {
    graph: DiGraph<ViewNode, ViewEdge>,
    node_id_map: FxHashMap<String, NodeIndex>,
}

impl GraphView {
    /// Copy the node/edge structure of `diagram`.
    pub fn from_graph(diagram: &DiagramGraph) -> Self {
        let mut view = Self::default();
        for node in diagram.nodes() {
            let idx = view.graph.add_node(ViewNode {
                id: node.id().to_string(),
                label: node.label().to_string(),
                kind: node.kind(),
            });
            view.node_id_map.insert(node.id().to_string(), idx);
        }
        for flow in diagram.sequence_flows() {
            let (Some(&source), Some(&target)) = (
                view.node_id_map.get(flow.source().as_str()),
                view.node_id_map.get(flow.target().as_str()),
            ) else {
                continue;
            };
            view.graph.add_edge(
                source,
                target,
                ViewEdge {
                    id: flow.id().to_string(),
                    label: flow.name.clone().unwrap_or_default(),
                },
            );
        }
        view
    }

    pub fn graph(&self) -> &DiGraph<ViewNode, ViewEdge> {
        &self.graph
    }

    /// Mutable access to the underlying graph. Use [`GraphView::remove_node`]
    /// to drop nodes so the id index stays valid.
    pub fn graph_mut(&mut self) -> &mut DiGraph<ViewNode, ViewEdge> {
        &mut self.graph
    }

    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_id_map.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&ViewNode> {
        self.node_index(id).and_then(|idx| self.graph.node_weight(idx))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Change a node's label. Returns `false` if the id is unknown.
    pub fn relabel(&mut self, id: &str, label: impl Into<String>) -> bool {
        match self
            .node_index(id)
            .and_then(|idx| self.graph.node_weight_mut(idx))
        {
            Some(node) => {
                node.label = label.into();
                true
            }
            None => false,
        }
    }

    /// Remove a node and its edges.
    pub fn remove_node(&mut self, id: &str) -> Option<ViewNode> {
        let idx = self.node_id_map.remove(id)?;
        let removed = self.graph.remove_node(idx)?;
        // petgraph moves the last node into the freed slot.
        if let Some(moved) = self.graph.node_weight(idx) {
            self.node_id_map.insert(moved.id.clone(), idx);
        }
        Some(removed)
    }

    /// Ids of the direct successors of a node.
    pub fn successors(&self, id: &str) -> Vec<&str> {
        self.node_index(id)
            .map(|idx| {
                self.graph
                    .neighbors(idx)
                    .map(|n| self.graph[n].id.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Render as Graphviz DOT.
    pub fn to_dot(&self) -> String {
        format!("{}", Dot::new(&self.graph))
    }
}
