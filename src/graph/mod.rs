//! The diagram aggregate.
//!
//! [`DiagramGraph`] owns every entity by identifier and is the only place
//! cross-references change, so every public mutation leaves the graph
//! satisfying these invariants:
//!
//! - sequence flow endpoints resolve to nodes, and each node's
//!   `incoming`/`outgoing` lists are exactly the flows targeting/leaving it
//! - process member sets only name existing nodes and flows, and every node
//!   and flow belongs to an existing process
//! - containers are sub-processes, boundary events attach to activities
//! - default flows leave the node that names them
//! - sequence flows and lane refs stay inside one process
//! - participant processes, message flow endpoints and lane refs resolve
//!
//! ## Design
//!
//! ```text
//! DiagramGraph
//! ├── nodes:          IndexMap<ElementId, FlowNode>
//! ├── sequence_flows: IndexMap<ElementId, SequenceFlow>
//! ├── processes:      IndexMap<ElementId, Process>
//! ├── participants:   IndexMap<ElementId, Participant>
//! ├── message_flows:  IndexMap<ElementId, MessageFlow>
//! └── diagram / plane / definitions attribute bags
//! ```
//!
//! Maps preserve insertion order so exports are deterministic; equality
//! between graphs ignores that order.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use tracing::trace;

use crate::base::{AttributeBag, ElementId};
use crate::error::{DiagramError, Result};
use crate::model::{
    FlowNode, LaneSet, MessageFlow, NodeKind, Participant, Process, SequenceFlow,
};
use crate::view::GraphView;

#[cfg(test)]
mod tests;

/// The canonical BPMN diagram: every entity keyed by its identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagramGraph {
    nodes: IndexMap<ElementId, FlowNode>,
    sequence_flows: IndexMap<ElementId, SequenceFlow>,
    processes: IndexMap<ElementId, Process>,
    participants: IndexMap<ElementId, Participant>,
    message_flows: IndexMap<ElementId, MessageFlow>,
    collaboration_id: Option<ElementId>,
    /// Attributes of the `collaboration` element other than its id.
    pub collaboration_attributes: AttributeBag,
    /// Attributes of `BPMNDiagram`.
    pub diagram_attributes: AttributeBag,
    /// Attributes of `BPMNPlane`.
    pub plane_attributes: AttributeBag,
    /// Attributes of the root `definitions` element.
    pub definitions_attributes: AttributeBag,
}

impl DiagramGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty graph with a named diagram and generated diagram/plane ids.
    pub fn with_diagram(name: impl Into<String>) -> Self {
        let mut graph = Self::new();
        graph
            .diagram_attributes
            .insert("id", ElementId::generate().as_str());
        graph.diagram_attributes.insert("name", name.into());
        graph
            .plane_attributes
            .insert("id", ElementId::generate().as_str());
        graph
    }

    /// Whether `id` names any entity in the graph (lanes and the collaboration included).
    pub fn contains_id(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
            || self.sequence_flows.contains_key(id)
            || self.processes.contains_key(id)
            || self.participants.contains_key(id)
            || self.message_flows.contains_key(id)
            || self.collaboration_id.as_ref().is_some_and(|c| c.as_str() == id)
            || self.lane_ids().any(|lane| lane.as_str() == id)
    }

    fn lane_ids(&self) -> impl Iterator<Item = &ElementId> {
        self.processes
            .values()
            .filter_map(|p| p.lane_set.as_ref())
            .flat_map(|set| set.all_lanes().into_iter().map(|lane| &lane.id))
    }

    fn ensure_unique(&self, id: &ElementId) -> Result<()> {
        if self.contains_id(id.as_str()) {
            return Err(DiagramError::DuplicateIdentifier(id.clone()));
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.processes.is_empty() && self.participants.is_empty()
    }

    // ========================================================================
    // PROCESSES
    // ========================================================================

    /// Add an empty process.
    pub fn add_process(&mut self, process: Process) -> Result<()> {
        self.ensure_unique(process.id())?;
        let mut process = process;
        process.node_ids.clear();
        process.flow_ids.clear();
        process.lane_set = None;
        trace!(id = %process.id(), "add process");
        self.processes.insert(process.id().clone(), process);
        Ok(())
    }

    /// Add a process with a generated id. The plane is pointed at it when it
    /// does not reference anything yet.
    pub fn create_process(&mut self, name: impl Into<String>) -> Result<ElementId> {
        let id = ElementId::generate();
        self.add_process(Process::new(id.clone()).with_name(name))?;
        if !self.plane_attributes.contains("bpmnElement") {
            self.plane_attributes.insert("bpmnElement", id.as_str());
        }
        Ok(id)
    }

    /// Remove a process with all its nodes and flows. Participants that
    /// referenced it become black-box pools.
    pub fn remove_process(&mut self, id: &str) -> Result<Process> {
        let member_nodes: Vec<ElementId> = self
            .processes
            .get(id)
            .ok_or_else(|| DiagramError::not_found("process", id))?
            .node_ids
            .iter()
            .cloned()
            .collect();
        for node in member_nodes {
            if self.nodes.contains_key(&node) {
                self.remove_node(node.as_str())?;
            }
        }
        for participant in self.participants.values_mut() {
            if participant.process_ref.as_ref().is_some_and(|p| p.as_str() == id) {
                participant.process_ref = None;
            }
        }
        let process = self
            .processes
            .shift_remove(id)
            .ok_or_else(|| DiagramError::not_found("process", id))?;
        trace!(id, "remove process");
        Ok(process)
    }

    /// Replace the lane set of a process. Lane refs must name nodes of that
    /// process and lane ids must be unused.
    pub fn set_lane_set(&mut self, process: &str, lane_set: Option<LaneSet>) -> Result<()> {
        let previous = self
            .processes
            .get_mut(process)
            .ok_or_else(|| DiagramError::not_found("process", process))?
            .lane_set
            .take();
        if let Err(err) = self.check_lane_set(process, lane_set.as_ref()) {
            if let Some(p) = self.processes.get_mut(process) {
                p.lane_set = previous;
            }
            return Err(err);
        }
        if let Some(p) = self.processes.get_mut(process) {
            p.lane_set = lane_set;
        }
        Ok(())
    }

    fn check_lane_set(&self, process: &str, lane_set: Option<&LaneSet>) -> Result<()> {
        let Some(lane_set) = lane_set else {
            return Ok(());
        };
        let mut seen = FxHashSet::default();
        for lane in lane_set.all_lanes() {
            if !seen.insert(lane.id.clone()) {
                return Err(DiagramError::DuplicateIdentifier(lane.id.clone()));
            }
            self.ensure_unique(&lane.id)?;
            if let Some(missing) = lane.flow_node_refs.iter().find(|node| {
                !self
                    .nodes
                    .get(*node)
                    .is_some_and(|n| n.process().is_some_and(|p| p.as_str() == process))
            }) {
                return Err(DiagramError::dangling(
                    missing.as_str(),
                    format!("lane {}", lane.id),
                ));
            }
        }
        Ok(())
    }

    // ========================================================================
    // FLOW NODES
    // ========================================================================

    /// Add a node to its process.
    ///
    /// A node without a process joins the only process in the graph.
    pub fn add_node(&mut self, node: FlowNode) -> Result<()> {
        let mut node = node;
        self.ensure_unique(node.id())?;
        let element = format!("{} {}", node.kind().tag(), node.id());

        if !node.details_match_kind() {
            return Err(DiagramError::unsupported(format!(
                "details do not match kind for {element}"
            )));
        }

        let process = match node.process.clone() {
            Some(process) => process,
            None if self.processes.len() == 1 => self
                .processes
                .keys()
                .next()
                .cloned()
                .ok_or_else(|| DiagramError::missing_attribute(element.clone(), "process"))?,
            None => return Err(DiagramError::missing_attribute(element, "process")),
        };
        if !self.processes.contains_key(&process) {
            return Err(DiagramError::dangling(process.as_str(), element));
        }

        if let Some(container) = &node.container {
            match self.nodes.get(container) {
                Some(host)
                    if host.kind().is_sub_process()
                        && host.process.as_ref() == Some(&process) => {}
                _ => return Err(DiagramError::dangling(container.as_str(), element)),
            }
        }

        if let Some(host) = node.attached_to() {
            match self.nodes.get(host) {
                Some(activity) if activity.kind().is_activity() => {}
                _ => return Err(DiagramError::dangling(host.as_str(), element)),
            }
        }

        if let Some(flow) = node.default_flow() {
            return Err(DiagramError::dangling(flow.as_str(), element));
        }

        node.process = Some(process.clone());
        node.incoming.clear();
        node.outgoing.clear();

        trace!(id = %node.id(), kind = node.kind().tag(), "add node");
        if let Some(p) = self.processes.get_mut(&process) {
            p.node_ids.insert(node.id().clone());
        }
        self.nodes.insert(node.id().clone(), node);
        Ok(())
    }

    /// Remove a node and everything that depends on it: its sequence flows,
    /// nodes it contains, boundary events attached to it, message flows
    /// touching it, lane references and default-flow references.
    pub fn remove_node(&mut self, id: &str) -> Result<FlowNode> {
        let node = self
            .nodes
            .get(id)
            .ok_or_else(|| DiagramError::not_found("node", id))?;
        let process = node.process.clone();
        let mut flows: Vec<ElementId> = node.incoming.clone();
        flows.extend(node.outgoing.iter().cloned());

        let dependents: Vec<ElementId> = self
            .nodes
            .values()
            .filter(|n| {
                n.container.as_ref().is_some_and(|c| c.as_str() == id)
                    || n.attached_to().is_some_and(|a| a.as_str() == id)
            })
            .map(|n| n.id().clone())
            .collect();
        for dependent in dependents {
            if self.nodes.contains_key(&dependent) {
                self.remove_node(dependent.as_str())?;
            }
        }

        for flow in flows {
            if self.sequence_flows.contains_key(&flow) {
                self.remove_sequence_flow(flow.as_str())?;
            }
        }

        self.message_flows
            .retain(|_, mf| mf.source().as_str() != id && mf.target().as_str() != id);

        if let Some(p) = process.as_ref().and_then(|p| self.processes.get_mut(p)) {
            p.node_ids.shift_remove(id);
            if let Some(lane_set) = &mut p.lane_set {
                lane_set.for_each_lane_mut(&mut |lane| {
                    lane.flow_node_refs.retain(|r| r.as_str() != id)
                });
            }
        }

        let node = self
            .nodes
            .shift_remove(id)
            .ok_or_else(|| DiagramError::not_found("node", id))?;
        trace!(id, "remove node");
        Ok(node)
    }

    /// Set the default flow of an activity or an exclusive, inclusive or
    /// complex gateway. The flow must leave that node.
    pub fn set_default_flow(&mut self, node: &str, flow: &str) -> Result<()> {
        let owner = self
            .nodes
            .get(node)
            .ok_or_else(|| DiagramError::not_found("node", node))?;
        if !owner.kind().supports_default_flow() {
            return Err(DiagramError::unsupported(format!(
                "default flow on {}",
                owner.kind()
            )));
        }
        let element = format!("default of {} {}", owner.kind().tag(), node);
        let flow_id = match self.sequence_flows.get(flow) {
            Some(f) if f.source().as_str() == node => f.id().clone(),
            _ => return Err(DiagramError::dangling(flow, element)),
        };
        if let Some(owner) = self.nodes.get_mut(node) {
            owner.set_default_flow_ref(Some(flow_id));
        }
        Ok(())
    }

    pub fn clear_default_flow(&mut self, node: &str) -> Result<()> {
        self.nodes
            .get_mut(node)
            .ok_or_else(|| DiagramError::not_found("node", node))?
            .set_default_flow_ref(None);
        Ok(())
    }

    pub fn rename_node(&mut self, id: &str, name: Option<String>) -> Result<()> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| DiagramError::not_found("node", id))?
            .name = name;
        Ok(())
    }

    pub fn node_attributes_mut(&mut self, id: &str) -> Result<&mut AttributeBag> {
        self.nodes
            .get_mut(id)
            .map(|node| &mut node.attributes)
            .ok_or_else(|| DiagramError::not_found("node", id))
    }

    // ========================================================================
    // SEQUENCE FLOWS
    // ========================================================================

    /// Add a sequence flow and link it into both endpoints.
    ///
    /// Both endpoints must belong to the same process. Without an explicit
    /// process the flow joins theirs; without a container it inherits one
    /// both endpoints share.
    pub fn add_sequence_flow(&mut self, flow: SequenceFlow) -> Result<()> {
        let mut flow = flow;
        self.ensure_unique(flow.id())?;
        let element = format!("sequenceFlow {}", flow.id());

        let source = self
            .nodes
            .get(flow.source())
            .ok_or_else(|| DiagramError::dangling(flow.source().as_str(), element.clone()))?;
        let target = self
            .nodes
            .get(flow.target())
            .ok_or_else(|| DiagramError::dangling(flow.target().as_str(), element.clone()))?;

        let process = source
            .process
            .clone()
            .ok_or_else(|| DiagramError::missing_attribute(element.clone(), "process"))?;
        if target.process.as_ref() != Some(&process) {
            return Err(DiagramError::dangling(flow.target().as_str(), element));
        }
        if let Some(explicit) = flow.process() {
            if *explicit != process {
                return Err(DiagramError::dangling(explicit.as_str(), element));
            }
        }
        if !self.processes.contains_key(&process) {
            return Err(DiagramError::dangling(process.as_str(), element));
        }

        match &flow.container {
            Some(container) => {
                let valid = self.nodes.get(container).is_some_and(|host| {
                    host.kind().is_sub_process() && host.process.as_ref() == Some(&process)
                });
                if !valid {
                    return Err(DiagramError::dangling(container.as_str(), element));
                }
            }
            None if source.container == target.container => {
                flow.container = source.container.clone();
            }
            None => {}
        }
        flow.process = Some(process.clone());

        let id = flow.id().clone();
        if let Some(source) = self.nodes.get_mut(flow.source()) {
            source.outgoing.push(id.clone());
        }
        if let Some(target) = self.nodes.get_mut(flow.target()) {
            target.incoming.push(id.clone());
        }
        if let Some(p) = self.processes.get_mut(&process) {
            p.flow_ids.insert(id.clone());
        }
        trace!(id = %id, source = %flow.source(), target = %flow.target(), "add sequence flow");
        self.sequence_flows.insert(id, flow);
        Ok(())
    }

    /// Remove a sequence flow, unlinking it from both endpoints and clearing
    /// a default-flow reference to it.
    pub fn remove_sequence_flow(&mut self, id: &str) -> Result<SequenceFlow> {
        let flow = self
            .sequence_flows
            .shift_remove(id)
            .ok_or_else(|| DiagramError::not_found("sequence flow", id))?;

        if let Some(source) = self.nodes.get_mut(flow.source()) {
            source.outgoing.retain(|f| f.as_str() != id);
            if source.default_flow().is_some_and(|d| d.as_str() == id) {
                source.set_default_flow_ref(None);
            }
        }
        if let Some(target) = self.nodes.get_mut(flow.target()) {
            target.incoming.retain(|f| f.as_str() != id);
        }
        if let Some(p) = flow.process().and_then(|p| self.processes.get_mut(p)) {
            p.flow_ids.shift_remove(id);
        }
        trace!(id, "remove sequence flow");
        Ok(flow)
    }

    pub fn sequence_flow_attributes_mut(&mut self, id: &str) -> Result<&mut AttributeBag> {
        self.sequence_flows
            .get_mut(id)
            .map(|flow| &mut flow.attributes)
            .ok_or_else(|| DiagramError::not_found("sequence flow", id))
    }

    // ========================================================================
    // COLLABORATION
    // ========================================================================

    /// Add a pool. A generated collaboration id is assigned if none exists.
    pub fn add_participant(&mut self, participant: Participant) -> Result<()> {
        self.ensure_unique(participant.id())?;
        if let Some(process) = participant.process_ref() {
            if !self.processes.contains_key(process) {
                return Err(DiagramError::dangling(
                    process.as_str(),
                    format!("participant {}", participant.id()),
                ));
            }
        }
        self.ensure_collaboration();
        trace!(id = %participant.id(), "add participant");
        self.participants
            .insert(participant.id().clone(), participant);
        Ok(())
    }

    /// Remove a pool and the message flows touching it.
    pub fn remove_participant(&mut self, id: &str) -> Result<Participant> {
        let participant = self
            .participants
            .shift_remove(id)
            .ok_or_else(|| DiagramError::not_found("participant", id))?;
        self.message_flows
            .retain(|_, mf| mf.source().as_str() != id && mf.target().as_str() != id);
        trace!(id, "remove participant");
        Ok(participant)
    }

    /// Add a message flow between nodes and/or participants.
    pub fn add_message_flow(&mut self, flow: MessageFlow) -> Result<()> {
        self.ensure_unique(flow.id())?;
        for end in [flow.source(), flow.target()] {
            if !self.nodes.contains_key(end) && !self.participants.contains_key(end) {
                return Err(DiagramError::dangling(
                    end.as_str(),
                    format!("messageFlow {}", flow.id()),
                ));
            }
        }
        self.ensure_collaboration();
        trace!(id = %flow.id(), "add message flow");
        self.message_flows.insert(flow.id().clone(), flow);
        Ok(())
    }

    pub fn remove_message_flow(&mut self, id: &str) -> Result<MessageFlow> {
        self.message_flows
            .shift_remove(id)
            .ok_or_else(|| DiagramError::not_found("message flow", id))
    }

    /// Set or clear the `collaboration` id.
    pub fn set_collaboration_id(&mut self, id: Option<ElementId>) -> Result<()> {
        let current = self.collaboration_id.take();
        if let Some(id) = &id {
            if let Err(err) = self.ensure_unique(id) {
                self.collaboration_id = current;
                return Err(err);
            }
        }
        self.collaboration_id = id;
        Ok(())
    }

    fn ensure_collaboration(&mut self) {
        if self.collaboration_id.is_none() {
            self.collaboration_id = Some(ElementId::generate());
        }
    }

    // ========================================================================
    // GENERIC ACCESS
    // ========================================================================

    /// Attribute bag of any entity by id: node, flow, process, participant,
    /// message flow or lane.
    pub fn attributes_mut(&mut self, id: &str) -> Option<&mut AttributeBag> {
        if let Some(node) = self.nodes.get_mut(id) {
            return Some(&mut node.attributes);
        }
        if let Some(flow) = self.sequence_flows.get_mut(id) {
            return Some(&mut flow.attributes);
        }
        if let Some(participant) = self.participants.get_mut(id) {
            return Some(&mut participant.attributes);
        }
        if let Some(flow) = self.message_flows.get_mut(id) {
            return Some(&mut flow.attributes);
        }
        if self.processes.contains_key(id) {
            return self.processes.get_mut(id).map(|p| &mut p.attributes);
        }
        self.processes
            .values_mut()
            .filter_map(|p| p.lane_set.as_mut())
            .find_map(|set| set.lane_mut(id))
            .map(|lane| &mut lane.attributes)
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &FlowNode> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes_by_kind(&self, kind: NodeKind) -> impl Iterator<Item = &FlowNode> {
        self.nodes.values().filter(move |n| n.kind() == kind)
    }

    /// Nodes of a process in membership order.
    pub fn nodes_in_process<'a>(&'a self, process: &str) -> impl Iterator<Item = &'a FlowNode> {
        self.processes
            .get(process)
            .into_iter()
            .flat_map(|p| p.node_ids.iter())
            .filter_map(|id| self.nodes.get(id))
    }

    /// Nodes directly inside a sub-process.
    pub fn children_of<'a>(&'a self, container: &'a str) -> impl Iterator<Item = &'a FlowNode> {
        self.nodes
            .values()
            .filter(move |n| n.container().is_some_and(|c| c.as_str() == container))
    }

    pub fn sequence_flow(&self, id: &str) -> Option<&SequenceFlow> {
        self.sequence_flows.get(id)
    }

    pub fn sequence_flows(&self) -> impl Iterator<Item = &SequenceFlow> {
        self.sequence_flows.values()
    }

    pub fn sequence_flow_count(&self) -> usize {
        self.sequence_flows.len()
    }

    /// Sequence flows of a process in membership order.
    pub fn flows_in_process<'a>(&'a self, process: &str) -> impl Iterator<Item = &'a SequenceFlow> {
        self.processes
            .get(process)
            .into_iter()
            .flat_map(|p| p.flow_ids.iter())
            .filter_map(|id| self.sequence_flows.get(id))
    }

    pub fn process(&self, id: &str) -> Option<&Process> {
        self.processes.get(id)
    }

    pub fn processes(&self) -> impl Iterator<Item = &Process> {
        self.processes.values()
    }

    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.participants.get(id)
    }

    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.participants.values()
    }

    pub fn message_flow(&self, id: &str) -> Option<&MessageFlow> {
        self.message_flows.get(id)
    }

    pub fn message_flows(&self) -> impl Iterator<Item = &MessageFlow> {
        self.message_flows.values()
    }

    pub fn collaboration_id(&self) -> Option<&ElementId> {
        self.collaboration_id.as_ref()
    }

    /// Whether a `collaboration` element should be written.
    pub fn has_collaboration(&self) -> bool {
        self.collaboration_id.is_some()
            || !self.participants.is_empty()
            || !self.message_flows.is_empty()
    }

    /// A point-in-time copy of the node/edge structure.
    pub fn graph_view(&self) -> GraphView {
        GraphView::from_graph(self)
    }

    /// Check every graph invariant. Public mutations never break them, so
    /// this is mostly useful in tests.
    pub fn validate(&self) -> Result<()> {
        for flow in self.sequence_flows.values() {
            let element = format!("sequenceFlow {}", flow.id());
            let source = self
                .nodes
                .get(flow.source())
                .ok_or_else(|| DiagramError::dangling(flow.source().as_str(), element.clone()))?;
            let target = self
                .nodes
                .get(flow.target())
                .ok_or_else(|| DiagramError::dangling(flow.target().as_str(), element.clone()))?;
            if !source.outgoing.contains(flow.id()) || !target.incoming.contains(flow.id()) {
                return Err(DiagramError::dangling(flow.id().as_str(), "adjacency"));
            }
            if source.process() != flow.process() || target.process() != flow.process() {
                return Err(DiagramError::dangling(flow.id().as_str(), "flow process"));
            }
            let in_process = flow
                .process()
                .and_then(|p| self.processes.get(p))
                .is_some_and(|p| p.flow_ids.contains(flow.id()));
            if !in_process {
                return Err(DiagramError::dangling(flow.id().as_str(), "process flows"));
            }
        }

        for node in self.nodes.values() {
            let element = format!("{} {}", node.kind().tag(), node.id());
            for (list, end) in [(&node.incoming, false), (&node.outgoing, true)] {
                for flow_id in list {
                    let flow = self
                        .sequence_flows
                        .get(flow_id)
                        .ok_or_else(|| DiagramError::dangling(flow_id.as_str(), element.clone()))?;
                    let endpoint = if end { flow.source() } else { flow.target() };
                    if endpoint != node.id() {
                        return Err(DiagramError::dangling(flow_id.as_str(), element.clone()));
                    }
                }
            }
            let in_process = node
                .process()
                .and_then(|p| self.processes.get(p))
                .is_some_and(|p| p.node_ids.contains(node.id()));
            if !in_process {
                return Err(DiagramError::dangling(node.id().as_str(), "process nodes"));
            }
            if let Some(container) = node.container() {
                if !self.nodes.get(container).is_some_and(|c| c.kind().is_sub_process()) {
                    return Err(DiagramError::dangling(container.as_str(), element));
                }
            }
            if let Some(host) = node.attached_to() {
                if !self.nodes.get(host).is_some_and(|h| h.kind().is_activity()) {
                    return Err(DiagramError::dangling(host.as_str(), element));
                }
            }
            if let Some(default) = node.default_flow() {
                if !node.outgoing.contains(default) {
                    return Err(DiagramError::dangling(default.as_str(), element));
                }
            }
        }

        for process in self.processes.values() {
            let element = format!("process {}", process.id());
            if let Some(missing) = process
                .node_ids
                .iter()
                .find(|id| !self.nodes.contains_key(*id))
            {
                return Err(DiagramError::dangling(missing.as_str(), element));
            }
            if let Some(missing) = process
                .flow_ids
                .iter()
                .find(|id| !self.sequence_flows.contains_key(*id))
            {
                return Err(DiagramError::dangling(missing.as_str(), element));
            }
            if let Some(lane_set) = &process.lane_set {
                for lane in lane_set.all_lanes() {
                    if let Some(missing) = lane.flow_node_refs.iter().find(|id| {
                        !self
                            .nodes
                            .get(*id)
                            .is_some_and(|n| n.process() == Some(process.id()))
                    }) {
                        return Err(DiagramError::dangling(
                            missing.as_str(),
                            format!("lane {}", lane.id),
                        ));
                    }
                }
            }
        }

        for participant in self.participants.values() {
            if let Some(process) = participant.process_ref() {
                if !self.processes.contains_key(process) {
                    return Err(DiagramError::dangling(
                        process.as_str(),
                        format!("participant {}", participant.id()),
                    ));
                }
            }
        }

        for flow in self.message_flows.values() {
            for end in [flow.source(), flow.target()] {
                if !self.nodes.contains_key(end) && !self.participants.contains_key(end) {
                    return Err(DiagramError::dangling(
                        end.as_str(),
                        format!("messageFlow {}", flow.id()),
                    ));
                }
            }
        }
        Ok(())
    }
}
