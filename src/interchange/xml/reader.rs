//! BPMN XML reader.
//!
//! Works in passes over the element tree so forward references resolve:
//! nodes of every process first (boundary events after their hosts), then
//! sequence flows, default flows and lanes, then the collaboration, then the
//! diagram interchange section.

use tracing::{debug, warn};

use super::namespace;
use super::tree::{self, XmlElement};
use crate::base::{AttributeBag, ElementId, di};
use crate::error::{DiagramError, Result};
use crate::graph::DiagramGraph;
use crate::interchange::options::{ImportOptions, ImportResult, ImportWarning};
use crate::model::{
    ConditionExpression, DefinitionChild, EventDefinition, EventDefinitionType, EventTrigger,
    FlowNode, Lane, LaneSet, MessageFlow, NodeDetails, NodeKind, Participant, Process,
    SequenceFlow,
};

/// Adjacency a node declared through `incoming`/`outgoing` children.
struct DeclaredAdjacency {
    node: ElementId,
    incoming: Vec<String>,
    outgoing: Vec<String>,
}

pub(super) struct BpmnReader<'o> {
    options: &'o ImportOptions,
    graph: DiagramGraph,
    warnings: Vec<ImportWarning>,
    boundary_events: Vec<FlowNode>,
    flows: Vec<SequenceFlow>,
    defaults: Vec<(ElementId, String)>,
    lanes: Vec<(ElementId, LaneSet)>,
    declared: Vec<DeclaredAdjacency>,
}

impl<'o> BpmnReader<'o> {
    pub fn new(options: &'o ImportOptions) -> Self {
        Self {
            options,
            graph: DiagramGraph::new(),
            warnings: Vec::new(),
            boundary_events: Vec::new(),
            flows: Vec::new(),
            defaults: Vec::new(),
            lanes: Vec::new(),
            declared: Vec::new(),
        }
    }

    pub fn read(mut self, input: &[u8]) -> Result<ImportResult> {
        let root = tree::parse(input)?;
        if root.local != "definitions" {
            return Err(DiagramError::malformed(format!(
                "expected <definitions> root, found <{}>",
                root.name
            )));
        }
        self.graph.definitions_attributes = definitions_bag(&root);

        for process in root.children_named("process") {
            self.read_process(process)?;
        }
        self.resolve_boundary_events()?;
        self.resolve_flows()?;
        self.check_declared_adjacency();

        let mut collaborations = root.children_named("collaboration");
        if let Some(collaboration) = collaborations.next() {
            self.read_collaboration(collaboration)?;
        }
        for extra in collaborations {
            self.warn(extra.describe(), "only the first collaboration is read");
        }

        let mut diagrams = root.children_named("BPMNDiagram");
        if let Some(diagram) = diagrams.next() {
            self.read_diagram(diagram)?;
        }
        for extra in diagrams {
            self.warn(extra.describe(), "only the first diagram is read");
        }

        for child in &root.children {
            if !matches!(
                child.local.as_str(),
                "process" | "collaboration" | "BPMNDiagram"
            ) {
                self.warn(child.describe(), "unsupported element skipped");
            }
        }

        debug!(
            nodes = self.graph.node_count(),
            flows = self.graph.sequence_flow_count(),
            warnings = self.warnings.len(),
            "imported BPMN document"
        );
        Ok(ImportResult {
            graph: self.graph,
            warnings: self.warnings,
        })
    }

    fn warn(&mut self, element: String, message: &str) {
        warn!(element = %element, "{message}");
        if self.options.record_warnings {
            self.warnings.push(ImportWarning {
                element,
                message: message.to_string(),
            });
        }
    }

    // ========================================================================
    // PROCESSES AND FLOW ELEMENTS
    // ========================================================================

    fn read_process(&mut self, el: &XmlElement) -> Result<()> {
        let id = required(el, "id")?;
        let element = el.describe();
        let mut process = Process::new(id);
        for (key, value) in &el.attributes {
            match key.as_str() {
                "id" => {}
                "name" => process.name = Some(value.clone()),
                "isExecutable" => process.is_executable = parse_bool(value, key, &element)?,
                "isClosed" => process.is_closed = parse_bool(value, key, &element)?,
                "processType" => {
                    process.process_type = value
                        .parse()
                        .map_err(|_| invalid_value(value, key, &element))?
                }
                _ => {
                    process.attributes.insert(key.as_str(), value.as_str());
                }
            }
        }
        let process_id = process.id().clone();
        self.graph.add_process(process)?;
        self.read_flow_elements(&process_id, None, el)
    }

    fn read_flow_elements(
        &mut self,
        process: &ElementId,
        container: Option<&ElementId>,
        el: &XmlElement,
    ) -> Result<()> {
        for child in &el.children {
            if let Some(kind) = NodeKind::from_tag(&child.local) {
                let node_id = self.read_node(kind, child, process, container)?;
                if kind.is_sub_process() {
                    self.read_flow_elements(process, Some(&node_id), child)?;
                }
                continue;
            }
            match child.local.as_str() {
                "sequenceFlow" => {
                    let flow = read_sequence_flow(child, process, container)?;
                    self.flows.push(flow);
                }
                "laneSet" if container.is_none() => {
                    if self.lanes.iter().any(|(p, _)| p == process) {
                        self.warn(child.describe(), "only the first laneSet is read");
                    } else {
                        let lane_set = read_lane_set(child)?;
                        self.lanes.push((process.clone(), lane_set));
                    }
                }
                // Node adjacency of a sub-process, read with the node itself.
                "incoming" | "outgoing" if container.is_some() => {}
                _ => self.warn(child.describe(), "unsupported element skipped"),
            }
        }
        Ok(())
    }

    fn read_node(
        &mut self,
        kind: NodeKind,
        el: &XmlElement,
        process: &ElementId,
        container: Option<&ElementId>,
    ) -> Result<ElementId> {
        let id = ElementId::from(required(el, "id")?);
        let element = el.describe();
        let mut node = FlowNode::new(id.clone(), kind).with_process(process.clone());
        if let Some(container) = container {
            node = node.in_container(container.clone());
        }

        for (key, value) in &el.attributes {
            let consumed = match key.as_str() {
                "id" => true,
                "name" => {
                    node.name = Some(value.clone());
                    true
                }
                "default" if kind.supports_default_flow() => {
                    self.defaults.push((id.clone(), value.clone()));
                    true
                }
                _ => read_detail_attribute(&mut node.details, kind, key, value, &element)?,
            };
            if !consumed {
                node.attributes.insert(key.as_str(), value.as_str());
            }
        }

        let mut incoming = Vec::new();
        let mut outgoing = Vec::new();
        let mut definitions = Vec::new();
        for child in &el.children {
            match child.local.as_str() {
                "incoming" => incoming.push(child.text.clone()),
                "outgoing" => outgoing.push(child.text.clone()),
                local => {
                    if let Some(def) = EventDefinitionType::from_tag(local) {
                        definitions.push(read_event_definition(def, child));
                    } else if !kind.is_sub_process() {
                        self.warn(
                            format!("{element} > {}", child.describe()),
                            "unsupported child skipped",
                        );
                    }
                }
            }
        }

        if let NodeDetails::Event(event) = &mut node.details {
            let types: Vec<_> = definitions.iter().map(|d: &EventDefinition| d.kind).collect();
            event.trigger = EventTrigger::from_definitions(&types, event.parallel_multiple);
            event.definitions = definitions;
        } else if !definitions.is_empty() {
            self.warn(element.clone(), "event definitions on a non-event skipped");
        }

        self.declared.push(DeclaredAdjacency {
            node: id.clone(),
            incoming,
            outgoing,
        });

        if kind == NodeKind::BoundaryEvent {
            if node.attached_to().is_none() {
                return Err(DiagramError::missing_attribute(element, "attachedToRef"));
            }
            self.boundary_events.push(node);
        } else {
            self.graph.add_node(node)?;
        }
        Ok(id)
    }

    /// Add boundary events once every host activity exists.
    fn resolve_boundary_events(&mut self) -> Result<()> {
        for mut node in std::mem::take(&mut self.boundary_events) {
            let host = node.attached_to().cloned();
            let resolved = host
                .as_ref()
                .and_then(|h| self.graph.node(h.as_str()))
                .is_some_and(|h| h.kind().is_activity());
            if !resolved {
                let host = host.map(|h| h.to_string()).unwrap_or_default();
                let element = format!("boundaryEvent {}", node.id());
                if !self.options.lenient_attachments {
                    return Err(DiagramError::dangling(host, element));
                }
                self.warn(element, "attachedToRef does not resolve; kept as attribute");
                node.clear_attachment();
                node.attributes.insert("attachedToRef", host);
            }
            self.graph.add_node(node)?;
        }
        Ok(())
    }

    fn resolve_flows(&mut self) -> Result<()> {
        for flow in std::mem::take(&mut self.flows) {
            self.graph.add_sequence_flow(flow)?;
        }
        for (node, flow) in std::mem::take(&mut self.defaults) {
            self.graph.set_default_flow(node.as_str(), &flow)?;
        }
        for (process, lane_set) in std::mem::take(&mut self.lanes) {
            self.graph.set_lane_set(process.as_str(), Some(lane_set))?;
        }
        Ok(())
    }

    fn check_declared_adjacency(&mut self) {
        for declared in std::mem::take(&mut self.declared) {
            let Some(node) = self.graph.node(declared.node.as_str()) else {
                continue;
            };
            let same = |listed: &[String], actual: &[ElementId]| {
                listed.is_empty()
                    || (listed.len() == actual.len()
                        && listed
                            .iter()
                            .all(|l| actual.iter().any(|a| a.as_str() == l)))
            };
            let matches = same(&declared.incoming, node.incoming())
                && same(&declared.outgoing, node.outgoing());
            if !matches {
                let element = format!("{} {}", node.kind().tag(), node.id());
                self.warn(
                    element,
                    "declared incoming/outgoing differ from sequence flows; rebuilt from flows",
                );
            }
        }
    }

    // ========================================================================
    // COLLABORATION
    // ========================================================================

    fn read_collaboration(&mut self, el: &XmlElement) -> Result<()> {
        let id = required(el, "id")?;
        self.graph.set_collaboration_id(Some(ElementId::from(id)))?;
        for (key, value) in &el.attributes {
            if key != "id" {
                self.graph
                    .collaboration_attributes
                    .insert(key.as_str(), value.as_str());
            }
        }

        for child in &el.children {
            match child.local.as_str() {
                "participant" => {
                    let mut participant = Participant::new(required(child, "id")?);
                    for (key, value) in &child.attributes {
                        match key.as_str() {
                            "id" => {}
                            "name" => participant.name = Some(value.clone()),
                            "processRef" => participant = participant.with_process(value.as_str()),
                            _ => {
                                participant.attributes.insert(key.as_str(), value.as_str());
                            }
                        }
                    }
                    self.graph.add_participant(participant)?;
                }
                "messageFlow" => {
                    let mut flow = MessageFlow::new(
                        required(child, "id")?,
                        required(child, "sourceRef")?,
                        required(child, "targetRef")?,
                    );
                    for (key, value) in &child.attributes {
                        match key.as_str() {
                            "id" | "sourceRef" | "targetRef" => {}
                            "name" => flow.name = Some(value.clone()),
                            _ => {
                                flow.attributes.insert(key.as_str(), value.as_str());
                            }
                        }
                    }
                    self.graph.add_message_flow(flow)?;
                }
                _ => self.warn(child.describe(), "unsupported element skipped"),
            }
        }
        Ok(())
    }

    // ========================================================================
    // DIAGRAM INTERCHANGE
    // ========================================================================

    fn read_diagram(&mut self, el: &XmlElement) -> Result<()> {
        self.graph.diagram_attributes = el
            .attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let Some(plane) = el.child("BPMNPlane") else {
            return Ok(());
        };
        self.graph.plane_attributes = plane
            .attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        for child in &plane.children {
            let is_edge = match child.local.as_str() {
                "BPMNShape" => false,
                "BPMNEdge" => true,
                _ => {
                    self.warn(child.describe(), "unsupported element skipped");
                    continue;
                }
            };
            let target = required(child, "bpmnElement")?;
            let Some(bag) = self.graph.attributes_mut(target) else {
                self.warn(child.describe(), "bpmnElement does not resolve; layout skipped");
                continue;
            };
            read_layout(bag, child, is_edge);
        }
        Ok(())
    }
}

// ============================================================================
// ELEMENT HELPERS
// ============================================================================

fn required<'a>(el: &'a XmlElement, attribute: &'static str) -> Result<&'a str> {
    el.attr(attribute)
        .ok_or_else(|| DiagramError::missing_attribute(el.describe(), attribute))
}

fn parse_bool(value: &str, attribute: &str, element: &str) -> Result<bool> {
    match value.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(invalid_value(value, attribute, element)),
    }
}

fn invalid_value(value: &str, attribute: &str, element: &str) -> DiagramError {
    DiagramError::malformed(format!("invalid {attribute} '{value}' on {element}"))
}

/// Root attributes minus the BPMN namespace declarations the writer always emits.
fn definitions_bag(root: &XmlElement) -> AttributeBag {
    root.attributes
        .iter()
        .filter(|(key, value)| {
            let is_namespace = key == "xmlns" || key.starts_with("xmlns:");
            !(is_namespace && namespace::is_standard(value))
        })
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect()
}

/// Promote a kind-specific attribute into typed details. Returns `false`
/// when the attribute is not one the kind models.
fn read_detail_attribute(
    details: &mut NodeDetails,
    kind: NodeKind,
    key: &str,
    value: &str,
    element: &str,
) -> Result<bool> {
    match details {
        NodeDetails::Activity(activity) => match key {
            "triggeredByEvent" if kind.is_sub_process() => {
                activity.triggered_by_event = parse_bool(value, key, element)?;
            }
            _ => return Ok(false),
        },
        NodeDetails::Gateway(gateway) => match key {
            "gatewayDirection" => {
                gateway.direction = value
                    .parse()
                    .map_err(|_| invalid_value(value, key, element))?;
            }
            "instantiate" if kind == NodeKind::EventBasedGateway => {
                gateway.instantiate = parse_bool(value, key, element)?;
            }
            "eventGatewayType" if kind == NodeKind::EventBasedGateway => {
                gateway.event_gateway_type = value
                    .parse()
                    .map_err(|_| invalid_value(value, key, element))?;
            }
            _ => return Ok(false),
        },
        NodeDetails::Event(event) => match key {
            "parallelMultiple" => event.parallel_multiple = parse_bool(value, key, element)?,
            "isInterrupting" if kind == NodeKind::StartEvent => {
                event.is_interrupting = parse_bool(value, key, element)?;
            }
            "cancelActivity" if kind == NodeKind::BoundaryEvent => {
                event.cancel_activity = parse_bool(value, key, element)?;
            }
            "attachedToRef" if kind == NodeKind::BoundaryEvent => {
                event.attached_to = Some(ElementId::from(value));
            }
            _ => return Ok(false),
        },
        NodeDetails::Data(data) => match key {
            "isCollection" => data.is_collection = parse_bool(value, key, element)?,
            _ => return Ok(false),
        },
    }
    Ok(true)
}

fn read_event_definition(kind: EventDefinitionType, el: &XmlElement) -> EventDefinition {
    let mut def = EventDefinition::new(kind);
    for (key, value) in &el.attributes {
        if key == "id" {
            def.id = Some(ElementId::from(value.as_str()));
        } else {
            def.attributes.insert(key.as_str(), value.as_str());
        }
    }
    def.children = el.children.iter().map(read_definition_child).collect();
    def
}

fn read_definition_child(el: &XmlElement) -> DefinitionChild {
    let mut child = DefinitionChild::new(el.local.as_str(), el.text.as_str());
    for (key, value) in &el.attributes {
        child.attributes.insert(key.as_str(), value.as_str());
    }
    child.children = el.children.iter().map(read_definition_child).collect();
    child
}

fn read_sequence_flow(
    el: &XmlElement,
    process: &ElementId,
    container: Option<&ElementId>,
) -> Result<SequenceFlow> {
    let mut flow = SequenceFlow::new(
        required(el, "id")?,
        required(el, "sourceRef")?,
        required(el, "targetRef")?,
    )
    .with_process(process.clone());
    if let Some(container) = container {
        flow = flow.in_container(container.clone());
    }
    for (key, value) in &el.attributes {
        match key.as_str() {
            "id" | "sourceRef" | "targetRef" => {}
            "name" => flow.name = Some(value.clone()),
            _ => {
                flow.attributes.insert(key.as_str(), value.as_str());
            }
        }
    }
    if let Some(expr) = el.child("conditionExpression") {
        let mut condition = ConditionExpression::new(expr.text.clone());
        for (key, value) in &expr.attributes {
            if key == "id" {
                condition.id = Some(ElementId::from(value.as_str()));
            } else {
                condition.attributes.insert(key.as_str(), value.as_str());
            }
        }
        flow.condition = Some(condition);
    }
    Ok(flow)
}

fn read_lane_set(el: &XmlElement) -> Result<LaneSet> {
    let mut lane_set = LaneSet::new();
    lane_set.id = el.attr("id").map(ElementId::from);
    lane_set.name = el.attr("name").map(str::to_string);
    for child in el.children_named("lane") {
        let mut lane = Lane::new(required(child, "id")?);
        for (key, value) in &child.attributes {
            match key.as_str() {
                "id" => {}
                "name" => lane.name = Some(value.clone()),
                _ => {
                    lane.attributes.insert(key.as_str(), value.as_str());
                }
            }
        }
        lane.flow_node_refs = child
            .children_named("flowNodeRef")
            .map(|r| ElementId::from(r.text.as_str()))
            .collect();
        if let Some(child_set) = child.child("childLaneSet") {
            lane.child_lane_set = Some(read_lane_set(child_set)?);
        }
        lane_set.lanes.push(lane);
    }
    Ok(lane_set)
}

/// Fold a `BPMNShape`/`BPMNEdge` into `_di:` keys.
fn read_layout(bag: &mut AttributeBag, el: &XmlElement, is_edge: bool) {
    for (key, value) in &el.attributes {
        if key != "bpmnElement" {
            bag.insert(format!("{}{key}", di::PREFIX), value.as_str());
        }
    }
    if let Some(bounds) = el.child("Bounds").filter(|_| !is_edge) {
        for (key, name) in [(di::X, "x"), (di::Y, "y"), (di::WIDTH, "width"), (di::HEIGHT, "height")] {
            if let Some(value) = bounds.attr(name) {
                bag.insert(key, value);
            }
        }
    }
    if is_edge {
        let points: Vec<String> = el
            .children_named("waypoint")
            .map(|p| format!("{},{}", p.attr("x").unwrap_or("0"), p.attr("y").unwrap_or("0")))
            .collect();
        if !points.is_empty() {
            bag.insert(di::WAYPOINTS, points.join(" "));
        }
    }
    if let Some(label) = el.child("BPMNLabel") {
        let bounds = label
            .child("Bounds")
            .map(|b| {
                ["x", "y", "width", "height"]
                    .iter()
                    .map(|name| b.attr(name).unwrap_or("0"))
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .unwrap_or_default();
        bag.insert(di::LABEL, bounds);
    }
}
