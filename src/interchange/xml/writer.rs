//! BPMN XML writer.

use std::io::{Cursor, Write};

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tracing::debug;

use super::namespace;
use crate::base::{AttributeBag, ElementId, di};
use crate::error::{DiagramError, Result};
use crate::graph::DiagramGraph;
use crate::interchange::options::ExportOptions;
use crate::model::{
    DefinitionChild, EventDefinition, EventTrigger, FlowNode, LaneSet, NodeDetails, NodeKind,
    Process, ProcessType, SequenceFlow,
};

/// Namespace declarations written on every document root.
const DECLARATIONS: [(&str, &str); 5] = [
    ("xmlns:bpmn", namespace::MODEL),
    ("xmlns:bpmndi", namespace::BPMNDI),
    ("xmlns:dc", namespace::DC),
    ("xmlns:di", namespace::DI),
    ("xmlns:xsi", namespace::XSI),
];

/// Layout keys with dedicated output; every other `_di:` key becomes a
/// shape/edge attribute.
const STRUCTURED_LAYOUT: [&str; 7] = ["id", "x", "y", "width", "height", "label", "waypoints"];

pub(super) struct BpmnWriter<'o> {
    options: &'o ExportOptions,
}

impl<'o> BpmnWriter<'o> {
    pub fn new(options: &'o ExportOptions) -> Self {
        Self { options }
    }

    pub fn write(&self, graph: &DiagramGraph) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        let mut writer = if self.options.indent_size > 0 {
            Writer::new_with_indent(&mut buffer, b' ', self.options.indent_size)
        } else {
            Writer::new(&mut buffer)
        };

        emit(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
        )?;

        let mut root = BytesStart::new("bpmn:definitions");
        for declaration in DECLARATIONS {
            root.push_attribute(declaration);
        }
        for (key, value) in graph.definitions_attributes.plain() {
            if !DECLARATIONS.iter().any(|(k, _)| *k == key) {
                root.push_attribute((key, value));
            }
        }
        if !graph.definitions_attributes.contains("targetNamespace") {
            root.push_attribute(("targetNamespace", self.options.target_namespace.as_str()));
        }
        emit(&mut writer, Event::Start(root))?;

        if graph.has_collaboration() {
            self.write_collaboration(&mut writer, graph)?;
        }
        for process in graph.processes() {
            self.write_process(&mut writer, graph, process)?;
        }
        if self.options.include_diagram_interchange && has_diagram(graph) {
            self.write_diagram(&mut writer, graph)?;
        }

        emit(&mut writer, Event::End(BytesEnd::new("bpmn:definitions")))?;

        debug!(
            processes = graph.processes().count(),
            nodes = graph.node_count(),
            "exported BPMN document"
        );
        let mut output = buffer.into_inner();
        output.push(b'\n');
        Ok(output)
    }

    // ========================================================================
    // COLLABORATION
    // ========================================================================

    fn write_collaboration<W: Write>(
        &self,
        writer: &mut Writer<W>,
        graph: &DiagramGraph,
    ) -> Result<()> {
        let id = graph
            .collaboration_id()
            .cloned()
            .unwrap_or_else(ElementId::generate);
        let mut start = BytesStart::new("bpmn:collaboration");
        start.push_attribute(("id", id.as_str()));
        push_plain(&mut start, &graph.collaboration_attributes);
        emit(writer, Event::Start(start))?;

        for participant in graph.participants() {
            let mut el = BytesStart::new("bpmn:participant");
            el.push_attribute(("id", participant.id().as_str()));
            if let Some(name) = &participant.name {
                el.push_attribute(("name", name.as_str()));
            }
            if let Some(process) = participant.process_ref() {
                el.push_attribute(("processRef", process.as_str()));
            }
            push_plain(&mut el, &participant.attributes);
            emit(writer, Event::Empty(el))?;
        }

        for flow in graph.message_flows() {
            let mut el = BytesStart::new("bpmn:messageFlow");
            el.push_attribute(("id", flow.id().as_str()));
            if let Some(name) = &flow.name {
                el.push_attribute(("name", name.as_str()));
            }
            el.push_attribute(("sourceRef", flow.source().as_str()));
            el.push_attribute(("targetRef", flow.target().as_str()));
            push_plain(&mut el, &flow.attributes);
            emit(writer, Event::Empty(el))?;
        }

        emit(writer, Event::End(BytesEnd::new("bpmn:collaboration")))
    }

    // ========================================================================
    // PROCESSES
    // ========================================================================

    fn write_process<W: Write>(
        &self,
        writer: &mut Writer<W>,
        graph: &DiagramGraph,
        process: &Process,
    ) -> Result<()> {
        let mut start = BytesStart::new("bpmn:process");
        start.push_attribute(("id", process.id().as_str()));
        if let Some(name) = &process.name {
            start.push_attribute(("name", name.as_str()));
        }
        start.push_attribute(("isExecutable", bool_str(process.is_executable)));
        if process.is_closed {
            start.push_attribute(("isClosed", "true"));
        }
        if process.process_type != ProcessType::None {
            start.push_attribute(("processType", process.process_type.as_str()));
        }
        push_plain(&mut start, &process.attributes);
        emit(writer, Event::Start(start))?;

        if let Some(lane_set) = process.lane_set() {
            self.write_lane_set(writer, lane_set, "bpmn:laneSet")?;
        }
        self.write_contents(writer, graph, process, None)?;

        emit(writer, Event::End(BytesEnd::new("bpmn:process")))
    }

    /// Write the nodes and flows directly inside a process or sub-process.
    fn write_contents<W: Write>(
        &self,
        writer: &mut Writer<W>,
        graph: &DiagramGraph,
        process: &Process,
        container: Option<&ElementId>,
    ) -> Result<()> {
        for node in graph
            .nodes_in_process(process.id().as_str())
            .filter(|n| n.container() == container)
        {
            self.write_node(writer, graph, process, node)?;
        }
        for flow in graph
            .flows_in_process(process.id().as_str())
            .filter(|f| f.container() == container)
        {
            self.write_sequence_flow(writer, flow)?;
        }
        Ok(())
    }

    fn write_lane_set<W: Write>(
        &self,
        writer: &mut Writer<W>,
        lane_set: &LaneSet,
        tag: &str,
    ) -> Result<()> {
        let mut start = BytesStart::new(tag);
        if let Some(id) = &lane_set.id {
            start.push_attribute(("id", id.as_str()));
        }
        if let Some(name) = &lane_set.name {
            start.push_attribute(("name", name.as_str()));
        }
        if lane_set.lanes.is_empty() {
            return emit(writer, Event::Empty(start));
        }
        emit(writer, Event::Start(start))?;

        for lane in &lane_set.lanes {
            let mut el = BytesStart::new("bpmn:lane");
            el.push_attribute(("id", lane.id.as_str()));
            if let Some(name) = &lane.name {
                el.push_attribute(("name", name.as_str()));
            }
            push_plain(&mut el, &lane.attributes);
            if lane.flow_node_refs.is_empty() && lane.child_lane_set.is_none() {
                emit(writer, Event::Empty(el))?;
                continue;
            }
            emit(writer, Event::Start(el))?;
            for node in &lane.flow_node_refs {
                write_text_element(writer, "bpmn:flowNodeRef", node.as_str())?;
            }
            if let Some(child) = &lane.child_lane_set {
                self.write_lane_set(writer, child, "bpmn:childLaneSet")?;
            }
            emit(writer, Event::End(BytesEnd::new("bpmn:lane")))?;
        }

        emit(writer, Event::End(BytesEnd::new(tag)))
    }

    fn write_node<W: Write>(
        &self,
        writer: &mut Writer<W>,
        graph: &DiagramGraph,
        process: &Process,
        node: &FlowNode,
    ) -> Result<()> {
        let tag = format!("bpmn:{}", node.kind().tag());
        let mut start = BytesStart::new(tag.as_str());
        start.push_attribute(("id", node.id().as_str()));
        if let Some(name) = &node.name {
            start.push_attribute(("name", name.as_str()));
        }
        push_details(&mut start, node);
        push_plain(&mut start, &node.attributes);

        let definitions = event_definitions(node)?;
        let has_contents = node.kind().is_sub_process()
            && (graph.children_of(node.id().as_str()).next().is_some()
                || graph
                    .sequence_flows()
                    .any(|f| f.container() == Some(node.id())));
        if node.incoming().is_empty()
            && node.outgoing().is_empty()
            && definitions.is_empty()
            && !has_contents
        {
            return emit(writer, Event::Empty(start));
        }

        emit(writer, Event::Start(start))?;
        for flow in node.incoming() {
            write_text_element(writer, "bpmn:incoming", flow.as_str())?;
        }
        for flow in node.outgoing() {
            write_text_element(writer, "bpmn:outgoing", flow.as_str())?;
        }
        for definition in &definitions {
            write_event_definition(writer, definition)?;
        }
        if has_contents {
            self.write_contents(writer, graph, process, Some(node.id()))?;
        }
        emit(writer, Event::End(BytesEnd::new(tag.as_str())))
    }

    fn write_sequence_flow<W: Write>(
        &self,
        writer: &mut Writer<W>,
        flow: &SequenceFlow,
    ) -> Result<()> {
        let mut start = BytesStart::new("bpmn:sequenceFlow");
        start.push_attribute(("id", flow.id().as_str()));
        if let Some(name) = &flow.name {
            start.push_attribute(("name", name.as_str()));
        }
        start.push_attribute(("sourceRef", flow.source().as_str()));
        start.push_attribute(("targetRef", flow.target().as_str()));
        push_plain(&mut start, &flow.attributes);

        let Some(condition) = &flow.condition else {
            return emit(writer, Event::Empty(start));
        };
        emit(writer, Event::Start(start))?;

        let mut expr = BytesStart::new("bpmn:conditionExpression");
        if let Some(id) = &condition.id {
            expr.push_attribute(("id", id.as_str()));
        }
        push_plain(&mut expr, &condition.attributes);
        emit(writer, Event::Start(expr))?;
        emit(writer, Event::Text(BytesText::new(&condition.body)))?;
        emit(writer, Event::End(BytesEnd::new("bpmn:conditionExpression")))?;

        emit(writer, Event::End(BytesEnd::new("bpmn:sequenceFlow")))
    }

    // ========================================================================
    // DIAGRAM INTERCHANGE
    // ========================================================================

    fn write_diagram<W: Write>(&self, writer: &mut Writer<W>, graph: &DiagramGraph) -> Result<()> {
        let mut diagram = BytesStart::new("bpmndi:BPMNDiagram");
        if !graph.diagram_attributes.contains("id") {
            diagram.push_attribute(("id", ElementId::generate().as_str()));
        }
        push_plain(&mut diagram, &graph.diagram_attributes);
        emit(writer, Event::Start(diagram))?;

        let mut plane = BytesStart::new("bpmndi:BPMNPlane");
        if !graph.plane_attributes.contains("id") {
            plane.push_attribute(("id", ElementId::generate().as_str()));
        }
        push_plain(&mut plane, &graph.plane_attributes);
        if !graph.plane_attributes.contains("bpmnElement") {
            let target = graph
                .collaboration_id()
                .or_else(|| graph.processes().next().map(Process::id));
            if let Some(target) = target {
                plane.push_attribute(("bpmnElement", target.as_str()));
            }
        }
        emit(writer, Event::Start(plane))?;

        for participant in graph.participants() {
            write_shape(writer, participant.id(), &participant.attributes)?;
        }
        for process in graph.processes() {
            write_shape(writer, process.id(), &process.attributes)?;
        }
        for process in graph.processes() {
            if let Some(lane_set) = process.lane_set() {
                for lane in lane_set.all_lanes() {
                    write_shape(writer, &lane.id, &lane.attributes)?;
                }
            }
        }
        for node in graph.nodes() {
            write_shape(writer, node.id(), &node.attributes)?;
        }
        for flow in graph.sequence_flows() {
            write_edge(writer, flow.id(), &flow.attributes)?;
        }
        for flow in graph.message_flows() {
            write_edge(writer, flow.id(), &flow.attributes)?;
        }

        emit(writer, Event::End(BytesEnd::new("bpmndi:BPMNPlane")))?;
        emit(writer, Event::End(BytesEnd::new("bpmndi:BPMNDiagram")))
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn emit<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| DiagramError::serialize(format!("Write error: {e}")))
}

fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

fn push_plain(start: &mut BytesStart<'_>, bag: &AttributeBag) {
    for (key, value) in bag.plain() {
        start.push_attribute((key, value));
    }
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> Result<()> {
    emit(writer, Event::Start(BytesStart::new(tag)))?;
    emit(writer, Event::Text(BytesText::new(text)))?;
    emit(writer, Event::End(BytesEnd::new(tag)))
}

/// Typed detail attributes; defaults are left implicit.
fn push_details(start: &mut BytesStart<'_>, node: &FlowNode) {
    let kind = node.kind();
    match node.details() {
        NodeDetails::Activity(activity) => {
            if activity.triggered_by_event && kind.is_sub_process() {
                start.push_attribute(("triggeredByEvent", "true"));
            }
        }
        NodeDetails::Gateway(gateway) => {
            if gateway.direction != Default::default() {
                start.push_attribute(("gatewayDirection", gateway.direction.as_str()));
            }
            if kind == NodeKind::EventBasedGateway {
                if gateway.instantiate {
                    start.push_attribute(("instantiate", "true"));
                }
                if gateway.event_gateway_type != Default::default() {
                    start.push_attribute((
                        "eventGatewayType",
                        gateway.event_gateway_type.as_str(),
                    ));
                }
            }
        }
        NodeDetails::Event(event) => {
            if event.parallel_multiple {
                start.push_attribute(("parallelMultiple", "true"));
            }
            if kind == NodeKind::StartEvent && !event.is_interrupting {
                start.push_attribute(("isInterrupting", "false"));
            }
            if kind == NodeKind::BoundaryEvent && !event.cancel_activity {
                start.push_attribute(("cancelActivity", "false"));
            }
            if let Some(host) = event.attached_to() {
                start.push_attribute(("attachedToRef", host.as_str()));
            }
        }
        NodeDetails::Data(data) => {
            if data.is_collection {
                start.push_attribute(("isCollection", "true"));
            }
        }
    }
    if let Some(flow) = node.default_flow() {
        start.push_attribute(("default", flow.as_str()));
    }
}

/// Definitions to write: the stored ones, or a bare definition for the trigger.
///
/// A multiple trigger cannot be expressed without at least two stored
/// definitions.
fn event_definitions(node: &FlowNode) -> Result<Vec<EventDefinition>> {
    let Some(event) = node.event_details() else {
        return Ok(Vec::new());
    };
    let multiple = matches!(
        event.trigger,
        EventTrigger::Multiple | EventTrigger::ParallelMultiple
    );
    if multiple && event.definitions.len() < 2 {
        return Err(DiagramError::serialize(format!(
            "{} event {} needs at least two event definitions",
            event.trigger.as_str(),
            node.id()
        )));
    }
    if !event.definitions.is_empty() {
        return Ok(event.definitions.clone());
    }
    Ok(event
        .trigger
        .definition_type()
        .map(EventDefinition::new)
        .into_iter()
        .collect())
}

fn write_event_definition<W: Write>(writer: &mut Writer<W>, def: &EventDefinition) -> Result<()> {
    let tag = format!("bpmn:{}", def.kind.tag());
    let mut start = BytesStart::new(tag.as_str());
    if let Some(id) = &def.id {
        start.push_attribute(("id", id.as_str()));
    }
    push_plain(&mut start, &def.attributes);
    if def.children.is_empty() {
        return emit(writer, Event::Empty(start));
    }
    emit(writer, Event::Start(start))?;
    for child in &def.children {
        write_definition_child(writer, child)?;
    }
    emit(writer, Event::End(BytesEnd::new(tag.as_str())))
}

fn write_definition_child<W: Write>(
    writer: &mut Writer<W>,
    child: &DefinitionChild,
) -> Result<()> {
    let tag = format!("bpmn:{}", child.name);
    let mut start = BytesStart::new(tag.as_str());
    push_plain(&mut start, &child.attributes);
    if child.text.is_empty() && child.children.is_empty() {
        return emit(writer, Event::Empty(start));
    }
    emit(writer, Event::Start(start))?;
    if !child.text.is_empty() {
        emit(writer, Event::Text(BytesText::new(&child.text)))?;
    }
    for nested in &child.children {
        write_definition_child(writer, nested)?;
    }
    emit(writer, Event::End(BytesEnd::new(tag.as_str())))
}

fn has_diagram(graph: &DiagramGraph) -> bool {
    !graph.diagram_attributes.is_empty()
        || !graph.plane_attributes.is_empty()
        || graph.nodes().any(|n| n.attributes.has_layout())
        || graph.sequence_flows().any(|f| f.attributes.has_layout())
        || graph.participants().any(|p| p.attributes.has_layout())
        || graph.message_flows().any(|f| f.attributes.has_layout())
        || graph.processes().any(process_has_layout)
}

fn process_has_layout(process: &Process) -> bool {
    process.attributes.has_layout()
        || process.lane_set().is_some_and(|set| {
            set.all_lanes()
                .iter()
                .any(|lane| lane.attributes.has_layout())
        })
}

fn layout_start<'a>(tag: &'a str, element: &'a ElementId, bag: &'a AttributeBag) -> BytesStart<'a> {
    let mut start = BytesStart::new(tag);
    let id = bag
        .get(di::ID)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{element}_gui"));
    start.push_attribute(("id", id.as_str()));
    start.push_attribute(("bpmnElement", element.as_str()));
    for (name, value) in bag.layout() {
        if !STRUCTURED_LAYOUT.contains(&name) {
            start.push_attribute((name, value));
        }
    }
    start
}

fn write_shape<W: Write>(
    writer: &mut Writer<W>,
    element: &ElementId,
    bag: &AttributeBag,
) -> Result<()> {
    if !bag.has_layout() {
        return Ok(());
    }
    emit(writer, Event::Start(layout_start("bpmndi:BPMNShape", element, bag)))?;
    if bag.has_bounds() {
        let mut bounds = BytesStart::new("dc:Bounds");
        for (name, key) in [("x", di::X), ("y", di::Y), ("width", di::WIDTH), ("height", di::HEIGHT)] {
            bounds.push_attribute((name, bag.get(key).unwrap_or("0")));
        }
        emit(writer, Event::Empty(bounds))?;
    }
    write_label(writer, bag)?;
    emit(writer, Event::End(BytesEnd::new("bpmndi:BPMNShape")))
}

fn write_edge<W: Write>(
    writer: &mut Writer<W>,
    element: &ElementId,
    bag: &AttributeBag,
) -> Result<()> {
    if !bag.has_layout() {
        return Ok(());
    }
    emit(writer, Event::Start(layout_start("bpmndi:BPMNEdge", element, bag)))?;
    for (x, y) in bag.waypoints() {
        let mut point = BytesStart::new("di:waypoint");
        point.push_attribute(("x", x));
        point.push_attribute(("y", y));
        emit(writer, Event::Empty(point))?;
    }
    write_label(writer, bag)?;
    emit(writer, Event::End(BytesEnd::new("bpmndi:BPMNEdge")))
}

fn write_label<W: Write>(writer: &mut Writer<W>, bag: &AttributeBag) -> Result<()> {
    let Some(label) = bag.get(di::LABEL) else {
        return Ok(());
    };
    let parts: Vec<&str> = label.split(',').collect();
    if parts.len() != 4 {
        return emit(writer, Event::Empty(BytesStart::new("bpmndi:BPMNLabel")));
    }
    emit(writer, Event::Start(BytesStart::new("bpmndi:BPMNLabel")))?;
    let mut bounds = BytesStart::new("dc:Bounds");
    for (name, value) in ["x", "y", "width", "height"].into_iter().zip(parts) {
        bounds.push_attribute((name, value));
    }
    emit(writer, Event::Empty(bounds))?;
    emit(writer, Event::End(BytesEnd::new("bpmndi:BPMNLabel")))
}
