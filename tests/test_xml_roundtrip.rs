//! BPMN XML import/export against document fixtures.

#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use bpmn::base::di;
use bpmn::interchange::{self, BpmnXml, DiagramFormat, ExportOptions, ImportOptions};
use bpmn::{DiagramError, DiagramGraph, EventTrigger, GatewayDirection, NodeDetails, NodeKind};
use rstest::rstest;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load(name: &str) -> DiagramGraph {
    interchange::read_file(&fixture(name)).unwrap()
}

fn ids<'a>(refs: impl IntoIterator<Item = &'a bpmn::ElementId>) -> Vec<&'a str> {
    refs.into_iter().map(|id| id.as_str()).collect()
}

// ============================================================================
// ROUND TRIP
// ============================================================================

#[rstest]
#[case("order_process.bpmn")]
#[case("collaboration.bpmn")]
#[case("subprocess_boundary.bpmn")]
#[case("forward_references.bpmn")]
#[case("unknown_elements.bpmn")]
fn test_import_export_import_is_stable(#[case] name: &str) {
    let graph = load(name);
    graph.validate().unwrap();

    let bytes = BpmnXml::new().write(&graph).unwrap();
    let reread = BpmnXml::new().read(&bytes).unwrap();

    reread.validate().unwrap();
    assert_eq!(reread, graph, "{name} changed across export");
}

#[rstest]
#[case(0)]
#[case(4)]
fn test_indentation_does_not_change_content(#[case] indent_size: usize) {
    let graph = load("order_process.bpmn");
    let format = BpmnXml::new().with_export_options(ExportOptions {
        indent_size,
        ..ExportOptions::default()
    });

    let text = format.export_string(&graph).unwrap();
    if indent_size == 0 {
        assert_eq!(text.lines().count(), 1);
    }
    assert_eq!(format.read(text.as_bytes()).unwrap(), graph);
}

#[test]
fn test_file_roundtrip() {
    let graph = load("collaboration.bpmn");
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("copy.bpmn");

    interchange::write_file(&path, &graph).unwrap();
    assert_eq!(interchange::read_file(&path).unwrap(), graph);
}

// ============================================================================
// FIXTURE CONTENT
// ============================================================================

#[test]
fn test_order_process_content() {
    let graph = load("order_process.bpmn");

    assert_eq!(graph.node_count(), 6);
    assert_eq!(graph.sequence_flow_count(), 6);
    let process = graph.process("Process_Order").unwrap();
    assert_eq!(process.name.as_deref(), Some("Order handling"));
    assert!(!process.is_executable);

    let start = graph.node("Start_Order").unwrap();
    assert_eq!(start.trigger(), Some(EventTrigger::Message));
    assert_eq!(ids(start.outgoing()), ["Flow_1"]);

    let gateway = graph.node("Gateway_Stock").unwrap();
    assert_eq!(gateway.kind(), NodeKind::ExclusiveGateway);
    assert_eq!(gateway.default_flow().unwrap().as_str(), "Flow_NoStock");
    assert_eq!(ids(gateway.outgoing()), ["Flow_InStock", "Flow_NoStock"]);
    assert_eq!(gateway.attributes.get("_di:isMarkerVisible"), Some("true"));
    assert_eq!(gateway.attributes.get(di::LABEL), Some("396,71,48,14"));

    let ship = graph.node("Task_Ship").unwrap();
    assert_eq!(ship.attributes.get("implementation"), Some("##WebService"));
    assert_eq!(ship.attributes.get(di::X), Some("500"));

    let in_stock = graph.sequence_flow("Flow_InStock").unwrap();
    assert_eq!(in_stock.name.as_deref(), Some("yes"));
    assert_eq!(
        in_stock.condition.as_ref().unwrap().body,
        "${stock >= quantity}"
    );
    assert_eq!(
        graph.sequence_flow("Flow_NoStock").unwrap().attributes.waypoints().len(),
        3
    );

    assert_eq!(graph.definitions_attributes.get("exporter"), Some("bpmn-js"));
    assert_eq!(graph.plane_attributes.get("bpmnElement"), Some("Process_Order"));
}

#[test]
fn test_collaboration_content() {
    let graph = load("collaboration.bpmn");

    assert_eq!(graph.collaboration_id().unwrap().as_str(), "Collaboration_1");
    assert_eq!(graph.participants().count(), 3);
    assert!(graph.participant("Pool_Bank").unwrap().process_ref().is_none());
    assert_eq!(
        graph.participant("Pool_Shop").unwrap().process_ref().unwrap().as_str(),
        "Process_Shop"
    );
    assert_eq!(
        graph.participant("Pool_Customer").unwrap().attributes.get(di::HEIGHT),
        Some("160")
    );

    let order = graph.message_flow("Msg_Order").unwrap();
    assert_eq!(order.source().as_str(), "Task_Place");
    assert_eq!(order.attributes.waypoints(), vec![("310", "180"), ("310", "332")]);
    assert_eq!(graph.message_flow("Msg_Payment").unwrap().target().as_str(), "Pool_Bank");

    let shop = graph.process("Process_Shop").unwrap();
    assert!(shop.is_executable);
    let lanes = shop.lane_set().unwrap().all_lanes();
    assert_eq!(
        lanes.iter().map(|l| l.id.as_str()).collect::<Vec<_>>(),
        ["Lane_Sales", "Lane_Warehouse", "Lane_Packing"]
    );
    assert_eq!(lanes[0].attributes.get(di::WIDTH), Some("570"));
    assert_eq!(ids(&lanes[2].flow_node_refs), ["Task_Pack"]);
}

#[test]
fn test_nested_content() {
    let graph = load("subprocess_boundary.bpmn");

    let mut children = ids(graph.children_of("Sub_Assess").map(|n| n.id()));
    children.sort();
    assert_eq!(children, ["Sub_End", "Sub_Inner", "Sub_Start"]);
    assert_eq!(
        graph.node("Task_Inner").unwrap().container().unwrap().as_str(),
        "Sub_Inner"
    );
    assert_eq!(
        graph.sequence_flow("Flow_Sub1").unwrap().container().unwrap().as_str(),
        "Sub_Assess"
    );
    assert_eq!(
        graph.node("Sub_Assess").unwrap().default_flow().unwrap().as_str(),
        "Flow_Approve"
    );

    let timeout = graph.node("Boundary_Timeout").unwrap();
    let event = timeout.event_details().unwrap();
    assert_eq!(timeout.attached_to().unwrap().as_str(), "Sub_Assess");
    assert_eq!(event.trigger, EventTrigger::Timer);
    assert!(!event.cancel_activity);
    let duration = &event.definitions[0].children[0];
    assert_eq!(duration.name, "timeDuration");
    assert_eq!(duration.text, "PT48H");
    assert_eq!(duration.attributes.get("xsi:type"), Some("tFormalExpression"));
    assert!(graph.node("Boundary_Error").unwrap().event_details().unwrap().cancel_activity);

    let escalation = graph.node("Esc_Start").unwrap().event_details().unwrap();
    assert!(!escalation.is_interrupting);
    assert_eq!(escalation.trigger, EventTrigger::Escalation);

    match graph.node("Sub_Escalation").unwrap().details() {
        NodeDetails::Activity(activity) => assert!(activity.triggered_by_event),
        other => panic!("unexpected details {other:?}"),
    }
    match graph.node("Data_Claim").unwrap().details() {
        NodeDetails::Data(data) => assert!(data.is_collection),
        other => panic!("unexpected details {other:?}"),
    }
}

#[test]
fn test_event_definition_children_keep_attributes() {
    let graph = load("subprocess_boundary.bpmn");
    let xml = BpmnXml::new().export_string(&graph).unwrap();
    assert!(
        xml.contains(r#"<bpmn:timeDuration xsi:type="tFormalExpression">PT48H</bpmn:timeDuration>"#),
        "{xml}"
    );

    let reread = BpmnXml::new().read(xml.as_bytes()).unwrap();
    let event = reread.node("Boundary_Timeout").unwrap().event_details().unwrap();
    assert_eq!(
        event.definitions[0].children[0].attributes.get("xsi:type"),
        Some("tFormalExpression")
    );
}

#[test]
fn test_nested_removal_cascades() {
    let mut graph = load("subprocess_boundary.bpmn");
    assert_eq!(graph.node_count(), 14);

    graph.remove_node("Sub_Assess").unwrap();

    assert_eq!(graph.node_count(), 7);
    for gone in ["Sub_Start", "Task_Inner", "Boundary_Timeout", "Boundary_Error"] {
        assert!(graph.node(gone).is_none(), "{gone} survived");
    }
    assert_eq!(ids(graph.sequence_flows().map(|f| f.id())), ["Flow_End"]);
    assert!(graph.node("Task_Remind").unwrap().incoming().is_empty());
    graph.validate().unwrap();
}

#[test]
fn test_forward_references_resolve() {
    let graph = load("forward_references.bpmn");

    let split = graph.node("Gateway_Split").unwrap();
    assert_eq!(split.gateway_details().unwrap().direction, GatewayDirection::Diverging);
    assert_eq!(ids(split.incoming()), ["Flow_In"]);
    assert_eq!(ids(split.outgoing()), ["Flow_A", "Flow_B"]);
    assert_eq!(
        graph.node("Boundary_Signal").unwrap().trigger(),
        Some(EventTrigger::Signal)
    );
}

#[test]
fn test_unknown_elements_are_skipped_with_warnings() {
    let bytes = std::fs::read(fixture("unknown_elements.bpmn")).unwrap();
    let result = BpmnXml::new().import(&bytes).unwrap();

    assert_eq!(result.graph.node_count(), 2);
    assert_eq!(result.graph.sequence_flow_count(), 1);
    let warned: Vec<_> = result.warnings.iter().map(|w| w.element.as_str()).collect();
    assert_eq!(warned.len(), 5, "{warned:?}");
    assert!(warned.contains(&"textAnnotation Annotation_1"));
    assert!(warned.contains(&"association Association_1"));
    assert!(warned.contains(&"message Message_1"));

    let task = result.graph.node("Task_1").unwrap();
    assert_eq!(task.attributes.get("camunda:asyncBefore"), Some("true"));

    let quiet = BpmnXml::new().with_import_options(ImportOptions {
        record_warnings: false,
        ..ImportOptions::default()
    });
    let silent = quiet.import(&bytes).unwrap();
    assert!(silent.warnings.is_empty());
    assert_eq!(silent.graph, result.graph);

    let xml = BpmnXml::new().export_string(&result.graph).unwrap();
    assert!(xml.contains("xmlns:camunda=\"http://camunda.org/schema/1.0/bpmn\""));
    assert!(!xml.contains("textAnnotation"));
}

#[test]
fn test_export_after_edit() {
    let mut graph = load("order_process.bpmn");
    graph.remove_node("Task_Notify").unwrap();
    graph
        .rename_node("Task_Ship", Some("Ship parcel".to_string()))
        .unwrap();

    let xml = BpmnXml::new().export_string(&graph).unwrap();
    assert!(!xml.contains("Task_Notify"));
    assert!(!xml.contains("Flow_NoStock"));
    assert!(xml.contains("name=\"Ship parcel\""));

    let reread = BpmnXml::new().read(xml.as_bytes()).unwrap();
    assert!(reread.node("Gateway_Stock").unwrap().default_flow().is_none());
    assert_eq!(reread, graph);
}

#[test]
fn test_malformed_document() {
    let err = BpmnXml::new()
        .read(b"<bpmn:definitions xmlns:bpmn=\"x\"><bpmn:process id=\"P\">")
        .unwrap_err();
    assert!(matches!(err, DiagramError::MalformedXml(_)));
}
