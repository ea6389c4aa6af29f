use super::*;
use crate::model::{ConditionExpression, EventTrigger, Lane};
use rstest::rstest;

fn linear() -> DiagramGraph {
    let mut graph = DiagramGraph::new();
    graph.add_process(Process::new("P")).unwrap();
    graph
        .add_node(FlowNode::event("Start", NodeKind::StartEvent, "none").unwrap())
        .unwrap();
    graph.add_node(FlowNode::task("A").with_name("A")).unwrap();
    graph.add_node(FlowNode::task("B").with_name("B")).unwrap();
    graph
        .add_sequence_flow(SequenceFlow::new("f0", "Start", "A"))
        .unwrap();
    graph.add_sequence_flow(SequenceFlow::new("f1", "A", "B")).unwrap();
    graph
}

/// `P1` holds `a1`, `b1` and sub-process `sub1`; `P2` holds `a2` and `b2`.
fn two_processes() -> DiagramGraph {
    let mut graph = DiagramGraph::new();
    graph.add_process(Process::new("P1")).unwrap();
    graph.add_process(Process::new("P2")).unwrap();
    for (id, process) in [("a1", "P1"), ("b1", "P1"), ("a2", "P2"), ("b2", "P2")] {
        graph.add_node(FlowNode::task(id).with_process(process)).unwrap();
    }
    graph
        .add_node(FlowNode::new("sub1", NodeKind::SubProcess).with_process("P1"))
        .unwrap();
    graph
}

// ============================================================================
// ADD / REMOVE NODES
// ============================================================================

#[test]
fn test_add_node_joins_only_process() {
    let graph = linear();
    let a = graph.node("A").unwrap();
    assert_eq!(a.process().map(ElementId::as_str), Some("P"));
    assert!(graph.process("P").unwrap().contains_node("A"));
    graph.validate().unwrap();
}

#[test]
fn test_add_node_without_process_needs_single_process() {
    let mut graph = DiagramGraph::new();
    graph.add_process(Process::new("P1")).unwrap();
    graph.add_process(Process::new("P2")).unwrap();
    let err = graph.add_node(FlowNode::task("T")).unwrap_err();
    assert!(matches!(err, DiagramError::MissingRequiredAttribute { attribute: "process", .. }));
    assert_eq!(graph.node_count(), 0);
}

#[test]
fn test_duplicate_node_rejected_and_graph_unchanged() {
    let mut graph = linear();
    let before = graph.clone();
    let err = graph.add_node(FlowNode::task("A").with_name("other")).unwrap_err();
    assert!(matches!(err, DiagramError::DuplicateIdentifier(ref id) if id.as_str() == "A"));
    assert_eq!(graph, before);
}

#[test]
fn test_ids_unique_across_entity_kinds() {
    let mut graph = linear();
    let err = graph.add_node(FlowNode::task("f1")).unwrap_err();
    assert!(matches!(err, DiagramError::DuplicateIdentifier(_)));
    let err = graph.add_process(Process::new("A")).unwrap_err();
    assert!(matches!(err, DiagramError::DuplicateIdentifier(_)));
}

#[test]
fn test_unknown_process_is_dangling() {
    let mut graph = linear();
    let err = graph
        .add_node(FlowNode::task("T").with_process("Nope"))
        .unwrap_err();
    assert!(matches!(err, DiagramError::DanglingReference { ref id, .. } if id == "Nope"));
}

#[test]
fn test_remove_node_cascades_to_flows() {
    let mut graph = linear();
    let b_before = graph.node("B").unwrap().clone();

    graph.remove_node("A").unwrap();

    assert!(graph.node("A").is_none());
    assert!(graph.sequence_flow("f0").is_none());
    assert!(graph.sequence_flow("f1").is_none());
    let b = graph.node("B").unwrap();
    assert!(b.incoming().is_empty());
    assert_eq!(b.name, b_before.name);
    assert_eq!(b.kind(), b_before.kind());
    assert!(graph.node("Start").unwrap().outgoing().is_empty());
    assert_eq!(graph.process("P").unwrap().flow_ids().count(), 0);
    graph.validate().unwrap();
}

#[test]
fn test_remove_missing_node_is_not_found() {
    let mut graph = linear();
    assert!(matches!(
        graph.remove_node("Z"),
        Err(DiagramError::NotFound { kind: "node", .. })
    ));
}

#[test]
fn test_remove_sub_process_removes_contents_and_boundary_events() {
    let mut graph = linear();
    graph
        .add_node(FlowNode::new("Sub", NodeKind::SubProcess))
        .unwrap();
    graph
        .add_node(FlowNode::task("Inner1").in_container("Sub"))
        .unwrap();
    graph
        .add_node(FlowNode::task("Inner2").in_container("Sub"))
        .unwrap();
    graph
        .add_sequence_flow(SequenceFlow::new("fi", "Inner1", "Inner2"))
        .unwrap();
    graph
        .add_node(FlowNode::boundary_event("Timer", "Sub", "timer").unwrap())
        .unwrap();
    graph
        .add_sequence_flow(SequenceFlow::new("fb", "Timer", "B"))
        .unwrap();

    assert_eq!(
        graph.sequence_flow("fi").unwrap().container().map(ElementId::as_str),
        Some("Sub")
    );

    graph.remove_node("Sub").unwrap();

    for gone in ["Sub", "Inner1", "Inner2", "Timer"] {
        assert!(graph.node(gone).is_none(), "{gone} should be removed");
    }
    assert!(graph.sequence_flow("fi").is_none());
    assert!(graph.sequence_flow("fb").is_none());
    assert_eq!(graph.node("B").unwrap().incoming().len(), 1);
    graph.validate().unwrap();
}

#[test]
fn test_container_must_be_sub_process() {
    let mut graph = linear();
    let err = graph
        .add_node(FlowNode::task("X").in_container("A"))
        .unwrap_err();
    assert!(matches!(err, DiagramError::DanglingReference { ref id, .. } if id == "A"));
}

#[test]
fn test_boundary_event_must_attach_to_activity() {
    let mut graph = linear();
    let err = graph
        .add_node(FlowNode::boundary_event("E", "Start", "error").unwrap())
        .unwrap_err();
    assert!(matches!(err, DiagramError::DanglingReference { .. }));

    let err = graph
        .add_node(FlowNode::boundary_event("E", "Missing", "error").unwrap())
        .unwrap_err();
    assert!(matches!(err, DiagramError::DanglingReference { ref id, .. } if id == "Missing"));

    graph
        .add_node(FlowNode::boundary_event("E", "A", "error").unwrap())
        .unwrap();
    assert_eq!(graph.node("E").unwrap().trigger(), Some(EventTrigger::Error));
}

// ============================================================================
// SEQUENCE FLOWS
// ============================================================================

#[test]
fn test_add_flow_updates_adjacency_in_order() {
    let mut graph = linear();
    graph.add_node(FlowNode::task("C")).unwrap();
    graph.add_sequence_flow(SequenceFlow::new("f2", "A", "C")).unwrap();

    let a = graph.node("A").unwrap();
    let outgoing: Vec<_> = a.outgoing().iter().map(ElementId::as_str).collect();
    assert_eq!(outgoing, vec!["f1", "f2"]);
    let incoming: Vec<_> = a.incoming().iter().map(ElementId::as_str).collect();
    assert_eq!(incoming, vec!["f0"]);
}

#[test]
fn test_add_flow_with_unknown_endpoint_is_dangling() {
    let mut graph = linear();
    let before = graph.clone();
    let err = graph
        .add_sequence_flow(SequenceFlow::new("fx", "A", "Ghost"))
        .unwrap_err();
    match err {
        DiagramError::DanglingReference { id, element } => {
            assert_eq!(id, "Ghost");
            assert_eq!(element, "sequenceFlow fx");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(graph, before);
}

#[test]
fn test_self_loop() {
    let mut graph = linear();
    graph.add_sequence_flow(SequenceFlow::new("loop", "B", "B")).unwrap();
    let b = graph.node("B").unwrap();
    assert!(b.incoming().iter().any(|f| f.as_str() == "loop"));
    assert!(b.outgoing().iter().any(|f| f.as_str() == "loop"));
    graph.remove_sequence_flow("loop").unwrap();
    graph.validate().unwrap();
}

#[test]
fn test_remove_flow_unlinks_endpoints() {
    let mut graph = linear();
    let flow = graph.remove_sequence_flow("f1").unwrap();
    assert_eq!(flow.source().as_str(), "A");
    assert!(graph.node("A").unwrap().outgoing().is_empty());
    assert!(graph.node("B").unwrap().incoming().is_empty());
    assert!(matches!(
        graph.remove_sequence_flow("f1"),
        Err(DiagramError::NotFound { .. })
    ));
}

#[test]
fn test_default_flow_must_leave_node() {
    let mut graph = linear();
    graph
        .add_node(FlowNode::gateway("G", NodeKind::ExclusiveGateway).unwrap())
        .unwrap();
    graph.add_sequence_flow(SequenceFlow::new("g1", "G", "A")).unwrap();
    graph
        .add_sequence_flow(
            SequenceFlow::new("g2", "G", "B").with_condition(ConditionExpression::new("${ok}")),
        )
        .unwrap();

    let err = graph.set_default_flow("G", "f1").unwrap_err();
    assert!(matches!(err, DiagramError::DanglingReference { ref id, .. } if id == "f1"));

    graph.set_default_flow("G", "g1").unwrap();
    assert_eq!(graph.node("G").unwrap().default_flow().map(ElementId::as_str), Some("g1"));

    graph.remove_sequence_flow("g1").unwrap();
    assert!(graph.node("G").unwrap().default_flow().is_none());
}

#[test]
fn test_parallel_gateway_has_no_default_flow() {
    let mut graph = linear();
    graph
        .add_node(FlowNode::gateway("G", NodeKind::ParallelGateway).unwrap())
        .unwrap();
    graph.add_sequence_flow(SequenceFlow::new("g1", "G", "A")).unwrap();
    assert!(matches!(
        graph.set_default_flow("G", "g1"),
        Err(DiagramError::UnsupportedElementKind(_))
    ));
}

#[rstest]
#[case::endpoints_in_different_processes(SequenceFlow::new("f", "a1", "b2"), "b2")]
#[case::explicit_process_differs(
    SequenceFlow::new("f", "a2", "b2").with_process("P1"),
    "P1"
)]
#[case::container_in_other_process(
    SequenceFlow::new("f", "a2", "b2").in_container("sub1"),
    "sub1"
)]
fn test_flow_must_stay_in_one_process(#[case] flow: SequenceFlow, #[case] dangling: &str) {
    let mut graph = two_processes();
    let before = graph.clone();
    let err = graph.add_sequence_flow(flow).unwrap_err();
    assert!(
        matches!(err, DiagramError::DanglingReference { ref id, .. } if id == dangling),
        "{err:?}"
    );
    assert_eq!(graph, before);
}

#[test]
fn test_remove_process_leaves_other_process_valid() {
    let mut graph = two_processes();
    graph
        .add_sequence_flow(SequenceFlow::new("f", "a2", "b2").with_process("P2"))
        .unwrap();
    graph.remove_process("P1").unwrap();
    assert_eq!(graph.sequence_flow("f").unwrap().process().map(ElementId::as_str), Some("P2"));
    graph.validate().unwrap();
}

// ============================================================================
// PROCESSES, LANES, COLLABORATION
// ============================================================================

#[test]
fn test_create_process_points_plane_at_it() {
    let mut graph = DiagramGraph::with_diagram("Main");
    let id = graph.create_process("Orders").unwrap();
    assert_eq!(graph.plane_attributes.get("bpmnElement"), Some(id.as_str()));
    assert_eq!(graph.process(id.as_str()).unwrap().name.as_deref(), Some("Orders"));
    assert!(graph.diagram_attributes.get("id").is_some());
}

#[test]
fn test_remove_process_cascades() {
    let mut graph = linear();
    graph
        .add_participant(Participant::new("Pool").with_process("P"))
        .unwrap();
    graph.remove_process("P").unwrap();
    assert_eq!(graph.node_count(), 0);
    assert_eq!(graph.sequence_flow_count(), 0);
    assert!(graph.participant("Pool").unwrap().process_ref().is_none());
}

#[test]
fn test_lane_refs_validated_and_cleaned() {
    let mut graph = linear();
    let lanes = LaneSet::new()
        .with_lane(Lane::new("L1").with_node("Start").with_node("A"))
        .with_lane(Lane::new("L2").with_node("B"));
    graph.set_lane_set("P", Some(lanes)).unwrap();
    assert!(graph.contains_id("L1"));

    let bad = LaneSet::new().with_lane(Lane::new("L3").with_node("Nope"));
    assert!(matches!(
        graph.set_lane_set("P", Some(bad)),
        Err(DiagramError::DanglingReference { .. })
    ));
    assert!(graph.contains_id("L1"), "previous lane set kept on failure");

    graph.remove_node("A").unwrap();
    let lane_set = graph.process("P").unwrap().lane_set().unwrap();
    let refs: Vec<_> = lane_set.lanes[0]
        .flow_node_refs
        .iter()
        .map(ElementId::as_str)
        .collect();
    assert_eq!(refs, vec!["Start"]);

    graph.attributes_mut("L2").unwrap().insert("_di:x", "0");
    assert_eq!(
        graph.process("P").unwrap().lane_set().unwrap().lanes[1]
            .attributes
            .get("_di:x"),
        Some("0")
    );
}

#[test]
fn test_lane_refs_must_stay_in_process() {
    let mut graph = two_processes();
    let foreign = LaneSet::new().with_lane(Lane::new("L").with_node("a1").with_node("b2"));
    let err = graph.set_lane_set("P1", Some(foreign)).unwrap_err();
    assert!(matches!(err, DiagramError::DanglingReference { ref id, .. } if id == "b2"));
    assert!(graph.process("P1").unwrap().lane_set().is_none());

    let own = LaneSet::new().with_lane(Lane::new("L").with_node("a1"));
    graph.set_lane_set("P1", Some(own)).unwrap();
    graph.remove_node("b2").unwrap();
    graph.validate().unwrap();
}

#[test]
fn test_message_flows_between_pools() {
    let mut graph = linear();
    graph
        .add_participant(Participant::new("Customer").with_name("Customer"))
        .unwrap();
    assert!(graph.collaboration_id().is_some());
    graph
        .add_message_flow(MessageFlow::new("m1", "Customer", "Start"))
        .unwrap();

    let err = graph
        .add_message_flow(MessageFlow::new("m2", "Customer", "Nowhere"))
        .unwrap_err();
    assert!(matches!(err, DiagramError::DanglingReference { .. }));

    graph.remove_node("Start").unwrap();
    assert!(graph.message_flow("m1").is_none());

    graph
        .add_message_flow(MessageFlow::new("m3", "Customer", "B"))
        .unwrap();
    graph.remove_participant("Customer").unwrap();
    assert_eq!(graph.message_flows().count(), 0);
}

#[test]
fn test_participant_with_unknown_process() {
    let mut graph = DiagramGraph::new();
    let err = graph
        .add_participant(Participant::new("Pool").with_process("Ghost"))
        .unwrap_err();
    assert!(matches!(err, DiagramError::DanglingReference { ref id, .. } if id == "Ghost"));
}

#[test]
fn test_queries_preserve_insertion_order() {
    let graph = linear();
    let ids: Vec<_> = graph.nodes_in_process("P").map(|n| n.id().as_str()).collect();
    assert_eq!(ids, vec!["Start", "A", "B"]);
    let flows: Vec<_> = graph.flows_in_process("P").map(|f| f.id().as_str()).collect();
    assert_eq!(flows, vec!["f0", "f1"]);
    assert_eq!(graph.nodes_by_kind(NodeKind::Task).count(), 2);
}

#[test]
fn test_graph_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DiagramGraph>();
}
