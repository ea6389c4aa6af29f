//! CSV export and re-import of real diagrams.

#![cfg(feature = "csv")]
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use bpmn::DiagramGraph;
use bpmn::interchange::{self, Csv, DiagramFormat};
use rstest::rstest;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Nodes and flows carry the same structure in both graphs.
fn assert_same_structure(expected: &DiagramGraph, actual: &DiagramGraph) {
    assert_eq!(actual.node_count(), expected.node_count());
    assert_eq!(actual.sequence_flow_count(), expected.sequence_flow_count());
    for node in expected.nodes() {
        let other = actual.node(node.id().as_str()).unwrap();
        assert_eq!(other.kind(), node.kind(), "{}", node.id());
        assert_eq!(other.name, node.name, "{}", node.id());
        assert_eq!(other.process(), node.process(), "{}", node.id());
        assert_eq!(other.container(), node.container(), "{}", node.id());
        assert_eq!(other.attached_to(), node.attached_to(), "{}", node.id());
        assert_eq!(other.trigger(), node.trigger(), "{}", node.id());
        assert_eq!(other.default_flow(), node.default_flow(), "{}", node.id());
        assert_eq!(other.incoming(), node.incoming(), "{}", node.id());
        assert_eq!(other.outgoing(), node.outgoing(), "{}", node.id());
    }
    for flow in expected.sequence_flows() {
        let other = actual.sequence_flow(flow.id().as_str()).unwrap();
        assert_eq!(other.source(), flow.source());
        assert_eq!(other.target(), flow.target());
        assert_eq!(other.name, flow.name);
        assert_eq!(other.container(), flow.container());
        assert_eq!(
            other.condition.as_ref().map(|c| &c.body),
            flow.condition.as_ref().map(|c| &c.body)
        );
    }
}

#[rstest]
#[case("order_process.bpmn")]
#[case("subprocess_boundary.bpmn")]
#[case("forward_references.bpmn")]
#[case("collaboration.bpmn")]
fn test_single_file_reproduces_structure(#[case] name: &str) {
    let graph = interchange::read_file(&fixture(name)).unwrap();

    let table = Csv.write(&graph).unwrap();
    let reread = Csv.read(&table).unwrap();

    assert_same_structure(&graph, &reread);
    reread.validate().unwrap();
}

#[rstest]
#[case("order_process.bpmn")]
#[case("subprocess_boundary.bpmn")]
fn test_file_pair_reproduces_structure(#[case] name: &str) {
    let graph = interchange::read_file(&fixture(name)).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let nodes = dir.path().join("nodes.csv");
    let flows = dir.path().join("flows.csv");

    Csv.write_pair_files(&graph, &nodes, &flows).unwrap();
    let reread = Csv.read_pair_files(&nodes, &flows).unwrap();

    assert_same_structure(&graph, &reread);
}

#[test]
fn test_csv_through_file_detection() {
    let graph = interchange::read_file(&fixture("order_process.bpmn")).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("order.csv");

    interchange::write_file(&path, &graph).unwrap();
    let reread = interchange::read_file(&path).unwrap();

    assert_same_structure(&graph, &reread);
    let ship = reread.node("Task_Ship").unwrap();
    assert!(!ship.attributes.has_layout());
}

#[test]
fn test_csv_to_bpmn() {
    let table = "\
id,type,name,source,target,process
start,startEvent,Begin,,,orders
work,task,Work,,,orders
done,endEvent,,,,orders
f1,sequenceFlow,,start,work,
f2,sequenceFlow,,work,done,
";
    let graph = Csv.read(table.as_bytes()).unwrap();
    let xml = interchange::BpmnXml::new().export_string(&graph).unwrap();

    assert!(xml.contains("<bpmn:process id=\"orders\""));
    assert!(xml.contains("sourceRef=\"work\" targetRef=\"done\""));
    let reread = interchange::BpmnXml::new().read(xml.as_bytes()).unwrap();
    assert_same_structure(&graph, &reread);
}
