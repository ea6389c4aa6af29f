//! CSV format support.
//!
//! A reduced table format covering flow nodes and sequence flows. It comes in
//! two shapes:
//!
//! - a single file where flow rows carry type `sequenceFlow`:
//!   `id,type,name,source,target,process,container,attached_to,trigger,default_flow,condition`
//! - a file pair: nodes (`id,type,name,process,container,attached_to,trigger,default_flow`)
//!   and flows (`id,name,source,target,process,condition`)
//!
//! Empty cells mean "not set". Layout, lanes, collaborations and residual
//! attributes are not represented.

use std::path::Path;

use csv::{ReaderBuilder, Trim, WriterBuilder};
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::format::{DiagramFormat, FormatCapability};
use crate::error::{DiagramError, Result};
use crate::graph::DiagramGraph;
use crate::model::{ConditionExpression, EventTrigger, FlowNode, NodeKind, Process, SequenceFlow};

/// Process that receives node rows without a `process` cell.
pub const DEFAULT_PROCESS: &str = "process_1";

/// `type` cell marking a flow row in the single-file layout.
const FLOW_TYPE: &str = "sequenceFlow";

const TABLE_HEADERS: [&str; 11] = [
    "id",
    "type",
    "name",
    "source",
    "target",
    "process",
    "container",
    "attached_to",
    "trigger",
    "default_flow",
    "condition",
];
const NODE_HEADERS: [&str; 8] = [
    "id",
    "type",
    "name",
    "process",
    "container",
    "attached_to",
    "trigger",
    "default_flow",
];
const FLOW_HEADERS: [&str; 6] = ["id", "name", "source", "target", "process", "condition"];

// ============================================================================
// ROWS
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
struct TableRow {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    name: Option<String>,
    source: Option<String>,
    target: Option<String>,
    process: Option<String>,
    container: Option<String>,
    attached_to: Option<String>,
    trigger: Option<String>,
    default_flow: Option<String>,
    condition: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct NodeRow {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    name: Option<String>,
    process: Option<String>,
    container: Option<String>,
    attached_to: Option<String>,
    trigger: Option<String>,
    default_flow: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct FlowRow {
    id: String,
    name: Option<String>,
    source: Option<String>,
    target: Option<String>,
    process: Option<String>,
    condition: Option<String>,
}

impl TableRow {
    fn is_flow(&self) -> bool {
        self.kind.eq_ignore_ascii_case(FLOW_TYPE)
    }

    fn into_node(self) -> NodeRow {
        NodeRow {
            id: self.id,
            kind: self.kind,
            name: self.name,
            process: self.process,
            container: self.container,
            attached_to: self.attached_to,
            trigger: self.trigger,
            default_flow: self.default_flow,
        }
    }

    fn into_flow(self) -> FlowRow {
        FlowRow {
            id: self.id,
            name: self.name,
            source: self.source,
            target: self.target,
            process: self.process,
            condition: self.condition,
        }
    }

    fn from_node(row: NodeRow) -> Self {
        Self {
            id: row.id,
            kind: row.kind,
            name: row.name,
            process: row.process,
            container: row.container,
            attached_to: row.attached_to,
            trigger: row.trigger,
            default_flow: row.default_flow,
            ..Self::default()
        }
    }

    fn from_flow(row: FlowRow) -> Self {
        Self {
            id: row.id,
            kind: FLOW_TYPE.to_string(),
            name: row.name,
            source: row.source,
            target: row.target,
            process: row.process,
            condition: row.condition,
            ..Self::default()
        }
    }
}

impl NodeRow {
    fn from_node(node: &FlowNode) -> Self {
        let trigger = node
            .trigger()
            .filter(|t| *t != EventTrigger::None)
            .map(|t| t.as_str().to_string());
        Self {
            id: node.id().to_string(),
            kind: node.kind().tag().to_string(),
            name: node.name.clone(),
            process: node.process().map(ToString::to_string),
            container: node.container().map(ToString::to_string),
            attached_to: node.attached_to().map(ToString::to_string),
            trigger,
            default_flow: node.default_flow().map(ToString::to_string),
        }
    }
}

impl FlowRow {
    fn from_flow(flow: &SequenceFlow) -> Self {
        Self {
            id: flow.id().to_string(),
            name: flow.name.clone(),
            source: Some(flow.source().to_string()),
            target: Some(flow.target().to_string()),
            process: flow.process().map(ToString::to_string),
            condition: flow.condition.as_ref().map(|c| c.body.clone()),
        }
    }
}

// ============================================================================
// FORMAT
// ============================================================================

/// CSV format handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Csv;

impl Csv {
    pub fn new() -> Self {
        Self
    }

    /// Read a nodes table and a flows table.
    pub fn read_pair(&self, nodes: &[u8], flows: &[u8]) -> Result<DiagramGraph> {
        let node_rows = read_rows::<NodeRow>(nodes)?;
        let flow_rows = read_rows::<FlowRow>(flows)?;
        build_graph(node_rows, flow_rows)
    }

    /// Write the nodes table and the flows table.
    pub fn write_pair(&self, graph: &DiagramGraph) -> Result<(Vec<u8>, Vec<u8>)> {
        let nodes = write_rows(&NODE_HEADERS, graph.nodes().map(NodeRow::from_node))?;
        let flows = write_rows(&FLOW_HEADERS, graph.sequence_flows().map(FlowRow::from_flow))?;
        Ok((nodes, flows))
    }

    pub fn read_pair_files(&self, nodes: &Path, flows: &Path) -> Result<DiagramGraph> {
        let node_bytes = std::fs::read(nodes).map_err(|e| DiagramError::io(nodes, e))?;
        let flow_bytes = std::fs::read(flows).map_err(|e| DiagramError::io(flows, e))?;
        self.read_pair(&node_bytes, &flow_bytes)
    }

    pub fn write_pair_files(&self, graph: &DiagramGraph, nodes: &Path, flows: &Path) -> Result<()> {
        let (node_bytes, flow_bytes) = self.write_pair(graph)?;
        std::fs::write(nodes, node_bytes).map_err(|e| DiagramError::io(nodes, e))?;
        std::fs::write(flows, flow_bytes).map_err(|e| DiagramError::io(flows, e))
    }
}

impl DiagramFormat for Csv {
    fn name(&self) -> &'static str {
        "CSV"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["csv"]
    }

    fn mime_type(&self) -> &'static str {
        "text/csv"
    }

    fn capabilities(&self) -> FormatCapability {
        FormatCapability::LOSSY
    }

    fn read(&self, input: &[u8]) -> Result<DiagramGraph> {
        let (flows, nodes): (Vec<_>, Vec<_>) = read_rows::<TableRow>(input)?
            .into_iter()
            .partition(TableRow::is_flow);
        build_graph(
            nodes.into_iter().map(TableRow::into_node).collect(),
            flows.into_iter().map(TableRow::into_flow).collect(),
        )
    }

    fn write(&self, graph: &DiagramGraph) -> Result<Vec<u8>> {
        let nodes = graph
            .nodes()
            .map(|n| TableRow::from_node(NodeRow::from_node(n)));
        let flows = graph
            .sequence_flows()
            .map(|f| TableRow::from_flow(FlowRow::from_flow(f)));
        write_rows(&TABLE_HEADERS, nodes.chain(flows))
    }

    fn validate(&self, input: &[u8]) -> Result<()> {
        let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(input);
        let headers = reader
            .headers()
            .map_err(|e| DiagramError::csv(format!("CSV read error: {e}")))?;
        for required in ["id", "type"] {
            if !headers.iter().any(|h| h == required) {
                return Err(DiagramError::csv(format!("missing column '{required}'")));
            }
        }
        Ok(())
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn read_rows<T: DeserializeOwned>(input: &[u8]) -> Result<Vec<T>> {
    ReaderBuilder::new()
        .trim(Trim::All)
        .from_reader(input)
        .deserialize::<T>()
        .map(|row| row.map_err(|e| DiagramError::csv(format!("CSV read error: {e}"))))
        .collect()
}

fn write_rows<T: Serialize>(headers: &[&str], rows: impl Iterator<Item = T>) -> Result<Vec<u8>> {
    let to_error = |e: csv::Error| DiagramError::csv(format!("CSV write error: {e}"));
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(headers).map_err(to_error)?;
    for row in rows {
        writer.serialize(row).map_err(to_error)?;
    }
    writer
        .into_inner()
        .map_err(|e| DiagramError::csv(format!("CSV write error: {e}")))
}

/// Build a graph from rows. Ordinary nodes go first with sub-processes ahead
/// of their contents, then boundary events, then flows, then default flows,
/// so rows may reference later rows.
fn build_graph(nodes: Vec<NodeRow>, flows: Vec<FlowRow>) -> Result<DiagramGraph> {
    let mut graph = DiagramGraph::new();

    let mut parsed = Vec::with_capacity(nodes.len());
    for row in nodes {
        let kind = row.kind.parse::<NodeKind>()?;
        parsed.push((kind, row));
    }
    let (boundary, mut ordinary): (Vec<_>, Vec<_>) = parsed
        .into_iter()
        .partition(|(kind, _)| *kind == NodeKind::BoundaryEvent);
    sort_by_nesting(&mut ordinary);

    let mut defaults = Vec::new();
    for (kind, row) in ordinary.into_iter().chain(boundary) {
        let process = row.process.as_deref().unwrap_or(DEFAULT_PROCESS);
        ensure_process(&mut graph, process)?;
        if let Some(flow) = &row.default_flow {
            defaults.push((row.id.clone(), flow.clone()));
        }
        graph.add_node(node_from_row(kind, &row)?.with_process(process))?;
    }

    for row in flows {
        if let Some(process) = &row.process {
            ensure_process(&mut graph, process)?;
        }
        graph.add_sequence_flow(flow_from_row(row)?)?;
    }

    for (node, flow) in defaults {
        graph.set_default_flow(&node, &flow)?;
    }

    debug!(
        nodes = graph.node_count(),
        flows = graph.sequence_flow_count(),
        "imported CSV tables"
    );
    Ok(graph)
}

/// Stable sort so every row follows the row of its container. Containers
/// that are missing or cyclic stop the walk; the graph reports them.
fn sort_by_nesting(rows: &mut [(NodeKind, NodeRow)]) {
    let containers: FxHashMap<String, Option<String>> = rows
        .iter()
        .map(|(_, row)| (row.id.clone(), row.container.clone()))
        .collect();
    let depth = |row: &NodeRow| {
        let mut depth = 0;
        let mut current = row.container.as_deref();
        while let Some(container) = current {
            depth += 1;
            if depth > containers.len() {
                break;
            }
            current = containers.get(container).and_then(|c| c.as_deref());
        }
        depth
    };
    rows.sort_by_cached_key(|(_, row)| depth(row));
}

fn ensure_process(graph: &mut DiagramGraph, id: &str) -> Result<()> {
    if graph.process(id).is_none() {
        graph.add_process(Process::new(id))?;
    }
    Ok(())
}

fn node_from_row(kind: NodeKind, row: &NodeRow) -> Result<FlowNode> {
    if row.id.is_empty() {
        return Err(DiagramError::missing_attribute(kind.tag(), "id"));
    }
    let trigger = row.trigger.as_deref().unwrap_or("");
    let mut node = if kind == NodeKind::BoundaryEvent {
        let host = row.attached_to.as_deref().ok_or_else(|| {
            DiagramError::missing_attribute(format!("boundaryEvent {}", row.id), "attached_to")
        })?;
        FlowNode::boundary_event(row.id.as_str(), host, trigger)?
    } else if kind.is_event() {
        FlowNode::event(row.id.as_str(), kind, trigger)?
    } else if !trigger.is_empty() {
        return Err(DiagramError::unsupported(format!(
            "trigger '{trigger}' on {kind} {}",
            row.id
        )));
    } else {
        FlowNode::new(row.id.as_str(), kind)
    };
    if let Some(name) = &row.name {
        node = node.with_name(name.as_str());
    }
    if let Some(container) = &row.container {
        node = node.in_container(container.as_str());
    }
    Ok(node)
}

fn flow_from_row(row: FlowRow) -> Result<SequenceFlow> {
    let element = format!("{FLOW_TYPE} {}", row.id);
    if row.id.is_empty() {
        return Err(DiagramError::missing_attribute(FLOW_TYPE, "id"));
    }
    let source = row
        .source
        .ok_or_else(|| DiagramError::missing_attribute(element.clone(), "source"))?;
    let target = row
        .target
        .ok_or_else(|| DiagramError::missing_attribute(element, "target"))?;
    let mut flow = SequenceFlow::new(row.id, source, target);
    if let Some(name) = row.name {
        flow = flow.with_name(name);
    }
    if let Some(process) = row.process {
        flow = flow.with_process(process);
    }
    if let Some(condition) = row.condition {
        flow = flow.with_condition(ConditionExpression::new(condition));
    }
    Ok(flow)
}
