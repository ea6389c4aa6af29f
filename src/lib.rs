//! # bpmn-graph
//!
//! Typed in-memory model of BPMN 2.0 process diagrams with lossless XML and
//! CSV import/export.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! interchange → BPMN XML and CSV readers/writers, format detection
//!   ↓
//! view        → Disposable petgraph snapshot, DOT rendering
//!   ↓
//! graph       → DiagramGraph: owns every entity, enforces invariants
//!   ↓
//! model       → FlowNode, SequenceFlow, Process, Participant, MessageFlow
//!   ↓
//! error       → DiagramError, Result
//!   ↓
//! base        → Primitives (ElementId, AttributeBag)
//! ```
//!
//! ## Example
//!
//! ```
//! use bpmn::{DiagramGraph, FlowNode, NodeKind, Process, SequenceFlow};
//!
//! let mut graph = DiagramGraph::new();
//! graph.add_process(Process::new("Process_1"))?;
//! graph.add_node(FlowNode::event("Start", NodeKind::StartEvent, "none")?.with_process("Process_1"))?;
//! graph.add_node(FlowNode::task("Task").with_name("Review").with_process("Process_1"))?;
//! graph.add_sequence_flow(SequenceFlow::new("Flow_1", "Start", "Task"))?;
//!
//! let view = graph.graph_view();
//! assert_eq!(view.node_count(), 2);
//! # Ok::<(), bpmn::DiagramError>(())
//! ```

// ============================================================================
// MODULES (dependency order: base → error → model → graph → view → interchange)
// ============================================================================

/// Foundation types: ElementId, AttributeBag, layout keys
pub mod base;

/// Error type shared by every module
pub mod error;

/// Typed BPMN entities
pub mod model;

/// The canonical diagram aggregate
pub mod graph;

/// Decoupled graph snapshot for visualization and graph algorithms
pub mod view;

/// Import/export: BPMN XML, CSV
pub mod interchange;

// Re-export foundation types
pub use base::{AttributeBag, ElementId};
pub use error::{DiagramError, Result};
pub use graph::DiagramGraph;
pub use model::{
    ConditionExpression, EventTrigger, FlowNode, GatewayDirection, Lane, LaneSet, MessageFlow,
    NodeDetails, NodeKind, Participant, Process, SequenceFlow,
};
pub use view::GraphView;
